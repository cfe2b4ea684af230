// Lenient field decoders
//
// The PHP backend is loose about JSON types: counters arrive as numbers or as
// strings with thousands separators, and an empty associative array is
// encoded as `[]` rather than `{}`. These helpers absorb both.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(u64),
    Float(f64),
    Text(String),
}

fn strip_separators(text: &str) -> String {
    text.trim().chars().filter(|c| *c != ',').collect()
}

/// `92699`, `92699.0`, `"92699"` and `"92,699"` all decode to `92699`.
#[allow(clippy::as_conversions, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(n) => Ok(n),
        NumberOrText::Float(f) if f >= 0.0 => Ok(f as u64),
        NumberOrText::Float(f) => Err(de::Error::custom(format!("negative count {f}"))),
        NumberOrText::Text(s) => strip_separators(&s)
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid count {s:?}"))),
    }
}

/// Percentages and other fractional values, numeric or textual.
#[allow(clippy::as_conversions, clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn ratio<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(n) => Ok(n as f32),
        NumberOrText::Float(f) => Ok(f as f32),
        NumberOrText::Text(s) => strip_separators(&s)
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid number {s:?}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrList<V> {
    Map(BTreeMap<String, V>),
    List(Vec<serde_json::Value>),
}

/// A string-keyed map that may be encoded as an empty list when it has no
/// entries. A non-empty list is rejected.
pub fn map<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: DeserializeOwned,
{
    match MapOrList::<V>::deserialize(deserializer)? {
        MapOrList::Map(m) => Ok(m),
        MapOrList::List(l) if l.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(de::Error::custom("expected an object, found a non-empty array")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "count")]
        n: u64,
        #[serde(deserialize_with = "ratio")]
        r: f32,
        #[serde(deserialize_with = "map")]
        m: BTreeMap<String, u64>,
    }

    #[test]
    fn accepts_text_with_separators() {
        let p: Probe = serde_json::from_str(r#"{"n":"92,699","r":"12.5","m":{"a":1}}"#).unwrap();
        assert_eq!(p.n, 92_699);
        assert!((p.r - 12.5).abs() < f32::EPSILON);
        assert_eq!(p.m["a"], 1);
    }

    #[test]
    fn accepts_plain_numbers_and_empty_list() {
        let p: Probe = serde_json::from_str(r#"{"n":7,"r":3,"m":[]}"#).unwrap();
        assert_eq!(p.n, 7);
        assert!((p.r - 3.0).abs() < f32::EPSILON);
        assert!(p.m.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"n":"lots","r":1,"m":{}}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"n":1,"r":1,"m":[1]}"#).is_err());
    }
}
