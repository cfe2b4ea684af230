// Request construction
//
// Turns an `Endpoint` (what to call) plus the current `SessionState` (which
// credentials are usable) into a fully formed `ApiRequest`. Nothing here
// touches the network; the builder never refuses a request based on local
// session state -- the appliance's sentinel is the only authority on whether
// credentials were sufficient.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;
use url::form_urlencoded;

use crate::error::Error;
use crate::instance::Instance;
use crate::session::{SESSION_COOKIE, SessionState};

const API_PATH: &str = "/admin/api.php";
const API_DB_PATH: &str = "/admin/api_db.php";
const LOGIN_PATH: &str = "/admin/login.php";
const DASHBOARD_PATH: &str = "/admin/index.php";

/// Query parameter carrying the derived API key.
pub const AUTH_PARAM: &str = "auth";

/// One appliance operation: path, query template, and auth expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Legacy dashboard counters: `api.php` with no query.
    Status,
    /// `api.php?summaryRaw`
    Summary,
    /// The HTML dashboard, scraped for hardware telemetry.
    Dashboard,
    /// `api.php?topItems=N`
    TopItems { count: u32 },
    /// `api.php?getQuerySources=N`
    TopClients { count: u32 },
    /// `api.php?topClientsBlocked=N`
    TopBlockedClients { count: u32 },
    /// `api.php?getQueryTypes`
    QueryTypes,
    /// `api.php?overTimeData10mins`
    OverTimeData10Mins,
    /// `api_db.php?getGraphData&from=..&until=..&interval=..`
    GraphData { from: i64, until: i64, interval: u64 },
    /// `api.php?overTimeDataClients&getClientNames`
    ClientTimeline,
    /// `api.php?getForwardDestinations`
    ForwardDestinations,
    /// `api_db.php?network`
    Network,
    /// `api.php?enable`
    Enable,
    /// `api.php?disable[=seconds]`
    Disable { seconds: Option<u64> },
    /// `api.php?recentBlocked` -- cheap probe used to verify an API key.
    RecentBlocked,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => DASHBOARD_PATH,
            Self::GraphData { .. } | Self::Network => API_DB_PATH,
            _ => API_PATH,
        }
    }

    /// Query items in order. A `None` value renders as a bare key (`?summaryRaw`).
    pub fn query(&self) -> Vec<(&'static str, Option<String>)> {
        match self {
            Self::Status | Self::Dashboard => Vec::new(),
            Self::Summary => vec![("summaryRaw", None)],
            Self::TopItems { count } => vec![("topItems", Some(count.to_string()))],
            Self::TopClients { count } => vec![("getQuerySources", Some(count.to_string()))],
            Self::TopBlockedClients { count } => {
                vec![("topClientsBlocked", Some(count.to_string()))]
            }
            Self::QueryTypes => vec![("getQueryTypes", None)],
            Self::OverTimeData10Mins => vec![("overTimeData10mins", None)],
            Self::GraphData {
                from,
                until,
                interval,
            } => vec![
                ("getGraphData", None),
                ("from", Some(from.to_string())),
                ("until", Some(until.to_string())),
                ("interval", Some(interval.to_string())),
            ],
            Self::ClientTimeline => vec![("overTimeDataClients", None), ("getClientNames", None)],
            Self::ForwardDestinations => vec![("getForwardDestinations", None)],
            Self::Network => vec![("network", None)],
            Self::Enable => vec![("enable", None)],
            Self::Disable { seconds } => vec![("disable", seconds.map(|s| s.to_string()))],
            Self::RecentBlocked => vec![("recentBlocked", None)],
        }
    }

    /// Whether the appliance is expected to demand credentials.
    ///
    /// Informational only: unauthenticated calls are still sent.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Status
                | Self::Summary
                | Self::Dashboard
                | Self::OverTimeData10Mins
                | Self::RecentBlocked
        )
    }

    /// The dashboard page only honours the session cookie; an `auth` query
    /// parameter is meaningless there.
    fn accepts_api_key(&self) -> bool {
        !matches!(self, Self::Dashboard)
    }
}

/// A fully formed HTTP request, ready for the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl ApiRequest {
    fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Whether the request carries an `auth` query parameter.
    pub fn has_api_key(&self) -> bool {
        self.url.query_pairs().any(|(k, _)| k == AUTH_PARAM)
    }

    /// Whether the request carries a `Cookie` header.
    pub fn has_cookie(&self) -> bool {
        self.headers.contains_key(COOKIE)
    }
}

/// Build the root URL (`http://host:port/`) for an instance.
///
/// Fails with [`Error::InvalidHostname`] if the address cannot be parsed
/// into a URL with a host component.
pub fn base_url(instance: &Instance) -> Result<Url, Error> {
    let url = Url::parse(&format!("http://{}/", instance.address()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidHostname(None));
    }
    Ok(url)
}

fn endpoint_url(base: &Url, endpoint: &Endpoint) -> Result<Url, Error> {
    let mut url = base.join(endpoint.path())?;
    let query = endpoint.query();
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query {
            match value {
                Some(v) => pairs.append_pair(key, v),
                None => pairs.append_key_only(key),
            };
        }
    }
    Ok(url)
}

fn cookie_header(session_id: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={}",
        session_id.expose_secret()
    ))
    .map_err(|e| Error::Other(Box::new(e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Build a request for `endpoint`, decorated with whatever credentials the
/// session currently holds.
///
/// - Cookie (`CookieOnly` / `Both`): `Cookie: PHPSESSID=<id>`
/// - API key (`ApiKeyOnly` / `Both`): `&auth=<key>` on every endpoint that
///   accepts one
/// - `Unauthenticated`: sent undecorated
pub fn build_request(
    base: &Url,
    endpoint: &Endpoint,
    session: &SessionState,
) -> Result<ApiRequest, Error> {
    let mut request = ApiRequest::get(endpoint_url(base, endpoint)?);

    if let Some(session_id) = session.session_id() {
        request.headers.insert(COOKIE, cookie_header(session_id)?);
    }

    if endpoint.accepts_api_key() {
        if let Some(api_key) = session.api_key() {
            request
                .url
                .query_pairs_mut()
                .append_pair(AUTH_PARAM, api_key.expose_secret());
        }
    }

    if endpoint.requires_auth() && session.session_id().is_none() && session.api_key().is_none() {
        debug!(path = endpoint.path(), "sending unauthenticated request to an authenticated endpoint");
    }

    Ok(request)
}

/// Login form POST: `pw=<password>` to the login page.
pub fn login_request(base: &Url, password: &SecretString) -> Result<ApiRequest, Error> {
    let url = base.join(LOGIN_PATH)?;
    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("pw", password.expose_secret())
        .finish();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    Ok(ApiRequest {
        method: Method::POST,
        url,
        headers,
        body: Some(body),
    })
}

/// API-key verification probe: `recentBlocked` decorated with the candidate
/// key only, never with a cookie.
pub fn key_probe_request(base: &Url, api_key: &SecretString) -> Result<ApiRequest, Error> {
    let probe = SessionState::Unauthenticated.with_api_key(api_key.clone());
    build_request(base, &Endpoint::RecentBlocked, &probe)
}
