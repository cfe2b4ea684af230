// Handle: one appliance, one session
//
// Composes request building, transport, and decoding. Every data operation
// is the same three steps: build from the current session snapshot, perform,
// decode. Operations only read the session; `authenticate()` (see `auth.rs`)
// is the only writer.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::decode::{decode_body, unwrap_envelope};
use crate::error::Error;
use crate::hardware::{HardwareInfo, extract_hardware_info};
use crate::instance::Instance;
use crate::models::{
    BlockingState, Client, ClientTimeline, ForwardDestination, NetworkClient,
    RequestRatioTimeline, Status, Summary, TopQueries, lenient,
};
use crate::request::{Endpoint, base_url, build_request};
use crate::session::{SessionCell, SessionKind};
use crate::transport::{RawResponse, Transport, TransportConfig};

/// Client for a single Pi-hole.
///
/// Cheap to share behind an `Arc`; all operations take `&self` and may run
/// concurrently.
#[derive(Debug)]
pub struct Handle {
    pub(crate) instance: Instance,
    pub(crate) transport: Transport,
    pub(crate) session: SessionCell,
}

impl Handle {
    /// Create a handle with the default transport settings.
    pub fn new(instance: Instance) -> Result<Self, Error> {
        Self::with_transport(instance, &TransportConfig::default())
    }

    pub fn with_transport(instance: Instance, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_parts(instance, Transport::new(config)?))
    }

    /// Create a handle around a pre-built `reqwest::Client`.
    pub fn with_client(instance: Instance, http: reqwest::Client) -> Self {
        Self::from_parts(instance, Transport::from_client(http))
    }

    fn from_parts(instance: Instance, transport: Transport) -> Self {
        Self {
            instance,
            transport,
            session: SessionCell::default(),
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Which credential forms the last `authenticate()` confirmed.
    pub fn session_kind(&self) -> SessionKind {
        self.session.load().kind()
    }

    pub(crate) fn base_url(&self) -> Result<Url, Error> {
        base_url(&self.instance)
    }

    async fn send(&self, endpoint: &Endpoint) -> Result<RawResponse, Error> {
        let base = self.base_url()?;
        let session = self.session.load();
        let request = build_request(&base, endpoint, &session)?;
        let response = self.transport.perform(request).await?;
        if !response.status.is_success() {
            warn!(status = %response.status, path = endpoint.path(), "non-success HTTP status");
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, Error> {
        let response = self.send(&endpoint).await?;
        decode_body(&response.body)
    }

    async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        key: &str,
    ) -> Result<T, Error> {
        let envelope: HashMap<String, serde_json::Value> = self.fetch(endpoint).await?;
        let payload = unwrap_envelope(envelope, key)?;
        Ok(serde_json::from_value(payload)?)
    }

    // ── Dashboard ───────────────────────────────────────────────────

    /// Legacy dashboard counters. Does not require authentication.
    pub async fn get_status(&self) -> Result<Status, Error> {
        self.fetch(Endpoint::Status).await
    }

    /// Raw summary counters. Does not require authentication.
    pub async fn get_summary(&self) -> Result<Summary, Error> {
        self.fetch(Endpoint::Summary).await
    }

    /// Host telemetry scraped from the dashboard page.
    ///
    /// More fields are rendered when the session holds a login cookie.
    pub async fn get_hardware_info(&self) -> Result<HardwareInfo, Error> {
        let response = self.send(&Endpoint::Dashboard).await?;
        extract_hardware_info(&response.body)
    }

    // ── Rankings ────────────────────────────────────────────────────

    /// Most requested domains today, permitted and blocked. Requires
    /// authentication.
    pub async fn get_top_queries(&self, count: u32) -> Result<TopQueries, Error> {
        self.fetch(Endpoint::TopItems { count }).await
    }

    /// Busiest clients today. Requires authentication.
    pub async fn get_top_clients(&self, count: u32) -> Result<BTreeMap<Client, u64>, Error> {
        let raw = self
            .fetch_client_counts(Endpoint::TopClients { count }, "top_sources")
            .await?;
        Ok(parse_client_counts(raw))
    }

    /// Clients with the most blocked requests today. Requires
    /// authentication.
    pub async fn get_top_blocked_clients(
        &self,
        count: u32,
    ) -> Result<BTreeMap<Client, u64>, Error> {
        let raw = self
            .fetch_client_counts(Endpoint::TopBlockedClients { count }, "top_sources_blocked")
            .await?;
        Ok(parse_client_counts(raw))
    }

    async fn fetch_client_counts(
        &self,
        endpoint: Endpoint,
        key: &str,
    ) -> Result<BTreeMap<String, u64>, Error> {
        let envelope: HashMap<String, serde_json::Value> = self.fetch(endpoint).await?;
        let payload = unwrap_envelope(envelope, key)?;
        Ok(lenient::map(payload)?)
    }

    /// Query type breakdown today, as percentages. Requires authentication.
    pub async fn get_query_types(&self) -> Result<BTreeMap<String, f32>, Error> {
        let envelope: HashMap<String, serde_json::Value> =
            self.fetch(Endpoint::QueryTypes).await?;
        let payload = unwrap_envelope(envelope, "querytypes")?;
        Ok(lenient::map(payload)?)
    }

    /// Share of queries answered by each destination today. Requires
    /// authentication.
    pub async fn get_forward_destinations(
        &self,
    ) -> Result<BTreeMap<ForwardDestination, f32>, Error> {
        let envelope: HashMap<String, serde_json::Value> =
            self.fetch(Endpoint::ForwardDestinations).await?;
        let payload = unwrap_envelope(envelope, "forward_destinations")?;
        let raw: BTreeMap<String, f32> = lenient::map(payload)?;

        Ok(raw
            .into_iter()
            .filter_map(|(key, share)| match key.parse::<ForwardDestination>() {
                Ok(dest) => Some((dest, share)),
                Err(e) => {
                    debug!(error = %e, "skipping forward destination");
                    None
                }
            })
            .collect())
    }

    // ── Timelines ───────────────────────────────────────────────────

    /// Blocked vs. permitted counts for today in 10-minute intervals. Does
    /// not require authentication.
    pub async fn get_request_ratio_timeline(&self) -> Result<RequestRatioTimeline, Error> {
        self.fetch(Endpoint::OverTimeData10Mins).await
    }

    /// Blocked vs. permitted counts from the long-term database between two
    /// epoch-second instants, bucketed by `interval`. Requires
    /// authentication.
    pub async fn get_request_ratio_timeline_between(
        &self,
        from: i64,
        until: i64,
        interval: Duration,
    ) -> Result<RequestRatioTimeline, Error> {
        self.fetch(Endpoint::GraphData {
            from,
            until,
            interval: interval.as_secs(),
        })
        .await
    }

    /// Per-client request counts for today. Requires authentication for
    /// full client data.
    pub async fn get_client_timeline(&self) -> Result<ClientTimeline, Error> {
        self.fetch(Endpoint::ClientTimeline).await
    }

    // ── Inventory ───────────────────────────────────────────────────

    /// Every device the appliance has tracked. Requires authentication.
    pub async fn get_network(&self) -> Result<Vec<NetworkClient>, Error> {
        self.fetch_envelope(Endpoint::Network, "network").await
    }

    // ── Blocking control ────────────────────────────────────────────

    /// Enable blocking. Requires authentication.
    ///
    /// Returns the state reported by the appliance afterwards.
    pub async fn enable(&self) -> Result<BlockingState, Error> {
        self.fetch_envelope(Endpoint::Enable, "status").await
    }

    /// Disable blocking, indefinitely when `duration` is `None`. Requires
    /// authentication.
    ///
    /// Every timed disable schedules its own re-enable timer on the
    /// appliance, and `enable` does not cancel them. Disabling for 30s,
    /// enabling, then disabling for 60s re-enables blocking at both the 30s
    /// and 60s marks. This is appliance behaviour and is passed through
    /// unchanged.
    pub async fn disable(&self, duration: Option<Duration>) -> Result<BlockingState, Error> {
        let seconds = duration.map(|d| d.as_secs());
        self.fetch_envelope(Endpoint::Disable { seconds }, "status")
            .await
    }
}

fn parse_client_counts(raw: BTreeMap<String, u64>) -> BTreeMap<Client, u64> {
    raw.into_iter()
        .filter_map(|(key, count)| match key.parse::<Client>() {
            Ok(client) => Some((client, count)),
            Err(e) => {
                debug!(error = %e, "skipping client ranking entry");
                None
            }
        })
        .collect()
}
