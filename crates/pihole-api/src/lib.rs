// pihole-api: Async Rust client for the Pi-hole admin API (JSON endpoints + dashboard scraping)

pub mod auth;
pub mod credential;
pub mod decode;
pub mod error;
pub mod handle;
pub mod hardware;
pub mod instance;
pub mod models;
pub mod request;
pub mod session;
pub mod transport;

pub use credential::derive_api_key;
pub use error::Error;
pub use handle::Handle;
pub use hardware::HardwareInfo;
pub use instance::Instance;
pub use models::{
    BlockingState, Client, ClientRecord, ClientTimeline, ForwardDestination, GravityInfo,
    HardwareAddress, NetworkClient, RequestRatioTimeline, SparseClientTimeline, Status, Summary,
    TopQueries,
};
pub use request::{ApiRequest, Endpoint};
pub use session::{SessionKind, SessionState};
pub use transport::{RawResponse, Transport, TransportConfig};
