// Response data contracts
//
// Typed shapes for every structured endpoint. Decoding goes through
// `crate::decode` so the sentinel check always runs first.

mod client;
mod forward;
pub(crate) mod lenient;
mod network;
mod state;
mod status;
mod timeline;
mod top;

pub use client::{Client, ClientRecord, InvalidClientKey};
pub use forward::{EmptyDestinationKey, ForwardDestination};
pub use network::{HardwareAddress, NetworkClient};
pub use state::BlockingState;
pub use status::{GravityInfo, Status, Summary};
pub use timeline::{ClientTimeline, RequestRatioTimeline, SparseClientTimeline};
pub use top::TopQueries;
