//! Everything that talks to the HaLo tag, either directly or through a
//! phone paired over the gateway.

pub mod command;
mod executor;
pub mod relay;
pub mod session;
mod soft_tag;
pub mod status;

pub use command::{HaloCommand, PkeysResponse, SignResponse, TagSignature};
pub use executor::TagExecutor;
pub use relay::{GatewayMessage, PairInfo, PairingRelay, RelayState};
pub use session::{CancelToken, LocalSession, RelaySession, SigningSession};
pub use soft_tag::SoftTag;
pub use status::{SessionStatus, StatusSink};
