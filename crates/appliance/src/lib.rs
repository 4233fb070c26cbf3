//! tnb-appliance: TrueNAS client for the backup pipeline
//!
//! Two layers:
//! - [`session`]: a persistent WebSocket JSON-RPC session with login and a
//!   blocking call primitive
//! - [`backup`]: the archive generator that drives the session and fetches
//!   the resulting archive over HTTP

pub mod backup;
pub mod protocol;
pub mod session;

pub use backup::{generate_backup, ApplianceConfig};
pub use session::RpcSession;
