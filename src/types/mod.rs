//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod endpoint;
mod port;
mod run_id;

pub use endpoint::Endpoint;
pub use port::{Port, PortError};
pub use run_id::{RunId, RunIdError};
