//! tnb-core: Core library for the truenas-backup tool
//!
//! This crate provides everything that does not touch a network SDK:
//! - Environment-driven configuration loading and validation
//! - The error taxonomy shared across the pipeline
//! - Backup filename and object-key composition
//! - The `ObjectStore` trait and the retention-based cleanup logic
//!
//! Keeping this crate independent of aws-sdk-s3 and the WebSocket stack
//! allows the retention and naming logic to be tested against mocks.

pub mod config;
pub mod error;
pub mod naming;
pub mod retention;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use naming::{backup_filename, object_key};
pub use retention::{prune_expired, CleanupReport};
pub use store::{ObjectStore, StoredObject};
