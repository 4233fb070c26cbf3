//! Error taxonomy for the backup pipeline
//!
//! Each variant corresponds to one failure class of the run. Every stage
//! failure is fatal to the run; only per-object delete failures during
//! cleanup are soft (they are collected as warnings in the cleanup report
//! and never surface here).

use thiserror::Error;

/// Result type alias using the pipeline error
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration; raised before any network I/O
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure: dial, handshake, timeout, broken connection
    #[error("connection error: {0}")]
    Connection(String),

    /// Appliance rejected the API key or returned a malformed login result
    #[error("authentication failed: {0}")]
    Auth(String),

    /// RPC result did not have the expected shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Error object reported by the appliance over RPC
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Archive download returned a non-success HTTP status
    #[error("download returned {status}: {body}")]
    Download { status: u16, body: String },

    /// Object store rejected the archive upload
    #[error("upload failed: {0}")]
    Upload(String),

    /// Object store listing or other store-side transport failure
    #[error("object store error: {0}")]
    Store(String),
}

impl Error {
    /// Truncate a response body for inclusion in an error message
    pub fn body_snippet(body: &str) -> String {
        const MAX: usize = 512;
        if body.len() <= MAX {
            body.to_string()
        } else {
            let mut end = MAX;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}…", &body[..end])
        }
    }
}
