//! Unified error type.

use thiserror::Error;

/// The error type returned by mhttp's fallible operations.
///
/// Application-level outcomes (the 404 fallback, a 500 from a failed JSON
/// encode) are written to the response, not returned as `Error`s. This type
/// only surfaces infrastructure failures that end [`Engine::run`](crate::Engine::run).
#[derive(Debug, Error)]
pub enum Error {
    /// The listening socket could not be bound (address in use, bad address, ...).
    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
