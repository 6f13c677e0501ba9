//! Error types for MirrorKV
//!
//! One error enum per domain: wire, storage, engine, client. Causes are
//! wrapped, never discarded, as errors cross from one domain into the
//! next, so the original failure stays visible in diagnostics.

use thiserror::Error;

use crate::protocol::status;

// =============================================================================
// Wire Errors
// =============================================================================

/// Errors from the wire codec and connection I/O.
///
/// Read/write failures and decode failures stay distinguishable: `Io`
/// means the stream broke, `Protocol` means the bytes were wrong.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from a storage backend.
///
/// A clean miss is not an error: `Storage::get` returns `Ok(None)` for
/// an absent key. These variants are genuine backend failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Errors produced while processing a request inside the engine.
///
/// Every variant maps onto a wire status code via
/// [`EngineError::status_code`]; that code is what a client sees in the
/// best-effort `Status` frame sent before the connection is closed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Admission-control rejection. Reserved, currently never produced.
    #[error("Engine too busy")]
    TooBusy,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Replication to {peer} failed: {detail}")]
    Replicate {
        peer: String,
        detail: String,
        #[source]
        source: Option<WireError>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lookup via {peer} failed: {detail}")]
    Lookup {
        peer: String,
        detail: String,
        #[source]
        source: Option<WireError>,
    },
}

impl EngineError {
    /// The status code reported on the wire for this error.
    pub fn status_code(&self) -> u8 {
        match self {
            EngineError::TooBusy => status::TOO_BUSY,
            EngineError::Internal(_) => status::INTERNAL,
            EngineError::Replicate { .. } => status::REPLICATE_FAILURE,
            EngineError::Storage(_) => status::STORAGE_FAILURE,
            EngineError::Lookup { .. } => status::LOOKUP_FAILURE,
        }
    }
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors surfaced by the client to external callers.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] WireError),

    #[error("Server responded with wrong message id")]
    WrongMessageId,

    #[error("Server responded with wrong message type")]
    WrongMessageType,

    #[error("Server responded with status 0x{0:02x}")]
    ServerStatus(u8),
}
