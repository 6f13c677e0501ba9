//! # MirrorKV
//!
//! A minimal distributed key-value store with:
//! - Binary-framed TCP wire protocol
//! - Synchronous replicate-before-commit writes
//! - Best-effort peer lookup on local read misses
//! - Pluggable storage backends behind a narrow Put/Get contract
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │             (one gated connection, Put/Get)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ wire frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     TCP Server                              │
//! │             (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                 │
//! │     Put: replicate to all replicas, then store locally      │
//! │     Get: local storage, then lookup peers on a miss         │
//! └──────┬──────────────────┬───────────────────────┬───────────┘
//!        │                  │                       │
//!        ▼                  ▼                       ▼
//! ┌─────────────┐    ┌─────────────┐        ┌─────────────┐
//! │  Replicas   │    │   Lookups   │        │   Storage   │
//! │ (must ack)  │    │(best effort)│        │ (mem/disk)  │
//! └─────────────┘    └─────────────┘        └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod storage;
pub mod engine;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, EngineError, StorageError, WireError};
pub use config::{Config, StorageBackend};
pub use engine::Engine;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MirrorKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
