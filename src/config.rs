//! Configuration for MirrorKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a MirrorKV node
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Replica peers dialed at startup; every write must be
    /// acknowledged by each of them before it commits locally
    pub replicas: Vec<String>,

    /// Lookup peers dialed at startup; queried on a local read miss
    pub lookups: Vec<String>,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Which storage backend to serve from
    pub backend: StorageBackend,

    /// Root directory for the disk backend (one file per key)
    pub data_dir: PathBuf,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-lifetime in-memory map
    Memory,

    /// One file per key under `data_dir`
    Disk,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:6440".to_string(),
            replicas: Vec::new(),
            lookups: Vec::new(),
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./mirrorkv_data"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Add a replica peer address
    pub fn replica(mut self, addr: impl Into<String>) -> Self {
        self.config.replicas.push(addr.into());
        self
    }

    /// Add a lookup peer address
    pub fn lookup(mut self, addr: impl Into<String>) -> Self {
        self.config.lookups.push(addr.into());
        self
    }

    /// Select the storage backend
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the data directory (disk backend only)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
