//! MirrorKV Server Binary
//!
//! Starts a MirrorKV node: storage backend, replica/lookup peer
//! registration, then the TCP accept loop.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mirrorkv::network::Server;
use mirrorkv::storage::{DiskStorage, MemoryStorage, Storage};
use mirrorkv::{Config, Engine, StorageBackend};

/// MirrorKV Server
#[derive(Parser, Debug)]
#[command(name = "mirrorkv-server")]
#[command(about = "Minimal distributed key-value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6440")]
    listen: String,

    /// Storage backend: memory or disk
    #[arg(short, long, default_value = "memory")]
    storage: String,

    /// Data directory for the disk backend
    #[arg(short, long, default_value = "./mirrorkv_data")]
    data_dir: String,

    /// Replica address that must acknowledge every write (repeatable)
    #[arg(short, long)]
    replica: Vec<String>,

    /// Lookup peer queried on a local read miss (repeatable)
    #[arg(short = 'u', long)]
    lookup: Vec<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mirrorkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let backend = match args.storage.as_str() {
        "memory" => StorageBackend::Memory,
        "disk" => StorageBackend::Disk,
        other => {
            tracing::error!("Unknown storage backend: {}", other);
            std::process::exit(1);
        }
    };

    let mut config = Config::builder()
        .listen_addr(&args.listen)
        .backend(backend)
        .data_dir(&args.data_dir);
    for addr in &args.replica {
        config = config.replica(addr);
    }
    for addr in &args.lookup {
        config = config.lookup(addr);
    }
    let config = config.build();

    tracing::info!("MirrorKV Server v{}", mirrorkv::VERSION);
    tracing::info!("Listen address: {}", config.listen_addr);

    let storage: Box<dyn Storage> = match config.backend {
        StorageBackend::Memory => Box::new(MemoryStorage::new()),
        StorageBackend::Disk => match DiskStorage::open(&config.data_dir) {
            Ok(s) => Box::new(s),
            Err(e) => {
                tracing::error!("Failed to open disk storage: {}", e);
                std::process::exit(1);
            }
        },
    };

    let engine = Arc::new(Engine::new(storage));

    for addr in &config.replicas {
        if let Err(e) = engine.add_replica(addr) {
            tracing::error!("Failed to register replica {}: {}", addr, e);
            std::process::exit(1);
        }
    }
    for addr in &config.lookups {
        if let Err(e) = engine.add_lookup(addr) {
            tracing::error!("Failed to register lookup peer {}: {}", addr, e);
            std::process::exit(1);
        }
    }

    let server = match Server::bind(&config.listen_addr, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
