//! MirrorKV CLI Client
//!
//! Command-line interface for talking to a MirrorKV server.

use clap::{Parser, Subcommand};

use mirrorkv::Client;

/// MirrorKV CLI
#[derive(Parser, Debug)]
#[command(name = "mirrorkv-cli")]
#[command(about = "CLI for the MirrorKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6440")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Store a key-value pair
    Put {
        /// The key to store under
        key: String,

        /// The value to store
        value: String,
    },
}

fn main() {
    let args = Args::parse();

    let client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match args.command {
        Commands::Get { key } => match client.get(key.as_bytes()) {
            Ok(Some(value)) => println!("{}", String::from_utf8_lossy(&value)),
            Ok(None) => {
                eprintln!("(not found)");
                std::process::exit(2);
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        Commands::Put { key, value } => match client.put(key.as_bytes(), value.as_bytes()) {
            Ok(()) => println!("OK"),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
    }
}
