//! Network Module
//!
//! Outbound gated peer connections and the inbound TCP server.

mod connection;
mod server;

pub use connection::PeerConnection;
pub use server::Server;
