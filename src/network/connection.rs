//! Peer connections
//!
//! A persistent outbound connection to a peer engine, shared by many
//! request-handling threads.

use std::net::TcpStream;

use parking_lot::Mutex;

use crate::error::WireError;
use crate::protocol::{read_message, write_message, Message};

/// A persistent outbound connection with an exclusive-use gate.
///
/// The correlation id in the frame is not guaranteed to be populated by
/// every caller, so request/response matching relies on one logical
/// exchange at a time per connection rather than on id demultiplexing.
/// The mutex around the stream is that gate: it is held for the full
/// send+receive pair and released when the guard drops, on every exit
/// path including errors.
pub struct PeerConnection {
    /// Peer address for diagnostics
    peer_addr: String,

    /// The underlying stream, gated for exclusive use
    stream: Mutex<TcpStream>,
}

impl PeerConnection {
    /// Dial a peer over TCP
    pub fn dial(addr: &str) -> Result<Self, WireError> {
        let stream = TcpStream::connect(addr)?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            peer_addr: addr.to_string(),
            stream: Mutex::new(stream),
        })
    }

    /// Send one request and read its response as a single gated exchange
    ///
    /// Blocks until no other exchange holds the connection. A failed
    /// connection is not reconnected; the error is reported and the
    /// stream left as-is.
    pub fn exchange(&self, msg: &Message) -> Result<Message, WireError> {
        let mut stream = self.stream.lock();

        write_message(&mut *stream, msg)?;
        read_message(&mut *stream)
    }

    /// The address this connection was dialed to
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
