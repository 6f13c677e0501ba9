//! TCP Server
//!
//! Accepts connections and serves requests, one thread per connection.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::engine::Engine;
use crate::error::WireError;
use crate::protocol::{read_message, write_message, Message};

/// TCP server for a MirrorKV engine
pub struct Server {
    listener: TcpListener,
    engine: Arc<Engine>,
}

impl Server {
    /// Bind the listen address
    ///
    /// Binding is separate from [`run`](Server::run) so callers can
    /// listen on port 0 and learn the chosen port via
    /// [`local_addr`](Server::local_addr).
    pub fn bind(addr: &str, engine: Arc<Engine>) -> Result<Self, WireError> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, engine })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, WireError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails (blocking)
    ///
    /// Every accepted connection gets its own thread; there is no
    /// connection limit or admission control.
    pub fn run(&self) -> Result<(), WireError> {
        tracing::info!("Accepting connections on {}", self.listener.local_addr()?);

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    return Err(e.into());
                }
            };

            let engine = Arc::clone(&self.engine);
            thread::spawn(move || match InboundConnection::new(stream, engine) {
                Ok(mut conn) => {
                    if let Err(e) = conn.handle() {
                        tracing::warn!("Connection ended with error: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to set up connection: {}", e),
            });
        }

        Ok(())
    }
}

/// Serves a single inbound connection
struct InboundConnection {
    /// TCP stream reader (buffered)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered)
    writer: BufWriter<TcpStream>,

    /// The engine requests are dispatched to
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl InboundConnection {
    fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self, WireError> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            engine,
            peer_addr,
        })
    }

    /// Request loop: read one message, process it fully (including any
    /// replication or lookup fan-out), write the response, repeat.
    ///
    /// No pipelining: the next request is not read until the current
    /// one has been fully answered. Terminates on read error, write
    /// error, or processing error; a processing error is reported to
    /// the client with one best-effort status frame first.
    fn handle(&mut self) -> Result<(), WireError> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let msg = match read_message(&mut self.reader) {
                Ok(m) => m,
                Err(WireError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(WireError::Io(ref e))
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection reset by {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received from {}: {:?}", self.peer_addr, msg);

            let reply = match self.engine.process_message(&msg) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!("Processing failed for {}: {}", self.peer_addr, e);
                    let status = Message::Status {
                        id: msg.id(),
                        code: e.status_code(),
                    };
                    let _ = write_message(&mut self.writer, &status);
                    return Ok(());
                }
            };

            if let Err(e) = write_message(&mut self.writer, &reply) {
                if let WireError::Io(ref io_err) = e {
                    if matches!(
                        io_err.kind(),
                        ErrorKind::ConnectionAborted
                            | ErrorKind::ConnectionReset
                            | ErrorKind::BrokenPipe
                    ) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }
}
