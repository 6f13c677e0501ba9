//! Engine Module
//!
//! The replication/lookup core. The engine owns the storage handle and
//! the mutable sets of replica and lookup peer connections, dispatches
//! inbound messages, and enforces the write rule: every replica must
//! acknowledge a Put before it is committed locally.
//!
//! ## Concurrency Model
//!
//! Many connection-handling threads call into one shared `Engine`. The
//! peer lists are guarded by a reader/writer lock that readers hold
//! only long enough to snapshot the current list; the I/O that follows
//! runs lock-free, so a peer added mid-request is invisible to requests
//! already in flight. Per-peer serialization is the connection's own
//! exclusive-use gate. The storage handle does its own locking and
//! tolerates concurrent calls.

use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::SliceRandom;

use crate::error::{EngineError, WireError};
use crate::network::{PeerConnection, Server};
use crate::protocol::{status, Message};
use crate::storage::Storage;

/// The replication/lookup engine
pub struct Engine {
    /// Storage handle, exclusively owned by the engine
    storage: Box<dyn Storage>,

    /// Peers that must acknowledge every write. Grows monotonically,
    /// never shrinks.
    replicas: RwLock<Vec<Arc<PeerConnection>>>,

    /// Peers queried on a local read miss. Grows monotonically, never
    /// shrinks.
    lookups: RwLock<Vec<Arc<PeerConnection>>>,
}

impl Engine {
    /// Create an engine over the given storage backend
    ///
    /// Both peer lists start empty; peers are registered with
    /// [`add_replica`](Engine::add_replica) and
    /// [`add_lookup`](Engine::add_lookup).
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            replicas: RwLock::new(Vec::new()),
            lookups: RwLock::new(Vec::new()),
        }
    }

    // =========================================================================
    // Administrative operations
    // =========================================================================

    /// Dial a replica peer and register it
    ///
    /// On dial failure the error is returned and the list is unchanged.
    /// No deduplication: adding the same address twice registers two
    /// connections.
    pub fn add_replica(&self, addr: &str) -> Result<(), WireError> {
        let conn = match PeerConnection::dial(addr) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to dial replica {}: {}", addr, e);
                return Err(e);
            }
        };

        self.replicas.write().push(Arc::new(conn));
        tracing::info!("Registered replica {}", addr);
        Ok(())
    }

    /// Dial a lookup peer and register it
    pub fn add_lookup(&self, addr: &str) -> Result<(), WireError> {
        let conn = match PeerConnection::dial(addr) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to dial lookup peer {}: {}", addr, e);
                return Err(e);
            }
        };

        self.lookups.write().push(Arc::new(conn));
        tracing::info!("Registered lookup peer {}", addr);
        Ok(())
    }

    /// Bind `addr` and serve inbound connections until the accept loop
    /// terminates (blocking). Returns an error if binding fails.
    pub fn serve(self: &Arc<Self>, addr: &str) -> Result<(), WireError> {
        Server::bind(addr, Arc::clone(self))?.run()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Process one request and produce its response
    ///
    /// - Put: replicate first; only if every replica acknowledges does
    ///   the local write happen. A replication failure aborts before
    ///   local storage is touched.
    /// - Get: local storage, then the lookup peers on a miss.
    /// - Response variants are not valid requests.
    pub fn process_message(&self, msg: &Message) -> Result<Message, EngineError> {
        match msg {
            Message::Put { id, key, value } => {
                self.replicate(msg)?;

                // The replicas already hold the write at this point; a
                // local storage failure leaves them diverged from us
                // and is surfaced, not masked.
                self.storage.put(key, value)?;

                Ok(Message::Status {
                    id: *id,
                    code: status::OK,
                })
            }
            Message::Get { id, key } => {
                if let Some(value) = self.storage.get(key)? {
                    return Ok(Message::Result {
                        id: *id,
                        data: value,
                    });
                }

                match self.lookup(msg)? {
                    Some(data) => Ok(Message::Result { id: *id, data }),
                    None => Ok(Message::Status {
                        id: *id,
                        code: status::NOT_EXISTS,
                    }),
                }
            }
            Message::Status { .. } | Message::Result { .. } => Err(EngineError::Internal(
                "request loop received a response variant".to_string(),
            )),
        }
    }

    // =========================================================================
    // Replication
    // =========================================================================

    /// Forward a Put to every replica and require a zero status from
    /// each before the local write may proceed
    ///
    /// Fails fast on the first replica that is unreachable, answers
    /// with a mismatched id, answers with a non-Status message, or
    /// reports a nonzero status. No retries and no rollback: replicas
    /// that already acknowledged keep the write even when a later one
    /// fails.
    fn replicate(&self, put: &Message) -> Result<(), EngineError> {
        let replicas = self.replicas.read().clone();

        for replica in replicas {
            let reply = replica.exchange(put).map_err(|e| EngineError::Replicate {
                peer: replica.peer_addr().to_string(),
                detail: "exchange failed".to_string(),
                source: Some(e),
            })?;

            if reply.id() != put.id() {
                return Err(EngineError::Replicate {
                    peer: replica.peer_addr().to_string(),
                    detail: "message ids don't match".to_string(),
                    source: None,
                });
            }

            match reply {
                Message::Status {
                    code: status::OK, ..
                } => {
                    tracing::trace!("Replica {} acknowledged", replica.peer_addr());
                }
                Message::Status { code, .. } => {
                    return Err(EngineError::Replicate {
                        peer: replica.peer_addr().to_string(),
                        detail: format!("status code received was 0x{:02x}", code),
                        source: None,
                    });
                }
                _ => {
                    return Err(EngineError::Replicate {
                        peer: replica.peer_addr().to_string(),
                        detail: "wrong message type received".to_string(),
                        source: None,
                    });
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Query the lookup peers for a key the local store does not have
    ///
    /// An empty peer list returns no-data without touching the network.
    /// Otherwise each peer is tried at most once, in uniformly random
    /// order, and the first Result short-circuits. A transport or
    /// protocol failure is recorded and the next peer is tried; any
    /// Status reply is a clean miss. With every peer exhausted, the
    /// last recorded failure is surfaced, or no-data when every peer
    /// cleanly missed.
    fn lookup(&self, get: &Message) -> Result<Option<Vec<u8>>, EngineError> {
        let mut peers = self.lookups.read().clone();

        if peers.is_empty() {
            return Ok(None);
        }

        peers.shuffle(&mut rand::thread_rng());

        let mut last_failure: Option<EngineError> = None;

        for peer in peers {
            let reply = match peer.exchange(get) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Lookup peer {} failed: {}", peer.peer_addr(), e);
                    last_failure = Some(EngineError::Lookup {
                        peer: peer.peer_addr().to_string(),
                        detail: "exchange failed".to_string(),
                        source: Some(e),
                    });
                    continue;
                }
            };

            if reply.id() != get.id() {
                last_failure = Some(EngineError::Lookup {
                    peer: peer.peer_addr().to_string(),
                    detail: "message ids don't match".to_string(),
                    source: None,
                });
                continue;
            }

            match reply {
                Message::Result { data, .. } => return Ok(Some(data)),
                Message::Status { code, .. } => {
                    // Only Result carries a hit; any status, zero
                    // included, is a miss on this peer.
                    tracing::trace!(
                        "Lookup miss from {} (status 0x{:02x})",
                        peer.peer_addr(),
                        code
                    );
                }
                _ => {
                    last_failure = Some(EngineError::Lookup {
                        peer: peer.peer_addr().to_string(),
                        detail: "wrong message type received".to_string(),
                        source: None,
                    });
                }
            }
        }

        match last_failure {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of registered replica peers
    pub fn replica_count(&self) -> usize {
        self.replicas.read().len()
    }

    /// Number of registered lookup peers
    pub fn lookup_count(&self) -> usize {
        self.lookups.read().len()
    }
}
