//! Client
//!
//! A thin request/response helper over a single gated connection.
//! External callers use this instead of speaking frames directly.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::ClientError;
use crate::network::PeerConnection;
use crate::protocol::{status, Message};

/// A client holding one connection to a server
///
/// Shareable across threads; the connection's exclusive-use gate
/// serializes concurrent calls, so each caller reads exactly the
/// response to its own request.
pub struct Client {
    conn: PeerConnection,
    next_id: AtomicU32,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: &str) -> Result<Self, ClientError> {
        let conn = PeerConnection::dial(addr)?;

        Ok(Self {
            conn,
            next_id: AtomicU32::new(1),
        })
    }

    fn fresh_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Store `value` under `key`
    ///
    /// A Put is answered by Status only: code zero is success, any
    /// other code is a server-reported error. Anything else is a
    /// protocol violation.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), ClientError> {
        let id = self.fresh_id();
        let request = Message::Put {
            id,
            key: key.to_vec(),
            value: value.to_vec(),
        };

        let reply = self.conn.exchange(&request)?;

        if reply.id() != id {
            return Err(ClientError::WrongMessageId);
        }

        match reply {
            Message::Status {
                code: status::OK, ..
            } => Ok(()),
            Message::Status { code, .. } => Err(ClientError::ServerStatus(code)),
            _ => Err(ClientError::WrongMessageType),
        }
    }

    /// Fetch the value under `key`
    ///
    /// `Ok(None)` means the key exists nowhere the server can see. A
    /// Get is answered by Result (a hit) or Status (a miss or a
    /// server-reported error); only Result can carry a hit, so a zero
    /// status is a protocol violation.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ClientError> {
        let id = self.fresh_id();
        let request = Message::Get {
            id,
            key: key.to_vec(),
        };

        let reply = self.conn.exchange(&request)?;

        if reply.id() != id {
            return Err(ClientError::WrongMessageId);
        }

        match reply {
            Message::Result { data, .. } => Ok(Some(data)),
            Message::Status {
                code: status::NOT_EXISTS,
                ..
            } => Ok(None),
            Message::Status {
                code: status::OK, ..
            } => Err(ClientError::WrongMessageType),
            Message::Status { code, .. } => Err(ClientError::ServerStatus(code)),
            _ => Err(ClientError::WrongMessageType),
        }
    }
}
