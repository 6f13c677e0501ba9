//! Protocol codec
//!
//! Encoding and decoding between [`Message`] values and wire frames,
//! plus blocking stream helpers. See the module docs in
//! [`crate::protocol`] for the byte-exact frame layout.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::Message;
use crate::error::WireError;

/// Header size: 4 bytes id + 1 byte type + 4 bytes payload length
pub const HEADER_SIZE: usize = 9;

/// Maximum payload size (16 MB), checked before any allocation
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a message to a complete wire frame
pub fn encode_message(msg: &Message) -> Vec<u8> {
    let payload_len = match msg {
        Message::Put { key, value, .. } => 2 + key.len() + 4 + value.len(),
        Message::Get { key, .. } => 2 + key.len(),
        Message::Status { .. } => 1,
        Message::Result { data, .. } => 4 + data.len(),
    };

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload_len);
    buf.put_u32_le(msg.id());
    buf.put_u8(msg.message_type() as u8);
    buf.put_u32_le(payload_len as u32);

    match msg {
        Message::Put { key, value, .. } => {
            buf.put_u16_le(key.len() as u16);
            buf.put_slice(key);
            buf.put_u32_le(value.len() as u32);
            buf.put_slice(value);
        }
        Message::Get { key, .. } => {
            buf.put_u16_le(key.len() as u16);
            buf.put_slice(key);
        }
        Message::Status { code, .. } => {
            buf.put_u8(*code);
        }
        Message::Result { data, .. } => {
            buf.put_u32_le(data.len() as u32);
            buf.put_slice(data);
        }
    }

    // Corruption guard: the declared length must match what was written.
    debug_assert_eq!(buf.len(), HEADER_SIZE + payload_len);

    buf.to_vec()
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a complete frame from a byte buffer
///
/// The buffer must contain exactly one frame; bytes beyond the declared
/// payload length are a protocol error.
pub fn decode_message(bytes: &[u8]) -> Result<Message, WireError> {
    if bytes.len() < HEADER_SIZE {
        return Err(WireError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let id = header.get_u32_le();
    let mtype = header.get_u8();
    let payload_len = header.get_u32_le();

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(WireError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() != total_len {
        return Err(WireError::Protocol(format!(
            "Frame length mismatch: declared {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    decode_payload(id, mtype, &bytes[HEADER_SIZE..])
}

/// Decode a payload given the already-parsed header fields
pub fn decode_payload(id: u32, mtype: u8, payload: &[u8]) -> Result<Message, WireError> {
    match mtype {
        0x01 => decode_put(id, payload),
        0x02 => decode_get(id, payload),
        0x03 => decode_status(id, payload),
        0x04 => decode_result(id, payload),
        _ => Err(WireError::Protocol(format!(
            "Unknown message type: 0x{:02x}",
            mtype
        ))),
    }
}

/// Decode a PUT payload: key_len (2) + key + value_len (4) + value
fn decode_put(id: u32, payload: &[u8]) -> Result<Message, WireError> {
    let mut buf = payload;

    if buf.remaining() < 2 {
        return Err(WireError::Protocol(
            "PUT payload too small: missing key length".to_string(),
        ));
    }
    let key_len = buf.get_u16_le() as usize;

    if buf.remaining() < key_len {
        return Err(WireError::Protocol(format!(
            "PUT payload too small: key needs {} bytes, {} remain",
            key_len,
            buf.remaining()
        )));
    }
    let key = buf[..key_len].to_vec();
    buf.advance(key_len);

    if buf.remaining() < 4 {
        return Err(WireError::Protocol(
            "PUT payload too small: missing value length".to_string(),
        ));
    }
    let value_len = buf.get_u32_le() as usize;

    if buf.remaining() < value_len {
        return Err(WireError::Protocol(format!(
            "PUT payload too small: value needs {} bytes, {} remain",
            value_len,
            buf.remaining()
        )));
    }
    let value = buf[..value_len].to_vec();
    buf.advance(value_len);

    if buf.has_remaining() {
        return Err(WireError::Protocol(format!(
            "PUT payload too big: {} trailing bytes",
            buf.remaining()
        )));
    }

    Ok(Message::Put { id, key, value })
}

/// Decode a GET payload: key_len (2) + key
fn decode_get(id: u32, payload: &[u8]) -> Result<Message, WireError> {
    let mut buf = payload;

    if buf.remaining() < 2 {
        return Err(WireError::Protocol(
            "GET payload too small: missing key length".to_string(),
        ));
    }
    let key_len = buf.get_u16_le() as usize;

    if buf.remaining() < key_len {
        return Err(WireError::Protocol(format!(
            "GET payload too small: key needs {} bytes, {} remain",
            key_len,
            buf.remaining()
        )));
    }
    let key = buf[..key_len].to_vec();
    buf.advance(key_len);

    if buf.has_remaining() {
        return Err(WireError::Protocol(format!(
            "GET payload too big: {} trailing bytes",
            buf.remaining()
        )));
    }

    Ok(Message::Get { id, key })
}

/// Decode a STATUS payload: status_code (1)
fn decode_status(id: u32, payload: &[u8]) -> Result<Message, WireError> {
    if payload.is_empty() {
        return Err(WireError::Protocol(
            "STATUS payload too small: missing status code".to_string(),
        ));
    }
    if payload.len() > 1 {
        return Err(WireError::Protocol(format!(
            "STATUS payload too big: {} trailing bytes",
            payload.len() - 1
        )));
    }

    Ok(Message::Status {
        id,
        code: payload[0],
    })
}

/// Decode a RESULT payload: data_len (4) + data
fn decode_result(id: u32, payload: &[u8]) -> Result<Message, WireError> {
    let mut buf = payload;

    if buf.remaining() < 4 {
        return Err(WireError::Protocol(
            "RESULT payload too small: missing data length".to_string(),
        ));
    }
    let data_len = buf.get_u32_le() as usize;

    if buf.remaining() < data_len {
        return Err(WireError::Protocol(format!(
            "RESULT payload too small: data needs {} bytes, {} remain",
            data_len,
            buf.remaining()
        )));
    }
    let data = buf[..data_len].to_vec();
    buf.advance(data_len);

    if buf.has_remaining() {
        return Err(WireError::Protocol(format!(
            "RESULT payload too big: {} trailing bytes",
            buf.remaining()
        )));
    }

    Ok(Message::Result { id, data })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete message from a stream
///
/// Reads exactly 9 header bytes, then exactly the declared payload
/// length. Short reads surface as I/O errors, never partial frames.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Message, WireError> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut hdr = &header[..];
    let id = hdr.get_u32_le();
    let mtype = hdr.get_u8();
    let payload_len = hdr.get_u32_le();

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(WireError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut payload = vec![0u8; payload_len as usize];
    reader.read_exact(&mut payload)?;

    decode_payload(id, mtype, &payload)
}

/// Write one complete message to a stream and flush it
pub fn write_message<W: Write>(writer: &mut W, msg: &Message) -> Result<(), WireError> {
    let bytes = encode_message(msg);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
