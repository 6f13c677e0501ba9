//! Protocol Module
//!
//! Defines the binary wire protocol spoken between clients, engines,
//! and peer engines. All multi-byte integers are little-endian.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Id (4)   │ Type (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Message Type
//! - 0x01 PUT:    key_len (2) + key + value_len (4) + value
//! - 0x02 GET:    key_len (2) + key
//! - 0x03 STATUS: status_code (1)
//! - 0x04 RESULT: data_len (4) + data
//!
//! `Len` must equal the exact encoded payload size. There is no
//! checksum or version field; frames are delimited by the explicit
//! lengths alone.
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: TOO_BUSY (reserved)
//! - 0x02: INTERNAL
//! - 0x03: REPLICATE_FAILURE
//! - 0x04: STORAGE_FAILURE
//! - 0x05: LOOKUP_FAILURE
//! - 0xC0: NOT_EXISTS

mod message;
mod codec;

pub use message::{status, Message, MessageType};
pub use codec::{
    decode_message, decode_payload, encode_message, read_message, write_message, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
