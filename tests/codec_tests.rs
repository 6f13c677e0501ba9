//! Codec Tests
//!
//! Round-trips, byte-exact wire format checks, and decode failure
//! behavior for the frame codec.

use std::io::Cursor;

use mirrorkv::protocol::{
    decode_message, encode_message, read_message, status, write_message, Message, HEADER_SIZE,
};

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_encode_decode_put() {
    let msg = Message::Put {
        id: 42,
        key: b"mykey".to_vec(),
        value: b"myvalue".to_vec(),
    };
    let encoded = encode_message(&msg);
    let decoded = decode_message(&encoded).unwrap();

    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_get() {
    let msg = Message::Get {
        id: 7,
        key: b"hello".to_vec(),
    };
    let encoded = encode_message(&msg);
    let decoded = decode_message(&encoded).unwrap();

    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_status() {
    for code in [status::OK, status::NOT_EXISTS, status::REPLICATE_FAILURE] {
        let msg = Message::Status { id: 1, code };
        let encoded = encode_message(&msg);
        let decoded = decode_message(&encoded).unwrap();

        assert_eq!(decoded, msg);
    }
}

#[test]
fn test_encode_decode_result() {
    let msg = Message::Result {
        id: 99,
        data: b"some data".to_vec(),
    };
    let encoded = encode_message(&msg);
    let decoded = decode_message(&encoded).unwrap();

    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_empty_key_and_value() {
    let msg = Message::Put {
        id: 0,
        key: vec![],
        value: vec![],
    };
    let encoded = encode_message(&msg);
    assert_eq!(encoded.len(), HEADER_SIZE + 2 + 4);

    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_single_byte_fields() {
    let msg = Message::Put {
        id: 1,
        key: vec![0x00],
        value: vec![0xFF],
    };
    let decoded = decode_message(&encode_message(&msg)).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_max_key_length() {
    // 65535 is the largest length representable by the u16 key field
    let key = vec![0xAB; 65535];
    let msg = Message::Get { id: 3, key };
    let decoded = decode_message(&encode_message(&msg)).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_large_value() {
    // Well past typical buffer sizes
    let value: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
    let msg = Message::Put {
        id: 4,
        key: b"big".to_vec(),
        value,
    };
    let decoded = decode_message(&encode_message(&msg)).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn test_encode_decode_binary_data() {
    let binary_key: Vec<u8> = vec![0x00, 0x01, 0xFF, 0xFE, 0x80];
    let binary_value: Vec<u8> = (0..=255).collect();

    let msg = Message::Put {
        id: 5,
        key: binary_key,
        value: binary_value,
    };
    let decoded = decode_message(&encode_message(&msg)).unwrap();
    assert_eq!(decoded, msg);
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_put() {
    let msg = Message::Put {
        id: 0x01020304,
        key: b"ab".to_vec(),
        value: b"xyz".to_vec(),
    };
    let encoded = encode_message(&msg);

    // id (LE) | type | payload_len (LE) | key_len (LE) | key | value_len (LE) | value
    assert_eq!(&encoded[0..4], &[0x04, 0x03, 0x02, 0x01]); // id
    assert_eq!(encoded[4], 0x01); // PUT
    assert_eq!(&encoded[5..9], &[0x0B, 0x00, 0x00, 0x00]); // payload len = 11
    assert_eq!(&encoded[9..11], &[0x02, 0x00]); // key len = 2
    assert_eq!(&encoded[11..13], b"ab");
    assert_eq!(&encoded[13..17], &[0x03, 0x00, 0x00, 0x00]); // value len = 3
    assert_eq!(&encoded[17..20], b"xyz");
    assert_eq!(encoded.len(), 20);
}

#[test]
fn test_wire_format_get() {
    let msg = Message::Get {
        id: 1,
        key: b"test".to_vec(),
    };
    let encoded = encode_message(&msg);

    assert_eq!(&encoded[0..4], &[0x01, 0x00, 0x00, 0x00]); // id
    assert_eq!(encoded[4], 0x02); // GET
    assert_eq!(&encoded[5..9], &[0x06, 0x00, 0x00, 0x00]); // payload len = 6
    assert_eq!(&encoded[9..11], &[0x04, 0x00]); // key len = 4
    assert_eq!(&encoded[11..15], b"test");
}

#[test]
fn test_wire_format_status() {
    let msg = Message::Status {
        id: 0,
        code: status::NOT_EXISTS,
    };
    let encoded = encode_message(&msg);

    assert_eq!(encoded[4], 0x03); // STATUS
    assert_eq!(&encoded[5..9], &[0x01, 0x00, 0x00, 0x00]); // payload len = 1
    assert_eq!(encoded[9], 0xC0);
    assert_eq!(encoded.len(), 10);
}

#[test]
fn test_wire_format_result() {
    let msg = Message::Result {
        id: 2,
        data: b"hi".to_vec(),
    };
    let encoded = encode_message(&msg);

    assert_eq!(encoded[4], 0x04); // RESULT
    assert_eq!(&encoded[5..9], &[0x06, 0x00, 0x00, 0x00]); // payload len = 6
    assert_eq!(&encoded[9..13], &[0x02, 0x00, 0x00, 0x00]); // data len = 2
    assert_eq!(&encoded[13..15], b"hi");
}

// =============================================================================
// Decode Failure Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let bytes = [0x01, 0x00, 0x00]; // 3 bytes, need 9
    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Incomplete header"));
}

#[test]
fn test_unknown_message_type() {
    // id 0, type 0xFF, empty payload
    let bytes = [0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unknown message type"));
}

#[test]
fn test_put_declared_key_undershoots_payload() {
    // key_len says 5 but only 2 key bytes follow
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x01];
    bytes.extend_from_slice(&[0x04, 0x00, 0x00, 0x00]); // payload len = 4
    bytes.extend_from_slice(&[0x05, 0x00]); // key len = 5
    bytes.extend_from_slice(b"aa");

    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("too small"));
}

#[test]
fn test_put_missing_value_length() {
    // key parses fine, then the payload ends before the value length
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x01];
    bytes.extend_from_slice(&[0x03, 0x00, 0x00, 0x00]); // payload len = 3
    bytes.extend_from_slice(&[0x01, 0x00]); // key len = 1
    bytes.push(b'k');

    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("missing value length"));
}

#[test]
fn test_get_trailing_bytes_rejected() {
    // one key byte, then one extra byte the layout does not account for
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x02];
    bytes.extend_from_slice(&[0x04, 0x00, 0x00, 0x00]); // payload len = 4
    bytes.extend_from_slice(&[0x01, 0x00]); // key len = 1
    bytes.push(b'k');
    bytes.push(0xEE);

    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("trailing"));
}

#[test]
fn test_status_trailing_bytes_rejected() {
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x03];
    bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]); // payload len = 2
    bytes.push(0x00);
    bytes.push(0xEE);

    let result = decode_message(&bytes);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("trailing"));
}

#[test]
fn test_result_data_length_mismatch() {
    // data_len says 4 but only 2 data bytes follow
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x04];
    bytes.extend_from_slice(&[0x06, 0x00, 0x00, 0x00]); // payload len = 6
    bytes.extend_from_slice(&[0x04, 0x00, 0x00, 0x00]); // data len = 4
    bytes.extend_from_slice(b"hi");

    let result = decode_message(&bytes);
    assert!(result.is_err());
}

#[test]
fn test_frame_with_bytes_beyond_declared_length() {
    let mut encoded = encode_message(&Message::Status { id: 1, code: 0 });
    encoded.push(0x00);

    let result = decode_message(&encoded);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("length mismatch"));
}

#[test]
fn test_oversized_declared_length_rejected_before_allocation() {
    // header declaring a 4 GB payload must fail fast on the size guard
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x01];
    bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

    let mut cursor = Cursor::new(bytes);
    let result = read_message(&mut cursor);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Payload too large"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_roundtrip() {
    let msg = Message::Put {
        id: 11,
        key: b"key".to_vec(),
        value: b"value".to_vec(),
    };

    let mut buffer = Vec::new();
    write_message(&mut buffer, &msg).unwrap();

    let mut cursor = Cursor::new(buffer);
    let decoded = read_message(&mut cursor).unwrap();

    assert_eq!(decoded, msg);
}

#[test]
fn test_stream_multiple_messages_in_order() {
    let messages = vec![
        Message::Put {
            id: 1,
            key: b"k1".to_vec(),
            value: b"v1".to_vec(),
        },
        Message::Get {
            id: 2,
            key: b"k1".to_vec(),
        },
        Message::Status { id: 2, code: 0 },
        Message::Result {
            id: 2,
            data: b"v1".to_vec(),
        },
    ];

    let mut buffer = Vec::new();
    for msg in &messages {
        write_message(&mut buffer, msg).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &messages {
        let decoded = read_message(&mut cursor).unwrap();
        assert_eq!(&decoded, expected);
    }
}

#[test]
fn test_stream_short_read_is_an_error() {
    let encoded = encode_message(&Message::Get {
        id: 1,
        key: b"abcdef".to_vec(),
    });

    // Truncate mid-payload: the reader must error, not return a partial frame
    let mut cursor = Cursor::new(encoded[..encoded.len() - 3].to_vec());
    assert!(read_message(&mut cursor).is_err());
}
