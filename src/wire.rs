//! noeqd wire format.
//!
//! ```text
//! request:  [count: u8]
//! response: [id: u64 big-endian] * count
//! ```
//!
//! There is no length prefix and no handshake. The server writes exactly
//! `count` frames before the client may send its next request.

use crate::error::{Error, Result};
use crate::id::Id;

/// Size of a single response frame in bytes.
pub const FRAME_LEN: usize = 8;

/// Largest number of identifiers a single request can ask for.
pub const MAX_COUNT: usize = u8::MAX as usize;

/// Encodes the request frame asking for `count` identifiers.
pub fn encode_request(count: usize) -> Result<[u8; 1]> {
    match u8::try_from(count) {
        Ok(n) if n > 0 => Ok([n]),
        _ => Err(Error::InvalidCount(count)),
    }
}

/// Decodes one response frame.
pub fn decode_id(frame: &[u8]) -> Result<Id> {
    let bytes: [u8; FRAME_LEN] = frame.try_into().map_err(|_| Error::MalformedResponse {
        received: frame.to_vec(),
    })?;
    Ok(Id::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_the_count_byte() {
        assert_eq!(encode_request(1).unwrap(), [0x01]);
        assert_eq!(encode_request(100).unwrap(), [0x64]);
        assert_eq!(encode_request(MAX_COUNT).unwrap(), [0xFF]);
    }

    #[test]
    fn request_count_out_of_range() {
        for count in [0, 256, 1000] {
            assert!(matches!(
                encode_request(count),
                Err(Error::InvalidCount(c)) if c == count
            ));
        }
    }

    #[test]
    fn decode_frame() {
        let id = decode_id(&[0x00, 0x00, 0x00, 0x13, 0x26, 0xE9, 0xC7, 0xC3]).unwrap();
        assert_eq!(u64::from(id), 82_257_233_859);
    }

    #[test]
    fn decode_short_frame() {
        let err = decode_id(&[0x02, 0x02, 0x76, 0x3C]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse { received } if received == [0x02, 0x02, 0x76, 0x3C]
        ));
    }

    #[test]
    fn decode_long_frame() {
        assert!(matches!(
            decode_id(&[0; FRAME_LEN + 1]),
            Err(Error::MalformedResponse { .. })
        ));
    }
}
