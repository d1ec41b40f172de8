//! Frame layout for the embedded byte stream.
//!
//! Format: [1 byte algorithm id] + [4 bytes body length, big-endian] + [body]
//!
//! The stream read back from an image is always padded out to a whole number
//! of pixels, so anything after `HEADER_LEN + length` is ignored.

use thiserror::Error;

use crate::compression::Algorithm;

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = 5;

/// Errors raised while building or parsing a frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("Body of {0} bytes does not fit in a 32-bit length field")]
    BodyTooLarge(usize),

    #[error("Not enough data for a frame header: need 5 bytes, have {available}")]
    HeaderTooShort { available: usize },

    #[error("Unknown compression algorithm id: {0} (wrong password or not a pixstash image?)")]
    UnknownAlgorithm(u8),

    #[error("Frame truncated: header declares {declared} body bytes, only {available} available (wrong password or corrupted image?)")]
    FrameTruncated { declared: u64, available: usize },
}

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub algorithm: Algorithm,
    pub body_len: u32,
}

impl FrameHeader {
    /// Total bytes the frame occupies, header included.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.body_len as usize
    }
}

/// A parsed frame borrowing its body from the extracted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    pub body: &'a [u8],
}

/// Builds `[id] ++ be_u32(len(body)) ++ body`.
pub fn build_frame(algorithm: Algorithm, body: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(body.len()).map_err(|_| FrameError::BodyTooLarge(body.len()))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.push(algorithm.id());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Reads and validates only the 5-byte header.
pub fn parse_header(bytes: &[u8]) -> Result<FrameHeader, FrameError> {
    if bytes.len() < HEADER_LEN {
        return Err(FrameError::HeaderTooShort {
            available: bytes.len(),
        });
    }

    let algorithm =
        Algorithm::from_id(bytes[0]).ok_or(FrameError::UnknownAlgorithm(bytes[0]))?;
    let body_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);

    Ok(FrameHeader {
        algorithm,
        body_len,
    })
}

/// Parses a frame from the front of `bytes`, ignoring trailing padding.
pub fn parse_frame(bytes: &[u8]) -> Result<Frame<'_>, FrameError> {
    let header = parse_header(bytes)?;

    let available = bytes.len() - HEADER_LEN;
    if header.body_len as u64 > available as u64 {
        return Err(FrameError::FrameTruncated {
            declared: header.body_len as u64,
            available,
        });
    }

    Ok(Frame {
        header,
        body: &bytes[HEADER_LEN..header.frame_len()],
    })
}
