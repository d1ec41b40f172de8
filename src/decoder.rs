//! Payload decoding from a PNG canvas.
//!
//! This module orchestrates the decoding process:
//! 1. Derive the placement order from the password
//! 2. Gather every visited pixel's R, G, B, A bytes into one stream
//! 3. Parse the frame header and slice out the body (trailing padding ignored)
//! 4. Decompress with the algorithm named in the header
//!
//! There is no password check. A wrong password usually surfaces as an
//! unknown algorithm id, a truncated frame, or a decompression failure.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::compression::{Algorithm, CompressionError};
use crate::frame::{parse_frame, parse_header, FrameError};
use crate::stego::{derive_seed, permute, Canvas, CanvasError, BYTES_PER_PIXEL};

/// Errors that can occur during decoding.
#[derive(Error, Debug)]
pub enum DecoderError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decompression(#[from] CompressionError),
}

/// Configuration for the decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Password used when the image was encoded, if any.
    pub password: Option<String>,
}

/// Result of decoding an image.
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    /// The recovered payload.
    pub data: Vec<u8>,
    /// Compression algorithm named in the frame header.
    pub algorithm: Algorithm,
    /// Compressed body size in bytes.
    pub body_len: usize,
}

/// Frame metadata read without decompressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub algorithm: Algorithm,
    pub body_len: u32,
    pub frame_len: usize,
    pub capacity: usize,
    pub width: u32,
    pub height: u32,
}

impl FrameInfo {
    /// Bytes of pixel capacity not covered by the frame.
    pub fn unused(&self) -> usize {
        self.capacity.saturating_sub(self.frame_len)
    }
}

/// Decodes the payload hidden in `canvas`.
pub fn decode(canvas: &Canvas, config: &DecoderConfig) -> Result<DecodedPayload, DecoderError> {
    let stream = extract_stream(canvas, config);
    let frame = parse_frame(&stream)?;

    let data = frame.header.algorithm.decompress(frame.body)?;
    info!(
        algorithm = frame.header.algorithm.name(),
        body = frame.body.len(),
        payload = data.len(),
        "payload recovered"
    );

    Ok(DecodedPayload {
        data,
        algorithm: frame.header.algorithm,
        body_len: frame.body.len(),
    })
}

/// Loads `stego_path` and decodes its payload.
pub fn decode_file(
    stego_path: &Path,
    config: &DecoderConfig,
) -> Result<DecodedPayload, DecoderError> {
    let canvas = Canvas::load(stego_path)?;
    decode(&canvas, config)
}

/// Reads and validates the frame header without decompressing the body.
pub fn inspect(canvas: &Canvas, config: &DecoderConfig) -> Result<FrameInfo, DecoderError> {
    let stream = extract_stream(canvas, config);
    let header = parse_header(&stream)?;
    // Also rejects a declared length that runs past the canvas.
    parse_frame(&stream)?;

    Ok(FrameInfo {
        algorithm: header.algorithm,
        body_len: header.body_len,
        frame_len: header.frame_len(),
        capacity: canvas.capacity(),
        width: canvas.width(),
        height: canvas.height(),
    })
}

/// Concatenates the channels of every slot in `order`, four bytes per slot.
pub fn gather(canvas: &Canvas, order: &[usize]) -> Vec<u8> {
    let mut stream = Vec::with_capacity(order.len() * BYTES_PER_PIXEL);
    for &slot in order {
        stream.extend_from_slice(&canvas.pixel(slot));
    }
    stream
}

fn extract_stream(canvas: &Canvas, config: &DecoderConfig) -> Vec<u8> {
    let seed = derive_seed(config.password.as_deref());
    let order = permute(seed, canvas.slot_count());
    gather(canvas, &order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, scatter, CanvasSource, EncoderConfig};
    use crate::frame::build_frame;
    use crate::stego::make_blank_canvas;

    fn encoder_config(password: Option<&str>, compress: bool) -> EncoderConfig {
        EncoderConfig {
            compress,
            password: password.map(str::to_string),
        }
    }

    fn decoder_config(password: Option<&str>) -> DecoderConfig {
        DecoderConfig {
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_hello_world_with_password() {
        let config = encoder_config(Some("pw"), true);
        let encoded = encode(b"hello world", CanvasSource::Noise, &config).unwrap();

        let decoded = decode(&encoded.canvas, &decoder_config(Some("pw"))).unwrap();
        assert_eq!(decoded.data, b"hello world");

        match decode(&encoded.canvas, &decoder_config(Some("wrong"))) {
            Ok(decoded) => assert_ne!(decoded.data, b"hello world"),
            Err(_) => {}
        }
    }

    #[test]
    fn test_wrong_password_on_uncompressed_frame() {
        // "pw" visits [3, 0, 2, 1]; "wrong" visits [1, 3, 0, 2] and reads
        // "orld" first, so 'o' is taken as the algorithm id.
        let config = encoder_config(Some("pw"), false);
        let encoded = encode(b"hello world", CanvasSource::Noise, &config).unwrap();
        let result = decode(&encoded.canvas, &decoder_config(Some("wrong")));
        assert!(matches!(
            result,
            Err(DecoderError::Frame(FrameError::UnknownAlgorithm(b'o')))
        ));
    }

    #[test]
    fn test_gather_reads_whole_slots() {
        let mut canvas = make_blank_canvas(2, 2);
        let order = vec![2, 0, 3, 1];
        scatter(&mut canvas, &[1, 2, 3, 4, 5, 6], &order);

        let stream = gather(&canvas, &order);
        assert_eq!(stream.len(), 16);
        assert_eq!(&stream[..8], &[1, 2, 3, 4, 5, 6, 0, 255]);
    }

    #[test]
    fn test_canvas_too_small_for_header() {
        let canvas = make_blank_canvas(1, 1);
        let result = decode(&canvas, &DecoderConfig::default());
        assert!(matches!(
            result,
            Err(DecoderError::Frame(FrameError::HeaderTooShort { available: 4 }))
        ));
    }

    #[test]
    fn test_decompression_failure_is_reported() {
        // A zlib frame whose body is not zlib data.
        let frame = build_frame(Algorithm::Zlib, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        let mut canvas = make_blank_canvas(3, 1);
        let order = permute(0, canvas.slot_count());
        scatter(&mut canvas, &frame, &order);

        let result = decode(&canvas, &DecoderConfig::default());
        assert!(matches!(result, Err(DecoderError::Decompression(_))));
    }

    #[test]
    fn test_inspect_reports_header() {
        let config = encoder_config(None, false);
        let encoded = encode(b"inspect me", CanvasSource::Noise, &config).unwrap();
        let info = inspect(&encoded.canvas, &DecoderConfig::default()).unwrap();

        assert_eq!(info.algorithm, Algorithm::None);
        assert_eq!(info.body_len, 10);
        assert_eq!(info.frame_len, 15);
        assert_eq!(info.capacity, encoded.canvas.capacity());
        assert_eq!(info.unused(), info.capacity - 15);
    }
}
