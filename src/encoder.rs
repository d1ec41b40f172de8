//! Payload encoding into a PNG canvas.
//!
//! This module orchestrates the encoding process:
//! 1. Pick the smallest compression (or force none)
//! 2. Frame the body: [algorithm id] + [be u32 length] + [body]
//! 3. Size the canvas: blank canvas with the cover's dimensions, or a
//!    near-square noise canvas
//! 4. Derive the placement order from the password
//! 5. Write four frame bytes per visited pixel, in R, G, B, A order

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::compression::{self, Algorithm};
use crate::frame::{build_frame, FrameError};
use crate::stego::{
    check_capacity, compute_square_dimensions, cover_dimensions, derive_seed, make_blank_canvas,
    make_noise_canvas, permute, required_pixels, Canvas, CanvasError, BYTES_PER_PIXEL,
};

/// Errors that can occur during encoding.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the carrier pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasSource {
    /// Synthesize a near-square noise canvas just large enough for the frame.
    #[default]
    Noise,
    /// Use a blank canvas with a cover image's dimensions.
    Cover { width: u32, height: u32 },
}

/// Configuration for the encoder.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Try every registered compressor and keep the smallest output.
    pub compress: bool,
    /// Optional password that drives the pixel placement order.
    pub password: Option<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            compress: true,
            password: None,
        }
    }
}

/// Result of encoding a payload.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The canvas holding the frame.
    pub canvas: Canvas,
    /// Compression algorithm written to the frame header.
    pub algorithm: Algorithm,
    /// Raw payload size in bytes.
    pub payload_len: usize,
    /// Compressed body size in bytes.
    pub body_len: usize,
    /// Frame size in bytes (header included).
    pub frame_len: usize,
    /// Pixel slots actually written.
    pub used_pixels: u64,
}

/// Encodes `payload` into a fresh canvas.
pub fn encode(
    payload: &[u8],
    source: CanvasSource,
    config: &EncoderConfig,
) -> Result<EncodedImage, EncoderError> {
    let (algorithm, body) = compression::select(payload, config.compress);
    debug!(
        algorithm = algorithm.name(),
        raw = payload.len(),
        compressed = body.len(),
        "selected compression"
    );

    let frame = build_frame(algorithm, &body)?;
    let used_pixels = required_pixels(frame.len());

    let mut canvas = match source {
        CanvasSource::Cover { width, height } => {
            check_capacity(width, height, used_pixels)?;
            make_blank_canvas(width, height)
        }
        CanvasSource::Noise => {
            let (width, height) = compute_square_dimensions(used_pixels)?;
            make_noise_canvas(width, height)
        }
    };

    let seed = derive_seed(config.password.as_deref());
    let order = permute(seed, canvas.slot_count());
    scatter(&mut canvas, &frame, &order);

    info!(
        algorithm = algorithm.name(),
        frame = frame.len(),
        width = canvas.width(),
        height = canvas.height(),
        "payload embedded"
    );

    Ok(EncodedImage {
        canvas,
        algorithm,
        payload_len: payload.len(),
        body_len: body.len(),
        frame_len: frame.len(),
        used_pixels,
    })
}

/// Reads `text_path`, encodes it and writes the PNG to `output_path`.
///
/// With a `cover_path`, only the cover's dimensions are used.
pub fn encode_file(
    text_path: &Path,
    output_path: &Path,
    cover_path: Option<&Path>,
    config: &EncoderConfig,
) -> Result<EncodedImage, EncoderError> {
    if !text_path.is_file() {
        return Err(EncoderError::InputNotFound(text_path.to_path_buf()));
    }
    let payload = std::fs::read(text_path)?;

    let source = match cover_path {
        Some(path) => {
            let (width, height) = cover_dimensions(path)?;
            CanvasSource::Cover { width, height }
        }
        None => CanvasSource::Noise,
    };

    let encoded = encode(&payload, source, config)?;
    encoded.canvas.save_png(output_path)?;
    Ok(encoded)
}

/// Writes `frame` into `canvas`, four bytes per slot, following `order`.
///
/// The last slot may receive fewer than four bytes; its remaining channels
/// keep their current values. Slots after the frame ends are not touched.
pub fn scatter(canvas: &mut Canvas, frame: &[u8], order: &[usize]) {
    debug_assert!(order.len() * BYTES_PER_PIXEL >= frame.len());
    for (chunk, &slot) in frame.chunks(BYTES_PER_PIXEL).zip(order) {
        canvas.write_slot(slot, chunk);
    }
}
