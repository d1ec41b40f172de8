//! Pixel canvases that carry the frame bytes.
//!
//! Every pixel holds four full data bytes (R, G, B, A). Pixel slot `k` is the
//! pixel at row-major index `k`, i.e. `(k % width, k / width)`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, Rgba, RgbaImage};
use rand::RngCore;
use thiserror::Error;
use tracing::{debug, warn};

use super::permute::{seeded_rng, SALT_NOISE};

/// Bytes stored per pixel slot.
pub const BYTES_PER_PIXEL: usize = 4;

/// Fixed seed for noise canvases. Independent of any password.
pub const NOISE_SEED: u64 = 0;

/// Alpha value of untouched pixels.
pub const OPAQUE: u8 = 255;

/// Errors that can occur while preparing, loading or saving a canvas.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Cover image must be 8-bit RGB or RGBA, found {0}")]
    InvalidCoverFormat(String),

    #[error("Cover image too small: need {required} pixels, have {actual}")]
    CapacityExceeded { required: u64, actual: u64 },

    #[error("Canvas of {0} pixels exceeds the maximum image dimensions")]
    DimensionsTooLarge(u64),

    #[error("Image load error: {0}")]
    ImageLoadError(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),
}

/// A width × height grid of RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Wraps an existing RGBA image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Loads a canvas from an image file, converting to RGBA8 if needed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CanvasError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CanvasError::InputNotFound(path.to_path_buf()));
        }

        let image = open_by_content(path)?
            .decode()
            .map_err(|e| CanvasError::ImageLoadError(e.to_string()))?;
        if image.color() != ColorType::Rgba8 {
            warn!(
                path = %path.display(),
                color = ?image.color(),
                "image is not RGBA8, converting; hidden data may not survive"
            );
        }

        Ok(Self::from_image(image.to_rgba8()))
    }

    /// Decodes a canvas from in-memory image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CanvasError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| CanvasError::ImageLoadError(e.to_string()))?;
        Ok(Self::from_image(image.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Total number of pixel slots.
    pub fn slot_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    /// Total byte capacity (4 bytes per slot).
    pub fn capacity(&self) -> usize {
        self.slot_count() * BYTES_PER_PIXEL
    }

    /// Returns the four channel bytes of a slot.
    pub fn pixel(&self, slot: usize) -> [u8; 4] {
        let offset = slot * BYTES_PER_PIXEL;
        let raw = self.image.as_raw();
        [raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]]
    }

    /// Overwrites the first `bytes.len()` channels of a slot in R, G, B, A order.
    ///
    /// Channels past `bytes.len()` keep their current value.
    pub fn write_slot(&mut self, slot: usize, bytes: &[u8]) {
        debug_assert!(bytes.len() <= BYTES_PER_PIXEL);
        let offset = slot * BYTES_PER_PIXEL;
        let raw: &mut [u8] = &mut self.image;
        raw[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Saves the canvas as a PNG at maximum compression.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), CanvasError> {
        let file =
            File::create(path.as_ref()).map_err(|e| CanvasError::ImageSaveError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        self.write_png(&mut writer)?;
        writer
            .flush()
            .map_err(|e| CanvasError::ImageSaveError(e.to_string()))
    }

    /// Returns the canvas as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, CanvasError> {
        let mut bytes = Vec::new();
        self.write_png(&mut bytes)?;
        Ok(bytes)
    }

    fn write_png<W: Write>(&self, writer: W) -> Result<(), CanvasError> {
        let encoder =
            PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
        encoder
            .write_image(
                self.image.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| CanvasError::ImageSaveError(e.to_string()))
    }

    /// Returns a reference to the underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consumes self and returns the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Creates a reproducible noise canvas with opaque alpha.
pub fn make_noise_canvas(width: u32, height: u32) -> Canvas {
    let mut rng = seeded_rng(SALT_NOISE, NOISE_SEED);
    let mut image = RgbaImage::new(width, height);

    for pixel in image.pixels_mut() {
        let mut rgb = [0u8; 3];
        rng.fill_bytes(&mut rgb);
        *pixel = Rgba([rgb[0], rgb[1], rgb[2], OPAQUE]);
    }

    Canvas::from_image(image)
}

/// Creates an all-black, fully opaque canvas.
pub fn make_blank_canvas(width: u32, height: u32) -> Canvas {
    Canvas::from_image(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, OPAQUE])))
}

/// Number of pixel slots needed to hold `frame_len` bytes.
pub fn required_pixels(frame_len: usize) -> u64 {
    (frame_len as u64).div_ceil(BYTES_PER_PIXEL as u64)
}

/// Picks a near-square `(width, height)` with `width * height >= required`.
///
/// Starts both sides at `floor(sqrt(required))` and grows width, then height,
/// alternately until the area fits. A request for zero pixels yields `(1, 1)`.
pub fn compute_square_dimensions(required: u64) -> Result<(u32, u32), CanvasError> {
    let required = required.max(1);
    let area = required as u128;

    let mut side = (required as f64).sqrt() as u128;
    while side * side > area {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= area {
        side += 1;
    }

    let (mut width, mut height) = (side, side);
    while width * height < area {
        width += 1;
        if width * height < area {
            height += 1;
        }
    }

    let width = u32::try_from(width).map_err(|_| CanvasError::DimensionsTooLarge(required))?;
    let height = u32::try_from(height).map_err(|_| CanvasError::DimensionsTooLarge(required))?;
    debug!(required, width, height, "computed canvas dimensions");
    Ok((width, height))
}

/// Fails unless a `width × height` cover holds at least `required` pixels.
pub fn check_capacity(width: u32, height: u32, required: u64) -> Result<(), CanvasError> {
    let actual = width as u64 * height as u64;
    if actual < required {
        return Err(CanvasError::CapacityExceeded { required, actual });
    }
    Ok(())
}

/// Reads a cover image and returns its dimensions.
///
/// Only 8-bit RGB and RGBA covers are accepted, judged by the colour type
/// stored in the file (palette and grayscale images are rejected even though
/// they decode to RGB). Only the header is read; pixels are never decoded.
pub fn cover_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32), CanvasError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CanvasError::InputNotFound(path.to_path_buf()));
    }

    let decoder = open_by_content(path)?
        .into_decoder()
        .map_err(|e| CanvasError::ImageLoadError(e.to_string()))?;
    match decoder.original_color_type() {
        ExtendedColorType::Rgb8 | ExtendedColorType::Rgba8 => Ok(decoder.dimensions()),
        other => Err(CanvasError::InvalidCoverFormat(format!("{:?}", other))),
    }
}

/// Opens an image file, detecting the format from its contents.
fn open_by_content(path: &Path) -> Result<ImageReader<BufReader<File>>, CanvasError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| CanvasError::ImageLoadError(e.to_string()))
}
