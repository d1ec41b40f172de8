//! Pixel-level steganography.
//!
//! - `permute`: password-driven placement order over pixel slots
//! - `canvas`: canvases that carry four payload bytes per RGBA pixel

pub mod canvas;
pub mod permute;

pub use canvas::{
    check_capacity, compute_square_dimensions, cover_dimensions, make_blank_canvas,
    make_noise_canvas, required_pixels, Canvas, CanvasError, BYTES_PER_PIXEL,
};
pub use permute::{derive_seed, permute};
