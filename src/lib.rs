//! # Pixstash - Hide any payload in as few pixels as possible
//!
//! Pixstash stores an arbitrary byte payload in the full 8 bits of every
//! channel (R, G, B and A) of a lossless PNG, so each pixel carries 4 bytes.
//!
//! ## Overview
//!
//! - Payload is compressed with every registered algorithm; the **smallest** wins
//! - Result is **framed**: 1-byte algorithm id + 4-byte big-endian length + body
//! - Canvas is a **near-square noise image** just large enough for the frame,
//!   or a blank canvas with an existing cover image's **dimensions**
//! - Pixels are visited in a **password-driven order** (Fisher-Yates over ChaCha20)
//!
//! ## Security Model
//!
//! - The password only permutes pixel order; payload bytes are **not encrypted**
//! - There is no password check: a wrong password yields a decode error or garbage
//! - No resistance to steganalysis; noise canvases are obviously synthetic
//!
//! ## Example Usage
//!
//! ```rust
//! use pixstash::{decode, encode, CanvasSource, DecoderConfig, EncoderConfig};
//!
//! let config = EncoderConfig {
//!     compress: true,
//!     password: Some("pw".to_string()),
//! };
//! let encoded = encode(b"hello world", CanvasSource::Noise, &config).unwrap();
//!
//! let decoded = decode(
//!     &encoded.canvas,
//!     &DecoderConfig { password: Some("pw".to_string()) },
//! ).unwrap();
//! assert_eq!(decoded.data, b"hello world");
//! ```
//!
//! ## Modules
//!
//! - [`compression`]: Compression registry and smallest-output selection
//! - [`frame`]: Frame header layout, building and parsing
//! - [`stego`]: Placement permutation and pixel canvases
//! - [`encoder`]: Payload encoding into a canvas
//! - [`decoder`]: Payload decoding from a canvas

pub mod compression;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod stego;

pub use compression::{select_best, Algorithm, CompressionError};
pub use decoder::{
    decode, decode_file, inspect, DecodedPayload, DecoderConfig, DecoderError, FrameInfo,
};
pub use encoder::{encode, encode_file, CanvasSource, EncodedImage, EncoderConfig, EncoderError};
pub use frame::{build_frame, parse_frame, Frame, FrameError, FrameHeader, HEADER_LEN};
pub use stego::{Canvas, CanvasError};
