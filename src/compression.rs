//! Payload compression for Pixstash.
//!
//! Every payload is run through a small, fixed registry of general-purpose
//! compressors and the smallest output wins. The algorithm id travels in the
//! frame header so the decoder knows which decompressor to apply.
//!
//! Registry (id order is also trial order):
//! - `0` none (identity, always succeeds)
//! - `1` zlib (DEFLATE with zlib wrapper, best level)
//! - `2` brotli (quality 11)
//! - `3` zstd (level 19)

use std::io::{Cursor, Read, Write};

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use thiserror::Error;
use tracing::debug;

/// Brotli quality (0-11).
const BROTLI_QUALITY: u32 = 11;

/// Brotli log2 window size.
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

/// Brotli internal buffer size.
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Zstd compression level.
const ZSTD_LEVEL: i32 = 19;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed ({algorithm}): {reason}")]
    DecompressionFailed {
        algorithm: &'static str,
        reason: String,
    },
}

/// A compression algorithm from the fixed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    None,
    Zlib,
    Brotli,
    Zstd,
}

impl Algorithm {
    /// Every registered algorithm, in id order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::None,
        Algorithm::Zlib,
        Algorithm::Brotli,
        Algorithm::Zstd,
    ];

    /// The one-byte identifier stored in the frame header.
    pub fn id(self) -> u8 {
        match self {
            Algorithm::None => 0,
            Algorithm::Zlib => 1,
            Algorithm::Brotli => 2,
            Algorithm::Zstd => 3,
        }
    }

    /// Looks up an algorithm by its header id.
    pub fn from_id(id: u8) -> Option<Algorithm> {
        Self::ALL.into_iter().find(|algorithm| algorithm.id() == id)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::Zlib => "zlib",
            Algorithm::Brotli => "brotli",
            Algorithm::Zstd => "zstd",
        }
    }

    /// Compresses `data` with this algorithm.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Algorithm::None => Ok(data.to_vec()),
            Algorithm::Zlib => {
                let mut encoder = ZlibEncoder::new(data, Compression::best());
                let mut compressed = Vec::new();
                encoder
                    .read_to_end(&mut compressed)
                    .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
                Ok(compressed)
            }
            Algorithm::Brotli => {
                let mut compressor = brotli::CompressorWriter::new(
                    Vec::new(),
                    BROTLI_BUFFER_SIZE,
                    BROTLI_QUALITY,
                    BROTLI_LG_WINDOW_SIZE,
                );
                compressor
                    .write_all(data)
                    .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
                compressor
                    .flush()
                    .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
                Ok(compressor.into_inner())
            }
            Algorithm::Zstd => zstd::encode_all(Cursor::new(data), ZSTD_LEVEL)
                .map_err(|e| CompressionError::CompressionFailed(e.to_string())),
        }
    }

    /// Decompresses `data` that was produced by [`Algorithm::compress`].
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let failed = |e: std::io::Error| CompressionError::DecompressionFailed {
            algorithm: self.name(),
            reason: e.to_string(),
        };

        match self {
            Algorithm::None => Ok(data.to_vec()),
            Algorithm::Zlib => {
                let mut decoder = ZlibDecoder::new(data);
                let mut decompressed = Vec::new();
                decoder.read_to_end(&mut decompressed).map_err(failed)?;
                Ok(decompressed)
            }
            Algorithm::Brotli => {
                let mut decompressor = brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE);
                let mut decompressed = Vec::new();
                decompressor.read_to_end(&mut decompressed).map_err(failed)?;
                Ok(decompressed)
            }
            Algorithm::Zstd => zstd::decode_all(Cursor::new(data)).map_err(failed),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Picks the smallest encoding of `raw` among all registered algorithms.
///
/// Identity is the baseline; an alternative replaces the current best only if
/// it is strictly smaller, so ties go to the lower id. Algorithms whose
/// compress step fails are skipped.
pub fn select_best(raw: &[u8]) -> (Algorithm, Vec<u8>) {
    let mut best = (Algorithm::None, raw.to_vec());

    for algorithm in Algorithm::ALL.into_iter().skip(1) {
        match algorithm.compress(raw) {
            Ok(body) => {
                debug!(
                    algorithm = algorithm.name(),
                    size = body.len(),
                    "compression candidate"
                );
                if body.len() < best.1.len() {
                    best = (algorithm, body);
                }
            }
            Err(e) => {
                debug!(
                    algorithm = algorithm.name(),
                    error = %e,
                    "skipping compression candidate"
                );
            }
        }
    }

    best
}

/// Runs [`select_best`] when `compress` is set, otherwise forces identity.
pub fn select(raw: &[u8], compress: bool) -> (Algorithm, Vec<u8>) {
    if compress {
        select_best(raw)
    } else {
        (Algorithm::None, raw.to_vec())
    }
}

/// Returns compression ratio (compressed_size / original_size).
/// Values < 1.0 mean compression helped.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 1.0;
    }
    compressed_len as f64 / original_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(Algorithm::None.id(), 0);
        assert_eq!(Algorithm::Zlib.id(), 1);
        assert_eq!(Algorithm::Brotli.id(), 2);
        assert_eq!(Algorithm::Zstd.id(), 3);
    }

    #[test]
    fn test_from_id() {
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(algorithm.id()), Some(algorithm));
        }
        assert_eq!(Algorithm::from_id(4), None);
        assert_eq!(Algorithm::from_id(255), None);
    }

    #[test]
    fn test_every_algorithm_roundtrips() {
        let data = b"Hello, this is a test message that should compress well. \
                     Hello, this is a test message that should compress well.";

        for algorithm in Algorithm::ALL {
            let compressed = algorithm.compress(data).unwrap();
            let decompressed = algorithm.decompress(&compressed).unwrap();
            assert_eq!(decompressed, data, "{} failed to roundtrip", algorithm);
        }
    }

    #[test]
    fn test_repetitive_data_picks_real_compressor() {
        let data = vec![b'A'; 4096];

        let (algorithm, body) = select_best(&data);

        assert_ne!(algorithm, Algorithm::None);
        assert!(body.len() < data.len());
        assert_eq!(algorithm.decompress(&body).unwrap(), data);
    }

    #[test]
    fn test_random_data_never_grows() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let data: Vec<u8> = (0..512).map(|_| rng.gen()).collect();

        let (algorithm, body) = select_best(&data);

        assert!(body.len() <= data.len());
        assert_eq!(algorithm.decompress(&body).unwrap(), data);
    }

    #[test]
    fn test_short_input_keeps_identity() {
        // Every real compressor adds framing overhead to tiny inputs.
        let (algorithm, body) = select_best(b"hi");
        assert_eq!(algorithm, Algorithm::None);
        assert_eq!(body, b"hi");
    }

    #[test]
    fn test_empty_input_keeps_identity() {
        let (algorithm, body) = select_best(b"");
        assert_eq!(algorithm, Algorithm::None);
        assert!(body.is_empty());
    }

    #[test]
    fn test_select_without_compression() {
        let data = vec![0u8; 1000];
        let (algorithm, body) = select(&data, false);
        assert_eq!(algorithm, Algorithm::None);
        assert_eq!(body, data);
    }

    #[test]
    fn test_decompress_garbage_fails() {
        let garbage = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x11];
        assert!(Algorithm::Zlib.decompress(&garbage).is_err());
        assert!(Algorithm::Zstd.decompress(&garbage).is_err());
    }

    #[test]
    fn test_decompress_truncated_stream_fails() {
        let text: Vec<u8> = (0..2000u32)
            .flat_map(|i| format!("line {} of {}\n", i * 7919 % 1013, i).into_bytes())
            .collect();

        for algorithm in [Algorithm::Brotli, Algorithm::Zstd] {
            let compressed = algorithm.compress(&text).unwrap();
            let truncated = &compressed[..compressed.len() / 2];
            assert!(
                algorithm.decompress(truncated).is_err(),
                "{} accepted a truncated stream",
                algorithm
            );
        }
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(0, 1), 1.0);
        assert_eq!(compression_ratio(4, 2), 0.5);
    }
}
