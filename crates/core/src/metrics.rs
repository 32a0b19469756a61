//! Size and timing figures for one encode/decode round trip.
//!
//! The raw baseline is what version 1 would produce: the 12-byte envelope plus
//! three bytes per pixel. Ratios below 1.0 mean the encoding beats it.

use std::time::{Duration, Instant};

use crate::codec::{self, Encoding};
use crate::error::Result;
use crate::header::HEADER_LEN;
use crate::image::Grid;
use crate::raw::PIXEL_BYTES;

/// Metrics for a single encoding of one image.
#[derive(Debug, Clone)]
pub struct CodecMetrics {
    /// Encoding label, e.g. "v3 (palette) 4bpp rle"
    pub encoding: String,

    /// Pixels in the image
    pub pixels: u64,

    /// Size of the uncompressed version 1 stream
    pub raw_bytes: u64,

    /// Size of the encoded stream
    pub encoded_bytes: u64,

    pub encode_time: Duration,

    pub decode_time: Duration,

    /// Whether decoding reproduced the original grid
    pub verified: bool,
}

impl CodecMetrics {
    /// Empty metrics for `grid` under the given label.
    pub fn new(encoding: impl Into<String>, grid: &Grid) -> Self {
        let pixels = grid.len() as u64;
        Self {
            encoding: encoding.into(),
            pixels,
            raw_bytes: HEADER_LEN as u64 + pixels * PIXEL_BYTES as u64,
            encoded_bytes: 0,
            encode_time: Duration::ZERO,
            decode_time: Duration::ZERO,
            verified: false,
        }
    }

    /// Encode `grid`, decode the result and record sizes and timings.
    ///
    /// Returns the metrics together with the encoded stream.
    pub fn measure(encoding: &Encoding, grid: &Grid) -> Result<(Self, Vec<u8>)> {
        let mut metrics = Self::new(encoding.to_string(), grid);

        let start = Instant::now();
        let bytes = encoding.encode(grid)?;
        metrics.encode_time = start.elapsed();
        metrics.encoded_bytes = bytes.len() as u64;

        let start = Instant::now();
        let decoded = codec::decode(&bytes)?;
        metrics.decode_time = start.elapsed();
        metrics.verified = &decoded == grid;

        Ok((metrics, bytes))
    }

    /// Compute compression ratio (encoded / raw).
    ///
    /// Returns 0.0 if the raw size is zero.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.encoded_bytes as f64 / self.raw_bytes as f64
        }
    }

    /// Average encoded bits per pixel, envelope included.
    pub fn bits_per_pixel(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.encoded_bytes as f64 * 8.0 / self.pixels as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.encoding);
        println!("Pixels: {}", self.pixels);
        println!("Raw size: {} bytes", self.raw_bytes);
        println!("Encoded size: {} bytes", self.encoded_bytes);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Bits per pixel: {:.2}", self.bits_per_pixel());
        println!("Encode time: {:.3} ms", self.encode_time.as_secs_f64() * 1000.0);
        println!("Decode time: {:.3} ms", self.decode_time.as_secs_f64() * 1000.0);
        if self.verified {
            println!("Verification: PASSED ✓");
        } else {
            println!("Verification: FAILED ✗ (decoded image differs)");
        }
    }

    /// One table row for comparing encodings side by side.
    pub fn table_row(&self) -> String {
        format!(
            "{:<28} {:>10} {:>7.1}% {:>7.2} {}",
            self.encoding,
            self.encoded_bytes,
            self.compression_ratio() * 100.0,
            self.bits_per_pixel(),
            if self.verified { "ok" } else { "MISMATCH" }
        )
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "encoding={}\n\
             pixels={}\n\
             raw_bytes={}\n\
             encoded_bytes={}\n\
             compression_ratio={:.4}\n\
             encode_us={}\n\
             decode_us={}\n\
             verified={}\n",
            self.encoding,
            self.pixels,
            self.raw_bytes,
            self.encoded_bytes,
            self.compression_ratio(),
            self.encode_time.as_micros(),
            self.decode_time.as_micros(),
            self.verified,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Pixel;

    #[test]
    fn test_raw_baseline() {
        let grid = Grid::filled(10, 10, Pixel::BLACK).unwrap();
        let metrics = CodecMetrics::new("test", &grid);

        assert_eq!(metrics.pixels, 100);
        assert_eq!(metrics.raw_bytes, 312);
        assert_eq!(metrics.compression_ratio(), 0.0);
    }

    #[test]
    fn test_measure_raw_matches_baseline() {
        let grid = Grid::filled(4, 4, Pixel::new(1, 2, 3)).unwrap();
        let (metrics, bytes) = CodecMetrics::measure(&Encoding::Raw, &grid).unwrap();

        assert!(metrics.verified);
        assert_eq!(metrics.encoded_bytes, bytes.len() as u64);
        assert_eq!(metrics.compression_ratio(), 1.0);
        assert_eq!(metrics.bits_per_pixel(), 30.0);
    }

    #[test]
    fn test_measure_run_length_compresses_flat_image() {
        let grid = Grid::filled(16, 16, Pixel::new(9, 9, 9)).unwrap();
        let (metrics, _) = CodecMetrics::measure(&Encoding::RunLength, &grid).unwrap();

        // 256 pixels: one record of 255 and one of 1
        assert_eq!(metrics.encoded_bytes, 12 + 8);
        assert!(metrics.compression_ratio() < 0.1);
    }

    #[test]
    fn test_export_text() {
        let grid = Grid::filled(2, 2, Pixel::BLACK).unwrap();
        let (metrics, _) = CodecMetrics::measure(&Encoding::Delta, &grid).unwrap();

        let text = metrics.export_text();
        assert!(text.contains("encoding=v4 (delta)"));
        assert!(text.contains("pixels=4"));
        assert!(text.contains("encoded_bytes=16"));
        assert!(text.contains("verified=true"));
    }
}
