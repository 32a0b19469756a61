//! Version 2: run-length records, also the run layer of version 3.
//!
//! # Record Format
//!
//! ```text
//! +-----------+-------+-------+-------+
//! | count (1) | R (1) | G (1) | B (1) |
//! +-----------+-------+-------+-------+
//! ```
//!
//! Records repeat until the end of the stream. A run longer than 255 pixels is
//! split into consecutive records.

use log::debug;

use crate::error::{FormatError, Result};
use crate::header::{Header, Version, HEADER_LEN};
use crate::image::{Grid, Pixel};

/// Longest run a single count byte can express
pub const MAX_RUN: usize = u8::MAX as usize;

/// Size of one version 2 record in bytes
pub const RECORD_BYTES: usize = 4;

/// A maximal run of identical adjacent pixels, capped at `MAX_RUN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub count: u8,
    pub pixel: Pixel,
}

/// Iterator over the runs of a pixel sequence in scan order.
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    remaining: &'a [Pixel],
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let (&pixel, rest) = self.remaining.split_first()?;
        let extra = rest
            .iter()
            .take(MAX_RUN - 1)
            .take_while(|&&p| p == pixel)
            .count();
        self.remaining = &rest[extra..];
        Some(Run {
            count: (extra + 1) as u8,
            pixel,
        })
    }
}

/// Split `pixels` into runs.
pub fn runs(pixels: &[Pixel]) -> Runs<'_> {
    Runs { remaining: pixels }
}

/// Encode `grid` as a complete version 2 stream appended to `out`.
pub fn encode(grid: &Grid, out: &mut Vec<u8>) -> Result<()> {
    Header::new(Version::RunLength, HEADER_LEN as u16, grid.width(), grid.height())?.write(out);
    let records = encode_pixels(grid.pixels(), out);
    debug!("run-length encode: {} pixels in {} records", grid.len(), records);
    Ok(())
}

/// Decode the body following a version 2 envelope.
///
/// The pixel count is checked when the grid is built, not here.
pub fn decode(_header: &Header, body: &[u8]) -> Result<Vec<Pixel>> {
    decode_until_end(body)
}

/// Append one `{count, R, G, B}` record per run to `out`.
///
/// Returns the number of records written.
pub fn encode_pixels(pixels: &[Pixel], out: &mut Vec<u8>) -> usize {
    let mut records = 0;
    for run in runs(pixels) {
        out.push(run.count);
        out.extend_from_slice(&run.pixel.channels());
        records += 1;
    }
    records
}

/// Expand records until `body` is exhausted.
///
/// An empty remainder where a count byte is expected ends decoding normally.
///
/// # Errors
/// `FormatError::TruncatedRecord` if the stream ends inside a record.
pub fn decode_until_end(body: &[u8]) -> Result<Vec<Pixel>> {
    let mut pixels = Vec::new();
    let mut offset = 0;

    for record in body.chunks(RECORD_BYTES) {
        if record.len() < RECORD_BYTES {
            return Err(FormatError::TruncatedRecord {
                offset,
                required: RECORD_BYTES,
                actual: record.len(),
            }
            .into());
        }
        let pixel = Pixel::new(record[1], record[2], record[3]);
        pixels.extend(std::iter::repeat(pixel).take(record[0] as usize));
        offset += RECORD_BYTES;
    }

    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const RED: Pixel = Pixel::new(255, 0, 0);
    const BLUE: Pixel = Pixel::new(0, 0, 255);

    #[test]
    fn test_runs_are_maximal() {
        let pixels = [RED, RED, BLUE, RED, RED, RED];
        let found: Vec<_> = runs(&pixels).collect();

        assert_eq!(
            found,
            vec![
                Run { count: 2, pixel: RED },
                Run { count: 1, pixel: BLUE },
                Run { count: 3, pixel: RED },
            ]
        );
    }

    #[test]
    fn test_run_of_255_is_one_record() {
        let pixels = vec![RED; 255];
        let mut out = Vec::new();

        assert_eq!(encode_pixels(&pixels, &mut out), 1);
        assert_eq!(out, vec![255, 255, 0, 0]);
    }

    #[test]
    fn test_run_of_256_splits() {
        let pixels = vec![RED; 256];
        let mut out = Vec::new();

        assert_eq!(encode_pixels(&pixels, &mut out), 2);
        assert_eq!(out, vec![255, 255, 0, 0, 1, 255, 0, 0]);
        assert_eq!(decode_until_end(&out).unwrap(), pixels);
    }

    #[test]
    fn test_empty_body() {
        assert!(decode_until_end(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_record() {
        let body = [2u8, 10, 20, 30, 1, 5];
        assert!(matches!(
            decode_until_end(&body),
            Err(Error::Format(FormatError::TruncatedRecord {
                offset: 4,
                required: 4,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_zero_count_record_expands_to_nothing() {
        let body = [0u8, 1, 1, 1, 1, 2, 2, 2];
        assert_eq!(decode_until_end(&body).unwrap(), vec![Pixel::new(2, 2, 2)]);
    }
}
