//! Version 1: uncompressed RGB triples in row-major order.

use crate::error::{FormatError, Result};
use crate::header::{Header, Version, HEADER_LEN};
use crate::image::{Grid, Pixel};

/// Bytes per truecolor pixel
pub const PIXEL_BYTES: usize = 3;

/// Encode `grid` as a complete version 1 stream appended to `out`.
pub fn encode(grid: &Grid, out: &mut Vec<u8>) -> Result<()> {
    Header::new(Version::Raw, HEADER_LEN as u16, grid.width(), grid.height())?.write(out);
    encode_pixels(grid.pixels(), out);
    Ok(())
}

/// Decode the body following a version 1 envelope.
pub fn decode(header: &Header, body: &[u8]) -> Result<Vec<Pixel>> {
    decode_pixels(body, header.pixel_count())
}

/// Append each pixel's three channels to `out`.
pub fn encode_pixels(pixels: &[Pixel], out: &mut Vec<u8>) {
    out.reserve(pixels.len() * PIXEL_BYTES);
    for pixel in pixels {
        out.extend_from_slice(&pixel.channels());
    }
}

/// Decode exactly `count` pixels from the start of `body`.
///
/// Trailing bytes after the last pixel are ignored.
///
/// # Errors
/// `FormatError::IncompletePixelData` if `body` holds fewer than `3 * count` bytes.
pub fn decode_pixels(body: &[u8], count: usize) -> Result<Vec<Pixel>> {
    let expected = count * PIXEL_BYTES;
    if body.len() < expected {
        return Err(FormatError::IncompletePixelData {
            expected,
            actual: body.len(),
        }
        .into());
    }

    Ok(body[..expected]
        .chunks_exact(PIXEL_BYTES)
        .map(|c| Pixel::new(c[0], c[1], c[2]))
        .collect())
}

/// Decode triples until `body` is exhausted.
///
/// Used by the truecolor palette mode, whose body has no declared length.
///
/// # Errors
/// `FormatError::TruncatedRecord` if the stream ends inside a triple.
pub fn decode_until_end(body: &[u8]) -> Result<Vec<Pixel>> {
    let whole = body.len() - body.len() % PIXEL_BYTES;
    if whole != body.len() {
        return Err(FormatError::TruncatedRecord {
            offset: whole,
            required: PIXEL_BYTES,
            actual: body.len() - whole,
        }
        .into());
    }
    decode_pixels(body, whole / PIXEL_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_encode_is_identity_on_channels() {
        let pixels = [Pixel::new(1, 2, 3), Pixel::new(250, 0, 7)];
        let mut out = Vec::new();
        encode_pixels(&pixels, &mut out);

        assert_eq!(out, vec![1, 2, 3, 250, 0, 7]);
        assert_eq!(decode_pixels(&out, 2).unwrap(), pixels);
    }

    #[test]
    fn test_incomplete_pixel_data() {
        let body = [9u8; 8];
        assert!(matches!(
            decode_pixels(&body, 3),
            Err(Error::Format(FormatError::IncompletePixelData {
                expected: 9,
                actual: 8
            }))
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let body = [1u8, 1, 1, 2, 2, 2, 0xFF];
        assert_eq!(decode_pixels(&body, 1).unwrap(), vec![Pixel::new(1, 1, 1)]);
    }

    #[test]
    fn test_decode_until_end() {
        let body = [1u8, 2, 3, 4, 5, 6];
        assert_eq!(decode_until_end(&body).unwrap().len(), 2);

        assert!(matches!(
            decode_until_end(&body[..5]),
            Err(Error::Format(FormatError::TruncatedRecord { offset: 3, .. }))
        ));
    }
}
