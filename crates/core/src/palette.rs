//! Version 3: palette indices packed below a byte, with an optional run layer.
//!
//! # Header Extension
//!
//! ```text
//! +--------------------+
//! | envelope (12)      |  header_size = 14 + 3 * palette_len
//! +--------------------+
//! | depth (1)          |  1, 2, 4, 8, or 24 (truecolor, no palette)
//! +--------------------+
//! | rle (1)            |  0 or 1
//! +--------------------+
//! | palette (3 * n)    |  RGB entries in first-appearance order
//! +--------------------+
//! ```
//!
//! # Body
//!
//! - truecolor, no rle: RGB triples as in version 1
//! - truecolor, rle: `{count, R, G, B}` records as in version 2
//! - indexed, no rle: `8 / depth` indices per byte, first pixel in the most
//!   significant bits, last byte zero-padded
//! - indexed, rle: `{count, packed}` pairs where `packed` holds the run's
//!   index in every slot
//!
//! The decoder reads packed bytes until the stream ends and then truncates to
//! `width * height`, since the last byte may carry padding slots.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{ConfigError, FormatError, Result};
use crate::header::{Header, Version, HEADER_LEN, PALETTE_HEADER_LEN};
use crate::image::{Grid, Pixel};
use crate::{raw, rle};

/// Bits per pixel of a palette encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    One,
    Two,
    Four,
    Eight,
    /// Direct RGB, no palette
    TrueColor,
}

impl Depth {
    pub const ALL: [Depth; 5] = [
        Depth::One,
        Depth::Two,
        Depth::Four,
        Depth::Eight,
        Depth::TrueColor,
    ];

    /// Wire value of the depth byte.
    pub fn bits(self) -> u8 {
        match self {
            Depth::One => 1,
            Depth::Two => 2,
            Depth::Four => 4,
            Depth::Eight => 8,
            Depth::TrueColor => 24,
        }
    }

    pub fn is_indexed(self) -> bool {
        self != Depth::TrueColor
    }

    /// Palette indices that fit in one byte (1 for truecolor).
    pub fn slots_per_byte(self) -> usize {
        if self.is_indexed() {
            8 / self.bits() as usize
        } else {
            1
        }
    }

    /// Largest palette this depth can index.
    pub fn capacity(self) -> usize {
        if self.is_indexed() {
            1 << self.bits()
        } else {
            0
        }
    }

    /// Smallest indexed depth able to address `colors` palette entries.
    pub fn smallest_for(colors: usize) -> Option<Depth> {
        Depth::ALL
            .into_iter()
            .filter(|d| d.is_indexed())
            .find(|d| colors <= d.capacity())
    }
}

impl TryFrom<u8> for Depth {
    type Error = ConfigError;

    fn try_from(bits: u8) -> std::result::Result<Self, Self::Error> {
        match bits {
            1 => Ok(Depth::One),
            2 => Ok(Depth::Two),
            4 => Ok(Depth::Four),
            8 => Ok(Depth::Eight),
            24 => Ok(Depth::TrueColor),
            other => Err(ConfigError::UnsupportedDepth(other)),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bpp", self.bits())
    }
}

/// Resolved options of a palette encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteOptions {
    pub depth: Depth,
    pub rle: bool,
}

/// Distinct colors of an image in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Pixel>,
}

impl Palette {
    /// Build the palette of `pixels` together with each pixel's index.
    pub fn index(pixels: &[Pixel]) -> (Palette, Vec<usize>) {
        let mut colors = Vec::new();
        let mut lookup: HashMap<Pixel, usize> = HashMap::new();
        let indices = pixels
            .iter()
            .map(|&pixel| {
                *lookup.entry(pixel).or_insert_with(|| {
                    colors.push(pixel);
                    colors.len() - 1
                })
            })
            .collect();
        (Palette { colors }, indices)
    }

    pub fn from_pixels(pixels: &[Pixel]) -> Palette {
        Self::index(pixels).0
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Pixel] {
        &self.colors
    }

    /// Look up a decoded index.
    ///
    /// # Errors
    /// `FormatError::PaletteIndexOutOfRange` past the last entry.
    pub fn get(&self, index: usize) -> Result<Pixel> {
        self.colors.get(index).copied().ok_or_else(|| {
            FormatError::PaletteIndexOutOfRange {
                index,
                palette_len: self.colors.len(),
            }
            .into()
        })
    }

    /// Size of the v3 header declaring this palette.
    pub fn header_size(&self) -> usize {
        PALETTE_HEADER_LEN + self.colors.len() * raw::PIXEL_BYTES
    }

    fn write(&self, out: &mut Vec<u8>) {
        raw::encode_pixels(&self.colors, out);
    }

    fn parse(bytes: &[u8]) -> Result<Palette> {
        Ok(Palette {
            colors: raw::decode_until_end(bytes)?,
        })
    }
}

/// Encode `grid` as a complete version 3 stream appended to `out`.
///
/// # Errors
/// - `ConfigError::PaletteTooLarge` if the image has more colors than
///   `2^depth`
/// - `ConfigError::DimensionTooLarge` if a side exceeds 65535
pub fn encode(grid: &Grid, options: PaletteOptions, out: &mut Vec<u8>) -> Result<()> {
    let PaletteOptions { depth, rle } = options;
    let (palette, indices) = if depth.is_indexed() {
        Palette::index(grid.pixels())
    } else {
        (Palette::default(), Vec::new())
    };

    if palette.len() > depth.capacity() && depth.is_indexed() {
        return Err(ConfigError::PaletteTooLarge {
            colors: palette.len(),
            depth: depth.bits(),
        }
        .into());
    }

    // At most 256 entries, so the size always fits in 16 bits
    let header_size = palette.header_size() as u16;
    Header::new(Version::Palette, header_size, grid.width(), grid.height())?.write(out);
    out.push(depth.bits());
    out.push(rle as u8);
    palette.write(out);

    match (depth.is_indexed(), rle) {
        (false, false) => raw::encode_pixels(grid.pixels(), out),
        (false, true) => {
            rle::encode_pixels(grid.pixels(), out);
        }
        (true, false) => pack_indices(&indices, depth, out)?,
        (true, true) => {
            let mut offset = 0;
            for run in rle::runs(grid.pixels()) {
                out.push(run.count);
                out.push(replicate(indices[offset], depth));
                offset += run.count as usize;
            }
        }
    }

    debug!(
        "palette encode: {} colors, depth {}, rle {}, {} bytes",
        palette.len(),
        depth,
        rle,
        out.len()
    );
    Ok(())
}

/// Decode the version 3 extension and body following the envelope.
///
/// # Errors
/// - `FormatError::InvalidHeaderSize` if the declared size cannot hold the
///   depth and rle bytes plus whole palette entries
/// - `FormatError::HeaderTooShort` if the stream ends inside the header
/// - `FormatError::InvalidDepth` for a depth byte outside {1, 2, 4, 8, 24}
/// - `FormatError::PaletteIndexOutOfRange` for an index past the palette
/// - `FormatError::TruncatedRecord` if the body ends inside a record
pub fn decode(header: &Header, rest: &[u8]) -> Result<Vec<Pixel>> {
    let header_size = header.header_size as usize;
    let whole_entries = header_size >= PALETTE_HEADER_LEN
        && (header_size - PALETTE_HEADER_LEN) % raw::PIXEL_BYTES == 0;
    if !whole_entries {
        return Err(FormatError::InvalidHeaderSize(header.header_size).into());
    }

    let extension_len = header_size - HEADER_LEN;
    if rest.len() < extension_len {
        return Err(FormatError::HeaderTooShort {
            required: header_size,
            actual: HEADER_LEN + rest.len(),
        }
        .into());
    }

    let depth = Depth::try_from(rest[0]).map_err(|_| FormatError::InvalidDepth(rest[0]))?;
    let rle = rest[1] != 0;
    let palette = Palette::parse(&rest[2..extension_len])?;
    let body = &rest[extension_len..];

    let mut pixels = if palette.is_empty() || !depth.is_indexed() {
        if rle {
            rle::decode_until_end(body)?
        } else {
            raw::decode_until_end(body)?
        }
    } else if rle {
        expand_index_runs(body, &palette, depth)?
    } else {
        unpack_indices(body, &palette, depth)?
    };

    debug!(
        "palette decode: {} colors, depth {}, rle {}, {} pixels before truncation",
        palette.len(),
        depth,
        rle,
        pixels.len()
    );
    pixels.truncate(header.pixel_count());
    Ok(pixels)
}

/// Pack `depth`-bit indices MSB-first, `8 / depth` per byte.
fn pack_indices(indices: &[usize], depth: Depth, out: &mut Vec<u8>) -> Result<()> {
    let bits = depth.bits() as usize;
    let mut writer = BitWriter::with_capacity(indices.len().div_ceil(depth.slots_per_byte()));
    for &index in indices {
        writer.write_bits(index as u32, bits)?;
    }
    out.extend_from_slice(&writer.finish());
    Ok(())
}

/// A byte holding `index` in every slot.
fn replicate(index: usize, depth: Depth) -> u8 {
    let bits = depth.bits() as u32;
    (0..depth.slots_per_byte()).fold(0u32, |byte, _| (byte << bits) | index as u32) as u8
}

fn unpack_indices(body: &[u8], palette: &Palette, depth: Depth) -> Result<Vec<Pixel>> {
    let bits = depth.bits() as usize;
    let mut reader = BitReader::new(body);
    let mut pixels = Vec::with_capacity(body.len() * depth.slots_per_byte());
    while !reader.is_empty() {
        let index = reader.read_bits(bits)? as usize;
        pixels.push(palette.get(index)?);
    }
    Ok(pixels)
}

/// Expand `{count, packed}` pairs; a pair yields `count` pixels of the index
/// in the packed byte's leading slot.
fn expand_index_runs(body: &[u8], palette: &Palette, depth: Depth) -> Result<Vec<Pixel>> {
    let shift = 8 - depth.bits();
    let mut pixels = Vec::new();
    let mut offset = 0;
    for record in body.chunks(2) {
        let &[count, packed] = record else {
            return Err(FormatError::TruncatedRecord {
                offset,
                required: 2,
                actual: record.len(),
            }
            .into());
        };
        let pixel = palette.get((packed >> shift) as usize)?;
        pixels.extend(std::iter::repeat(pixel).take(count as usize));
        offset += 2;
    }
    Ok(pixels)
}
