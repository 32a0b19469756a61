//! Version dispatch and the public encode/decode entry points.
//!
//! Encoding resolves a `Version` plus `EncodeOptions` into an `Encoding`,
//! which writes the envelope and body in one pass. Decoding parses the
//! envelope, lets the version byte pick the body decoder, and builds a `Grid`
//! from the resulting pixels.

use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::{ConfigError, Result};
use crate::header::{Header, Version, HEADER_LEN};
use crate::image::Grid;
use crate::palette::{Depth, PaletteOptions};
use crate::{delta, palette, raw, rle};

/// Caller-supplied, version-specific encoding parameters.
///
/// Only the palette version reads them, and it requires both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Bits per pixel: 1, 2, 4, 8 or 24
    pub depth: Option<u8>,
    /// Whether to add the run-length layer
    pub rle: Option<bool>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a palette encoding.
    pub fn palette(depth: u8, rle: bool) -> Self {
        Self::new().with_depth(depth).with_rle(rle)
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_rle(mut self, rle: bool) -> Self {
        self.rle = Some(rle);
        self
    }
}

/// A fully specified body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    RunLength,
    Palette(PaletteOptions),
    Delta,
}

impl Encoding {
    /// Combine a version with its options.
    ///
    /// # Errors
    /// - `ConfigError::MissingPaletteOptions` for version 3 without both
    ///   depth and rle
    /// - `ConfigError::UnsupportedDepth` for a depth outside {1, 2, 4, 8, 24}
    pub fn resolve(version: Version, options: &EncodeOptions) -> Result<Self> {
        Ok(match version {
            Version::Raw => Encoding::Raw,
            Version::RunLength => Encoding::RunLength,
            Version::Delta => Encoding::Delta,
            Version::Palette => {
                let (Some(depth), Some(rle)) = (options.depth, options.rle) else {
                    return Err(ConfigError::MissingPaletteOptions.into());
                };
                Encoding::Palette(PaletteOptions {
                    depth: Depth::try_from(depth)?,
                    rle,
                })
            }
        })
    }

    pub fn version(&self) -> Version {
        match self {
            Encoding::Raw => Version::Raw,
            Encoding::RunLength => Version::RunLength,
            Encoding::Palette(_) => Version::Palette,
            Encoding::Delta => Version::Delta,
        }
    }

    /// Serialize `grid` into a complete ULBMP stream.
    pub fn encode(&self, grid: &Grid) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN + grid.len() * raw::PIXEL_BYTES);
        match *self {
            Encoding::Raw => raw::encode(grid, &mut out)?,
            Encoding::RunLength => rle::encode(grid, &mut out)?,
            Encoding::Palette(options) => palette::encode(grid, options, &mut out)?,
            Encoding::Delta => delta::encode(grid, &mut out)?,
        }

        debug!(
            "encoded {}x{} grid as {}: {} bytes",
            grid.width(),
            grid.height(),
            self,
            out.len()
        );
        Ok(out)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Palette(PaletteOptions { depth, rle }) => {
                write!(f, "{} {}", self.version(), depth)?;
                if *rle {
                    write!(f, " rle")?;
                }
                Ok(())
            }
            _ => write!(f, "{}", self.version()),
        }
    }
}

/// Encode `grid` with the given version and options.
pub fn encode(grid: &Grid, version: Version, options: &EncodeOptions) -> Result<Vec<u8>> {
    Encoding::resolve(version, options)?.encode(grid)
}

/// Decode a complete ULBMP stream.
///
/// # Errors
/// - `Error::Format` if the stream is malformed or truncated
/// - `Error::Grid` if the body describes the wrong number of pixels
pub fn decode(bytes: &[u8]) -> Result<Grid> {
    let header = Header::parse(bytes)?;
    let rest = &bytes[HEADER_LEN..];

    let pixels = match header.version {
        Version::Raw => raw::decode(&header, rest)?,
        Version::RunLength => rle::decode(&header, rest)?,
        Version::Palette => palette::decode(&header, rest)?,
        Version::Delta => delta::decode(&header, rest)?,
    };

    debug!(
        "decoded {} stream: {}x{}, {} pixels from {} bytes",
        header.version,
        header.width,
        header.height,
        pixels.len(),
        bytes.len()
    );
    Grid::new(header.width as usize, header.height as usize, pixels)
}

/// Encode `grid` and write the stream to `path`.
///
/// Nothing is written if encoding fails.
pub fn save_to(
    path: impl AsRef<Path>,
    grid: &Grid,
    version: Version,
    options: &EncodeOptions,
) -> Result<()> {
    let bytes = encode(grid, version, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read and decode the ULBMP file at `path`.
pub fn load_from(path: impl AsRef<Path>) -> Result<Grid> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}
