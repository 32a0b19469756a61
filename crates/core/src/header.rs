//! The envelope shared by every ULBMP version.
//!
//! # Envelope Format
//!
//! ```text
//! +--------------------+
//! | signature (5)      |  "ULBMP"
//! +--------------------+
//! | version (1)        |  1 raw, 2 run-length, 3 palette, 4 delta
//! +--------------------+
//! | header_size (2)    |  u16 little-endian, bytes before the body
//! +--------------------+
//! | width (2)          |  u16 little-endian
//! +--------------------+
//! | height (2)         |  u16 little-endian
//! +--------------------+
//! ```
//!
//! Versions 1, 2 and 4 have no further header fields, so their header size is
//! always 12. Version 3 appends a depth byte, an rle byte and the palette, and
//! declares `14 + 3 * palette_len`.

use std::fmt;

use crate::error::{ConfigError, FormatError, Result};

/// File signature: "ULBMP"
pub const SIGNATURE: [u8; 5] = *b"ULBMP";

/// Length of the common envelope in bytes
pub const HEADER_LEN: usize = 12;

/// Header size of the palette version before any palette entries
pub const PALETTE_HEADER_LEN: usize = 14;

/// Body encoding selected by the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Version {
    Raw = 1,
    RunLength = 2,
    Palette = 3,
    Delta = 4,
}

impl Version {
    pub const ALL: [Version; 4] = [
        Version::Raw,
        Version::RunLength,
        Version::Palette,
        Version::Delta,
    ];

    /// Wire value of the version byte.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Whether the header is exactly the 12-byte envelope.
    pub fn has_fixed_header(self) -> bool {
        self != Version::Palette
    }
}

impl TryFrom<u8> for Version {
    type Error = FormatError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Version::Raw),
            2 => Ok(Version::RunLength),
            3 => Ok(Version::Palette),
            4 => Ok(Version::Delta),
            other => Err(FormatError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::Raw => "raw",
            Version::RunLength => "run-length",
            Version::Palette => "palette",
            Version::Delta => "delta",
        };
        write!(f, "v{} ({})", self.number(), name)
    }
}

/// Parsed envelope fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub header_size: u16,
    pub width: u16,
    pub height: u16,
}

impl Header {
    /// Build an envelope for a grid of the given size.
    ///
    /// # Errors
    /// `ConfigError::DimensionTooLarge` if a side does not fit in 16 bits.
    pub fn new(version: Version, header_size: u16, width: usize, height: usize) -> Result<Self> {
        let too_large = || ConfigError::DimensionTooLarge { width, height };
        Ok(Self {
            version,
            header_size,
            width: u16::try_from(width).map_err(|_| too_large())?,
            height: u16::try_from(height).map_err(|_| too_large())?,
        })
    }

    /// Number of pixels the body must describe.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Append the 12-byte envelope to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&SIGNATURE);
        out.push(self.version.number());
        out.extend_from_slice(&self.header_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
    }

    /// Parse the envelope from the start of `bytes`.
    ///
    /// # Errors
    /// - `FormatError::InvalidSignature` if the stream does not start with "ULBMP"
    /// - `FormatError::UnsupportedVersion` for a version byte outside 1..=4
    /// - `FormatError::IncompleteHeader` if a fixed-header version declares a
    ///   header size other than 12
    /// - `FormatError::HeaderTooShort` if the stream ends inside the envelope
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let signature = &bytes[..bytes.len().min(SIGNATURE.len())];
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature {
                expected: SIGNATURE,
                actual: signature.to_vec(),
            }
            .into());
        }

        let version_byte = *bytes.get(5).ok_or(FormatError::HeaderTooShort {
            required: HEADER_LEN,
            actual: bytes.len(),
        })?;
        let version = Version::try_from(version_byte)?;

        if bytes.len() < HEADER_LEN {
            return Err(FormatError::HeaderTooShort {
                required: HEADER_LEN,
                actual: bytes.len(),
            }
            .into());
        }

        let header_size = u16::from_le_bytes([bytes[6], bytes[7]]);
        if version.has_fixed_header() && header_size as usize != HEADER_LEN {
            return Err(FormatError::IncompleteHeader {
                version: version_byte,
                header_size,
            }
            .into());
        }

        Ok(Self {
            version,
            header_size,
            width: u16::from_le_bytes([bytes[8], bytes[9]]),
            height: u16::from_le_bytes([bytes[10], bytes[11]]),
        })
    }
}
