//! Error types for the ULBMP codec.
//!
//! All operations return structured errors rather than panicking. Every error
//! is terminal for the call that raised it: a failed encode produces no bytes
//! and a failed decode produces no grid.

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Format: the byte stream does not follow the ULBMP layout
/// - Config: the caller asked for an encoding that cannot be produced
/// - Grid: pixel data does not describe a valid image
/// - Bit I/O: reading/writing sub-byte fields
/// - I/O: file system operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or truncated ULBMP stream
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Encoding options are missing or cannot represent the image
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid grid dimensions, pixel count or coordinates
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a ULBMP stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The first five bytes are not "ULBMP"
    #[error("invalid signature: expected {expected:?}, got {actual:?}")]
    InvalidSignature { expected: [u8; 5], actual: Vec<u8> },

    /// Version byte outside 1..=4
    #[error("unsupported ULBMP version {0}")]
    UnsupportedVersion(u8),

    /// Fixed-header versions must declare a 12-byte header
    #[error("incomplete header: version {version} requires header size 12, got {header_size}")]
    IncompleteHeader { version: u8, header_size: u16 },

    /// Stream ends before the declared header does
    #[error("header too short: need at least {required} bytes, got {actual}")]
    HeaderTooShort { required: usize, actual: usize },

    /// Palette header size that cannot hold whole RGB entries
    #[error("invalid palette header size {0}")]
    InvalidHeaderSize(u16),

    /// Depth byte not in {1, 2, 4, 8, 24}
    #[error("invalid palette depth {0}")]
    InvalidDepth(u8),

    /// Fewer pixel bytes than the header implies
    #[error("incomplete pixel data: expected {expected} bytes, got {actual}")]
    IncompletePixelData { expected: usize, actual: usize },

    /// A run-length or truecolor record is cut short at the end of the stream
    #[error("truncated record at byte {offset}: need {required} bytes, got {actual}")]
    TruncatedRecord {
        offset: usize,
        required: usize,
        actual: usize,
    },

    /// Delta stream ends before every pixel is decoded
    #[error("missing pixels: stream ends after {actual} of {expected} pixels")]
    MissingPixels { expected: usize, actual: usize },

    /// Packed index refers past the end of the palette
    #[error("palette index {index} out of range for palette of {palette_len} colors")]
    PaletteIndexOutOfRange { index: usize, palette_len: usize },

    /// Big-difference record with the reserved subtag 0b11
    #[error("invalid delta subtag {subtag:#04b} at pixel {pixel}")]
    InvalidDeltaTag { subtag: u8, pixel: usize },

    /// Delta moves a channel outside 0..=255
    #[error("delta at pixel {pixel} produces channel value {value}")]
    ChannelOutOfRange { pixel: usize, value: i16 },
}

/// Errors raised when encoding options cannot produce a stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Version 3 requested without both depth and rle
    #[error("palette encoding requires both depth and rle options")]
    MissingPaletteOptions,

    /// Requested depth not in {1, 2, 4, 8, 24}
    #[error("unsupported palette depth {0}")]
    UnsupportedDepth(u8),

    /// Image has more distinct colors than the depth can index
    #[error("palette of {colors} colors does not fit in {depth} bits per pixel")]
    PaletteTooLarge { colors: usize, depth: u8 },

    /// Dimensions do not fit the 16-bit header fields
    #[error("image {width}x{height} exceeds the 65535 pixel limit per side")]
    DimensionTooLarge { width: usize, height: usize },
}

/// Pixel grid errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero
    #[error("invalid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: usize, height: usize },

    /// Pixel sequence length differs from width * height
    #[error("pixel count mismatch: expected {expected}, got {actual}")]
    InvalidPixelCount { expected: usize, actual: usize },

    /// Coordinates outside the grid
    #[error("position ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 32 bits in one field)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
