//! ulbmp-core: codec for the ULBMP raster image format
//!
//! A ULBMP stream is a 12-byte envelope (signature, version, header size,
//! width, height) followed by a body in one of four encodings:
//! - v1 `raw`: three bytes per pixel
//! - v2 `rle`: run-length records
//! - v3 `palette`: palette indices packed 1, 2, 4 or 8 bits wide, or
//!   truecolor, each with an optional run-length layer
//! - v4 `delta`: variable-width differences from the previous pixel
//!
//! # Architecture
//!
//! - `image`: `Pixel` and row-major `Grid`
//! - `bitio`: MSB-first bit reading/writing
//! - `header`: the shared envelope and `Version`
//! - `raw`, `rle`, `palette`, `delta`: one module per body encoding
//! - `codec`: dispatch by version, file helpers
//! - `metrics`: size and timing of a round trip
//!
//! # Example
//! ```
//! use ulbmp_core::{decode, encode, EncodeOptions, Grid, Pixel, Version};
//!
//! let grid = Grid::filled(3, 2, Pixel::new(10, 20, 30)).unwrap();
//! let bytes = encode(&grid, Version::Palette, &EncodeOptions::palette(1, true)).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), grid);
//! ```
//!
//! Every call is stateless: nothing is cached between encodes or decodes, and
//! all multi-byte integers are little-endian.

pub mod bitio;
pub mod codec;
pub mod delta;
pub mod error;
pub mod header;
pub mod image;
pub mod metrics;
pub mod palette;
pub mod raw;
pub mod rle;

// Re-export commonly used types
pub use codec::{decode, encode, load_from, save_to, EncodeOptions, Encoding};
pub use error::{Error, Result};
pub use header::Version;
pub use image::{Grid, Pixel};
pub use palette::{Depth, PaletteOptions};
