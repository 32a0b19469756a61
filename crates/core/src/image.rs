//! Pixel and grid types.
//!
//! A `Grid` is a fixed-size, row-major image of RGB `Pixel`s. It is the value
//! handed to the encoder and returned by the decoder; the codec never keeps a
//! reference to it between calls.

use crate::error::{GridError, Result};

/// An RGB color with three 8-bit channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in wire order (red, green, blue).
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Pixel {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// A width x height image stored row-major.
///
/// # Invariants
/// - `width > 0` and `height > 0`
/// - `pixels.len() == width * height`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Grid {
    /// Build a grid from a row-major pixel sequence.
    ///
    /// # Errors
    /// - `GridError::InvalidDimensions` if either side is zero
    /// - `GridError::InvalidPixelCount` if `pixels.len() != width * height`
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height }.into());
        }
        let expected = width * height;
        if pixels.len() != expected {
            return Err(GridError::InvalidPixelCount {
                expected,
                actual: pixels.len(),
            }
            .into());
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid with every pixel set to `pixel`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Result<Self> {
        Self::new(width, height, vec![pixel; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels (never zero).
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Pixel> {
        let offset = self.offset(x, y)?;
        Ok(self.pixels[offset])
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.pixels[offset] = pixel;
        Ok(())
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }
            .into());
        }
        Ok(y * self.width + x)
    }
}
