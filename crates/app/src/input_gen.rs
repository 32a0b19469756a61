//! Sample image generation.
//!
//! When no input file is given, the tool generates an image whose rows mix
//! bands with different compression characteristics, all drawn from a fixed
//! set of `colors` base colors so every palette depth that can hold them
//! applies:
//! - flat bands (one color, long runs)
//! - striped bands (horizontal runs of random length)
//! - patterned bands (a short repeating color sequence)
//! - noise bands (an independent color per pixel)

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ulbmp_core::{Grid, Pixel, Result};

/// Number of distinct RGB colors.
pub const MAX_COLORS: usize = 1 << 24;

/// Generate a sample image.
///
/// The same seed, size and color count always produce the same image.
/// `colors` is clamped to `1..=MAX_COLORS` and to the pixel count.
pub fn generate_sample_grid(seed: u64, width: usize, height: usize, colors: usize) -> Result<Grid> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = colors
        .min(MAX_COLORS)
        .min(width.saturating_mul(height))
        .max(1);
    let base = base_colors(&mut rng, count);
    let mut pixels = Vec::with_capacity(width * height);

    let mut row = 0;
    while row < height {
        let band_rows = rng.gen_range(1..=16).min(height - row);
        let band_len = band_rows * width;

        match rng.gen_range(0..10u8) {
            // 30% flat
            0..=2 => {
                let pixel = base[rng.gen_range(0..base.len())];
                pixels.extend(std::iter::repeat(pixel).take(band_len));
            }

            // 30% stripes
            3..=5 => {
                let mut left = band_len;
                while left > 0 {
                    let run = rng.gen_range(1..=width.max(2)).min(left);
                    let pixel = base[rng.gen_range(0..base.len())];
                    pixels.extend(std::iter::repeat(pixel).take(run));
                    left -= run;
                }
            }

            // 20% repeating pattern
            6..=7 => {
                let pattern = generate_pattern(&mut rng, &base);
                pixels.extend(pattern.iter().copied().cycle().take(band_len));
            }

            // 20% noise
            _ => {
                for _ in 0..band_len {
                    pixels.push(base[rng.gen_range(0..base.len())]);
                }
            }
        }

        row += band_rows;
    }

    Grid::new(width, height, pixels)
}

/// `count` distinct random colors.
fn base_colors(rng: &mut ChaCha8Rng, count: usize) -> Vec<Pixel> {
    let mut seen = HashSet::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    while colors.len() < count {
        let pixel = Pixel::from(rng.gen::<[u8; 3]>());
        if seen.insert(pixel) {
            colors.push(pixel);
        }
    }
    colors
}

/// Generate a short repeating color sequence.
fn generate_pattern(rng: &mut ChaCha8Rng, base: &[Pixel]) -> Vec<Pixel> {
    let pattern_len = rng.gen_range(2..=8);
    (0..pattern_len)
        .map(|_| base[rng.gen_range(0..base.len())])
        .collect()
}
