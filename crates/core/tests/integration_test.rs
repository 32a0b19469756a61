//! Integration tests for the ULBMP codec.
//!
//! These tests go through the public API only: grid -> encode -> bytes ->
//! decode -> grid, for every version and palette option, plus the byte-level
//! layouts a third-party reader would depend on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ulbmp_core::{
    decode,
    delta::{self, DeltaForm},
    encode,
    error::{ConfigError, FormatError},
    load_from, save_to, Depth, EncodeOptions, Encoding, Error, Grid, PaletteOptions, Pixel,
    Version,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random image drawing from `colors` distinct colors, with runs.
fn random_grid(rng: &mut ChaCha8Rng, width: usize, height: usize, colors: usize) -> Grid {
    let palette: Vec<Pixel> = (0..colors).map(|_| Pixel::from(rng.gen::<[u8; 3]>())).collect();
    let mut pixels = Vec::with_capacity(width * height);
    while pixels.len() < width * height {
        let pixel = palette[rng.gen_range(0..colors)];
        let run = rng.gen_range(1..=40).min(width * height - pixels.len());
        pixels.extend(std::iter::repeat(pixel).take(run));
    }
    Grid::new(width, height, pixels).unwrap()
}

/// Smooth image where neighbouring pixels differ slightly.
fn gradient_grid(width: usize, height: usize) -> Grid {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| Pixel::new(x as u8, (y * 2) as u8, (x + y) as u8))
        })
        .collect();
    Grid::new(width, height, pixels).unwrap()
}

/// Every encoding able to represent an image with `colors` distinct colors.
fn encodings_for(colors: usize) -> Vec<Encoding> {
    let mut encodings = vec![Encoding::Raw, Encoding::RunLength, Encoding::Delta];
    for depth in Depth::ALL {
        if depth.is_indexed() && colors > depth.capacity() {
            continue;
        }
        for rle in [false, true] {
            encodings.push(Encoding::Palette(PaletteOptions { depth, rle }));
        }
    }
    encodings
}

#[test]
fn test_round_trip_every_encoding() {
    init_logger();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for colors in [1, 2, 3, 4, 11, 16, 200] {
        let width = rng.gen_range(1..=37);
        let height = rng.gen_range(1..=23);
        let grid = random_grid(&mut rng, width, height, colors);

        for encoding in encodings_for(colors) {
            let bytes = encoding.encode(&grid).unwrap();
            let decoded = decode(&bytes).unwrap_or_else(|e| panic!("{encoding}: {e}"));
            assert_eq!(decoded, grid, "{encoding} with {colors} colors, {width}x{height}");
        }
    }
}

#[test]
fn test_round_trip_noise_and_gradients() {
    init_logger();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let noise: Vec<Pixel> = (0..64 * 48).map(|_| Pixel::from(rng.gen::<[u8; 3]>())).collect();
    let noise = Grid::new(64, 48, noise).unwrap();
    let gradient = gradient_grid(50, 40);

    for grid in [&noise, &gradient] {
        for version in [Version::Raw, Version::RunLength, Version::Delta] {
            let bytes = encode(grid, version, &EncodeOptions::new()).unwrap();
            assert_eq!(&decode(&bytes).unwrap(), grid, "{version}");
        }
        for rle in [false, true] {
            let bytes = encode(grid, Version::Palette, &EncodeOptions::palette(24, rle)).unwrap();
            assert_eq!(&decode(&bytes).unwrap(), grid);
        }
    }
}

#[test]
fn test_delta_compresses_gradients() {
    let grid = gradient_grid(64, 64);
    let raw = encode(&grid, Version::Raw, &EncodeOptions::new()).unwrap();
    let delta = encode(&grid, Version::Delta, &EncodeOptions::new()).unwrap();

    assert!(delta.len() * 2 < raw.len());
}

#[test]
fn test_reencoding_is_byte_identical() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let grid = random_grid(&mut rng, 20, 20, 9);

    for encoding in encodings_for(9) {
        let first = encoding.encode(&grid).unwrap();
        let second = encoding.encode(&decode(&first).unwrap()).unwrap();
        assert_eq!(first, second, "{encoding}");
    }
}

#[test]
fn test_depth_one_alternating_colors() {
    let black = Pixel::new(0, 0, 0);
    let white = Pixel::new(255, 255, 255);
    let pixels: Vec<_> = (0..16).map(|i| if i % 2 == 0 { white } else { black }).collect();
    let grid = Grid::new(16, 1, pixels).unwrap();

    let bytes = encode(&grid, Version::Palette, &EncodeOptions::palette(1, false)).unwrap();
    // 14-byte header + 2 palette entries, then 8 indices per byte
    assert_eq!(bytes.len(), 20 + 2);
    assert_eq!(&bytes[20..], &[0b0101_0101, 0b0101_0101]);
}

#[test]
fn test_depth_four_two_indices_per_byte() {
    let pixels: Vec<_> = (0..10u8).map(|i| Pixel::new(i, i, i)).collect();
    let grid = Grid::new(5, 2, pixels).unwrap();

    let bytes = encode(&grid, Version::Palette, &EncodeOptions::palette(4, false)).unwrap();
    let body = &bytes[14 + 30..];
    assert_eq!(body, &[0x01, 0x23, 0x45, 0x67, 0x89]);
    assert_eq!(decode(&bytes).unwrap(), grid);
}

#[test]
fn test_delta_identical_pixels_use_small_form() {
    let grid = Grid::filled(8, 8, Pixel::new(90, 12, 250)).unwrap();
    let forms = delta::forms(grid.pixels());

    assert!(forms[1..].iter().all(|&f| f == DeltaForm::Small));

    let bytes = encode(&grid, Version::Delta, &EncodeOptions::new()).unwrap();
    // Last 63 pixels are one byte each, all fields at their +2 bias
    assert!(bytes[bytes.len() - 63..].iter().all(|&b| b == 0b0010_1010));
}

#[test]
fn test_delta_large_jumps_use_new_pixel() {
    let a = Pixel::new(10, 10, 10);
    let b = Pixel::new(210, 210, 210);
    let grid = Grid::new(4, 1, vec![a, b, a, b]).unwrap();

    let forms = delta::forms(grid.pixels());
    assert!(forms[1..].iter().all(|&f| f == DeltaForm::NewPixel));

    let bytes = encode(&grid, Version::Delta, &EncodeOptions::new()).unwrap();
    let body = &bytes[12..];
    // (10, 10, 10) from black fits the intermediate form
    assert_eq!(body[..2], [0b0110_1010, 0b1000_1000]);
    assert_eq!(body[2..6], [0xFF, 210, 210, 210]);
    assert_eq!(decode(&bytes).unwrap(), grid);
}

#[test]
fn test_run_length_boundaries() {
    let pixel = Pixel::new(3, 4, 5);

    let exact = Grid::filled(255, 1, pixel).unwrap();
    let bytes = encode(&exact, Version::RunLength, &EncodeOptions::new()).unwrap();
    assert_eq!(&bytes[12..], &[255, 3, 4, 5]);

    let over = Grid::filled(128, 2, pixel).unwrap();
    let bytes = encode(&over, Version::RunLength, &EncodeOptions::new()).unwrap();
    assert_eq!(&bytes[12..], &[255, 3, 4, 5, 1, 3, 4, 5]);
    assert_eq!(decode(&bytes).unwrap(), over);
}

#[test]
fn test_single_pixel_every_version() {
    let grid = Grid::new(1, 1, vec![Pixel::new(255, 0, 128)]).unwrap();
    for encoding in encodings_for(1) {
        let bytes = encoding.encode(&grid).unwrap();
        assert_eq!(decode(&bytes).unwrap(), grid, "{encoding}");
    }
}

#[test]
fn test_bad_signature() {
    let grid = Grid::filled(2, 2, Pixel::BLACK).unwrap();
    let mut bytes = encode(&grid, Version::Raw, &EncodeOptions::new()).unwrap();
    bytes[..5].copy_from_slice(b"BMP\0\0");

    assert!(matches!(
        decode(&bytes),
        Err(Error::Format(FormatError::InvalidSignature { .. }))
    ));
}

#[test]
fn test_truncated_streams() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let grid = random_grid(&mut rng, 6, 6, 4);

    let raw = encode(&grid, Version::Raw, &EncodeOptions::new()).unwrap();
    assert!(matches!(
        decode(&raw[..raw.len() - 4]),
        Err(Error::Format(FormatError::IncompletePixelData { .. }))
    ));

    let delta = encode(&grid, Version::Delta, &EncodeOptions::new()).unwrap();
    assert!(matches!(
        decode(&delta[..delta.len() - 1]),
        Err(Error::Format(FormatError::MissingPixels { .. }))
    ));

    assert!(decode(&raw[..7]).is_err());
}

#[test]
fn test_palette_options_required() {
    let grid = Grid::filled(2, 2, Pixel::BLACK).unwrap();
    assert!(matches!(
        encode(&grid, Version::Palette, &EncodeOptions::new().with_depth(8)),
        Err(Error::Config(ConfigError::MissingPaletteOptions))
    ));
}

#[test]
fn test_palette_too_large() {
    let pixels: Vec<_> = (0..20u8).map(|i| Pixel::new(i, 0, 0)).collect();
    let grid = Grid::new(20, 1, pixels).unwrap();
    assert_eq!(ulbmp_core::palette::Palette::from_pixels(grid.pixels()).len(), 20);

    assert!(matches!(
        encode(&grid, Version::Palette, &EncodeOptions::palette(4, true)),
        Err(Error::Config(ConfigError::PaletteTooLarge { .. }))
    ));
}

#[test]
fn test_save_and_load_file() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.ulbmp");
    let grid = gradient_grid(12, 9);

    save_to(&path, &grid, Version::Delta, &EncodeOptions::new()).unwrap();
    assert_eq!(&std::fs::read(&path).unwrap()[..6], b"ULBMP\x04");
    assert_eq!(load_from(&path).unwrap(), grid);

    assert!(matches!(
        load_from(dir.path().join("missing.ulbmp")),
        Err(Error::Io(_))
    ));
}
