//! ulbmp: convert and compare ULBMP images.
//!
//! Reads a ULBMP file (or generates a seeded sample), encodes it with the
//! requested version, writes the result, decodes it back to verify, and prints
//! metrics.

mod config;
mod input_gen;

use config::Config;
use log::{info, warn};
use ulbmp_core::metrics::CodecMetrics;
use ulbmp_core::palette::Palette;
use ulbmp_core::{load_from, Depth, Encoding, Grid, PaletteOptions};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage");
            std::process::exit(2);
        }
    };

    if config.print_config {
        config.print();
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> ulbmp_core::Result<()> {
    let grid = match &config.input_file {
        Some(path) => {
            info!("loading {}", path.display());
            load_from(path)?
        }
        None => {
            let sample = config.sample;
            info!(
                "generating {}x{} sample with {} colors (seed {})",
                sample.width, sample.height, sample.colors, sample.seed
            );
            input_gen::generate_sample_grid(
                sample.seed,
                sample.width,
                sample.height,
                sample.colors,
            )?
        }
    };

    if config.compare {
        compare(&grid)?;
    }

    let encoding = Encoding::resolve(config.version, &config.options)?;
    let (metrics, bytes) = CodecMetrics::measure(&encoding, &grid)?;
    std::fs::write(&config.output_file, &bytes)?;
    info!("wrote {} bytes to {}", bytes.len(), config.output_file.display());

    if config.print_metrics {
        metrics.print_summary();
    } else {
        println!("{}", metrics.table_row());
    }

    if !metrics.verified {
        warn!("round trip through {} did not reproduce the image", encoding);
        std::process::exit(1);
    }
    Ok(())
}

/// Encode `grid` with every applicable encoding and print one row each.
fn compare(grid: &Grid) -> ulbmp_core::Result<()> {
    let colors = Palette::from_pixels(grid.pixels()).len();

    let mut encodings = vec![Encoding::Raw, Encoding::RunLength];
    for depth in Depth::ALL {
        if depth.is_indexed() && colors > depth.capacity() {
            continue;
        }
        for rle in [false, true] {
            encodings.push(Encoding::Palette(PaletteOptions { depth, rle }));
        }
    }
    encodings.push(Encoding::Delta);

    println!(
        "\n=== {}x{} image, {} colors ===",
        grid.width(),
        grid.height(),
        colors
    );
    println!("{:<28} {:>10} {:>8} {:>7} check", "encoding", "bytes", "ratio", "bpp");
    for encoding in &encodings {
        let (metrics, _) = CodecMetrics::measure(encoding, grid)?;
        println!("{}", metrics.table_row());
    }
    Ok(())
}
