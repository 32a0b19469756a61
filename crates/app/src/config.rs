//! Configuration for the ulbmp tool.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized sample-image parameters that are reproducible with a
//! seed).
//!
//! The tool works with ZERO arguments: it generates a sample image, encodes it
//! as version 4 and writes `./out.ulbmp`. All defaults are printed with
//! `--print-config` so runs are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use ulbmp_core::{EncodeOptions, Version};

use crate::input_gen::MAX_COLORS;

/// Parameters of a generated sample image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    /// Number of base colors the image draws from
    pub colors: usize,
}

/// Complete configuration for a conversion run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// ULBMP file to read (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Output file path
    pub output_file: PathBuf,

    // === Encoding ===
    pub version: Version,

    /// Palette depth and rle flag, required for version 3
    pub options: EncodeOptions,

    // === Sample ===
    pub sample: SampleConfig,

    // === Behavior ===
    /// Encode in every version and print a comparison table
    pub compare: bool,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

/// Value following a flag, or an error naming what the flag needs.
fn value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {}", flag, what))
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// Sample dimensions and colors not given explicitly are drawn from a
    /// ChaCha8 generator seeded with `--seed` (or the current time).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut version = Version::Delta;
        let mut options = EncodeOptions::new();
        let mut seed: Option<u64> = None;
        let mut width: Option<usize> = None;
        let mut height: Option<usize> = None;
        let mut colors: Option<usize> = None;
        let mut compare = false;
        let mut print_config = false;
        let mut print_metrics = true;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--in" => {
                    input_file = Some(PathBuf::from(value(args, &mut i, "--in", "a path")?));
                }
                "--out" => {
                    output_file = Some(PathBuf::from(value(args, &mut i, "--out", "a path")?));
                }
                "--version" => {
                    let raw: u8 = value(args, &mut i, "--version", "a number")?
                        .parse()
                        .map_err(|_| "invalid version")?;
                    version = Version::try_from(raw).map_err(|e| e.to_string())?;
                }
                "--depth" => {
                    let depth = value(args, &mut i, "--depth", "a number")?
                        .parse()
                        .map_err(|_| "invalid depth")?;
                    options = options.with_depth(depth);
                }
                "--rle" => {
                    options = options.with_rle(true);
                }
                "--no-rle" => {
                    options = options.with_rle(false);
                }
                "--seed" => {
                    seed = Some(
                        value(args, &mut i, "--seed", "a number")?
                            .parse()
                            .map_err(|_| "invalid seed")?,
                    );
                }
                "--width" => {
                    width = Some(
                        value(args, &mut i, "--width", "a number")?
                            .parse()
                            .map_err(|_| "invalid width")?,
                    );
                }
                "--height" => {
                    height = Some(
                        value(args, &mut i, "--height", "a number")?
                            .parse()
                            .map_err(|_| "invalid height")?,
                    );
                }
                "--colors" => {
                    colors = Some(
                        value(args, &mut i, "--colors", "a number")?
                            .parse()
                            .map_err(|_| "invalid colors")?,
                    );
                }
                "--compare" => {
                    compare = true;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sample = SampleConfig {
            seed,
            width: width.unwrap_or_else(|| rng.gen_range(16..=256)),
            height: height.unwrap_or_else(|| rng.gen_range(16..=256)),
            colors: colors.unwrap_or_else(|| rng.gen_range(2..=16)),
        };

        if sample.width == 0 || sample.height == 0 {
            return Err("sample width and height must be positive".to_string());
        }
        if sample.colors == 0 || sample.colors > MAX_COLORS {
            return Err(format!("--colors must be between 1 and {}", MAX_COLORS));
        }

        Ok(Config {
            input_file,
            output_file: output_file.unwrap_or_else(|| PathBuf::from("./out.ulbmp")),
            version,
            options,
            sample,
            compare,
            print_config,
            print_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.input_file {
            Some(path) => println!("Input file:  {}", path.display()),
            None => println!("Input file:  (generate sample)"),
        }
        println!("Output file: {}", self.output_file.display());
        println!();
        println!("=== Encoding ===");
        println!("Version: {}", self.version);
        if let Some(depth) = self.options.depth {
            println!("Depth: {}", depth);
        }
        if let Some(rle) = self.options.rle {
            println!("RLE: {}", rle);
        }
        println!();
        if self.input_file.is_none() {
            println!("=== Sample ===");
            println!("Seed: {}", self.sample.seed);
            println!("Size: {}x{}", self.sample.width, self.sample.height);
            println!("Colors: {}", self.sample.colors);
            println!();
        }
    }
}

fn print_help() {
    println!("ulbmp: Encode, decode and compare ULBMP images");
    println!();
    println!("USAGE:");
    println!("    ulbmp [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>         ULBMP file to read (default: generate sample)");
    println!("    --out <PATH>        Output file (default: ./out.ulbmp)");
    println!();
    println!("    --version <1-4>     Output version (default: 4)");
    println!("    --depth <N>         Palette depth 1, 2, 4, 8 or 24 (version 3)");
    println!("    --rle, --no-rle     Palette run-length layer (version 3)");
    println!();
    println!("    --seed <N>          Random seed for the sample image");
    println!("    --width <N>         Sample width (default: random 16-256)");
    println!("    --height <N>        Sample height (default: random 16-256)");
    println!("    --colors <N>        Sample base colors (default: random 2-16)");
    println!();
    println!("    --compare           Encode in every version and print a table");
    println!("    --print-config      Print resolved configuration");
    println!("    --no-metrics        Don't print metrics summary");
    println!("    --help, -h          Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    ulbmp --seed 42 --compare                      # Compare encodings of a sample");
    println!("    ulbmp --in a.ulbmp --out b.ulbmp --version 2   # Re-encode as run-length");
    println!("    ulbmp --version 3 --depth 4 --rle --colors 16  # 4-bit palette with runs");
    println!();
}
