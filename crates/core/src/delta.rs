//! Version 4: each pixel predicted from its row-major predecessor.
//!
//! The predictor starts at black and follows the last pixel written or read.
//! Every record starts with a 2-bit tag; fields are packed MSB-first and may
//! cross byte boundaries.
//!
//! # Record Forms
//!
//! ```text
//! small         00 | dr+2 (2) | dg+2 (2) | db+2 (2)                   1 byte
//! intermediate  01 | dg+32 (6) | dr-dg+8 (4) | db-dg+8 (4)            2 bytes
//! big red       10 00 | dr+128 (8) | dg-dr+32 (6) | db-dr+32 (6)      3 bytes
//! big green     10 01 | dg+128 (8) | dr-dg+32 (6) | db-dg+32 (6)      3 bytes
//! big blue      10 10 | db+128 (8) | dr-db+32 (6) | dg-db+32 (6)      3 bytes
//! new pixel     11111111 | R (8) | G (8) | B (8)                      4 bytes
//! ```
//!
//! The encoder uses the first form in that order whose ranges hold. There is
//! no end marker: the decoder stops after `width * height` pixels.

use log::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{BitIoError, Error, FormatError, Result};
use crate::header::{Header, Version, HEADER_LEN};
use crate::image::{Grid, Pixel};

const TAG_SMALL: u32 = 0b00;
const TAG_INTERMEDIATE: u32 = 0b01;
const TAG_BIG: u32 = 0b10;
const NEW_PIXEL: u32 = 0xFF;

/// Base channel of a big-difference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    fn subtag(self) -> u32 {
        self as u32
    }

    fn from_subtag(subtag: u32) -> Option<Channel> {
        Channel::ALL.get(subtag as usize).copied()
    }

    /// Positions of the two channels expressed relative to this one.
    fn others(self) -> [usize; 2] {
        match self {
            Channel::Red => [1, 2],
            Channel::Green => [0, 2],
            Channel::Blue => [0, 1],
        }
    }
}

/// Record form chosen for a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaForm {
    Small,
    Intermediate,
    Big(Channel),
    NewPixel,
}

/// Per-channel difference from the predicted pixel.
type Delta = [i16; 3];

fn delta(previous: Pixel, current: Pixel) -> Delta {
    let [pr, pg, pb] = previous.channels();
    let [r, g, b] = current.channels();
    [
        r as i16 - pr as i16,
        g as i16 - pg as i16,
        b as i16 - pb as i16,
    ]
}

fn within(value: i16, low: i16, high: i16) -> bool {
    (low..=high).contains(&value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Small(Delta),
    Intermediate(Delta),
    Big(Channel, Delta),
    NewPixel(Pixel),
}

impl Record {
    /// Pick the first form, in priority order, able to carry `current`.
    fn choose(previous: Pixel, current: Pixel) -> Record {
        let d = delta(previous, current);
        let [dr, dg, db] = d;

        if d.iter().all(|&v| within(v, -2, 1)) {
            return Record::Small(d);
        }
        if within(dg, -32, 31) && within(dr - dg, -8, 7) && within(db - dg, -8, 7) {
            return Record::Intermediate(d);
        }
        for channel in Channel::ALL {
            let base = d[channel as usize];
            let [i, j] = channel.others();
            if within(base, -128, 127)
                && within(d[i] - base, -32, 31)
                && within(d[j] - base, -32, 31)
            {
                return Record::Big(channel, d);
            }
        }
        Record::NewPixel(current)
    }

    fn form(&self) -> DeltaForm {
        match self {
            Record::Small(_) => DeltaForm::Small,
            Record::Intermediate(_) => DeltaForm::Intermediate,
            Record::Big(channel, _) => DeltaForm::Big(*channel),
            Record::NewPixel(_) => DeltaForm::NewPixel,
        }
    }

    fn write(&self, writer: &mut BitWriter) -> Result<()> {
        // Fields are biased into unsigned ranges; `choose` guarantees they fit
        let field = |value: i16, bias: i16| (value + bias) as u32;

        match *self {
            Record::Small([dr, dg, db]) => {
                writer.write_bits(TAG_SMALL, 2)?;
                writer.write_bits(field(dr, 2), 2)?;
                writer.write_bits(field(dg, 2), 2)?;
                writer.write_bits(field(db, 2), 2)?;
            }
            Record::Intermediate([dr, dg, db]) => {
                writer.write_bits(TAG_INTERMEDIATE, 2)?;
                writer.write_bits(field(dg, 32), 6)?;
                writer.write_bits(field(dr - dg, 8), 4)?;
                writer.write_bits(field(db - dg, 8), 4)?;
            }
            Record::Big(channel, d) => {
                let base = d[channel as usize];
                let [i, j] = channel.others();
                writer.write_bits(TAG_BIG, 2)?;
                writer.write_bits(channel.subtag(), 2)?;
                writer.write_bits(field(base, 128), 8)?;
                writer.write_bits(field(d[i] - base, 32), 6)?;
                writer.write_bits(field(d[j] - base, 32), 6)?;
            }
            Record::NewPixel(pixel) => {
                writer.write_bits(NEW_PIXEL, 8)?;
                for channel in pixel.channels() {
                    writer.write_byte(channel)?;
                }
            }
        }
        Ok(())
    }

    /// Read one record; `pixel` is its position, for error reporting.
    fn read(reader: &mut BitReader<'_>, pixel: usize) -> Result<Record> {
        let mut field = |count: usize, bias: i16| -> Result<i16> {
            Ok(reader.read_bits(count)? as i16 - bias)
        };

        match field(2, 0)? as u32 {
            TAG_SMALL => {
                let dr = field(2, 2)?;
                let dg = field(2, 2)?;
                let db = field(2, 2)?;
                Ok(Record::Small([dr, dg, db]))
            }
            TAG_INTERMEDIATE => {
                let dg = field(6, 32)?;
                let dr = field(4, 8)? + dg;
                let db = field(4, 8)? + dg;
                Ok(Record::Intermediate([dr, dg, db]))
            }
            TAG_BIG => {
                let subtag = field(2, 0)? as u32;
                let channel = Channel::from_subtag(subtag).ok_or(FormatError::InvalidDeltaTag {
                    subtag: subtag as u8,
                    pixel,
                })?;
                let base = field(8, 128)?;
                let [i, j] = channel.others();
                let mut d = [0i16; 3];
                d[channel as usize] = base;
                d[i] = field(6, 32)? + base;
                d[j] = field(6, 32)? + base;
                Ok(Record::Big(channel, d))
            }
            _ => {
                // Low six bits of the tag byte carry nothing
                field(6, 0)?;
                let r = field(8, 0)? as u8;
                let g = field(8, 0)? as u8;
                let b = field(8, 0)? as u8;
                Ok(Record::NewPixel(Pixel::new(r, g, b)))
            }
        }
    }

    /// Reconstruct the pixel this record describes after `previous`.
    fn apply(self, previous: Pixel, pixel: usize) -> Result<Pixel> {
        let d = match self {
            Record::NewPixel(p) => return Ok(p),
            Record::Small(d) | Record::Intermediate(d) | Record::Big(_, d) => d,
        };

        let mut channels = previous.channels();
        for (channel, diff) in channels.iter_mut().zip(d) {
            let value = *channel as i16 + diff;
            *channel = u8::try_from(value)
                .map_err(|_| FormatError::ChannelOutOfRange { pixel, value })?;
        }
        Ok(Pixel::from(channels))
    }
}

/// How many pixels used each record form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormCounts {
    pub small: usize,
    pub intermediate: usize,
    /// Indexed by base channel: red, green, blue
    pub big: [usize; 3],
    pub new_pixel: usize,
}

impl FormCounts {
    fn record(&mut self, form: DeltaForm) {
        match form {
            DeltaForm::Small => self.small += 1,
            DeltaForm::Intermediate => self.intermediate += 1,
            DeltaForm::Big(channel) => self.big[channel as usize] += 1,
            DeltaForm::NewPixel => self.new_pixel += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.small + self.intermediate + self.big.iter().sum::<usize>() + self.new_pixel
    }
}

/// Forms the encoder picks for `pixels`, in order.
pub fn forms(pixels: &[Pixel]) -> Vec<DeltaForm> {
    let mut previous = Pixel::BLACK;
    pixels
        .iter()
        .map(|&pixel| {
            let form = Record::choose(previous, pixel).form();
            previous = pixel;
            form
        })
        .collect()
}

/// Tally of the forms the encoder picks for `pixels`.
pub fn form_counts(pixels: &[Pixel]) -> FormCounts {
    let mut counts = FormCounts::default();
    for form in forms(pixels) {
        counts.record(form);
    }
    counts
}

/// Encode `grid` as a complete version 4 stream appended to `out`.
pub fn encode(grid: &Grid, out: &mut Vec<u8>) -> Result<()> {
    Header::new(Version::Delta, HEADER_LEN as u16, grid.width(), grid.height())?.write(out);

    let mut writer = BitWriter::with_capacity(grid.len() * 2);
    let mut counts = FormCounts::default();
    let mut previous = Pixel::BLACK;
    for &pixel in grid.pixels() {
        let record = Record::choose(previous, pixel);
        record.write(&mut writer)?;
        counts.record(record.form());
        previous = pixel;
    }

    let body = writer.finish();
    debug!(
        "delta encode: {} small, {} intermediate, {:?} big, {} new, {} body bytes",
        counts.small,
        counts.intermediate,
        counts.big,
        counts.new_pixel,
        body.len()
    );
    out.extend_from_slice(&body);
    Ok(())
}

/// Decode exactly `header.pixel_count()` pixels from `body`.
///
/// Bytes after the last record are ignored.
///
/// # Errors
/// - `FormatError::MissingPixels` if the stream ends early
/// - `FormatError::InvalidDeltaTag` for a big-difference subtag of 0b11
/// - `FormatError::ChannelOutOfRange` if a delta leaves 0..=255
pub fn decode(header: &Header, body: &[u8]) -> Result<Vec<Pixel>> {
    let expected = header.pixel_count();
    let mut reader = BitReader::new(body);
    // Every record is at least one byte, so the body bounds the pixel count
    let mut pixels = Vec::with_capacity(expected.min(body.len()));
    let mut previous = Pixel::BLACK;

    while pixels.len() < expected {
        let record = Record::read(&mut reader, pixels.len()).map_err(|err| match err {
            Error::BitIo(BitIoError::UnexpectedEof) => Error::from(FormatError::MissingPixels {
                expected,
                actual: pixels.len(),
            }),
            other => other,
        })?;
        previous = record.apply(previous, pixels.len())?;
        pixels.push(previous);
    }

    Ok(pixels)
}
