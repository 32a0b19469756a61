//! Bit-level I/O for sub-byte ULBMP fields.
//!
//! Palette indices (v3) and delta records (v4) are packed most-significant-bit
//! first, and a field may straddle a byte boundary. `BitWriter` and `BitReader`
//! do that packing with shift/mask arithmetic.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with trailing zeros
//! - BitReader: cannot tell padding from data (caller must track pixel count)
//!
//! # Example
//! ```
//! use ulbmp_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b01, 2).unwrap(); // tag
//! writer.write_bits(0b100000, 6).unwrap(); // biased green delta
//! writer.write_bits(0b1000, 4).unwrap();
//! writer.write_bits(0b1000, 4).unwrap();
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b0110_0000, 0b1000_1000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b01);
//! assert_eq!(reader.read_bits(6).unwrap(), 32);
//! ```

use crate::error::{BitIoError, Result};

/// Widest single field the codec ever reads or writes.
const MAX_FIELD_BITS: usize = 32;

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8
/// - unused low bits of `bit_buffer` are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose output starts with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Write the lowest `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 32.
    pub fn write_bits(&mut self, value: u32, count: usize) -> Result<()> {
        if count > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.bit_count as usize;
            let take = remaining.min(free);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u32 << take) - 1)) as u8;

            self.bit_buffer |= bits << (free - take);
            self.bit_count += take as u8;

            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }
            remaining -= take;
        }

        Ok(())
    }

    /// Write a whole byte. Fast path when the writer is byte-aligned.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.bit_count == 0 {
            self.bytes.push(byte);
            Ok(())
        } else {
            self.write_bits(byte as u32, 8)
        }
    }

    /// Whether the next bit starts a fresh byte.
    pub fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Finish writing and return the output bytes, zero-padding the last one.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        self.bytes
    }

    /// Return the number of complete bytes written so far.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read `count` bits (at most 32), most significant first.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 32
    /// - `BitIoError::UnexpectedEof` if not enough bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u32> {
        if count > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut result = 0u32;
        let mut remaining = count;
        while remaining > 0 {
            let byte = self.data[self.bit_position / 8];
            let available = 8 - self.bit_position % 8;
            let take = remaining.min(available);
            let bits = (byte >> (available - take)) & ((1u16 << take) - 1) as u8;

            result = (result << take) | bits as u32;
            self.bit_position += take;
            remaining -= take;
        }

        Ok(result)
    }

    /// Read the next 8 bits as a byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }

    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_write_read_single_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b10110011, 8).unwrap();

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b10110011]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(8).unwrap(), 0b10110011);
    }

    #[test]
    fn test_two_bit_fields_fill_one_byte() {
        let mut writer = BitWriter::new();
        for field in [0b00, 0b11, 0b01, 0b10] {
            writer.write_bits(field, 2).unwrap();
        }
        assert!(writer.is_aligned());

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b0011_0110]);
    }

    #[test]
    fn test_padding() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(0b1, 1).unwrap();

        assert_eq!(writer.bit_len(), 2);
        assert_eq!(writer.finish(), vec![0b1100_0000]);
    }

    #[test]
    fn test_field_straddles_byte_boundary() {
        // 4-bit prefix followed by an 8-bit field, as in a big-difference record
        let mut writer = BitWriter::new();
        writer.write_bits(0b1001, 4).unwrap();
        writer.write_bits(0xAB, 8).unwrap();
        writer.write_bits(0b0101, 4).unwrap();

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1001_1010, 0b1011_0101]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1001);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0101);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_write_byte_unaligned() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1111, 4).unwrap();
        writer.write_byte(0x00).unwrap();
        writer.write_bits(0b1111, 4).unwrap();

        assert_eq!(writer.byte_len(), 2);
        assert_eq!(writer.finish(), vec![0xF0, 0x0F]);
    }

    #[test]
    fn test_read_past_end() {
        let data = vec![0b10101010];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(6).unwrap(), 0b101010);
        assert!(matches!(
            reader.read_bits(3),
            Err(Error::BitIo(BitIoError::UnexpectedEof))
        ));
        // A failed read consumes nothing
        assert_eq!(reader.bits_remaining(), 2);
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new();
        assert!(matches!(
            writer.write_bits(0, 33),
            Err(Error::BitIo(BitIoError::InvalidBitCount(33)))
        ));

        let mut reader = BitReader::new(&[0u8; 8]);
        assert!(reader.read_bits(40).is_err());
    }

    #[test]
    fn test_zero_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        assert!(writer.finish().is_empty());

        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_bits_remaining() {
        let data = vec![0xFF, 0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.bits_remaining(), 16);
        reader.read_bits(5).unwrap();
        assert_eq!(reader.bits_remaining(), 11);
        reader.read_byte().unwrap();
        assert_eq!(reader.bits_remaining(), 3);
        reader.read_bits(3).unwrap();
        assert!(reader.is_empty());
    }
}
