//! In-memory bit accumulation with byte-aligned flush and padding.
//!
//! Bits are stored most-significant-bit first, so the first bit appended ends
//! up in the high bit of the first byte. This matches the big-endian packing
//! used by the Huffman artifact.

use crate::compression::Result;
use crate::error::Error;
use bitvec::prelude::*;

/// Growable sequence of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    bits: BitVec<u8, Msb0>,
}

impl BitStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stream with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Appends a single bit.
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends a sequence of bits in order.
    pub fn append_bits(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Number of bits in the stream, padding excluded.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    pub fn into_bitvec(self) -> BitVec<u8, Msb0> {
        self.bits
    }

    /// Packs the bits into bytes, padding the tail with `0` bits up to the
    /// next byte boundary.
    ///
    /// Returns the bytes and the number of padding bits added (0 to 7).
    pub fn to_padded_bytes(&self) -> (Vec<u8>, u8) {
        let padding = (8 - self.bits.len() % 8) % 8;
        let mut packed = self.bits.clone();
        packed.resize(self.bits.len() + padding, false);
        (packed.into_vec(), padding as u8)
    }

    /// Unpacks bytes produced by [`BitStream::to_padded_bytes`], dropping the
    /// trailing `padding` bits.
    pub fn from_bytes(bytes: &[u8], padding: u8) -> Result<Self> {
        if padding > 7 {
            return Err(Error::corrupt(format!(
                "padding count {} is outside 0..=7",
                padding
            )));
        }
        let total = bytes.len() * 8;
        let padding = padding as usize;
        if padding > total {
            return Err(Error::TruncatedStream {
                needed: padding,
                available: total,
            });
        }
        let mut bits = BitVec::<u8, Msb0>::from_slice(bytes);
        bits.truncate(total - padding);
        Ok(Self { bits })
    }

    /// Returns a cursor reading the stream from the first bit.
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.bits)
    }
}

impl From<BitVec<u8, Msb0>> for BitStream {
    fn from(bits: BitVec<u8, Msb0>) -> Self {
        Self { bits }
    }
}

/// Sequential reader over a bit slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, pos: 0 }
    }

    /// Bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Reads one bit, failing with `TruncatedStream` past the end.
    pub fn read_bit(&mut self) -> Result<bool> {
        match self.bits.get(self.pos) {
            Some(bit) => {
                self.pos += 1;
                Ok(*bit)
            }
            None => Err(Error::TruncatedStream {
                needed: 1,
                available: 0,
            }),
        }
    }

    /// Reads `count` bits (at most 64) as a big-endian unsigned value.
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(Error::invalid_input(format!(
                "cannot read {} bits into a u64",
                count
            )));
        }
        if count > self.remaining() {
            return Err(Error::TruncatedStream {
                needed: count,
                available: self.remaining(),
            });
        }
        let value = self.bits[self.pos..self.pos + count]
            .iter()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(*bit));
        self.pos += count;
        Ok(value)
    }
}
