//! LZW dictionary coding over bytes.
//!
//! The dictionary is seeded with all 256 single-byte sequences at codes
//! `0..=255` and learns one new sequence per emitted code. The decoder rebuilds
//! the same dictionary from the code stream alone.
//!
//! Codes are persisted as 16-bit big-endian integers with no header, so a
//! session can reference at most 65536 dictionary entries. The dictionary is
//! never reset or pruned; a stream long and varied enough to need a code past
//! `u16::MAX` fails with [`Error::UnsupportedAlphabetSize`].

use crate::compression::{Compression, Result, StreamingCompression};
use crate::error::Error;
use log::debug;
use std::collections::HashMap;

/// Number of seeded single-byte entries.
pub const SEED_CODES: u32 = 256;

/// Largest code the 16-bit artifact format can carry.
pub const MAX_CODE: u32 = u16::MAX as u32;

/// Encoder-side dictionary.
///
/// A learned sequence is always a known sequence plus one byte, so entries are
/// keyed by `(prefix code, byte)` instead of storing whole sequences.
#[derive(Debug, Clone)]
pub struct LzwDictionary {
    codes: HashMap<(u32, u8), u32>,
    learned: Vec<(u32, u8)>,
}

impl Default for LzwDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl LzwDictionary {
    pub fn new() -> Self {
        Self {
            codes: HashMap::new(),
            learned: Vec::new(),
        }
    }

    /// Code of the sequence `prefix` followed by `byte`, if known.
    pub fn lookup(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.codes.get(&(prefix, byte)).copied()
    }

    /// Learns `prefix` followed by `byte` at the next free code.
    pub fn insert(&mut self, prefix: u32, byte: u8) -> u32 {
        let code = self.next_code();
        self.codes.insert((prefix, byte), code);
        self.learned.push((prefix, byte));
        code
    }

    /// Code the next learned sequence will receive.
    pub fn next_code(&self) -> u32 {
        SEED_CODES + self.learned.len() as u32
    }

    /// Total number of entries, seeds included.
    pub fn len(&self) -> usize {
        SEED_CODES as usize + self.learned.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The byte sequence stored under `code`.
    pub fn sequence(&self, code: u32) -> Option<Vec<u8>> {
        if code < SEED_CODES {
            return Some(vec![code as u8]);
        }
        let mut chain = Vec::new();
        let mut current = code;
        while current >= SEED_CODES {
            let &(prefix, byte) = self.learned.get((current - SEED_CODES) as usize)?;
            chain.push(byte);
            current = prefix;
        }
        chain.push(current as u8);
        chain.reverse();
        Some(chain)
    }

    /// Learned sequences in code order, starting at code 256.
    pub fn entries(&self) -> Vec<Vec<u8>> {
        let mut entries: Vec<Vec<u8>> = Vec::with_capacity(self.learned.len());
        for &(prefix, byte) in &self.learned {
            let mut entry = if prefix < SEED_CODES {
                vec![prefix as u8]
            } else {
                entries[(prefix - SEED_CODES) as usize].clone()
            };
            entry.push(byte);
            entries.push(entry);
        }
        entries
    }
}

/// Incremental LZW encoder.
///
/// Bytes may be fed in any number of chunks; the emitted codes are identical
/// to encoding the concatenated input in one call.
#[derive(Debug, Clone, Default)]
pub struct LzwEncoder {
    dictionary: LzwDictionary,
    pending: Option<u32>,
    codes: Vec<u16>,
}

impl LzwEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the current match by one byte, emitting a code on mismatch.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        match self.pending {
            None => self.pending = Some(u32::from(byte)),
            Some(prefix) => match self.dictionary.lookup(prefix, byte) {
                Some(code) => self.pending = Some(code),
                None => {
                    self.emit(prefix)?;
                    self.dictionary.insert(prefix, byte);
                    self.pending = Some(u32::from(byte));
                }
            },
        }
        Ok(())
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        bytes.iter().try_for_each(|&byte| self.push(byte))
    }

    /// Emits the code for the pending match, if any.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(prefix) = self.pending.take() {
            self.emit(prefix)?;
        }
        Ok(())
    }

    fn emit(&mut self, code: u32) -> Result<()> {
        let code = u16::try_from(code).map_err(|_| Error::UnsupportedAlphabetSize {
            code,
            max_code: MAX_CODE,
        })?;
        self.codes.push(code);
        Ok(())
    }

    /// Codes emitted and not yet taken.
    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    pub fn take_codes(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.codes)
    }

    pub fn dictionary(&self) -> &LzwDictionary {
        &self.dictionary
    }
}

impl StreamingCompression for LzwEncoder {
    /// Returns the artifact bytes for every code finalized by this chunk.
    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        self.extend(chunk)?;
        Ok(codes_to_bytes(&self.take_codes()))
    }

    /// Flushes the pending match and starts a fresh session.
    fn finish(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        let tail = codes_to_bytes(&self.take_codes());
        *self = Self::new();
        Ok(tail)
    }
}

/// Incremental LZW decoder, mirroring the encoder's dictionary growth.
#[derive(Debug, Clone, Default)]
pub struct LzwDecoder {
    learned: Vec<Vec<u8>>,
    previous: Option<Vec<u8>>,
}

impl LzwDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code the next learned sequence will receive.
    pub fn next_code(&self) -> u32 {
        SEED_CODES + self.learned.len() as u32
    }

    /// Learned sequences in code order, starting at code 256.
    pub fn dictionary_entries(&self) -> &[Vec<u8>] {
        &self.learned
    }

    /// Resolves one code and appends its bytes to `out`.
    pub fn push_code(&mut self, code: u16, out: &mut Vec<u8>) -> Result<()> {
        let code = u32::from(code);
        let next_code = self.next_code();
        let entry = match &self.previous {
            // The first code of a session can only name a seeded byte.
            None if code < SEED_CODES => vec![code as u8],
            None => {
                return Err(Error::InvalidCode {
                    code,
                    next_code: SEED_CODES,
                })
            }
            Some(_) if code < SEED_CODES => vec![code as u8],
            Some(_) if code < next_code => self.learned[(code - SEED_CODES) as usize].clone(),
            Some(previous) if code == next_code => {
                // Sequence not yet learned: previous + its own first byte.
                let mut entry = previous.clone();
                entry.push(previous[0]);
                entry
            }
            Some(_) => return Err(Error::InvalidCode { code, next_code }),
        };

        if let Some(mut learned) = self.previous.take() {
            learned.push(entry[0]);
            self.learned.push(learned);
        }
        out.extend_from_slice(&entry);
        self.previous = Some(entry);
        Ok(())
    }
}

/// Compresses the input data using the LZW algorithm.
///
/// Empty input produces an empty code sequence.
///
/// # Example
///
/// ```
/// use compresso::compression::lzw::encode;
///
/// let codes = encode(b"TOBEORNOTTOBE").unwrap();
/// assert!(!codes.is_empty());
/// ```
pub fn encode(input: &[u8]) -> Result<Vec<u16>> {
    let mut encoder = LzwEncoder::new();
    encoder.extend(input)?;
    encoder.flush()?;
    debug!(
        "lzw: encoded {} bytes into {} codes ({} dictionary entries)",
        input.len(),
        encoder.codes().len(),
        encoder.dictionary().len()
    );
    Ok(encoder.take_codes())
}

/// Decompresses a sequence of LZW codes back into the original bytes.
///
/// # Example
///
/// ```
/// use compresso::compression::lzw::{decode, encode};
///
/// let input = b"TOBEORNOTTOBE";
/// let codes = encode(input).unwrap();
/// assert_eq!(decode(&codes).unwrap(), input);
/// ```
pub fn decode(codes: &[u16]) -> Result<Vec<u8>> {
    let mut decoder = LzwDecoder::new();
    let mut out = Vec::new();
    for &code in codes {
        decoder.push_code(code, &mut out)?;
    }
    Ok(out)
}

/// Serializes codes as 2-byte big-endian integers.
pub fn codes_to_bytes(codes: &[u16]) -> Vec<u8> {
    codes.iter().flat_map(|code| code.to_be_bytes()).collect()
}

/// Parses 2-byte big-endian codes.
pub fn codes_from_bytes(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(Error::TruncatedStream {
            needed: 2,
            available: 1,
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode bytes straight to artifact bytes.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    Ok(codes_to_bytes(&encode(input)?))
}

/// Decode artifact bytes.
pub fn decompress(artifact: &[u8]) -> Result<Vec<u8>> {
    decode(&codes_from_bytes(artifact)?)
}

/// LZW-code the UTF-8 bytes of `text`.
pub fn compress_text(text: &str) -> Result<Vec<u8>> {
    compress(text.as_bytes())
}

/// Inverse of [`compress_text`].
pub fn decompress_text(artifact: &[u8]) -> Result<String> {
    String::from_utf8(decompress(artifact)?)
        .map_err(|e| Error::corrupt(format!("decoded bytes are not UTF-8: {}", e)))
}

/// Byte-oriented LZW codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzwCodec;

impl Compression for LzwCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress(data)
    }
}
