//! Huffman coding over an arbitrary discrete alphabet.
//!
//! The codec builds a frequency table, merges the two lightest nodes until a
//! single tree remains, and derives a prefix code by walking the tree
//! (left = `0`, right = `1`). Equal frequencies are merged in a fixed order so
//! that identical inputs always produce byte-identical artifacts.
//!
//! # Artifact layout
//!
//! ```text
//! [1 byte: padding count 0-7][pre-order tree][packed bits, zero padded]
//! ```
//!
//! Each tree node starts with a tag byte: `0x00` for an internal node
//! (followed by its left then right subtree) or `0x01` for a leaf (followed by
//! the symbol's fixed-width big-endian encoding).

use crate::compression::bitstream::BitStream;
use crate::compression::{Compression, Result};
use crate::error::Error;
use bitvec::prelude::*;
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

const TAG_INTERNAL: u8 = 0x00;
const TAG_LEAF: u8 = 0x01;

/// Deepest tree accepted when reading an artifact. A tree of depth `d` needs a
/// total frequency of at least Fib(d + 1), so no `usize` frequency table can
/// produce anything close to this.
const MAX_TREE_DEPTH: usize = 128;

/// A unit of data that can be Huffman coded and stored in an artifact.
pub trait Symbol: Copy + Eq + Hash + Ord + Debug {
    /// Number of bytes used to store one symbol in the serialized tree.
    const WIDTH: usize;

    /// Appends the big-endian encoding of the symbol.
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Reads a symbol from exactly `WIDTH` bytes.
    fn read_bytes(bytes: &[u8]) -> Result<Self>;
}

impl Symbol for u8 {
    const WIDTH: usize = 1;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }

    fn read_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bytes[0])
    }
}

impl Symbol for char {
    const WIDTH: usize = 4;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&u32::from(*self).to_be_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        char::from_u32(raw)
            .ok_or_else(|| Error::corrupt(format!("{:#x} is not a unicode scalar value", raw)))
    }
}

/// Occurrence count of every distinct symbol in one coding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S: Symbol> {
    counts: HashMap<S, usize>,
}

impl<S: Symbol> FrequencyTable<S> {
    /// Counts symbols in a single pass.
    pub fn from_symbols(symbols: &[S]) -> Self {
        let mut counts = HashMap::new();
        for &symbol in symbols {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Occurrences of `symbol`, zero when absent.
    pub fn count(&self, symbol: &S) -> usize {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the length of the counted input.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &usize)> {
        self.counts.iter()
    }
}

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone)]
pub enum HuffmanNode<S> {
    /// A leaf node contains a symbol and its frequency.
    Leaf { symbol: S, freq: usize },
    /// An internal node with left and right children and combined frequency.
    Internal {
        freq: usize,
        left: Box<HuffmanNode<S>>,
        right: Box<HuffmanNode<S>>,
    },
}

impl<S> HuffmanNode<S> {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            HuffmanNode::Leaf { .. } => 1,
            HuffmanNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffmanNode::Leaf { .. } => 0,
            HuffmanNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Nodes compare by shape and symbols. Frequencies are construction metadata
/// and are not stored in artifacts, so a decoded tree compares equal to the
/// tree that produced it.
impl<S: PartialEq> PartialEq for HuffmanNode<S> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf { symbol: s1, .. }, Self::Leaf { symbol: s2, .. }) => s1 == s2,
            (
                Self::Internal {
                    left: left1,
                    right: right1,
                    ..
                },
                Self::Internal {
                    left: left2,
                    right: right2,
                    ..
                },
            ) => left1 == left2 && right1 == right2,
            _ => false,
        }
    }
}

impl<S: Eq> Eq for HuffmanNode<S> {}

/// A complete Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree<S> {
    root: HuffmanNode<S>,
}

impl<S: Symbol> HuffmanTree<S> {
    pub fn root(&self) -> &HuffmanNode<S> {
        &self.root
    }

    /// Number of distinct symbols the tree can code.
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Appends the pre-order serialization of the tree.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        fn walk<S: Symbol>(node: &HuffmanNode<S>, out: &mut Vec<u8>) {
            match node {
                HuffmanNode::Leaf { symbol, .. } => {
                    out.push(TAG_LEAF);
                    symbol.write_bytes(out);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    out.push(TAG_INTERNAL);
                    walk(left, out);
                    walk(right, out);
                }
            }
        }
        walk(&self.root, out);
    }

    /// Reads a tree written by [`HuffmanTree::write_to`] from the front of
    /// `bytes`, returning it with the number of bytes consumed.
    pub fn read_from(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut pos = 0;
        let mut seen = HashSet::new();
        let root = read_node(bytes, &mut pos, 0, &mut seen)?;
        Ok((Self { root }, pos))
    }
}

fn read_node<S: Symbol>(
    bytes: &[u8],
    pos: &mut usize,
    depth: usize,
    seen: &mut HashSet<S>,
) -> Result<HuffmanNode<S>> {
    if depth > MAX_TREE_DEPTH {
        return Err(Error::corrupt(format!(
            "tree is nested deeper than {} levels",
            MAX_TREE_DEPTH
        )));
    }
    let tag = *bytes.get(*pos).ok_or(Error::TruncatedStream {
        needed: 1,
        available: 0,
    })?;
    *pos += 1;
    match tag {
        TAG_LEAF => {
            let available = bytes.len() - *pos;
            if available < S::WIDTH {
                return Err(Error::TruncatedStream {
                    needed: S::WIDTH,
                    available,
                });
            }
            let symbol = S::read_bytes(&bytes[*pos..*pos + S::WIDTH])?;
            *pos += S::WIDTH;
            if !seen.insert(symbol) {
                return Err(Error::corrupt(format!(
                    "symbol {:?} appears in more than one leaf",
                    symbol
                )));
            }
            Ok(HuffmanNode::Leaf { symbol, freq: 0 })
        }
        TAG_INTERNAL => {
            let left = read_node(bytes, pos, depth + 1, seen)?;
            let right = read_node(bytes, pos, depth + 1, seen)?;
            Ok(HuffmanNode::Internal {
                freq: 0,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        other => Err(Error::corrupt(format!("unknown tree node tag {:#04x}", other))),
    }
}

/// Heap entry ordering nodes by ascending frequency, then by arrival order.
struct QueuedNode<S> {
    freq: usize,
    arrival: usize,
    node: HuffmanNode<S>,
}

impl<S> PartialEq for QueuedNode<S> {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.arrival == other.arrival
    }
}

impl<S> Eq for QueuedNode<S> {}

impl<S> Ord for QueuedNode<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower frequency, then earlier arrival, should come first.
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.arrival.cmp(&self.arrival))
    }
}

impl<S> PartialOrd for QueuedNode<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build a frequency table mapping each symbol in `symbols` to its frequency.
pub fn build_frequency_table<S: Symbol>(symbols: &[S]) -> FrequencyTable<S> {
    FrequencyTable::from_symbols(symbols)
}

/// Build the Huffman tree given a frequency table.
///
/// Leaves enter the queue sorted by `(frequency, symbol)`, and each merged
/// node arrives after every node already queued; the earlier of two equal
/// weights is always taken first and becomes the left child.
///
/// A table with one distinct symbol yields a lone leaf, which is assigned the
/// one-bit code `0`.
pub fn build_huffman_tree<S: Symbol>(table: &FrequencyTable<S>) -> Result<HuffmanTree<S>> {
    let mut leaves: Vec<(S, usize)> = table.iter().map(|(&s, &f)| (s, f)).collect();
    leaves.sort_unstable_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut heap = BinaryHeap::with_capacity(leaves.len());
    let mut arrival = 0;
    for (symbol, freq) in leaves {
        heap.push(QueuedNode {
            freq,
            arrival,
            node: HuffmanNode::Leaf { symbol, freq },
        });
        arrival += 1;
    }

    // Combine nodes until only one tree remains.
    loop {
        let first = heap.pop().ok_or(Error::EmptyInput)?;
        let second = match heap.pop() {
            Some(second) => second,
            None => return Ok(HuffmanTree { root: first.node }),
        };
        let freq = first.freq + second.freq;
        heap.push(QueuedNode {
            freq,
            arrival,
            node: HuffmanNode::Internal {
                freq,
                left: Box::new(first.node),
                right: Box::new(second.node),
            },
        });
        arrival += 1;
    }
}

/// Mapping from symbol to its variable-length code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBook<S: Symbol> {
    codes: HashMap<S, BitVec<u8, Msb0>>,
}

impl<S: Symbol> CodeBook<S> {
    pub fn get(&self, symbol: &S) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(symbol).map(|code| code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &BitSlice<u8, Msb0>)> {
        self.codes.iter().map(|(s, code)| (s, code.as_bitslice()))
    }

    /// Checks that no code is a prefix of another.
    ///
    /// After a lexicographic sort, a code that prefixes any later code also
    /// prefixes its immediate successor, so adjacent pairs suffice.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&BitSlice<u8, Msb0>> =
            self.codes.values().map(|c| c.as_bitslice()).collect();
        codes.sort();
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

/// Walk the tree and record the path to every leaf.
///
/// If the tree consists of a single leaf (i.e. one unique symbol), the code "0" is assigned.
pub fn generate_codes<S: Symbol>(tree: &HuffmanTree<S>) -> CodeBook<S> {
    let mut codes = HashMap::new();
    let mut prefix = BitVec::new();
    generate_codes_helper(&tree.root, &mut prefix, &mut codes);
    CodeBook { codes }
}

fn generate_codes_helper<S: Symbol>(
    node: &HuffmanNode<S>,
    prefix: &mut BitVec<u8, Msb0>,
    codes: &mut HashMap<S, BitVec<u8, Msb0>>,
) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                prefix.clone()
            };
            codes.insert(*symbol, code);
        }
        HuffmanNode::Internal { left, right, .. } => {
            prefix.push(false);
            generate_codes_helper(left, prefix, codes);
            prefix.pop();
            prefix.push(true);
            generate_codes_helper(right, prefix, codes);
            prefix.pop();
        }
    }
}

/// Output of [`encode`]: the coded bits together with the tree needed to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanEncoded<S: Symbol> {
    pub bits: BitVec<u8, Msb0>,
    pub tree: HuffmanTree<S>,
}

impl<S: Symbol> HuffmanEncoded<S> {
    /// Decodes the bits with the bundled tree.
    pub fn decode(&self) -> Result<Vec<S>> {
        decode(&self.bits, &self.tree)
    }

    /// Serializes as `[padding][tree][packed bits]`.
    pub fn to_artifact(&self) -> Vec<u8> {
        let (packed, padding) = BitStream::from(self.bits.clone()).to_padded_bytes();
        let mut out = Vec::with_capacity(1 + packed.len() + self.tree.leaf_count() * 2);
        out.push(padding);
        self.tree.write_to(&mut out);
        out.extend_from_slice(&packed);
        out
    }

    /// Parses an artifact written by [`HuffmanEncoded::to_artifact`].
    pub fn from_artifact(bytes: &[u8]) -> Result<Self> {
        let (&padding, rest) = bytes.split_first().ok_or(Error::TruncatedStream {
            needed: 1,
            available: 0,
        })?;
        let (tree, consumed) = HuffmanTree::read_from(rest)?;
        let payload = &rest[consumed..];
        if payload.is_empty() {
            return Err(Error::TruncatedStream {
                needed: 1,
                available: 0,
            });
        }
        let bits = BitStream::from_bytes(payload, padding)?.into_bitvec();
        Ok(Self { bits, tree })
    }
}

/// Encode `symbols`, returning the coded bits and the tree that produced them.
pub fn encode<S: Symbol>(symbols: &[S]) -> Result<HuffmanEncoded<S>> {
    if symbols.is_empty() {
        return Err(Error::EmptyInput);
    }
    let table = build_frequency_table(symbols);
    let tree = build_huffman_tree(&table)?;
    let book = generate_codes(&tree);

    let mut stream = BitStream::with_capacity(symbols.len());
    for symbol in symbols {
        let code = book.get(symbol).ok_or_else(|| {
            Error::invalid_input(format!("symbol {:?} has no code", symbol))
        })?;
        stream.append_bits(code);
    }
    debug!(
        "huffman: encoded {} symbols ({} distinct, depth {}) into {} bits",
        symbols.len(),
        table.len(),
        tree.depth(),
        stream.len()
    );
    Ok(HuffmanEncoded {
        bits: stream.into_bitvec(),
        tree,
    })
}

/// Decode an encoded bit sequence using the Huffman tree.
/// Traverses the tree according to each bit until a leaf is reached.
///
/// Fails with `CorruptStream` if the bits run out part way down the tree.
pub fn decode<S: Symbol>(bits: &BitSlice<u8, Msb0>, tree: &HuffmanTree<S>) -> Result<Vec<S>> {
    let root = &tree.root;

    // Special case: if tree is a leaf, each '0' represents one occurrence
    if let HuffmanNode::Leaf { symbol, .. } = root {
        if let Some(pos) = bits.first_one() {
            return Err(Error::corrupt(format!(
                "bit {} is set but the tree has a single leaf",
                pos
            )));
        }
        return Ok(vec![*symbol; bits.len()]);
    }

    let mut decoded = Vec::new();
    let mut current = root;
    for bit in bits.iter().by_vals() {
        if let HuffmanNode::Internal { left, right, .. } = current {
            current = if bit { &**right } else { &**left };
        }
        if let HuffmanNode::Leaf { symbol, .. } = current {
            decoded.push(*symbol);
            current = root;
        }
    }

    if !std::ptr::eq(current, root) {
        return Err(Error::corrupt(
            "bit sequence ended before reaching a leaf",
        ));
    }
    trace!("huffman: decoded {} bits into {} symbols", bits.len(), decoded.len());
    Ok(decoded)
}

/// Encode `symbols` straight to artifact bytes.
pub fn compress<S: Symbol>(symbols: &[S]) -> Result<Vec<u8>> {
    let artifact = encode(symbols)?.to_artifact();
    debug!(
        "huffman: {} symbols -> {} artifact bytes",
        symbols.len(),
        artifact.len()
    );
    Ok(artifact)
}

/// Decode artifact bytes back into symbols.
pub fn decompress<S: Symbol>(artifact: &[u8]) -> Result<Vec<S>> {
    HuffmanEncoded::<S>::from_artifact(artifact)?.decode()
}

/// Huffman-code text, one symbol per `char`.
pub fn compress_text(text: &str) -> Result<Vec<u8>> {
    let symbols: Vec<char> = text.chars().collect();
    compress(&symbols)
}

/// Inverse of [`compress_text`].
pub fn decompress_text(artifact: &[u8]) -> Result<String> {
    Ok(decompress::<char>(artifact)?.into_iter().collect())
}

/// Byte-oriented Huffman codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffmanCodec;

impl Compression for HuffmanCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress(data)
    }
}
