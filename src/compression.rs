//! Compression algorithms implementation.
//!
//! This module provides the codecs and the frame pipeline built on them:
//! - Bit-level buffering (`bitstream`)
//! - Lossless entropy coding (Huffman)
//! - Lossless dictionary coding (LZW)
//! - Lossy block-transform filtering (DCT with coefficient thresholding)
//! - Whole-frame and multi-frame orchestration of the block transform
//!
//! # Examples
//!
//! ```rust
//! use compresso::compression::{Compression, huffman::HuffmanCodec, lzw::LzwCodec};
//!
//! let data = b"abracadabra abracadabra";
//! for codec in [&HuffmanCodec as &dyn Compression, &LzwCodec] {
//!     let packed = codec.compress(data).unwrap();
//!     assert_eq!(codec.decompress(&packed).unwrap(), data);
//! }
//! ```

pub use crate::error::Result;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Trait for streaming compression algorithms
pub trait StreamingCompression {
    /// Process a chunk of input data
    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>>;

    /// Finish processing and return any remaining data
    fn finish(&mut self) -> Result<Vec<u8>>;
}

pub mod bitstream;
pub use bitstream::{BitReader, BitStream};

pub mod huffman;
pub use huffman::{
    build_frequency_table, build_huffman_tree, generate_codes, CodeBook, FrequencyTable,
    HuffmanCodec, HuffmanEncoded, HuffmanTree, Symbol,
};

pub mod lzw;
pub use lzw::{LzwCodec, LzwDecoder, LzwDictionary, LzwEncoder};

pub mod dct;
pub use dct::{BlockCoefficients, BlockTransform};

pub mod frame;
pub use frame::{
    channel_huffman_stats, compress_frame, CompressedFrame, CompressionStats, Frame,
    FrameCodecConfig, FrameStats, SizeUnit,
};

pub mod pipeline;
pub use pipeline::{FramePipeline, PipelineOutput, StreamMetadata};
