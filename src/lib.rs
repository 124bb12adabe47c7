//! Small family of codecs: canonical Huffman coding, LZW dictionary coding,
//! and a block-DCT quantization filter for raster frames.
//!
//! The Huffman and LZW codecs are lossless and produce compact artifacts.
//! The block transform path is a lossy spatial-domain filter: it returns a
//! reconstructed frame together with size statistics rather than a bitstream.
//!
//! # Examples
//!
//! ```rust
//! use compresso::compression::{huffman, lzw};
//!
//! let artifact = huffman::compress_text("aaaabbbccd").unwrap();
//! assert_eq!(huffman::decompress_text(&artifact).unwrap(), "aaaabbbccd");
//!
//! let artifact = lzw::compress_text("TOBEORNOTTOBEORTOBEORNOT").unwrap();
//! assert_eq!(lzw::decompress_text(&artifact).unwrap(), "TOBEORNOTTOBEORTOBEORNOT");
//! ```

pub mod compression;
pub mod error;

pub use compression::{
    bitstream, dct, frame, huffman, lzw, pipeline, Compression, StreamingCompression,
};
pub use error::{Error, Result};
