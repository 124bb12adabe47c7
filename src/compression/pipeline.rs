//! Block-transform compression over a sequence of frames.
//!
//! Frames are independent: there is no inter-frame prediction and no state
//! carried from one frame to the next. Output order always matches input
//! order. With the `parallel` feature, frames are filtered on the rayon pool
//! and collected back by index.

use crate::compression::frame::{
    compress_frame, CompressedFrame, CompressionStats, Frame, FrameCodecConfig, SizeUnit,
};
use crate::compression::Result;
use crate::error::Error;
use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Container-level details supplied by whatever extracted the frames.
///
/// The pipeline never interprets these; they are echoed in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamMetadata {
    /// Frames per second of the source, if known
    pub frame_rate: Option<f64>,
    /// Frame count reported by the source, if known
    pub frame_count: Option<usize>,
}

/// Result of compressing a whole frame sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Compressed frames in input order
    pub frames: Vec<CompressedFrame>,
    /// Sum of the per-frame statistics, in bits
    pub stats: CompressionStats,
    pub metadata: StreamMetadata,
}

impl PipelineOutput {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Applies the block filter to frames one at a time.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    config: FrameCodecConfig,
    metadata: StreamMetadata,
}

impl FramePipeline {
    pub fn new(config: FrameCodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metadata: StreamMetadata::default(),
        })
    }

    pub fn with_metadata(mut self, metadata: StreamMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn config(&self) -> &FrameCodecConfig {
        &self.config
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    /// Compresses a single image.
    pub fn compress_frame(&self, frame: &Frame) -> Result<CompressedFrame> {
        compress_frame(frame, &self.config)
    }

    /// Lazily compresses frames as they are pulled, in input order.
    pub fn compress_stream<'a, I>(
        &'a self,
        frames: I,
    ) -> impl Iterator<Item = Result<CompressedFrame>> + 'a
    where
        I: IntoIterator<Item = Frame>,
        I::IntoIter: 'a,
    {
        frames
            .into_iter()
            .map(move |frame| compress_frame(&frame, &self.config))
    }

    /// Compresses every frame and aggregates the statistics.
    ///
    /// Fails with `EmptyInput` when no frames are supplied, and with the first
    /// frame error otherwise.
    pub fn compress_frames<I>(&self, frames: I) -> Result<PipelineOutput>
    where
        I: IntoIterator<Item = Frame>,
    {
        let frames: Vec<Frame> = frames.into_iter().collect();
        if frames.is_empty() {
            return Err(Error::EmptyInput);
        }
        if let Some(expected) = self.metadata.frame_count {
            if expected != frames.len() {
                warn!(
                    "pipeline: source reported {} frames, received {}",
                    expected,
                    frames.len()
                );
            }
        }

        let compressed = self.compress_all(&frames)?;

        let (original, packed) = compressed.iter().fold((0u64, 0u64), |(o, c), frame| {
            (
                o + frame.stats.compression.original_size(),
                c + frame.stats.compression.compressed_size(),
            )
        });
        let stats = CompressionStats::new(original, packed, SizeUnit::Bits);
        debug!(
            "pipeline: compressed {} frames, {} -> {} bits (ratio {:.4})",
            compressed.len(),
            original,
            packed,
            stats.ratio()
        );
        Ok(PipelineOutput {
            frames: compressed,
            stats,
            metadata: self.metadata,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn compress_all(&self, frames: &[Frame]) -> Result<Vec<CompressedFrame>> {
        frames
            .iter()
            .map(|frame| compress_frame(frame, &self.config))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compress_all(&self, frames: &[Frame]) -> Result<Vec<CompressedFrame>> {
        frames
            .par_iter()
            .map(|frame| compress_frame(frame, &self.config))
            .collect()
    }
}
