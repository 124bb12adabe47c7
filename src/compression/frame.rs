//! Block-transform compression of a single raster frame.
//!
//! A frame is an interleaved buffer of 8-bit samples (`height x width x
//! channels`). Every complete `block_size x block_size` block of every channel
//! is run through the DCT filter. Trailing rows and columns that do not fill a
//! whole block are copied through untouched and stay lossless.
//!
//! The filter does not shrink the buffer, so size statistics are reported in
//! bits for the conceptual symbol stream: the original is 8 bits per sample,
//! the compressed size is what a per-channel Huffman code of the
//! reconstructed samples would take (tree overhead excluded).

use crate::compression::dct::BlockTransform;
use crate::compression::huffman::{build_frequency_table, build_huffman_tree, generate_codes};
use crate::compression::Result;
use crate::error::Error;
use log::debug;
use ndarray::{s, Array3, ArrayView2, ArrayView3, Axis};

/// Parameters of the block filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCodecConfig {
    /// Edge length of the square blocks
    pub block_size: usize,
    /// Coefficients with magnitude strictly below this are zeroed
    pub threshold: f64,
}

impl Default for FrameCodecConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            threshold: 10.0,
        }
    }
}

impl FrameCodecConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::invalid_input("block size must be positive"));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::invalid_input(format!(
                "threshold must be a finite non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Unit of a [`CompressionStats`] measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bits,
    Bytes,
}

/// Original and compressed size of one operation, in a single unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStats {
    original_size: u64,
    compressed_size: u64,
    unit: SizeUnit,
    ratio: f64,
}

impl CompressionStats {
    /// `ratio` is `compressed / original`, or 0 when the original is empty.
    pub fn new(original_size: u64, compressed_size: u64, unit: SizeUnit) -> Self {
        let ratio = if original_size > 0 {
            compressed_size as f64 / original_size as f64
        } else {
            0.0
        };
        Self {
            original_size,
            compressed_size,
            unit,
            ratio,
        }
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

/// Raster frame of interleaved 8-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Array3<u8>,
}

impl Frame {
    /// Wraps `data` laid out row by row with channels interleaved.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if channels == 0 {
            return Err(Error::invalid_input("a frame needs at least one channel"));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::invalid_input(format!(
                "{}x{}x{} frame needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                data.len()
            )));
        }
        let samples = Array3::from_shape_vec((height, width, channels), data)
            .map_err(|e| Error::invalid_input(e.to_string()))?;
        Ok(Self { samples })
    }

    /// Wraps an array shaped `(height, width, channels)`.
    pub fn from_array(samples: Array3<u8>) -> Result<Self> {
        if samples.dim().2 == 0 {
            return Err(Error::invalid_input("a frame needs at least one channel"));
        }
        Ok(Self { samples })
    }

    pub fn width(&self) -> usize {
        self.samples.dim().1
    }

    pub fn height(&self) -> usize {
        self.samples.dim().0
    }

    pub fn channels(&self) -> usize {
        self.samples.dim().2
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// One channel as a `(height, width)` view.
    pub fn channel(&self, channel: usize) -> Option<ArrayView2<'_, u8>> {
        (channel < self.channels()).then(|| self.samples.index_axis(Axis(2), channel))
    }

    pub fn as_array(&self) -> ArrayView3<'_, u8> {
        self.samples.view()
    }

    /// Interleaved samples in row-major order.
    pub fn to_raw(&self) -> Vec<u8> {
        self.samples.iter().copied().collect()
    }
}

/// Statistics for one compressed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Conceptual symbol-stream sizes, in bits
    pub compression: CompressionStats,
    /// Complete blocks filtered across all channels
    pub blocks_processed: usize,
    /// Coefficients in all filtered blocks
    pub coefficients_total: usize,
    /// Coefficients zeroed by thresholding
    pub coefficients_zeroed: usize,
}

/// Reconstructed frame plus its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedFrame {
    pub frame: Frame,
    pub stats: FrameStats,
}

/// Applies the block filter to every complete block of every channel.
pub fn compress_frame(frame: &Frame, config: &FrameCodecConfig) -> Result<CompressedFrame> {
    config.validate()?;
    let transform = BlockTransform::new(config.block_size)?;
    let n = config.block_size;
    let (height, width, channels) = frame.samples.dim();
    let (block_rows, block_cols) = (height / n, width / n);

    let mut restored = frame.samples.clone();
    let mut coefficients_zeroed = 0;
    for channel in 0..channels {
        let source = frame.samples.index_axis(Axis(2), channel);
        let mut target = restored.index_axis_mut(Axis(2), channel);
        for br in 0..block_rows {
            for bc in 0..block_cols {
                let (rows, cols) = (br * n..(br + 1) * n, bc * n..(bc + 1) * n);
                coefficients_zeroed += transform.filter_block(
                    &source.slice(s![rows.clone(), cols.clone()]),
                    config.threshold,
                    target.slice_mut(s![rows, cols]),
                )?;
            }
        }
    }

    let blocks_processed = block_rows * block_cols * channels;
    let compression = CompressionStats::new(
        frame.sample_count() as u64 * 8,
        huffman_bits(&restored)?,
        SizeUnit::Bits,
    );
    debug!(
        "frame: {}x{}x{} filtered {} blocks, zeroed {} coefficients, ratio {:.4}",
        width,
        height,
        channels,
        blocks_processed,
        coefficients_zeroed,
        compression.ratio()
    );
    Ok(CompressedFrame {
        frame: Frame { samples: restored },
        stats: FrameStats {
            compression,
            blocks_processed,
            coefficients_total: blocks_processed * n * n,
            coefficients_zeroed,
        },
    })
}

/// Size of a lossless per-channel Huffman coding of `frame`, in bits.
pub fn channel_huffman_stats(frame: &Frame) -> Result<CompressionStats> {
    Ok(CompressionStats::new(
        frame.sample_count() as u64 * 8,
        huffman_bits(&frame.samples)?,
        SizeUnit::Bits,
    ))
}

fn huffman_bits(samples: &Array3<u8>) -> Result<u64> {
    let mut total = 0u64;
    for channel in samples.axis_iter(Axis(2)) {
        let values: Vec<u8> = channel.iter().copied().collect();
        if values.is_empty() {
            continue;
        }
        let table = build_frequency_table(&values);
        let book = generate_codes(&build_huffman_tree(&table)?);
        for (symbol, &count) in table.iter() {
            let length = book.get(symbol).map_or(0, |code| code.len());
            total += (count * length) as u64;
        }
    }
    Ok(total)
}
