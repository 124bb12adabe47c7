//! Block Discrete Cosine Transform with coefficient thresholding.
//!
//! The transform is the orthonormal 2-D DCT-II over an `N x N` block, computed
//! separably as `C * X * C^T` with a precomputed basis matrix `C`. Because `C`
//! is orthogonal the inverse is simply `C^T * Y * C`, so a block survives a
//! forward/inverse round trip unchanged up to floating point error.
//!
//! Thresholding zeroes every coefficient whose magnitude is strictly below the
//! limit. It is the only lossy step; the result is a filtered block of the same
//! size, not a smaller bitstream.

use crate::compression::Result;
use crate::error::Error;
use log::trace;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Zip};
use std::f64::consts::PI;

/// Transform-domain values of one block of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCoefficients(Array2<f64>);

impl BlockCoefficients {
    pub fn new(values: Array2<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.0
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.0
    }

    /// Zeroes every coefficient with `|c| < limit`.
    ///
    /// Returns how many coefficients fell below the limit.
    pub fn threshold(&mut self, limit: f64) -> usize {
        let mut zeroed = 0;
        self.0.mapv_inplace(|c| {
            if c.abs() < limit {
                zeroed += 1;
                0.0
            } else {
                c
            }
        });
        zeroed
    }

    /// Number of coefficients that are exactly zero.
    pub fn zero_count(&self) -> usize {
        self.0.iter().filter(|&&c| c == 0.0).count()
    }
}

/// Orthonormal `N x N` DCT-II and its inverse.
#[derive(Debug, Clone)]
pub struct BlockTransform {
    size: usize,
    basis: Array2<f64>,
}

impl BlockTransform {
    /// Builds the basis for `size x size` blocks.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_input("block size must be positive"));
        }
        let n = size as f64;
        let basis = Array2::from_shape_fn((size, size), |(k, i)| {
            let alpha = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            alpha * (PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n)).cos()
        });
        Ok(Self { size, basis })
    }

    /// Edge length of the blocks this transform handles.
    pub fn size(&self) -> usize {
        self.size
    }

    fn check_shape(&self, shape: &[usize]) -> Result<()> {
        if shape != [self.size, self.size] {
            return Err(Error::invalid_input(format!(
                "expected a {0}x{0} block, got {1:?}",
                self.size, shape
            )));
        }
        Ok(())
    }

    /// Spatial samples to transform coefficients.
    pub fn forward(&self, block: &ArrayView2<'_, f64>) -> Result<BlockCoefficients> {
        self.check_shape(block.shape())?;
        Ok(BlockCoefficients(
            self.basis.dot(block).dot(&self.basis.t()),
        ))
    }

    /// Transform coefficients back to spatial samples.
    pub fn inverse(&self, coefficients: &BlockCoefficients) -> Result<Array2<f64>> {
        self.check_shape(coefficients.0.shape())?;
        Ok(self.basis.t().dot(&coefficients.0).dot(&self.basis))
    }

    /// Forward transform, threshold, inverse transform, then clip to `0..=255`
    /// and round to the nearest sample.
    pub fn compress_block(&self, block: &ArrayView2<'_, u8>, limit: f64) -> Result<Array2<u8>> {
        let mut out = Array2::zeros((self.size, self.size));
        self.filter_block(block, limit, out.view_mut())?;
        Ok(out)
    }

    /// Same as [`BlockTransform::compress_block`], writing into `out` and
    /// returning the number of coefficients zeroed.
    pub(crate) fn filter_block(
        &self,
        block: &ArrayView2<'_, u8>,
        limit: f64,
        mut out: ArrayViewMut2<'_, u8>,
    ) -> Result<usize> {
        self.check_shape(block.shape())?;
        self.check_shape(out.shape())?;
        let samples = block.mapv(f64::from);
        let mut coefficients = self.forward(&samples.view())?;
        let zeroed = coefficients.threshold(limit);
        let restored = self.inverse(&coefficients)?;
        Zip::from(&mut out)
            .and(&restored)
            .for_each(|dst, &v| *dst = v.clamp(0.0, 255.0).round() as u8);
        trace!("dct: block zeroed {}/{} coefficients", zeroed, self.size * self.size);
        Ok(zeroed)
    }
}
