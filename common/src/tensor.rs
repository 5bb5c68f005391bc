//! Image tensors and the named normalization conventions of each model artifact.
//!
//! Image decoding and resizing happen upstream. This module only covers the last
//! preprocessing step: turning an already-resized RGB8 buffer into an NHWC `f32`
//! tensor with the normalization a particular model was trained with.
//!
//! Two conventions exist and they are **not** interchangeable for a given model:
//!
//! | Scheme | Formula | Resize filter | Used by |
//! |--------|---------|---------------|---------|
//! | [`NormalizationScheme::ScaledOffset`] | `p / 127.5 - 1.0` | bilinear | trained dog breed model |
//! | [`NormalizationScheme::CenteredUnit`] | `(p / 255.0 - 0.5) * 2.0` | Lanczos3 | generic species classifier |
//!
//! Every tensor carries the scheme it was produced with, and every model declares the
//! scheme it expects in its [`TensorSpec`], so a mix-up is rejected instead of silently
//! degrading accuracy.

use crate::error::{TensorError, TensorResult};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of colour channels (RGB).
pub const CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationScheme {
    /// `pixel / 127.5 - 1.0` (legacy single-species path)
    ScaledOffset,
    /// `(pixel / 255.0 - 0.5) * 2.0` (multi-species path)
    CenteredUnit,
}

impl NormalizationScheme {
    /// Map one 8-bit channel value into `[-1, 1]`.
    #[inline]
    pub fn normalize(&self, pixel: u8) -> f32 {
        let p = pixel as f32;
        match self {
            Self::ScaledOffset => p / 127.5 - 1.0,
            Self::CenteredUnit => (p / 255.0 - 0.5) * 2.0,
        }
    }

    /// Resize filter the upstream preprocessor pairs with this scheme.
    pub fn resize_filter(&self) -> ResizeFilter {
        match self {
            Self::ScaledOffset => ResizeFilter::Bilinear,
            Self::CenteredUnit => ResizeFilter::Lanczos3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScaledOffset => "scaled-offset",
            Self::CenteredUnit => "centered-unit",
        }
    }
}

impl fmt::Display for NormalizationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Bilinear,
    Lanczos3,
}

/// Input contract of a model: spatial size plus normalization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorSpec {
    pub height: usize,
    pub width: usize,
    pub normalization: NormalizationScheme,
}

impl TensorSpec {
    pub fn new(height: usize, width: usize, normalization: NormalizationScheme) -> Self {
        Self { height, width, normalization }
    }

    /// Square MobileNet-sized input (224x224).
    pub fn mobilenet(normalization: NormalizationScheme) -> Self {
        Self::new(crate::DEFAULT_INPUT_SIZE, crate::DEFAULT_INPUT_SIZE, normalization)
    }

    /// Full NHWC shape with a batch of one.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.height, self.width, CHANNELS]
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[1, {}, {}, {}] ({})", self.height, self.width, CHANNELS, self.normalization)
    }
}

/// A single preprocessed image, NHWC `[1, H, W, 3]`, in standard (row-major) layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
    normalization: NormalizationScheme,
}

impl ImageTensor {
    /// Normalize an already-resized, interleaved RGB8 buffer.
    pub fn from_rgb8(
        pixels: &[u8],
        height: usize,
        width: usize,
        normalization: NormalizationScheme,
    ) -> TensorResult<Self> {
        if height == 0 || width == 0 {
            return Err(TensorError::InvalidDimensions(format!(
                "image must be non-empty, got {}x{}",
                height, width
            )));
        }

        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                TensorError::InvalidDimensions(format!("{}x{} image is too large", height, width))
            })?;
        if pixels.len() != expected {
            return Err(TensorError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
                height,
                width,
            });
        }

        let values: Vec<f32> = pixels.iter().map(|&p| normalization.normalize(p)).collect();
        let data = Array4::from_shape_vec((1, height, width, CHANNELS), values)
            .map_err(|e| TensorError::InvalidDimensions(e.to_string()))?;

        Ok(Self { data, normalization })
    }

    /// Wrap an already-normalized NHWC array.
    pub fn from_array(array: Array4<f32>, normalization: NormalizationScheme) -> TensorResult<Self> {
        let shape = array.shape();
        if shape[0] != 1 || shape[3] != CHANNELS {
            return Err(TensorError::InvalidDimensions(format!(
                "expected [1, H, W, {}], got {:?}",
                CHANNELS, shape
            )));
        }

        let data = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };

        Ok(Self { data, normalization })
    }

    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn shape(&self) -> [usize; 4] {
        [1, self.height(), self.width(), CHANNELS]
    }

    pub fn normalization(&self) -> NormalizationScheme {
        self.normalization
    }

    /// Spec describing this tensor, for comparison against a model's input contract.
    pub fn spec(&self) -> TensorSpec {
        TensorSpec::new(self.height(), self.width(), self.normalization)
    }

    /// True if this tensor can be fed to a model expecting `spec`.
    pub fn matches(&self, spec: &TensorSpec) -> bool {
        self.spec() == *spec
    }

    /// Contiguous row-major view of the values.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }

    pub fn array(&self) -> &Array4<f32> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_endpoints() {
        for scheme in [NormalizationScheme::ScaledOffset, NormalizationScheme::CenteredUnit] {
            assert!((scheme.normalize(0) + 1.0).abs() < 1e-6);
            assert!((scheme.normalize(255) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_schemes_are_numerically_distinct() {
        // Same range, different arithmetic: midpoints land on different values.
        let legacy = NormalizationScheme::ScaledOffset.normalize(127);
        let multi = NormalizationScheme::CenteredUnit.normalize(127);
        assert!((legacy - (127.0 / 127.5 - 1.0)).abs() < 1e-7);
        assert!((multi - ((127.0 / 255.0 - 0.5) * 2.0)).abs() < 1e-7);
        assert_eq!(NormalizationScheme::ScaledOffset.resize_filter(), ResizeFilter::Bilinear);
        assert_eq!(NormalizationScheme::CenteredUnit.resize_filter(), ResizeFilter::Lanczos3);
    }

    #[test]
    fn test_from_rgb8_layout() {
        let pixels = [0u8, 255, 0, 255, 0, 255];
        let tensor = ImageTensor::from_rgb8(&pixels, 1, 2, NormalizationScheme::CenteredUnit)
            .expect("valid buffer");

        assert_eq!(tensor.shape(), [1, 1, 2, 3]);
        let values = tensor.as_slice().expect("standard layout");
        assert_eq!(values.len(), 6);
        assert!((values[0] + 1.0).abs() < 1e-6);
        assert!((values[1] - 1.0).abs() < 1e-6);
        assert_eq!(tensor.spec(), TensorSpec::new(1, 2, NormalizationScheme::CenteredUnit));
    }

    #[test]
    fn test_from_rgb8_rejects_wrong_length() {
        let err = ImageTensor::from_rgb8(&[0u8; 10], 2, 2, NormalizationScheme::ScaledOffset)
            .unwrap_err();
        assert_eq!(
            err,
            TensorError::PixelCountMismatch { expected: 12, actual: 10, height: 2, width: 2 }
        );
    }

    #[test]
    fn test_from_rgb8_rejects_overflowing_dimensions() {
        let result = ImageTensor::from_rgb8(&[0u8; 3], usize::MAX, 2, NormalizationScheme::ScaledOffset);
        assert!(matches!(result, Err(TensorError::InvalidDimensions(_))));

        let result = ImageTensor::from_rgb8(&[0u8; 3], usize::MAX / 2, 1, NormalizationScheme::CenteredUnit);
        assert!(matches!(result, Err(TensorError::InvalidDimensions(_))));
    }

    #[test]
    fn test_spec_matching_includes_scheme() {
        let tensor = ImageTensor::from_array(
            Array4::zeros((1, 224, 224, 3)),
            NormalizationScheme::ScaledOffset,
        )
        .expect("valid array");

        assert!(tensor.matches(&TensorSpec::mobilenet(NormalizationScheme::ScaledOffset)));
        assert!(!tensor.matches(&TensorSpec::mobilenet(NormalizationScheme::CenteredUnit)));
    }

    #[test]
    fn test_from_array_rejects_batches() {
        let result = ImageTensor::from_array(Array4::zeros((2, 4, 4, 3)), NormalizationScheme::CenteredUnit);
        assert!(matches!(result, Err(TensorError::InvalidDimensions(_))));
    }
}
