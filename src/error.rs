//! Errors raised while rasterizing offscreen layers.
//!
//! None of these escape a draw call: renderers log them and skip the data set
//! that produced them.

use thiserror::Error;

/// Failure to build or combine an offscreen layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The requested layer has no pixels.
    #[error("layer of {width}x{height} pixels is empty")]
    EmptyLayer { width: u32, height: u32 },
    /// The requested layer exceeds the allocation limit.
    #[error("layer of {width}x{height} pixels exceeds the allocation limit")]
    LayerTooLarge { width: u32, height: u32 },
    /// Two layers that must align have different dimensions.
    #[error("layer size {actual:?} does not match {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
