//! The error type returned at the quantization boundary.

use crate::Channel;
use thiserror::Error;

/// An error raised while validating the inputs to a quantization call.
///
/// All variants abort the whole operation. Conditions that can occur inside the
/// refinement loop (an empty box, a box that cannot be cut) are not errors and
/// are never reported through this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pixel sequence had no elements.
    #[error("no pixels were provided")]
    EmptyInput,

    /// The requested maximum number of colors was outside `2..=256`.
    #[error("invalid color count: {0} (must be between 2 and 256)")]
    InvalidColorCount(u16),

    /// The output depth was not one of `1`, `2`, `4`, or `8`,
    /// or it cannot hold the requested number of colors.
    #[error("invalid output depth: {depth} bits cannot hold {max_colors} colors")]
    InvalidOutputDepth {
        /// The requested output depth in bits.
        depth: u8,
        /// The requested maximum number of colors.
        max_colors: u16,
    },

    /// A pixel had a component outside `0..=255`.
    #[error("pixel {index} has {channel} component {value} outside 0..=255")]
    InvalidPixelComponent {
        /// The position of the offending pixel in the input.
        index: usize,
        /// The offending channel.
        channel: Channel,
        /// The rejected value.
        value: i32,
    },
}
