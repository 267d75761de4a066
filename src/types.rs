//! Contains various types needed across the crate.

use crate::{Error, MAX_COLORS, MIN_COLORS};
use palette::{cast, Srgb};
use std::fmt::Display;

/// One of the three components of an RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// The red component.
    Red,
    /// The green component.
    Green,
    /// The blue component.
    Blue,
}

impl Channel {
    /// All channels in component order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Returns the component index of this channel (`0` for red, `2` for blue).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Validates a raw component triple into a pixel.
///
/// `index` is the position of the pixel in the caller's input and is only used for the error.
///
/// # Errors
/// Returns [`Error::InvalidPixelComponent`] for the first component outside `0..=255`.
pub fn validate_pixel(index: usize, components: [i32; 3]) -> Result<Srgb<u8>, Error> {
    let mut rgb = [0u8; 3];
    for (channel, (out, value)) in Channel::ALL.into_iter().zip(rgb.iter_mut().zip(components)) {
        *out = u8::try_from(value)
            .map_err(|_| Error::InvalidPixelComponent { index, channel, value })?;
    }
    Ok(cast::from_array(rgb))
}

/// Converts a color with normalized `f32` components into an 8-bit pixel.
///
/// Components are clamped to `0.0..=1.0` and rounded to the nearest 8-bit level.
#[must_use]
pub fn pixel_from_normalized(color: Srgb<f32>) -> Srgb<u8> {
    let Srgb { red, green, blue, .. } = color;
    Srgb::new(red.clamp(0.0, 1.0), green.clamp(0.0, 1.0), blue.clamp(0.0, 1.0)).into_format()
}

/// This type is used to specify the maximum number of colors to include in a palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// in the range [`MIN_COLORS`]`..=`[`MAX_COLORS`].
///
/// # Examples
/// ```
/// # use mmcq::{MaxColors, Error};
/// # fn main() -> Result<(), Error> {
/// let colors = MaxColors::try_from(16u16)?;
/// let colors: MaxColors = 128u16.try_into()?;
/// assert!(MaxColors::try_from(1u16).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MaxColors(u16);

impl MaxColors {
    /// The largest supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// The smallest supported palette size (given by [`MIN_COLORS`]).
    pub const MIN: Self = Self(MIN_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Creates a [`MaxColors`] by clamping the given `u16` into the supported range.
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value < MIN_COLORS {
            Self::MIN
        } else if value > MAX_COLORS {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// The number of boxes the population-ordered phase stops at:
    /// three quarters of the palette size, rounded up.
    pub(crate) const fn population_target(self) -> usize {
        (self.0 as usize * 3).div_ceil(4)
    }
}

impl Default for MaxColors {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<MaxColors> for u16 {
    fn from(val: MaxColors) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u16> for MaxColors {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (MIN_COLORS..=MAX_COLORS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidColorCount(value))
        }
    }
}

impl Display for MaxColors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The bit depth of the indexed output the palette is meant for.
///
/// A depth limits the palette to `2^depth` colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputDepth {
    /// 1 bit per index (2 colors).
    One = 1,
    /// 2 bits per index (4 colors).
    Two = 2,
    /// 4 bits per index (16 colors).
    Four = 4,
    /// 8 bits per index (256 colors).
    Eight = 8,
}

impl OutputDepth {
    /// Returns the depth in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Returns the number of colors representable at this depth.
    #[must_use]
    pub const fn max_colors(self) -> u16 {
        1 << self.bits()
    }

    /// Checks that `max_colors` fits in this depth.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOutputDepth`] if `max_colors` is above `2^depth`.
    pub fn check(self, max_colors: MaxColors) -> Result<(), Error> {
        if max_colors.into_inner() <= self.max_colors() {
            Ok(())
        } else {
            Err(Error::InvalidOutputDepth {
                depth: self.bits(),
                max_colors: max_colors.into_inner(),
            })
        }
    }

    /// Validates a raw depth together with the requested number of colors.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOutputDepth`] if `depth` is not `1`, `2`, `4`, or `8`,
    /// or if `max_colors` does not fit in it.
    pub fn for_colors(depth: u8, max_colors: MaxColors) -> Result<Self, Error> {
        let depth = match depth {
            1 => Self::One,
            2 => Self::Two,
            4 => Self::Four,
            8 => Self::Eight,
            _ => {
                return Err(Error::InvalidOutputDepth { depth, max_colors: max_colors.into_inner() })
            }
        };
        depth.check(max_colors)?;
        Ok(depth)
    }
}

impl Display for OutputDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}
