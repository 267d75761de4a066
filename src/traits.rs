//! Contains the traits used to accept different pixel types.

use palette::cast::ArrayCast;

/// A color type that can be reinterpreted as three `u8` components (red, green, blue).
///
/// This is implemented for `palette::Srgb<u8>` and other 8-bit, 3-component `palette` colors.
pub trait ColorComponents: ArrayCast<Array = [u8; 3]> + Copy + 'static {}

impl<Color> ColorComponents for Color where Color: ArrayCast<Array = [u8; 3]> + Copy + 'static {}
