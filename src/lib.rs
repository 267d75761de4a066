//! A library for reducing a set of RGB pixels to a small palette with modified median cut
//! quantization (MMCQ), and for mapping pixels onto that palette.
//!
//! Pixels are binned into a coarse 3-dimensional histogram ([`SIGBITS`] bits per channel).
//! A box covering the histogram is then split recursively, first to balance the pixel count
//! of the boxes and then to balance pixel count times volume, until the requested number of
//! boxes is reached. The average color of each box becomes a palette entry.
//!
//! # Features
//! To reduce dependencies and compile times, `mmcq` has several `cargo` features
//! that can be turned off or on:
//! - `pipelines`: exposes a builder struct that serves as the high-level API.
//! - `threads`: exposes parallel versions of the histogram and palette computations via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # Examples
//! ```
//! # use mmcq::Error;
//! # use palette::Srgb;
//! # fn main() -> Result<(), Error> {
//! let pixels = [
//!     [190, 197, 190],
//!     [202, 204, 200],
//!     [207, 214, 210],
//!     [211, 214, 211],
//!     [205, 207, 207],
//! ];
//!
//! let color_map = mmcq::quantize(&pixels, 4, None)?;
//!
//! assert!(color_map.len() <= 4);
//! assert_eq!(color_map.map(Srgb::new(190, 197, 190)), Srgb::new(188, 196, 188));
//! # Ok(())
//! # }
//! ```
//!
//! Diagnostics (for example, a refinement that stopped early) are reported through [`tracing`].

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod color_map;
mod error;
mod traits;
mod types;
mod vbox;

#[cfg(feature = "pipelines")]
mod api;

pub mod histogram;
pub mod median_cut;
pub mod refine;

pub use color_map::ColorMap;
pub use error::Error;
pub use histogram::Histogram;
pub use refine::Priority;
pub use traits::*;
pub use types::*;
pub use vbox::VolumeBox;

#[cfg(feature = "pipelines")]
pub use api::*;

use palette::Srgb;
use refine::refine;
use std::sync::Arc;
use tracing::debug;
#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::ComponentsAs};

/// The number of most significant bits kept from each 8-bit channel in the histogram.
pub const SIGBITS: u32 = 5;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// The minimum supported number of palette colors is `2`.
pub const MIN_COLORS: u16 = 2;

/// The maximum number of iterations of a single refinement.
pub const MAX_ITERATIONS: usize = 1000;

/// Runs both refinement phases over the box spanning `histogram`.
fn color_map_from_histogram(
    histogram: Histogram,
    max_colors: MaxColors,
) -> Result<ColorMap, Error> {
    debug!(
        pixels = histogram.total(),
        occupied = histogram.num_occupied(),
        "built color histogram"
    );

    let root = VolumeBox::from_histogram(Arc::new(histogram)).ok_or(Error::EmptyInput)?;
    let mut color_map = ColorMap::new(vec![root]);

    refine(&mut color_map, max_colors.population_target(), Priority::Population);
    color_map.sort_descending(Priority::Population);

    refine(&mut color_map, usize::from(max_colors.into_inner()), Priority::Occupancy);
    color_map.sort_descending(Priority::Occupancy);

    Ok(color_map)
}

/// Computes a [`ColorMap`] with at most `max_colors` entries from raw pixel component triples.
///
/// If `output_depth` is given, the palette must fit in an index of that many bits.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if `pixels` is empty,
/// [`Error::InvalidColorCount`] if `max_colors` is not in `2..=256`,
/// [`Error::InvalidOutputDepth`] if `output_depth` is not `1`, `2`, `4`, or `8`
/// or cannot hold `max_colors` colors,
/// and [`Error::InvalidPixelComponent`] if any component is outside `0..=255`.
pub fn quantize(
    pixels: &[[i32; 3]],
    max_colors: u16,
    output_depth: Option<u8>,
) -> Result<ColorMap, Error> {
    if pixels.is_empty() {
        return Err(Error::EmptyInput);
    }

    let max_colors = MaxColors::try_from(max_colors)?;

    if let Some(depth) = output_depth {
        OutputDepth::for_colors(depth, max_colors)?;
    }

    let pixels = pixels
        .iter()
        .enumerate()
        .map(|(i, &components)| validate_pixel(i, components))
        .collect::<Result<Vec<Srgb<u8>>, _>>()?;

    quantize_srgb(&pixels, max_colors)
}

/// Computes a [`ColorMap`] with at most `max_colors` entries from the given pixels.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if `pixels` is empty.
pub fn quantize_srgb<Color: ColorComponents>(
    pixels: &[Color],
    max_colors: MaxColors,
) -> Result<ColorMap, Error> {
    if pixels.is_empty() {
        return Err(Error::EmptyInput);
    }
    color_map_from_histogram(Histogram::new(pixels), max_colors)
}

/// Computes a [`ColorMap`] with at most `max_colors` entries from the given pixels,
/// building the histogram in parallel.
///
/// The result is the same as [`quantize_srgb`].
///
/// # Errors
/// Returns [`Error::EmptyInput`] if `pixels` is empty.
#[cfg(feature = "threads")]
pub fn quantize_srgb_par<Color: ColorComponents + Sync>(
    pixels: &[Color],
    max_colors: MaxColors,
) -> Result<ColorMap, Error> {
    if pixels.is_empty() {
        return Err(Error::EmptyInput);
    }
    color_map_from_histogram(Histogram::new_par(pixels), max_colors)
}

/// Computes a [`ColorMap`] with at most `max_colors` entries from the pixels of an image.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if the image has no pixels.
#[cfg(feature = "image")]
pub fn quantize_rgbimage(image: &RgbImage, max_colors: MaxColors) -> Result<ColorMap, Error> {
    let pixels = image.pixels().len();
    let buf: &[Srgb<u8>] = image.as_raw()[..(pixels * 3)].components_as();
    quantize_srgb(buf, max_colors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use palette::cast;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// Deterministic pseudo-random colors shared by the tests.
    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(42);
        (0..1024).map(|_| cast::from_array(rng.gen::<[u8; 3]>())).collect()
    }

    const REFERENCE_PIXELS: [[i32; 3]; 5] =
        [[190, 197, 190], [202, 204, 200], [207, 214, 210], [211, 214, 211], [205, 207, 207]];

    #[test]
    fn reference_palette() {
        let color_map = quantize(&REFERENCE_PIXELS, 4, None).unwrap();

        assert_eq!(
            color_map.palette(),
            vec![
                Srgb::new(204, 204, 204),
                Srgb::new(208, 212, 212),
                Srgb::new(188, 196, 188),
                Srgb::new(212, 204, 196),
            ]
        );
        assert_eq!(color_map.map(Srgb::new(190, 197, 190)), Srgb::new(188, 196, 188));
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(quantize(&[], 4, None).unwrap_err(), Error::EmptyInput);
        assert_eq!(quantize(&REFERENCE_PIXELS, 1, None).unwrap_err(), Error::InvalidColorCount(1));
        assert_eq!(
            quantize(&REFERENCE_PIXELS, 257, None).unwrap_err(),
            Error::InvalidColorCount(257)
        );
        assert_eq!(
            quantize(&REFERENCE_PIXELS, 4, Some(3)).unwrap_err(),
            Error::InvalidOutputDepth { depth: 3, max_colors: 4 }
        );
        assert_eq!(
            quantize(&REFERENCE_PIXELS, 16, Some(2)).unwrap_err(),
            Error::InvalidOutputDepth { depth: 2, max_colors: 16 }
        );
        assert_eq!(
            quantize(&[[0, 0, 0], [0, 256, 0]], 4, None).unwrap_err(),
            Error::InvalidPixelComponent { index: 1, channel: Channel::Green, value: 256 }
        );
        assert!(quantize(&REFERENCE_PIXELS, 4, Some(2)).is_ok());
        assert_eq!(quantize_srgb::<Srgb<u8>>(&[], MaxColors::MAX).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn palette_size_is_bounded() {
        let colors = test_data_1024();
        for k in [2u16, 3, 4, 16, 64, 100, 256] {
            let color_map = quantize_srgb(&colors, MaxColors::try_from(k).unwrap()).unwrap();
            assert!((1..=usize::from(k)).contains(&color_map.len()));
            assert_eq!(color_map.iter().map(VolumeBox::count).sum::<u64>(), 1024);
        }
    }

    #[test]
    fn single_color_gives_single_entry() {
        let colors = vec![Srgb::new(30u8, 60, 90); 100];
        let color_map = quantize_srgb(&colors, MaxColors::try_from(8u16).unwrap()).unwrap();

        assert_eq!(color_map.palette(), vec![Srgb::new(28, 60, 92)]);
        assert_eq!(color_map.map(Srgb::new(30, 60, 90)), Srgb::new(28, 60, 92));
    }

    #[test]
    fn deterministic() {
        let colors = test_data_1024();
        let max_colors = MaxColors::try_from(32u16).unwrap();
        let a = quantize_srgb(&colors, max_colors).unwrap();
        let b = quantize_srgb(&colors, max_colors).unwrap();

        let bounds = |map: &ColorMap| map.iter().map(VolumeBox::bounds).collect::<Vec<_>>();
        assert_eq!(bounds(&a), bounds(&b));
        assert_eq!(a.palette(), b.palette());
    }

    #[test]
    fn palette_entries_map_to_themselves() {
        let colors = test_data_1024();
        let color_map = quantize_srgb(&colors, MaxColors::try_from(16u16).unwrap()).unwrap();

        for color in color_map.palette() {
            assert_eq!(color_map.map(color), color);
        }
        for &color in &colors {
            let mapped = color_map.map(color);
            assert!(color_map.palette().contains(&mapped));
        }
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let colors = test_data_1024();
        let single = quantize_srgb(&colors, MaxColors::MAX).unwrap();
        let par = quantize_srgb_par(&colors, MaxColors::MAX).unwrap();
        assert_eq!(single.palette(), par.palette());
    }
}
