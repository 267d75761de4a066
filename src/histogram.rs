//! The quantized color histogram that every box reads from.
//!
//! Each channel keeps its [`SIGBITS`] most significant bits, so the histogram has
//! `2^(3 * SIGBITS)` cells indexed by `r << (2 * SIGBITS) | g << SIGBITS | b`.

use crate::{ColorComponents, SIGBITS};
use palette::cast::AsArrays;
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The number of bits dropped from each 8-bit channel.
pub const RSHIFT: u32 = u8::BITS - SIGBITS;

/// The number of quantized levels per channel.
pub const LEVELS: usize = 1 << SIGBITS;

/// The number of cells in the histogram.
pub const HISTOGRAM_SIZE: usize = 1 << (3 * SIGBITS);

/// Quantizes an 8-bit channel value down to [`SIGBITS`] bits.
#[inline]
#[must_use]
pub const fn quantize_channel(value: u8) -> u8 {
    value >> RSHIFT
}

/// Returns the quantized coordinates of the given color components.
#[inline]
#[must_use]
pub fn bin(components: [u8; 3]) -> [u8; 3] {
    components.map(quantize_channel)
}

/// Returns the histogram index of the given quantized coordinates.
#[inline]
#[must_use]
pub const fn color_index([r, g, b]: [u8; 3]) -> usize {
    ((r as usize) << (2 * SIGBITS)) | ((g as usize) << SIGBITS) | b as usize
}

/// A frequency table over the quantized color space.
///
/// The histogram is built once and only read afterwards.
/// Boxes share it through an [`Arc`](std::sync::Arc) instead of copying it.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    /// The pixel count of each cell.
    counts: Box<[u32]>,
    /// The total number of pixels added.
    total: u64,
    /// The smallest quantized coordinate seen on each channel.
    min: [u8; 3],
    /// The largest quantized coordinate seen on each channel.
    max: [u8; 3],
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("total", &self.total)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

impl Histogram {
    /// Creates an empty histogram.
    fn new_zero() -> Self {
        Self {
            counts: vec![0; HISTOGRAM_SIZE].into_boxed_slice(),
            total: 0,
            min: [u8::MAX; 3],
            max: [0; 3],
        }
    }

    /// Adds a single color to the histogram.
    #[inline]
    fn add_color(&mut self, color: [u8; 3]) {
        let coords = bin(color);
        let count = &mut self.counts[color_index(coords)];
        *count = count.saturating_add(1);
        self.total += 1;
        for c in 0..3 {
            self.min[c] = self.min[c].min(coords[c]);
            self.max[c] = self.max[c].max(coords[c]);
        }
    }

    /// Adds the given colors to the histogram.
    fn add_colors(&mut self, colors: &[[u8; 3]]) {
        for &color in colors {
            self.add_color(color);
        }
    }

    /// Builds the histogram of the given pixels.
    #[must_use]
    pub fn new<Color: ColorComponents>(pixels: &[Color]) -> Self {
        let mut hist = Self::new_zero();
        hist.add_colors(pixels.as_arrays());
        hist
    }

    /// Returns the number of pixels in the cell at the given quantized coordinates.
    #[inline]
    #[must_use]
    pub fn get(&self, coords: [u8; 3]) -> u32 {
        self.counts[color_index(coords)]
    }

    /// Returns the number of pixels the histogram was built from.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns whether no pixels were added to the histogram.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Returns the number of non-empty cells.
    #[must_use]
    pub fn num_occupied(&self) -> usize {
        self.counts.iter().filter(|&&n| n > 0).count()
    }

    /// Returns the per-channel `(min, max)` quantized coordinates of the added pixels,
    /// or `None` if the histogram is empty.
    #[must_use]
    pub fn extent(&self) -> Option<([u8; 3], [u8; 3])> {
        if self.is_empty() {
            None
        } else {
            Some((self.min, self.max))
        }
    }
}

#[cfg(feature = "threads")]
impl Histogram {
    /// Builds the histogram of the given pixels in parallel.
    #[must_use]
    pub fn new_par<Color: ColorComponents + Sync>(pixels: &[Color]) -> Self {
        let chunk_size = pixels.len().div_ceil(rayon::current_num_threads()).max(1);
        pixels
            .as_arrays()
            .par_chunks(chunk_size)
            .map(|colors| {
                let mut hist = Self::new_zero();
                hist.add_colors(colors);
                hist
            })
            .reduce_with(Self::merge_partial)
            .unwrap_or_else(Self::new_zero)
    }

    /// Merges two partial histograms by summing their cells.
    #[allow(clippy::needless_pass_by_value)]
    fn merge_partial(mut self, other: Self) -> Self {
        for (a, &b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a = a.saturating_add(b);
        }
        self.total += other.total;
        for c in 0..3 {
            self.min[c] = self.min[c].min(other.min[c]);
            self.max[c] = self.max[c].max(other.max[c]);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::Srgb;

    #[test]
    fn index_layout() {
        assert_eq!(color_index([0, 0, 0]), 0);
        assert_eq!(color_index([0, 0, 1]), 1);
        assert_eq!(color_index([0, 1, 0]), 32);
        assert_eq!(color_index([1, 0, 0]), 1024);
        assert_eq!(color_index([31, 31, 31]), HISTOGRAM_SIZE - 1);
        assert_eq!(bin([255, 8, 7]), [31, 1, 0]);
    }

    #[test]
    fn counts_sum_to_input_length() {
        let colors = test_data_1024();
        let hist = Histogram::new(&colors);

        assert_eq!(hist.total(), 1024);
        assert_eq!(hist.counts.iter().map(|&n| u64::from(n)).sum::<u64>(), 1024);
    }

    #[test]
    fn colors_in_same_cell_collapse() {
        let colors = [Srgb::new(200u8, 16, 0), Srgb::new(207, 23, 7), Srgb::new(0, 0, 0)];
        let hist = Histogram::new(&colors);

        assert_eq!(hist.get([25, 2, 0]), 2);
        assert_eq!(hist.get([0, 0, 0]), 1);
        assert_eq!(hist.num_occupied(), 2);
        assert_eq!(hist.extent(), Some(([0, 0, 0], [25, 2, 0])));
    }

    #[test]
    fn empty_histogram_has_no_extent() {
        let hist = Histogram::new::<Srgb<u8>>(&[]);
        assert!(hist.is_empty());
        assert_eq!(hist.extent(), None);
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let colors = test_data_1024();
        assert_eq!(Histogram::new(&colors), Histogram::new_par(&colors));
    }
}
