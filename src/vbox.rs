//! Axis-aligned boxes over the quantized color space.

use crate::{
    histogram::{bin, Histogram, LEVELS, RSHIFT},
    Channel,
};
use palette::{cast, Srgb};
use std::{cell::OnceCell, sync::Arc};

/// An axis-aligned box of histogram cells, bounds inclusive on every channel.
///
/// The pixel count, volume, and average color of a box are computed on first use and cached.
/// The cached values are never invalidated; the `recompute_*` methods overwrite them.
/// Cloning a box copies its caches as they are.
#[derive(Debug, Clone)]
pub struct VolumeBox {
    /// The lower quantized bound of each channel.
    min: [u8; 3],
    /// The upper quantized bound of each channel.
    max: [u8; 3],
    /// The histogram shared by every box of a quantization.
    histogram: Arc<Histogram>,
    /// Cached number of pixels inside the box.
    count: OnceCell<u64>,
    /// Cached number of cells inside the box.
    volume: OnceCell<u32>,
    /// Cached average color of the box.
    average: OnceCell<Srgb<u8>>,
}

impl VolumeBox {
    /// Creates a box with the given bounds and empty caches.
    ///
    /// Returns `None` unless each bound is a quantized coordinate (below [`LEVELS`])
    /// and `min[c] <= max[c]` holds on every channel.
    #[must_use]
    pub fn new(histogram: Arc<Histogram>, min: [u8; 3], max: [u8; 3]) -> Option<Self> {
        let valid = (0..3).all(|c| min[c] <= max[c] && usize::from(max[c]) < LEVELS);
        valid.then(|| Self {
            min,
            max,
            histogram,
            count: OnceCell::new(),
            volume: OnceCell::new(),
            average: OnceCell::new(),
        })
    }

    /// Creates the box spanning every pixel in the histogram,
    /// or `None` if the histogram is empty.
    #[must_use]
    pub fn from_histogram(histogram: Arc<Histogram>) -> Option<Self> {
        let (min, max) = histogram.extent()?;
        Self::new(histogram, min, max)
    }

    /// Creates a box over the same histogram with new bounds and empty caches.
    ///
    /// Returns `None` if the bounds are invalid (see [`VolumeBox::new`]).
    #[must_use]
    pub fn with_bounds(&self, min: [u8; 3], max: [u8; 3]) -> Option<Self> {
        Self::new(Arc::clone(&self.histogram), min, max)
    }

    /// Returns the histogram this box reads from.
    #[must_use]
    pub fn histogram(&self) -> &Arc<Histogram> {
        &self.histogram
    }

    /// Returns the inclusive `(min, max)` quantized bounds of each channel.
    #[must_use]
    pub const fn bounds(&self) -> ([u8; 3], [u8; 3]) {
        (self.min, self.max)
    }

    /// Returns the number of quantized levels the box covers on the given channel.
    #[must_use]
    pub const fn width(&self, channel: Channel) -> u8 {
        let c = channel.index();
        self.max[c] - self.min[c] + 1
    }

    /// Returns whether the given pixel falls inside this box once quantized.
    #[must_use]
    pub fn contains(&self, pixel: Srgb<u8>) -> bool {
        let coords = bin(cast::into_array(pixel));
        (0..3).all(|c| self.min[c] <= coords[c] && coords[c] <= self.max[c])
    }

    /// Calls `f` with the coordinates and pixel count of every cell in the box.
    fn for_each_cell(&self, mut f: impl FnMut([u8; 3], u32)) {
        let Self { min, max, histogram, .. } = self;
        for r in min[0]..=max[0] {
            for g in min[1]..=max[1] {
                for b in min[2]..=max[2] {
                    let coords = [r, g, b];
                    f(coords, histogram.get(coords));
                }
            }
        }
    }

    /// Sums the histogram over the box.
    fn compute_count(&self) -> u64 {
        let mut count = 0;
        self.for_each_cell(|_, n| count += u64::from(n));
        count
    }

    /// Computes the number of cells in the box.
    fn compute_volume(&self) -> u32 {
        Channel::ALL.into_iter().map(|c| u32::from(self.width(c))).product()
    }

    /// Computes the weighted centroid of the box, rescaled to 8 bits and truncated.
    ///
    /// A box with no pixels gets the midpoint of its bounds instead.
    fn compute_average(&self) -> Srgb<u8> {
        let mult = 1u64 << RSHIFT;

        // cell centers are at (coordinate + 0.5) * mult, so sums are kept doubled
        let mut total = 0u64;
        let mut sums = [0u64; 3];
        self.for_each_cell(|coords, n| {
            if n > 0 {
                let n = u64::from(n);
                total += n;
                for (sum, c) in sums.iter_mut().zip(coords) {
                    *sum += n * (2 * u64::from(c) + 1) * mult;
                }
            }
        });

        #[allow(clippy::cast_possible_truncation)]
        let components = if total > 0 {
            sums.map(|sum| (sum / (2 * total)) as u8)
        } else {
            let Self { min, max, .. } = self;
            [0, 1, 2].map(|c| ((u64::from(min[c]) + u64::from(max[c]) + 1) * mult / 2) as u8)
        };

        cast::from_array(components)
    }

    /// Returns the number of pixels in the box, computing it on first use.
    #[must_use]
    pub fn count(&self) -> u64 {
        *self.count.get_or_init(|| self.compute_count())
    }

    /// Recomputes the number of pixels in the box, overwriting the cached value.
    pub fn recount(&mut self) -> u64 {
        let count = self.compute_count();
        self.count = OnceCell::from(count);
        count
    }

    /// Returns the number of histogram cells in the box, computing it on first use.
    #[must_use]
    pub fn volume(&self) -> u32 {
        *self.volume.get_or_init(|| self.compute_volume())
    }

    /// Recomputes the number of histogram cells in the box, overwriting the cached value.
    pub fn recompute_volume(&mut self) -> u32 {
        let volume = self.compute_volume();
        self.volume = OnceCell::from(volume);
        volume
    }

    /// Returns the average color of the box, computing it on first use.
    #[must_use]
    pub fn average(&self) -> Srgb<u8> {
        *self.average.get_or_init(|| self.compute_average())
    }

    /// Recomputes the average color of the box, overwriting the cached value.
    pub fn recompute_average(&mut self) -> Srgb<u8> {
        let average = self.compute_average();
        self.average = OnceCell::from(average);
        average
    }

    /// Overwrites the cached average color.
    pub(crate) fn set_average(&mut self, color: Srgb<u8>) {
        self.average = OnceCell::from(color);
    }

    /// The size of a box is its pixel count.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.count()
    }

    /// Returns whether the box contains no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the pixel count multiplied by the volume.
    #[must_use]
    pub fn occupancy(&self) -> u64 {
        self.count() * u64::from(self.volume())
    }
}
