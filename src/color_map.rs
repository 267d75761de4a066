//! The finished palette and nearest color lookups.

use crate::{Priority, VolumeBox};
use ordered_float::OrderedFloat;
use palette::{cast, Srgb};
#[cfg(feature = "threads")]
use rayon::prelude::*;
use tracing::debug;

/// Channel values below this are snapped to black by [`ColorMap::greyscale`].
const BLACK_THRESHOLD: u8 = 5;

/// Channel values above this are snapped to white by [`ColorMap::greyscale`].
const WHITE_THRESHOLD: u8 = 251;

/// Squared euclidean distance between two colors.
fn squared_euclidean_distance(x: Srgb<u8>, y: Srgb<u8>) -> f32 {
    let x: [u8; 3] = cast::into_array(x);
    let y: [u8; 3] = cast::into_array(y);
    let mut dist = 0.0;
    for c in 0..3 {
        let d = f32::from(x[c]) - f32::from(y[c]);
        dist += d * d;
    }
    dist
}

/// Returns the sum of the components of a color.
fn brightness(color: Srgb<u8>) -> u16 {
    let [r, g, b]: [u8; 3] = cast::into_array(color);
    u16::from(r) + u16::from(g) + u16::from(b)
}

/// An ordered collection of boxes, one palette color per box.
///
/// The average color of each box is its palette entry.
/// A color map returned by [`quantize`](crate::quantize) always holds at least one box.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// The boxes in palette order.
    boxes: Vec<VolumeBox>,
    /// The policy `boxes` is currently sorted by in ascending order, if any.
    sorted_by: Option<Priority>,
}

impl ColorMap {
    /// Creates a color map from the given boxes, in the given order.
    pub(crate) const fn new(boxes: Vec<VolumeBox>) -> Self {
        Self { boxes, sorted_by: None }
    }

    /// Returns the number of boxes (and palette colors).
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns whether the color map has no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Returns the boxes in palette order.
    #[must_use]
    pub fn boxes(&self) -> &[VolumeBox] {
        &self.boxes
    }

    /// Returns an iterator over the boxes in palette order.
    pub fn iter(&self) -> std::slice::Iter<'_, VolumeBox> {
        self.boxes.iter()
    }

    /// Returns the average color of each box in palette order.
    ///
    /// The returned `Vec` is a snapshot; modifying it does not affect the color map.
    #[must_use]
    pub fn palette(&self) -> Vec<Srgb<u8>> {
        self.boxes.iter().map(VolumeBox::average).collect()
    }

    /// Returns the average color of each box in palette order,
    /// computing any missing averages in parallel first.
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn palette_par(&mut self) -> Vec<Srgb<u8>> {
        self.compute_averages_par();
        self.palette()
    }

    /// Fills the cached average of every box in parallel.
    #[cfg(feature = "threads")]
    pub(crate) fn compute_averages_par(&mut self) {
        self.boxes.par_iter_mut().for_each(|vbox| {
            let _ = vbox.average();
        });
    }

    /// Returns the index of the palette color closest to `pixel`.
    ///
    /// Ties are broken in favor of the earliest box.
    #[must_use]
    pub fn nearest_index(&self, pixel: Srgb<u8>) -> usize {
        // a color map always has at least one box
        #[allow(clippy::expect_used)]
        let (index, _) = self
            .boxes
            .iter()
            .enumerate()
            .min_by_key(|(_, vbox)| OrderedFloat(squared_euclidean_distance(pixel, vbox.average())))
            .expect("at least one box");

        index
    }

    /// Returns the palette color closest to `pixel` in RGB space.
    ///
    /// Ties are broken in favor of the earliest box,
    /// so the result can depend on the current palette order.
    #[must_use]
    pub fn nearest(&self, pixel: Srgb<u8>) -> Srgb<u8> {
        self.boxes[self.nearest_index(pixel)].average()
    }

    /// Maps `pixel` to a palette color.
    ///
    /// A pixel equal to a palette color maps to itself,
    /// otherwise this is the same as [`ColorMap::nearest`].
    #[must_use]
    pub fn map(&self, pixel: Srgb<u8>) -> Srgb<u8> {
        self.boxes
            .iter()
            .map(VolumeBox::average)
            .find(|&average| average == pixel)
            .unwrap_or_else(|| self.nearest(pixel))
    }

    /// Sorts the boxes from brightest to dimmest average,
    /// then snaps a near-black dimmest color to black and a near-white brightest color to white.
    ///
    /// Brightness is the sum of the color components.
    /// A color is near-black if every component is below `5`,
    /// and near-white if every component is above `251`.
    pub fn greyscale(&mut self) {
        self.boxes.sort_by_key(|vbox| std::cmp::Reverse(brightness(vbox.average())));
        self.sorted_by = None;

        if let Some(dimmest) = self.boxes.last_mut() {
            let average = dimmest.average();
            if cast::into_array(average).iter().all(|&c: &u8| c < BLACK_THRESHOLD) {
                debug!(?average, "snapping dimmest palette color to black");
                dimmest.set_average(Srgb::new(0, 0, 0));
            }
        }

        if let Some(brightest) = self.boxes.first_mut() {
            let average = brightest.average();
            if cast::into_array(average).iter().all(|&c: &u8| c > WHITE_THRESHOLD) {
                debug!(?average, "snapping brightest palette color to white");
                brightest.set_average(Srgb::new(u8::MAX, u8::MAX, u8::MAX));
            }
        }
    }

    /// Returns a copy of this color map with [`ColorMap::greyscale`] applied,
    /// leaving this color map unchanged.
    #[must_use]
    pub fn to_greyscale(&self) -> Self {
        let mut copy = self.clone();
        copy.greyscale();
        copy
    }

    /// Sorts the boxes in ascending order under `priority`,
    /// unless they are already known to be in that order.
    pub(crate) fn sort_ascending(&mut self, priority: Priority) {
        if self.sorted_by != Some(priority) {
            self.boxes.sort_by(|a, b| priority.compare(a, b));
            self.sorted_by = Some(priority);
        }
    }

    /// Sorts the boxes in descending order under `priority`.
    pub(crate) fn sort_descending(&mut self, priority: Priority) {
        self.sort_ascending(priority);
        self.boxes.reverse();
        self.sorted_by = None;
    }

    /// Removes the last box.
    pub(crate) fn pop(&mut self) -> Option<VolumeBox> {
        self.boxes.pop()
    }

    /// Appends a new box, invalidating the current order.
    pub(crate) fn push(&mut self, vbox: VolumeBox) {
        self.boxes.push(vbox);
        self.sorted_by = None;
    }

    /// Puts back the box that was just popped, keeping the current order.
    pub(crate) fn restore(&mut self, vbox: VolumeBox) {
        self.boxes.push(vbox);
    }
}

impl<'a> IntoIterator for &'a ColorMap {
    type Item = &'a VolumeBox;
    type IntoIter = std::slice::Iter<'a, VolumeBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
