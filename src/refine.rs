//! The iterative splitting loop that grows a [`ColorMap`] toward a target number of boxes.

use crate::{
    median_cut::{median_cut, Cut},
    ColorMap, VolumeBox, MAX_ITERATIONS,
};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// The policy deciding which box is split next.
///
/// The box that compares greatest is split first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Split the box holding the most pixels.
    Population,
    /// Split the box with the greatest pixel count times volume.
    Occupancy,
}

impl Priority {
    /// Compares two boxes under this policy.
    #[must_use]
    pub fn compare(self, a: &VolumeBox, b: &VolumeBox) -> Ordering {
        match self {
            Self::Population => by_population(a, b),
            Self::Occupancy => by_occupancy(a, b),
        }
    }
}

/// Orders boxes by pixel count.
#[must_use]
pub fn by_population(a: &VolumeBox, b: &VolumeBox) -> Ordering {
    a.count().cmp(&b.count())
}

/// Orders boxes by pixel count times volume.
#[must_use]
pub fn by_occupancy(a: &VolumeBox, b: &VolumeBox) -> Ordering {
    a.occupancy().cmp(&b.occupancy())
}

/// Why a refinement stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The color map reached the target number of boxes.
    ReachedTarget,
    /// [`MAX_ITERATIONS`] iterations were used up first.
    IterationLimit,
    /// The highest priority box could not be split.
    Stalled,
}

/// Repeatedly splits the highest priority box of `color_map` until it holds `target` boxes,
/// [`MAX_ITERATIONS`] iterations have passed, or a box cannot be split.
///
/// Empty boxes are put back unsplit and only use up an iteration.
/// A box with a single pixel is replaced by its copy without adding to the box count.
/// A box that cannot be split is put back and ends the refinement.
pub fn refine(color_map: &mut ColorMap, target: usize, priority: Priority) -> Outcome {
    let mut boxes = color_map.len();
    let mut iterations = 0;

    debug!(?priority, target, boxes, "refining color map");

    let outcome = loop {
        if boxes >= target {
            break Outcome::ReachedTarget;
        }
        if iterations >= MAX_ITERATIONS {
            break Outcome::IterationLimit;
        }
        iterations += 1;

        color_map.sort_ascending(priority);
        let Some(vbox) = color_map.pop() else {
            break Outcome::Stalled;
        };

        if vbox.is_empty() {
            color_map.restore(vbox);
            continue;
        }

        match median_cut(&vbox) {
            Some(Cut::Single(single)) => color_map.push(single),
            Some(Cut::Pair(lower, upper)) => {
                trace!(
                    bounds = ?vbox.bounds(),
                    lower = lower.count(),
                    upper = upper.count(),
                    "split box"
                );
                color_map.push(lower);
                color_map.push(upper);
                boxes += 1;
            }
            None => {
                warn!(
                    bounds = ?vbox.bounds(),
                    count = vbox.count(),
                    boxes,
                    target,
                    "box cannot be split, stopping refinement early"
                );
                color_map.restore(vbox);
                break Outcome::Stalled;
            }
        }
    };

    debug!(?outcome, iterations, boxes = color_map.len(), "finished refining color map");

    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Histogram;
    use palette::{cast, Srgb};
    use std::sync::Arc;

    fn color_map(colors: &[[u8; 3]]) -> ColorMap {
        let colors = colors.iter().map(|&c| cast::from_array(c)).collect::<Vec<Srgb<u8>>>();
        let root = VolumeBox::from_histogram(Arc::new(Histogram::new(&colors))).unwrap();
        ColorMap::new(vec![root])
    }

    #[test]
    fn policies_compare_count_and_occupancy() {
        let map = color_map(&[[0, 0, 0], [0, 0, 0], [255, 255, 255]]);
        let root = &map.boxes()[0];
        let dense = root.with_bounds([0, 0, 0], [0, 0, 0]).unwrap();
        let sparse = root.with_bounds([16, 16, 16], [31, 31, 31]).unwrap();

        assert_eq!(dense.count(), 2);
        assert_eq!(sparse.count(), 1);
        assert_eq!(by_population(&dense, &sparse), Ordering::Greater);
        assert_eq!(by_occupancy(&dense, &sparse), Ordering::Less);
        assert_eq!(Priority::Occupancy.compare(&dense, &sparse), Ordering::Less);
    }

    #[test]
    fn reaches_target() {
        let colors = crate::tests::test_data_1024();
        let root = VolumeBox::from_histogram(Arc::new(Histogram::new(&colors))).unwrap();
        let mut map = ColorMap::new(vec![root]);

        assert_eq!(refine(&mut map, 16, Priority::Population), Outcome::ReachedTarget);
        assert_eq!(map.len(), 16);
        assert_eq!(map.boxes().iter().map(VolumeBox::count).sum::<u64>(), 1024);
    }

    #[test]
    fn stalls_on_unsplittable_box() {
        let mut map = color_map(&[[10, 10, 10], [10, 10, 10], [250, 250, 250], [250, 250, 250]]);

        assert_eq!(refine(&mut map, 4, Priority::Population), Outcome::Stalled);
        assert_eq!(map.len(), 2);
        assert_eq!(map.boxes().iter().map(VolumeBox::count).sum::<u64>(), 4);
    }

    #[test]
    fn single_pixel_boxes_use_up_iterations() {
        let mut map = color_map(&[[10, 10, 10], [250, 250, 250]]);

        assert_eq!(refine(&mut map, 3, Priority::Population), Outcome::IterationLimit);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn empty_boxes_are_put_back() {
        let map = color_map(&[[0, 0, 0]]);
        let empty = map.boxes()[0].with_bounds([5, 5, 5], [9, 9, 9]).unwrap();
        let mut map = ColorMap::new(vec![empty]);

        assert_eq!(refine(&mut map, 2, Priority::Occupancy), Outcome::IterationLimit);
        assert_eq!(map.len(), 1);
        assert!(map.boxes()[0].is_empty());
    }
}
