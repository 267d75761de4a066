//! Splitting a box in two at the median of its longest axis.

use crate::{Channel, VolumeBox};

/// The result of a successful [`median_cut`].
#[derive(Debug, Clone)]
pub enum Cut {
    /// The box held a single pixel and was kept whole.
    Single(VolumeBox),
    /// The box was divided into a lower and an upper half along one channel.
    Pair(VolumeBox, VolumeBox),
}

/// Returns the channel with the most quantized levels in the box.
///
/// Ties go to red, then green, then blue.
#[must_use]
pub fn cut_channel(vbox: &VolumeBox) -> Channel {
    let mut best = Channel::Red;
    for channel in [Channel::Green, Channel::Blue] {
        if vbox.width(channel) > vbox.width(best) {
            best = channel;
        }
    }
    best
}

/// Returns the cumulative pixel counts along `channel`, one entry per level from the
/// lower bound of the box to its upper bound.
fn partial_sums(vbox: &VolumeBox, channel: Channel) -> Vec<u64> {
    let (min, max) = vbox.bounds();
    let histogram = vbox.histogram();
    let d = channel.index();
    let (d1, d2) = ((d + 1) % 3, (d + 2) % 3);

    let mut total = 0;
    (min[d]..=max[d])
        .map(|x| {
            let mut coords = [0; 3];
            coords[d] = x;
            for y in min[d1]..=max[d1] {
                coords[d1] = y;
                for z in min[d2]..=max[d2] {
                    coords[d2] = z;
                    total += u64::from(histogram.get(coords));
                }
            }
            total
        })
        .collect()
}

/// Finds the last level of the lower half when cutting along an axis spanning `lo..=hi`,
/// given the cumulative counts `partial` over that axis.
///
/// Returns `None` if no level in `lo..hi` leaves pixels on both sides.
fn cut_level(partial: &[u64], lo: i32, hi: i32) -> Option<i32> {
    let total = *partial.last()?;
    #[allow(clippy::cast_sign_loss)]
    let at = |level: i32| partial[(level - lo) as usize];

    // first level holding more than half of the pixels
    let median = (lo..=hi).find(|&level| 2 * at(level) > total)?;

    let left = median - lo;
    let right = hi - median;
    let mut cut = if left <= right {
        (hi - 1).min(median + right / 2)
    } else {
        lo.max((2 * (median - 1) - left) / 2)
    };

    while cut <= hi && at(cut) == 0 {
        cut += 1;
    }
    if cut > hi {
        return None;
    }

    while total == at(cut) && cut > lo && at(cut - 1) != 0 {
        cut -= 1;
    }

    (lo..hi).contains(&cut).then_some(cut)
}

/// Splits the given box along its longest axis so that each half holds roughly half of the pixels.
///
/// Returns `None` if the box is empty or cannot be divided into two non-empty halves
/// (for example, a single histogram cell holding several pixels).
/// A box with exactly one pixel is returned whole as [`Cut::Single`].
///
/// The halves are created with fresh caches over their own bounds.
#[must_use]
pub fn median_cut(vbox: &VolumeBox) -> Option<Cut> {
    match vbox.count() {
        0 => return None,
        1 => return Some(Cut::Single(vbox.clone())),
        _ => {}
    }

    let channel = cut_channel(vbox);
    if vbox.width(channel) == 1 {
        return None;
    }

    let d = channel.index();
    let (min, max) = vbox.bounds();
    let partial = partial_sums(vbox, channel);
    let cut = cut_level(&partial, i32::from(min[d]), i32::from(max[d]))?;
    let cut = u8::try_from(cut).ok()?;

    let mut lower_max = max;
    lower_max[d] = cut;
    let mut upper_min = min;
    upper_min[d] = cut + 1;

    Some(Cut::Pair(vbox.with_bounds(min, lower_max)?, vbox.with_bounds(upper_min, max)?))
}
