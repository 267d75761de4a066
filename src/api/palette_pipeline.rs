//! Contains the [`PalettePipeline`] builder struct for the high level API.

use crate::{quantize_srgb, ColorComponents, ColorMap, Error, MaxColors, OutputDepth};
use palette::cast;
#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::ComponentsAs, palette::Srgb};

/// A builder struct to specify options to create a color palette or [`ColorMap`]
/// for a set of pixels.
///
/// # Examples
/// ```
/// # use mmcq::{PalettePipeline, MaxColors, OutputDepth, Error};
/// # use palette::Srgb;
/// # fn main() -> Result<(), Error> {
/// let pixels = vec![Srgb::new(0u8, 0, 0), Srgb::new(2, 1, 3), Srgb::new(200, 180, 90)];
///
/// let palette = PalettePipeline::new(&pixels)
///     .max_colors(MaxColors::try_from(16u16)?)
///     .output_depth(OutputDepth::Four)
///     .greyscale(true)
///     .palette()?;
///
/// assert!(palette.contains(&Srgb::new(0, 0, 0)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PalettePipeline<'a, Color>
where
    Color: ColorComponents,
{
    /// The pixels to quantize.
    pub(crate) pixels: &'a [Color],
    /// The maximum number of palette colors.
    pub(crate) max_colors: MaxColors,
    /// The bit depth the palette must fit in, if any.
    pub(crate) output_depth: Option<OutputDepth>,
    /// Whether to snap the darkest and brightest colors to black and white.
    pub(crate) greyscale: bool,
}

impl<'a, Color> PalettePipeline<'a, Color>
where
    Color: ColorComponents,
{
    /// Creates a new [`PalettePipeline`] with default options:
    /// up to [`MaxColors::MAX`] colors, no output depth, and no greyscale snapping.
    #[must_use]
    pub fn new(pixels: &'a [Color]) -> Self {
        Self {
            pixels,
            max_colors: MaxColors::default(),
            output_depth: None,
            greyscale: false,
        }
    }

    /// Creates a new [`PalettePipeline`] with as many colors as the given output depth can index.
    #[must_use]
    pub fn for_output_depth(pixels: &'a [Color], depth: OutputDepth) -> Self {
        Self::new(pixels)
            .max_colors(MaxColors::from_clamped(depth.max_colors()))
            .output_depth(depth)
    }

    /// Sets the maximum number of colors in the palette.
    ///
    /// The default is [`MaxColors::MAX`].
    #[must_use]
    pub fn max_colors(mut self, max_colors: MaxColors) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Sets the bit depth that the palette indices must fit in.
    ///
    /// This does not change the number of colors;
    /// running the pipeline fails if the number of colors does not fit.
    #[must_use]
    pub fn output_depth(mut self, depth: OutputDepth) -> Self {
        self.output_depth = Some(depth);
        self
    }

    /// Sets whether a near-black darkest color and a near-white brightest color
    /// should be snapped to pure black and white (see [`ColorMap::greyscale`]).
    ///
    /// The default is `false`.
    #[must_use]
    pub fn greyscale(mut self, greyscale: bool) -> Self {
        self.greyscale = greyscale;
        self
    }

    /// Checks the options against each other.
    fn check(&self) -> Result<(), Error> {
        if let Some(depth) = self.output_depth {
            depth.check(self.max_colors)?;
        }
        Ok(())
    }

    /// Applies the post-processing options to a computed color map.
    fn finish(&self, mut color_map: ColorMap) -> ColorMap {
        if self.greyscale {
            color_map.greyscale();
        }
        color_map
    }

    /// Runs the pipeline and returns the [`ColorMap`].
    ///
    /// # Errors
    /// Returns [`Error::EmptyInput`] if there are no pixels
    /// or [`Error::InvalidOutputDepth`] if the output depth cannot hold the palette.
    pub fn color_map(self) -> Result<ColorMap, Error> {
        self.check()?;
        let color_map = quantize_srgb(self.pixels, self.max_colors)?;
        Ok(self.finish(color_map))
    }

    /// Runs the pipeline and returns the palette colors.
    ///
    /// # Errors
    /// See [`PalettePipeline::color_map`].
    pub fn palette(self) -> Result<Vec<Color>, Error> {
        let color_map = self.color_map()?;
        Ok(color_map
            .palette()
            .into_iter()
            .map(|srgb| cast::from_array(cast::into_array(srgb)))
            .collect())
    }
}

#[cfg(feature = "threads")]
impl<'a, Color> PalettePipeline<'a, Color>
where
    Color: ColorComponents + Sync,
{
    /// Runs the pipeline in parallel and returns the [`ColorMap`].
    ///
    /// # Errors
    /// See [`PalettePipeline::color_map`].
    pub fn color_map_par(self) -> Result<ColorMap, Error> {
        self.check()?;
        let mut color_map = crate::quantize_srgb_par(self.pixels, self.max_colors)?;
        color_map.compute_averages_par();
        Ok(self.finish(color_map))
    }

    /// Runs the pipeline in parallel and returns the palette colors.
    ///
    /// # Errors
    /// See [`PalettePipeline::color_map`].
    pub fn palette_par(self) -> Result<Vec<Color>, Error> {
        let color_map = self.color_map_par()?;
        Ok(color_map
            .palette()
            .into_iter()
            .map(|srgb| cast::from_array(cast::into_array(srgb)))
            .collect())
    }
}

#[cfg(feature = "image")]
impl<'a> From<&'a RgbImage> for PalettePipeline<'a, Srgb<u8>> {
    fn from(image: &'a RgbImage) -> Self {
        let pixels = image.pixels().len();
        Self::new(image.as_raw()[..(pixels * 3)].components_as())
    }
}
