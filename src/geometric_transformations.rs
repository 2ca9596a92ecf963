use image::{
    Pixel,
    imageops::{FilterType, crop_imm, resize},
};
use imageproc::definitions::Image;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output size used for classifier patches, `(width, height)`.
pub const DEFAULT_OUTPUT_SIZE: (u32, u32) = (64, 64);

/// A rectangular search window over an image.
///
/// Coordinates are `(x, y)`. `start` is inclusive and `stop` is exclusive, so the window
/// covers columns `start.0..stop.0` and rows `start.1..stop.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: (u32, u32),
    pub stop: (u32, u32),
}

impl Window {
    /// Creates a window from its inclusive `start` and exclusive `stop` corners.
    ///
    /// # Arguments
    ///
    /// * `start` - `(x, y)` of the first pixel inside the window.
    /// * `stop` - `(x, y)` one past the last pixel inside the window.
    ///
    /// No ordering is enforced; a window whose `stop` does not lie past `start` is empty.
    pub fn new(start: (u32, u32), stop: (u32, u32)) -> Self {
        Self { start, stop }
    }

    /// Number of columns covered, 0 for an empty window.
    pub fn width(&self) -> u32 {
        self.stop.0.saturating_sub(self.start.0)
    }

    /// Number of rows covered, 0 for an empty window.
    pub fn height(&self) -> u32 {
        self.stop.1.saturating_sub(self.start.1)
    }

    /// Restricts the window to an image of the given size, like slicing does.
    ///
    /// Returns `None` if nothing of the window is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Window> {
        let clamped = Window {
            start: (self.start.0.min(width), self.start.1.min(height)),
            stop: (self.stop.0.min(width), self.stop.1.min(height)),
        };
        (clamped.width() > 0 && clamped.height() > 0).then_some(clamped)
    }
}

/// Crops `window` out of `outer` and resizes the crop to `output_size`.
///
/// The window is clamped to the image bounds before cropping. Resizing uses linear
/// (triangle) filtering.
///
/// # Arguments
///
/// * `outer` - The full image to cut the window from.
/// * `window` - The region to crop, in `outer`'s pixel coordinates.
/// * `output_size` - `(width, height)` of the returned image, usually [`DEFAULT_OUTPUT_SIZE`].
///
/// # Returns
///
/// A new image of exactly `output_size` holding the resized crop.
///
/// # Errors
///
/// * [`Error::InvalidOutputSize`] if either output dimension is zero.
/// * [`Error::EmptyWindow`] if the window holds no pixels once clamped.
///
/// # Examples
///
/// ```
/// use image::{Rgb, RgbImage};
/// use vision_debug_utils::geometric_transformations::{grab_inner_image, Window};
///
/// let outer = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
/// let patch = grab_inner_image(&outer, &Window::new((100, 50), (228, 178)), (64, 64)).unwrap();
///
/// assert_eq!(patch.dimensions(), (64, 64));
/// assert_eq!(patch.get_pixel(0, 0), &Rgb([10, 20, 30]));
/// ```
pub fn grab_inner_image<P>(
    outer: &Image<P>,
    window: &Window,
    output_size: (u32, u32),
) -> Result<Image<P>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (out_width, out_height) = output_size;
    if out_width == 0 || out_height == 0 {
        return Err(Error::InvalidOutputSize(out_width, out_height));
    }

    let (width, height) = outer.dimensions();
    let clamped = window.clamp_to(width, height).ok_or(Error::EmptyWindow { width, height })?;
    if clamped != *window {
        warn!("window {window:?} exceeds {width}x{height} image, clamped to {clamped:?}");
    }

    let crop = crop_imm(
        outer,
        clamped.start.0,
        clamped.start.1,
        clamped.width(),
        clamped.height(),
    )
    .to_image();

    debug!(
        "resizing {}x{} crop to {out_width}x{out_height}",
        crop.width(),
        crop.height()
    );

    Ok(resize(&crop, out_width, out_height, FilterType::Triangle))
}
