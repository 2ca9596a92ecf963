use image::Pixel;
use imageproc::definitions::Image;
use num_traits::Zero;

/// Returns a copy of `image` where every channel value at or below `threshold` is zeroed.
///
/// Values strictly above `threshold` are kept unchanged. This is typically applied to a
/// detection heatmap to drop regions with too few overlapping detections.
///
/// # Examples
///
/// ```
/// use image::{ImageBuffer, Luma};
/// use vision_debug_utils::contrast::apply_threshold;
///
/// let heatmap = ImageBuffer::<Luma<u32>, Vec<u32>>::from_raw(4, 1, vec![0, 1, 2, 3]).unwrap();
/// let thresholded = apply_threshold(&heatmap, 1);
///
/// assert_eq!(thresholded.into_raw(), vec![0, 0, 2, 3]);
/// ```
pub fn apply_threshold<P>(image: &Image<P>, threshold: P::Subpixel) -> Image<P>
where
    P: Pixel,
{
    let mut out = image.clone();
    apply_threshold_mut(&mut out, threshold);
    out
}

/// Zeroes every channel value at or below `threshold`, in place.
pub fn apply_threshold_mut<P>(image: &mut Image<P>, threshold: P::Subpixel)
where
    P: Pixel,
{
    for pixel in image.pixels_mut() {
        for value in pixel.channels_mut() {
            if *value <= threshold {
                *value = P::Subpixel::zero();
            }
        }
    }
}
