use std::collections::BTreeMap;

use image::{Luma, RgbImage, Rgba, RgbaImage};
use imageproc::{definitions::Image, drawing::Canvas};
use log::debug;

use crate::{
    colors::{contrasting_colors, contrasting_colors_rgba},
    drawing::{DEFAULT_BOX_COLOR, DEFAULT_BOX_THICKNESS, draw_box_outline_mut},
    rect::BoundingBox,
};

/// Computes one bounding box per labeled region of a label image.
///
/// `labels` is a label image as produced by
/// `imageproc::region_labelling::connected_components`: 0 is background and the number of
/// labels is the largest label present. Each box spans the minimum and maximum x and y of the
/// pixels carrying that label. Boxes are returned with their label, in ascending label order.
/// Labels that have no pixels are skipped.
///
/// # Examples
///
/// ```
/// use image::{ImageBuffer, Luma};
/// use vision_debug_utils::{rect::BoundingBox, region_labelling::labeled_bounding_boxes};
///
/// let mut labels = ImageBuffer::<Luma<u32>, Vec<u32>>::new(10, 10);
/// labels.put_pixel(2, 3, Luma([1]));
/// labels.put_pixel(4, 6, Luma([1]));
///
/// assert_eq!(
///     labeled_bounding_boxes(&labels),
///     vec![(1, BoundingBox::new((2, 3), (4, 6)))]
/// );
/// ```
pub fn labeled_bounding_boxes(labels: &Image<Luma<u32>>) -> Vec<(u32, BoundingBox)> {
    let mut boxes: BTreeMap<u32, BoundingBox> = BTreeMap::new();

    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel.0[0];
        if label == 0 {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        boxes
            .entry(label)
            .and_modify(|bbox| {
                bbox.top_left = (bbox.top_left.0.min(x), bbox.top_left.1.min(y));
                bbox.bottom_right = (bbox.bottom_right.0.max(x), bbox.bottom_right.1.max(y));
            })
            .or_insert_with(|| BoundingBox::new((x, y), (x, y)));
    }

    debug!("found {} labeled regions", boxes.len());

    boxes.into_iter().collect()
}

/// Returns a copy of `image` with the bounding box of every labeled region drawn on it,
/// using [`DEFAULT_BOX_COLOR`] and [`DEFAULT_BOX_THICKNESS`].
pub fn draw_labeled_bboxes(image: &RgbImage, labels: &Image<Luma<u32>>) -> RgbImage {
    let mut out = image.clone();
    draw_labeled_bboxes_mut(&mut out, labels, DEFAULT_BOX_COLOR, DEFAULT_BOX_THICKNESS);
    out
}

/// Draws the bounding box of every labeled region directly on `canvas`.
pub fn draw_labeled_bboxes_mut<C>(
    canvas: &mut C,
    labels: &Image<Luma<u32>>,
    color: C::Pixel,
    thickness: u32,
) where
    C: Canvas,
{
    for (_, bbox) in labeled_bounding_boxes(labels) {
        draw_box_outline_mut(canvas, &bbox, color, thickness);
    }
}

/// Like [`draw_labeled_bboxes`], but every region gets its own contrasting color.
pub fn draw_labeled_bboxes_colored(
    image: &RgbImage,
    labels: &Image<Luma<u32>>,
    thickness: u32,
) -> RgbImage {
    let mut out = image.clone();
    let boxes = labeled_bounding_boxes(labels);
    let colors = contrasting_colors(boxes.len());

    for ((_, bbox), color) in boxes.iter().zip(colors) {
        draw_box_outline_mut(&mut out, bbox, color, thickness);
    }

    out
}

/// Renders the `n` largest connected components in distinct colors.
///
/// Components are ranked by pixel count. Every pixel that is background (label 0) or
/// belongs to a smaller component is painted `background`. Ties are broken by the lower
/// label.
pub fn draw_principal_connected_components(
    labels: &Image<Luma<u32>>,
    n: usize,
    background: Rgba<u8>,
) -> RgbaImage {
    let mut areas: BTreeMap<u32, usize> = BTreeMap::new();
    for pixel in labels.pixels() {
        let label = pixel.0[0];
        if label != 0 {
            *areas.entry(label).or_insert(0) += 1;
        }
    }

    // Ascending label order makes the stable sort break ties by the lower label.
    let mut ranked: Vec<(u32, usize)> = areas.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);

    let palette: BTreeMap<u32, Rgba<u8>> = ranked
        .iter()
        .map(|&(label, _)| label)
        .zip(contrasting_colors_rgba(ranked.len(), 255))
        .collect();

    RgbaImage::from_fn(labels.width(), labels.height(), |x, y| {
        palette
            .get(&labels.get_pixel(x, y).0[0])
            .copied()
            .unwrap_or(background)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use imageproc::region_labelling::{Connectivity, connected_components};

    /// Builds a label image from `(label, x0, y0, x1, y1)` filled rectangles.
    fn label_image(
        width: u32,
        height: u32,
        regions: &[(u32, u32, u32, u32, u32)],
    ) -> Image<Luma<u32>> {
        let mut labels = ImageBuffer::new(width, height);
        for &(label, x0, y0, x1, y1) in regions {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    labels.put_pixel(x, y, Luma([label]));
                }
            }
        }
        labels
    }

    #[test]
    fn test_no_labels() {
        let labels = label_image(8, 8, &[]);
        assert!(labeled_bounding_boxes(&labels).is_empty());

        let image = RgbImage::new(8, 8);
        assert_eq!(draw_labeled_bboxes(&image, &labels), image);
    }

    #[test]
    fn test_boxes_in_label_order() {
        let labels = label_image(40, 40, &[(2, 1, 1, 5, 3), (1, 20, 10, 30, 35)]);
        assert_eq!(
            labeled_bounding_boxes(&labels),
            vec![
                (1, BoundingBox::new((20, 10), (30, 35))),
                (2, BoundingBox::new((1, 1), (5, 3))),
            ]
        );
    }

    #[test]
    fn test_missing_labels_are_skipped() {
        let labels = label_image(10, 10, &[(3, 4, 4, 6, 6)]);
        assert_eq!(
            labeled_bounding_boxes(&labels),
            vec![(3, BoundingBox::new((4, 4), (6, 6)))]
        );
    }

    #[test]
    fn test_sparse_large_labels() {
        let mut labels = label_image(3, 2, &[]);
        labels.put_pixel(0, 0, Luma([u32::MAX]));
        labels.put_pixel(2, 1, Luma([1 << 25]));
        labels.put_pixel(1, 1, Luma([u32::MAX]));

        assert_eq!(
            labeled_bounding_boxes(&labels),
            vec![
                (1 << 25, BoundingBox::new((2, 1), (2, 1))),
                (u32::MAX, BoundingBox::new((0, 0), (1, 1))),
            ]
        );

        let background = Rgba([0, 0, 0, 255]);
        let colored = draw_principal_connected_components(&labels, 1, background);
        let colors = contrasting_colors_rgba(1, 255);
        assert_eq!(colored.get_pixel(0, 0), &colors[0]);
        assert_eq!(colored.get_pixel(1, 1), &colors[0]);
        assert_eq!(colored.get_pixel(2, 1), &background);
    }

    #[test]
    fn test_non_convex_region_spans_all_pixels() {
        let labels = label_image(20, 20, &[(1, 2, 2, 3, 3), (1, 15, 12, 16, 17)]);
        assert_eq!(
            labeled_bounding_boxes(&labels),
            vec![(1, BoundingBox::new((2, 2), (16, 17)))]
        );
    }

    #[test]
    fn test_with_connected_components() {
        let mut binary = image::GrayImage::new(30, 30);
        for (x, y) in [(2, 2), (3, 2), (3, 3), (20, 25), (21, 26)] {
            binary.put_pixel(x, y, Luma([255]));
        }
        let labels = connected_components(&binary, Connectivity::Eight, Luma([0]));
        let boxes: Vec<BoundingBox> = labeled_bounding_boxes(&labels)
            .into_iter()
            .map(|(_, bbox)| bbox)
            .collect();

        assert_eq!(boxes.len(), 2);
        assert!(boxes.contains(&BoundingBox::new((2, 2), (3, 3))));
        assert!(boxes.contains(&BoundingBox::new((20, 25), (21, 26))));
    }

    #[test]
    fn test_draw_labeled_bboxes_uses_defaults() {
        let labels = label_image(40, 40, &[(1, 15, 15, 24, 24)]);
        let image = RgbImage::new(40, 40);
        let drawn = draw_labeled_bboxes(&image, &labels);

        // Thickness 6 covers offsets -3..=2 around each edge.
        assert_eq!(drawn.get_pixel(12, 20), &DEFAULT_BOX_COLOR);
        assert_eq!(drawn.get_pixel(17, 20), &DEFAULT_BOX_COLOR);
        assert_eq!(drawn.get_pixel(11, 20), &Rgb([0, 0, 0]));
        assert_eq!(drawn.get_pixel(18, 20), &Rgb([0, 0, 0]));
        assert_eq!(drawn.get_pixel(20, 20), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_labeled_bboxes_colored() {
        let labels = label_image(20, 20, &[(1, 2, 2, 6, 6), (2, 10, 10, 15, 15)]);
        let drawn = draw_labeled_bboxes_colored(&RgbImage::new(20, 20), &labels, 1);
        let colors = contrasting_colors(2);

        assert_eq!(drawn.get_pixel(2, 4), &colors[0]);
        assert_eq!(drawn.get_pixel(15, 12), &colors[1]);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn test_principal_components() {
        let labels = label_image(10, 10, &[(1, 0, 0, 0, 0), (2, 2, 2, 5, 5), (3, 7, 7, 8, 8)]);
        let background = Rgba([0, 0, 0, 255]);
        let colored = draw_principal_connected_components(&labels, 2, background);
        let colors = contrasting_colors_rgba(2, 255);

        // Label 2 has 16 pixels, label 3 has 4, label 1 has 1.
        assert_eq!(colored.get_pixel(3, 3), &colors[0]);
        assert_eq!(colored.get_pixel(7, 7), &colors[1]);
        assert_eq!(colored.get_pixel(0, 0), &background);
        assert_eq!(colored.get_pixel(9, 0), &background);
    }

    #[test]
    fn test_principal_components_zero() {
        let labels = label_image(4, 4, &[(1, 0, 0, 3, 3)]);
        let background = Rgba([1, 2, 3, 4]);
        let colored = draw_principal_connected_components(&labels, 0, background);
        assert!(colored.pixels().all(|p| *p == background));
    }
}
