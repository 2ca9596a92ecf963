use image::{Pixel, Rgb};
use imageproc::{
    definitions::Image,
    drawing::{Canvas, draw_filled_rect_mut},
    rect::Rect,
};

use crate::rect::BoundingBox;

/// Box color used when none is given.
pub const DEFAULT_BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Outline thickness used when none is given.
pub const DEFAULT_BOX_THICKNESS: u32 = 6;

/// Returns a copy of `image` with every box in `boxes` outlined in `color`.
///
/// The outline is `thickness` pixels wide and centred on the box border. Parts of a box
/// that fall outside the image are clipped.
///
/// # Examples
///
/// ```
/// use image::{Rgb, RgbImage};
/// use vision_debug_utils::{drawing::draw_boxes, rect::BoundingBox};
///
/// let image = RgbImage::new(20, 20);
/// let boxes = [BoundingBox::new((5, 5), (14, 14))];
/// let drawn = draw_boxes(&image, &boxes, Rgb([0, 0, 255]), 1);
///
/// assert_eq!(drawn.get_pixel(5, 10), &Rgb([0, 0, 255]));
/// assert_eq!(drawn.get_pixel(10, 10), &Rgb([0, 0, 0]));
/// ```
pub fn draw_boxes<P>(image: &Image<P>, boxes: &[BoundingBox], color: P, thickness: u32) -> Image<P>
where
    P: Pixel,
{
    let mut out = image.clone();
    draw_boxes_mut(&mut out, boxes, color, thickness);
    out
}

/// Outlines every box in `boxes` directly on `canvas`. See [`draw_boxes`].
pub fn draw_boxes_mut<C>(canvas: &mut C, boxes: &[BoundingBox], color: C::Pixel, thickness: u32)
where
    C: Canvas,
{
    for bbox in boxes {
        draw_box_outline_mut(canvas, bbox, color, thickness);
    }
}

/// Draws the four edge bands of a single box.
pub(crate) fn draw_box_outline_mut<C>(
    canvas: &mut C,
    bbox: &BoundingBox,
    color: C::Pixel,
    thickness: u32,
) where
    C: Canvas,
{
    if thickness == 0 {
        return;
    }

    let t = thickness.min(i32::MAX as u32) as i32;
    let before = t / 2;
    let (x1, y1) = bbox.top_left;
    let (x2, y2) = bbox.bottom_right;

    let outer_left = x1.saturating_sub(before);
    let outer_top = y1.saturating_sub(before);
    let outer_width = bbox.width().saturating_add(thickness - 1);
    let outer_height = bbox.height().saturating_add(thickness - 1);

    let bands = [
        Rect::at(outer_left, y1.saturating_sub(before)).of_size(outer_width, thickness),
        Rect::at(outer_left, y2.saturating_sub(before)).of_size(outer_width, thickness),
        Rect::at(x1.saturating_sub(before), outer_top).of_size(thickness, outer_height),
        Rect::at(x2.saturating_sub(before), outer_top).of_size(thickness, outer_height),
    ];

    for band in bands {
        draw_filled_rect_mut(canvas, band, color);
    }
}
