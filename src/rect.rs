use image::math::Rect;
use imageproc::point::Point;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An axis-aligned box given by two inclusive corner pixels, as in OpenCV's `rectangle`.
///
/// A box whose corners coincide covers exactly one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: (i32, i32),
    pub bottom_right: (i32, i32),
}

impl BoundingBox {
    /// Creates a box from two opposite corners, in any order.
    pub fn new(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            top_left: (a.0.min(b.0), a.1.min(b.1)),
            bottom_right: (a.0.max(b.0), a.1.max(b.1)),
        }
    }

    /// Number of pixel columns covered, saturating at `u32::MAX`.
    pub fn width(&self) -> u32 {
        self.bottom_right.0.abs_diff(self.top_left.0).saturating_add(1)
    }

    /// Number of pixel rows covered, saturating at `u32::MAX`.
    pub fn height(&self) -> u32 {
        self.bottom_right.1.abs_diff(self.top_left.1).saturating_add(1)
    }

    /// Returns `true` if the pixel `(x, y)` lies inside the box.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.top_left.0..=self.bottom_right.0).contains(&x)
            && (self.top_left.1..=self.bottom_right.1).contains(&y)
    }

    /// Computes the smallest box enclosing all `points`.
    ///
    /// Generic over numeric types that implement `PartialOrd`, so both integer and
    /// floating-point coordinates are accepted. Fractional coordinates are truncated and
    /// coordinates that do not fit in an `i32` become 0.
    ///
    /// Returns `None` if `points` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use imageproc::point::Point;
    /// use vision_debug_utils::rect::BoundingBox;
    ///
    /// let points = [Point::new(4, 9), Point::new(12, 3), Point::new(7, 5)];
    /// let bbox = BoundingBox::from_points(&points).unwrap();
    ///
    /// assert_eq!(bbox.top_left, (4, 3));
    /// assert_eq!(bbox.bottom_right, (12, 9));
    /// ```
    pub fn from_points<T>(points: &[Point<T>]) -> Option<Self>
    where
        T: Copy + PartialOrd + ToPrimitive,
    {
        let (min_x, min_y, max_x, max_y) = extremes(points)?;
        let to_i32 = |v: T| v.to_i32().unwrap_or(0);

        // Out-of-range fallbacks can swap the corners, so normalize again.
        Some(Self::new(
            (to_i32(min_x), to_i32(min_y)),
            (to_i32(max_x), to_i32(max_y)),
        ))
    }

    /// Converts into an [`imageproc::rect::Rect`] covering the same pixels.
    pub fn to_rect(&self) -> imageproc::rect::Rect {
        imageproc::rect::Rect::at(self.top_left.0, self.top_left.1)
            .of_size(self.width(), self.height())
    }
}

/// Calculates the axis-aligned bounding box of a rotated rectangle's vertices.
///
/// This function is designed to work with the output of `imageproc::geometry::min_area_rect`.
/// Coordinates are converted to `u32`: negative ones become 0, and the full `u32` range is
/// kept. The returned width and height are the distances between the extreme coordinates
/// (so a degenerate rectangle has zero size).
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use vision_debug_utils::rect::to_axis_aligned_bounding_box;
///
/// let rotated_rect_vertices = [
///     Point { x: 50.0, y: 10.0 },
///     Point { x: 90.0, y: 50.0 },
///     Point { x: 50.0, y: 90.0 },
///     Point { x: 10.0, y: 50.0 },
/// ];
///
/// let bounding_box = to_axis_aligned_bounding_box(&rotated_rect_vertices);
///
/// assert_eq!(bounding_box.x, 10);
/// assert_eq!(bounding_box.y, 10);
/// assert_eq!(bounding_box.width, 80);
/// assert_eq!(bounding_box.height, 80);
/// ```
pub fn to_axis_aligned_bounding_box<T>(vertices: &[Point<T>; 4]) -> Rect
where
    T: Copy + PartialOrd + ToPrimitive,
{
    let to_u32 = |v: T| v.to_u32().unwrap_or(0);

    // Four vertices always have extremes.
    let Some((min_x, min_y, max_x, max_y)) = extremes(vertices) else {
        return Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    };

    let x = to_u32(min_x);
    let y = to_u32(min_y);

    Rect {
        x,
        y,
        width: to_u32(max_x).saturating_sub(x),
        height: to_u32(max_y).saturating_sub(y),
    }
}

/// Finds `(min_x, min_y, max_x, max_y)` over `points`, or `None` if there are none.
fn extremes<T>(points: &[Point<T>]) -> Option<(T, T, T, T)>
where
    T: Copy + PartialOrd,
{
    let (first, rest) = points.split_first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    // Manual comparison because `T` only has `PartialOrd`; floats do not implement `Ord`.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    Some((min_x, min_y, max_x, max_y))
}
