//! Offscreen 3D scatter plots of pixel color distributions.
//!
//! Plots are rasterized into an [`RgbImage`] with an orthographic projection of the axis
//! limits cube. The three axes starting at the lower corner are drawn red, green and blue in
//! channel order, the remaining edges of the cube in gray.

use std::path::Path;

use image::{GenericImageView, Pixel, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::debug;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    colors::contrasting_colors,
    error::{Error, Result},
};

const FRAME_COLOR: Rgb<u8> = Rgb([160, 160, 160]);

/// Rendering options of [`plot3d`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plot3dOptions {
    /// Names of the x, y and z axes, usually the color channels.
    pub axis_labels: [String; 3],
    /// `(low, high)` limits of the x, y and z axes.
    pub axis_limits: [(f32, f32); 3],
    /// Canvas `(width, height)` in pixels.
    pub size: (u32, u32),
    /// Camera elevation above the xy plane, in degrees.
    pub elevation: f32,
    /// Camera rotation around the z axis, in degrees.
    pub azimuth: f32,
    /// Marker radius in pixels. Zero draws single pixels.
    pub point_radius: i32,
    pub background: [u8; 3],
}

impl Default for Plot3dOptions {
    fn default() -> Self {
        Self {
            axis_labels: ["R", "G", "B"].map(String::from),
            axis_limits: [(0.0, 255.0); 3],
            size: (800, 800),
            elevation: 30.0,
            azimuth: -60.0,
            point_radius: 1,
            background: [255, 255, 255],
        }
    }
}

/// A rendered 3D axes that more points can be added to.
#[derive(Debug, Clone)]
pub struct Axes3d {
    image: RgbImage,
    options: Plot3dOptions,
    scale: f32,
}

/// A projected point: screen position and how close it is to the camera.
struct Projected {
    x: f32,
    y: f32,
    closeness: f32,
}

impl Axes3d {
    /// Creates an empty axes with the frame drawn.
    pub fn new(options: Plot3dOptions) -> Result<Self> {
        for (axis, &(lo, hi)) in options.axis_limits.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(Error::InvalidAxisLimits { axis, lo, hi });
            }
        }
        let (width, height) = options.size;
        if width == 0 || height == 0 {
            return Err(Error::InvalidCanvasSize(width, height));
        }

        let mut axes = Self {
            image: RgbImage::from_pixel(width, height, Rgb(options.background)),
            scale: width.min(height) as f32 / 1.9,
            options,
        };
        axes.draw_frame();
        Ok(axes)
    }

    /// Maps a point in data coordinates to canvas coordinates.
    ///
    /// Returns `None` for points outside the axis limits.
    pub fn project(&self, point: [f32; 3]) -> Option<(f32, f32)> {
        self.project_with_depth(point).map(|p| (p.x, p.y))
    }

    /// Draws every `(point, color)` pair as a marker, far points first.
    ///
    /// Returns the number of points drawn; points outside the axis limits are skipped.
    pub fn scatter<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = ([f32; 3], Rgb<u8>)>,
    {
        let mut total = 0usize;
        let mut projected: Vec<(Projected, Rgb<u8>)> = points
            .into_iter()
            .filter_map(|(point, color)| {
                total += 1;
                self.project_with_depth(point).map(|p| (p, color))
            })
            .collect();
        projected.sort_unstable_by(|a, b| a.0.closeness.total_cmp(&b.0.closeness));

        let radius = self.options.point_radius;
        for (p, color) in &projected {
            let center = (p.x.round() as i32, p.y.round() as i32);
            if radius > 0 {
                draw_filled_circle_mut(&mut self.image, center, radius, *color);
            } else if let (Ok(x), Ok(y)) = (u32::try_from(center.0), u32::try_from(center.1))
                && self.image.in_bounds(x, y)
            {
                self.image.put_pixel(x, y, *color);
            }
        }

        if projected.len() < total {
            debug!(
                "skipped {} of {} points outside the axis limits",
                total - projected.len(),
                total
            );
        }
        projected.len()
    }

    /// Names of the x, y and z axes, in the colors of the drawn axes (red, green, blue).
    pub fn axis_labels(&self) -> &[String; 3] {
        &self.options.axis_labels
    }

    /// The rendered plot.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Writes the rendered plot to `path`, in the format given by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if encoding or writing fails.
    pub fn save<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    fn project_with_depth(&self, point: [f32; 3]) -> Option<Projected> {
        let mut n = [0.0f32; 3];
        for (axis, (&value, &(lo, hi))) in point.iter().zip(&self.options.axis_limits).enumerate() {
            if !(lo..=hi).contains(&value) {
                return None;
            }
            n[axis] = (value - lo) / (hi - lo) - 0.5;
        }
        Some(self.project_normalized(n))
    }

    /// Projects a point of the centred unit cube.
    fn project_normalized(&self, n: [f32; 3]) -> Projected {
        let (sa, ca) = self.options.azimuth.to_radians().sin_cos();
        let (se, ce) = self.options.elevation.to_radians().sin_cos();

        let xr = n[0] * ca - n[1] * sa;
        let yr = n[0] * sa + n[1] * ca;
        let up = yr * se + n[2] * ce;

        let (width, height) = self.image.dimensions();
        Projected {
            x: width as f32 / 2.0 + xr * self.scale,
            y: height as f32 / 2.0 - up * self.scale,
            closeness: n[2] * se - yr * ce,
        }
    }

    fn draw_frame(&mut self) {
        let corner = |bits: usize| {
            [0, 1, 2].map(|axis| if bits & (1 << axis) == 0 { -0.5 } else { 0.5 })
        };

        // Edges of the cube connect corners differing in exactly one bit.
        let mut axes = Vec::with_capacity(3);
        for from in 0..8usize {
            for axis in 0..3 {
                let to = from | (1 << axis);
                if to == from {
                    continue;
                }
                if from == 0 {
                    axes.push((corner(from), corner(to)));
                } else {
                    self.draw_segment(corner(from), corner(to), FRAME_COLOR);
                }
            }
        }

        for ((from, to), color) in axes.into_iter().zip(contrasting_colors(3)) {
            self.draw_segment(from, to, color);
        }
    }

    fn draw_segment(&mut self, from: [f32; 3], to: [f32; 3], color: Rgb<u8>) {
        let a = self.project_normalized(from);
        let b = self.project_normalized(to);
        draw_line_segment_mut(&mut self.image, (a.x, a.y), (b.x, b.y), color);
    }
}

/// Scatter-plots the color channels of `pixels` in 3D.
///
/// The first three channels of every pixel of `pixels` are its x, y and z coordinates, and
/// the pixel of `colors_rgb` at the same location is its marker color. This is typically
/// used to see how a color space separates object pixels from background.
///
/// # Errors
///
/// * [`Error::NotEnoughChannels`] if `pixels` has fewer than three channels.
/// * [`Error::DimensionMismatch`] if the two images differ in size.
/// * The option errors of [`Axes3d::new`].
pub fn plot3d<I>(pixels: &I, colors_rgb: &RgbImage, options: Plot3dOptions) -> Result<Axes3d>
where
    I: GenericImageView,
{
    let channels = <I::Pixel as Pixel>::CHANNEL_COUNT;
    if channels < 3 {
        return Err(Error::NotEnoughChannels(channels));
    }
    if pixels.dimensions() != colors_rgb.dimensions() {
        return Err(Error::DimensionMismatch {
            left: pixels.dimensions(),
            right: colors_rgb.dimensions(),
        });
    }

    let mut axes = Axes3d::new(options)?;
    axes.scatter(pixels.pixels().map(|(x, y, pixel)| {
        let c = pixel.channels();
        let coord = |i: usize| c[i].to_f32().unwrap_or(f32::NAN);
        ([coord(0), coord(1), coord(2)], *colors_rgb.get_pixel(x, y))
    }));

    Ok(axes)
}
