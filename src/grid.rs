//! Grid figures of titled images.

use std::path::{Path, PathBuf};

use image::{
    DynamicImage, Rgb, RgbImage,
    imageops::{FilterType, overlay, resize},
};
use imageproc::rect::Rect;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How single-channel images are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    #[default]
    Gray,
    /// Black through red and yellow to white, handy for heatmaps.
    Hot,
}

impl ColorMap {
    /// Maps `t` in `[0, 1]` to a color.
    pub fn color(self, t: f32) -> Rgb<u8> {
        let t = t.clamp(0.0, 1.0);
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        match self {
            ColorMap::Gray => {
                let v = to_u8(t);
                Rgb([v, v, v])
            }
            ColorMap::Hot => Rgb([
                to_u8(t / 0.365),
                to_u8((t - 0.365) / 0.381),
                to_u8((t - 0.746) / 0.254),
            ]),
        }
    }
}

/// Layout of a grid figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub rows: u32,
    /// `(width, height)` of every cell in pixels.
    pub cell_size: (u32, u32),
    /// Gap between cells and around the border.
    pub spacing: u32,
    pub background: [u8; 3],
    pub color_map: ColorMap,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 1,
            cell_size: (400, 300),
            spacing: 8,
            background: [255, 255, 255],
            color_map: ColorMap::Gray,
        }
    }
}

/// Where one titled image landed in a [`Figure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub bounds: Rect,
}

/// A rendered grid of images.
#[derive(Debug, Clone)]
pub struct Figure {
    pub image: RgbImage,
    pub panels: Vec<Panel>,
}

impl Figure {
    /// Writes the figure to `path`, in the format given by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Arranges `titled_images` into a grid with `layout.rows` rows.
///
/// The number of columns is the number of images divided by the number of rows, rounded up.
/// Images fill the grid row by row; each one is scaled to fit its cell with its aspect ratio
/// preserved and centred in it. Single-channel images are min-max normalized and colored
/// with `layout.color_map`.
///
/// # Errors
///
/// * [`Error::NoImages`] if `titled_images` is empty.
/// * [`Error::InvalidLayout`] if `layout.rows` or a cell dimension is zero, or if the figure
///   would be larger than `u32::MAX` pixels along an axis.
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, RgbImage};
/// use vision_debug_utils::grid::{show_images, GridLayout};
///
/// let images = vec![
///     ("left", DynamicImage::ImageRgb8(RgbImage::new(40, 30))),
///     ("right", DynamicImage::ImageRgb8(RgbImage::new(40, 30))),
/// ];
/// let layout = GridLayout { cell_size: (40, 30), spacing: 0, ..Default::default() };
/// let figure = show_images(&images, &layout).unwrap();
///
/// assert_eq!(figure.image.dimensions(), (80, 30));
/// assert_eq!(figure.panels[1].title, "right");
/// ```
pub fn show_images<S>(titled_images: &[(S, DynamicImage)], layout: &GridLayout) -> Result<Figure>
where
    S: AsRef<str>,
{
    if titled_images.is_empty() {
        return Err(Error::NoImages);
    }
    if layout.rows == 0 {
        return Err(Error::InvalidLayout("rows must be at least 1"));
    }
    let (cell_width, cell_height) = layout.cell_size;
    if cell_width == 0 || cell_height == 0 {
        return Err(Error::InvalidLayout("cell size must be non-zero"));
    }

    let rows = layout.rows;
    let columns = u32::try_from(titled_images.len())
        .map_err(|_| Error::InvalidLayout("too many images"))?
        .div_ceil(rows);
    let spacing = layout.spacing;
    let width = figure_extent(columns, cell_width, spacing)
        .ok_or(Error::InvalidLayout("figure width overflows"))?;
    let height = figure_extent(rows, cell_height, spacing)
        .ok_or(Error::InvalidLayout("figure height overflows"))?;

    debug!(
        "laying out {} images on a {rows}x{columns} grid ({width}x{height})",
        titled_images.len()
    );

    let mut canvas = RgbImage::from_pixel(width, height, Rgb(layout.background));
    let mut panels = Vec::with_capacity(titled_images.len());

    for (i, (title, image)) in titled_images.iter().enumerate() {
        let (row, column) = (i as u32 / columns, i as u32 % columns);
        let rgb = to_display_rgb(image, layout.color_map);
        let fitted = fit_into(&rgb, cell_width, cell_height, Rgb(layout.background));

        let x = spacing + column * (cell_width + spacing) + (cell_width - fitted.width()) / 2;
        let y = spacing + row * (cell_height + spacing) + (cell_height - fitted.height()) / 2;
        overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));

        panels.push(Panel {
            title: title.as_ref().to_owned(),
            bounds: Rect::at(x as i32, y as i32).of_size(fitted.width(), fitted.height()),
        });
    }

    Ok(Figure {
        image: canvas,
        panels,
    })
}

/// Total size along one axis of `cells` cells of size `cell` with `spacing` between and
/// around them, or `None` on overflow.
fn figure_extent(cells: u32, cell: u32, spacing: u32) -> Option<u32> {
    cells
        .checked_mul(cell)?
        .checked_add(cells.checked_add(1)?.checked_mul(spacing)?)
}

/// Loads every image in `paths` and arranges them with [`show_images`], titled by path.
///
/// # Arguments
///
/// * `paths` - Image files to load, in grid order. Each panel is titled with its path.
/// * `layout` - The grid layout, as for [`show_images`].
///
/// # Errors
///
/// Returns [`Error::Load`] for the first path that cannot be opened or decoded, and the
/// errors of [`show_images`] otherwise.
pub fn show_images_from_paths<P>(paths: &[P], layout: &GridLayout) -> Result<Figure>
where
    P: AsRef<Path>,
{
    let titled_images = paths
        .iter()
        .map(|path| path.as_ref().display().to_string())
        .zip(paths_to_images(paths))
        .map(|(title, image)| image.map(|image| (title, image)))
        .collect::<Result<Vec<_>>>()?;

    show_images(&titled_images, layout)
}

/// Lazily loads the images in `paths`.
pub fn paths_to_images<I>(paths: I) -> impl Iterator<Item = Result<DynamicImage>>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    paths.into_iter().map(|path| {
        let path = path.as_ref();
        image::open(path).map_err(|source| Error::Load {
            path: PathBuf::from(path),
            source,
        })
    })
}

/// Converts any image to RGB for display, coloring single-channel images with `color_map`.
fn to_display_rgb(image: &DynamicImage, color_map: ColorMap) -> RgbImage {
    if image.color().has_color() {
        return image.to_rgb8();
    }

    let luma = image.to_luma32f();
    let (min, max) = luma
        .pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0[0]), hi.max(p.0[0]))
        });
    let range = max - min;

    RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
        let v = luma.get_pixel(x, y).0[0];
        let t = if range > 0.0 { (v - min) / range } else { 0.0 };
        color_map.color(t)
    })
}

/// Scales `image` to the largest size fitting `width` x `height` with the same aspect ratio.
///
/// An empty image becomes a single `background` pixel.
fn fit_into(image: &RgbImage, width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbImage::from_pixel(1, 1, background);
    }
    let scale = (width as f32 / w as f32).min(height as f32 / h as f32);
    let new_width = ((w as f32 * scale).round() as u32).clamp(1, width);
    let new_height = ((h as f32 * scale).round() as u32).clamp(1, height);
    resize(image, new_width, new_height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn layout(rows: u32, cell: (u32, u32), spacing: u32) -> GridLayout {
        GridLayout {
            rows,
            cell_size: cell,
            spacing,
            ..Default::default()
        }
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_single_row_layout() {
        let images = vec![
            ("a", solid(10, 10, [255, 0, 0])),
            ("b", solid(10, 10, [0, 255, 0])),
            ("c", solid(10, 10, [0, 0, 255])),
        ];
        let figure = show_images(&images, &layout(1, (10, 10), 2)).unwrap();

        assert_eq!(figure.image.dimensions(), (3 * 10 + 4 * 2, 10 + 2 * 2));
        assert_eq!(figure.panels.len(), 3);
        assert_eq!(figure.panels[2].bounds, Rect::at(26, 2).of_size(10, 10));
        assert_eq!(figure.image.get_pixel(3, 3), &Rgb([255, 0, 0]));
        assert_eq!(figure.image.get_pixel(15, 3), &Rgb([0, 255, 0]));
        assert_eq!(figure.image.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_multi_row_layout_rounds_columns_up() {
        let images: Vec<_> = (0..5).map(|i| (format!("{i}"), solid(4, 4, [0; 3]))).collect();
        let figure = show_images(&images, &layout(2, (4, 4), 0)).unwrap();

        // 5 images on 2 rows need 3 columns.
        assert_eq!(figure.image.dimensions(), (12, 8));
        assert_eq!(figure.panels[3].bounds, Rect::at(0, 4).of_size(4, 4));
        assert_eq!(figure.panels[4].title, "4");
        // The sixth cell stays empty.
        assert_eq!(figure.image.get_pixel(10, 6), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_images_keep_aspect_ratio() {
        let images = vec![("wide", solid(40, 10, [9, 9, 9]))];
        let figure = show_images(&images, &layout(1, (20, 20), 0)).unwrap();
        assert_eq!(figure.panels[0].bounds, Rect::at(0, 7).of_size(20, 5));
    }

    #[test]
    fn test_grayscale_is_normalized() {
        let gray = GrayImage::from_raw(3, 1, vec![50, 100, 150]).unwrap();
        let images = vec![("gray", DynamicImage::ImageLuma8(gray))];
        let figure = show_images(&images, &layout(1, (3, 1), 0)).unwrap();

        assert_eq!(figure.image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        let mid = figure.image.get_pixel(1, 0).0;
        assert!((127..=128).contains(&mid[0]) && mid[0] == mid[1] && mid[1] == mid[2]);
        assert_eq!(figure.image.get_pixel(2, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_constant_grayscale_maps_to_low_end() {
        let gray = GrayImage::from_pixel(2, 2, Luma([77]));
        let rgb = to_display_rgb(&DynamicImage::ImageLuma8(gray), ColorMap::Hot);
        assert!(rgb.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_hot_color_map() {
        assert_eq!(ColorMap::Hot.color(0.0), Rgb([0, 0, 0]));
        assert_eq!(ColorMap::Hot.color(1.0), Rgb([255, 255, 255]));
        let mid = ColorMap::Hot.color(0.5);
        assert_eq!(mid.0[0], 255);
        assert_eq!(mid.0[2], 0);
    }

    #[test]
    fn test_invalid_layouts() {
        let none: Vec<(&str, DynamicImage)> = Vec::new();
        assert!(matches!(
            show_images(&none, &GridLayout::default()),
            Err(Error::NoImages)
        ));

        let images = vec![("a", solid(1, 1, [0; 3]))];
        assert!(matches!(
            show_images(&images, &layout(0, (10, 10), 0)),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            show_images(&images, &layout(1, (0, 10), 0)),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_oversized_layout_is_an_error() {
        let images = vec![("a", solid(1, 1, [0; 3])), ("b", solid(1, 1, [0; 3]))];
        let huge: GridLayout =
            serde_json::from_str(r#"{"cell_size": [4294967295, 10]}"#).unwrap();
        assert!(matches!(
            show_images(&images, &huge),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            show_images(&images, &layout(1, (10, 10), u32::MAX)),
            Err(Error::InvalidLayout(_))
        ));
        assert_eq!(figure_extent(3, 10, 2), Some(38));
        assert_eq!(figure_extent(2, u32::MAX / 2, 1), None);
    }

    #[test]
    fn test_missing_path_is_reported() {
        let result = show_images_from_paths(&["does/not/exist.png"], &GridLayout::default());
        match result {
            Err(Error::Load { path, .. }) => assert_eq!(path, PathBuf::from("does/not/exist.png")),
            other => panic!("expected a load error, got {other:?}"),
        }
    }

    #[test]
    fn test_show_images_from_paths() {
        let dir = std::env::temp_dir().join(format!("vision-debug-utils-grid-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let paths: Vec<PathBuf> = (0..2)
            .map(|i| {
                let path = dir.join(format!("{i}.png"));
                RgbImage::from_pixel(8, 6, Rgb([i * 100, 0, 0])).save(&path).unwrap();
                path
            })
            .collect();

        let figure = show_images_from_paths(&paths, &layout(1, (8, 6), 0)).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(figure.image.dimensions(), (16, 6));
        assert_eq!(figure.panels[1].title, paths[1].display().to_string());
        assert_eq!(figure.image.get_pixel(9, 1), &Rgb([100, 0, 0]));
    }

    #[test]
    fn test_layout_from_json() {
        let layout: GridLayout =
            serde_json::from_str(r#"{"rows": 2, "color_map": "hot"}"#).unwrap();
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.color_map, ColorMap::Hot);
        assert_eq!(layout.cell_size, (400, 300));
    }
}
