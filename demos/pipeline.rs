//! Runs every helper on a synthetic road scene and writes the results to `target/demo`.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::{
    drawing::draw_filled_rect_mut,
    rect::Rect,
    region_labelling::{Connectivity, connected_components},
};
use vision_debug_utils::{
    contrast::apply_threshold,
    drawing::{DEFAULT_BOX_COLOR, DEFAULT_BOX_THICKNESS, draw_boxes},
    geometric_transformations::{DEFAULT_OUTPUT_SIZE, Window, grab_inner_image},
    grid::{ColorMap, GridLayout, show_images, show_images_from_paths},
    plot::{Plot3dOptions, plot3d},
    rect::BoundingBox,
    region_labelling::draw_labeled_bboxes,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let out_dir = Path::new("target/demo");
    std::fs::create_dir_all(out_dir)?;

    // 1. A gray road with two "cars".
    let mut scene = RgbImage::from_pixel(320, 180, Rgb([90, 90, 90]));
    draw_filled_rect_mut(&mut scene, Rect::at(40, 90).of_size(60, 40), Rgb([200, 30, 30]));
    draw_filled_rect_mut(&mut scene, Rect::at(200, 100).of_size(80, 50), Rgb([240, 240, 240]));
    scene.save(out_dir.join("scene.png"))?;

    // 2. Overlapping detections accumulate into a heatmap.
    let detections = [
        BoundingBox::new((35, 85), (95, 125)),
        BoundingBox::new((45, 95), (105, 135)),
        BoundingBox::new((195, 95), (275, 145)),
        BoundingBox::new((205, 105), (285, 155)),
        BoundingBox::new((120, 20), (150, 50)),
    ];
    let drawn = draw_boxes(&scene, &detections, DEFAULT_BOX_COLOR, 2);
    drawn.save(out_dir.join("detections.png"))?;

    let mut heatmap: ImageBuffer<Luma<u32>, Vec<u32>> = ImageBuffer::new(320, 180);
    for bbox in &detections {
        for (x, y, heat) in heatmap.enumerate_pixels_mut() {
            if bbox.contains(x as i32, y as i32) {
                heat.0[0] += 1;
            }
        }
    }

    // 3. A single stray detection is false positive noise.
    let heatmap = apply_threshold(&heatmap, 1);
    let labels = connected_components(&heatmap, Connectivity::Eight, Luma([0]));
    let cars = draw_labeled_bboxes(&scene, &labels);
    cars.save(out_dir.join("cars.png"))?;
    log::info!("thick boxes drawn with thickness {DEFAULT_BOX_THICKNESS}");

    // 4. Classifier patch of one window.
    let patch = grab_inner_image(&scene, &Window::new((30, 80), (110, 140)), DEFAULT_OUTPUT_SIZE)?;
    patch.save(out_dir.join("patch.png"))?;

    // 5. Color distribution of the scene.
    let axes = plot3d(&scene, &scene, Plot3dOptions::default())?;
    axes.save(out_dir.join("rgb_scatter.png"))?;

    // 6. Everything side by side.
    let heat_view = DynamicImage::ImageLuma8(ImageBuffer::from_fn(320, 180, |x, y| {
        Luma([heatmap.get_pixel(x, y).0[0].min(255) as u8])
    }));
    let figure = show_images(
        &[
            ("detections", DynamicImage::ImageRgb8(drawn)),
            ("heat", heat_view),
            ("cars", DynamicImage::ImageRgb8(cars)),
            ("patch", DynamicImage::ImageRgb8(patch)),
        ],
        &GridLayout {
            rows: 2,
            cell_size: (320, 180),
            color_map: ColorMap::Hot,
            ..Default::default()
        },
    )?;
    figure.save(out_dir.join("overview.png"))?;

    let from_disk = show_images_from_paths(
        &[out_dir.join("scene.png"), out_dir.join("rgb_scatter.png")],
        &GridLayout::default(),
    )?;
    from_disk.save(out_dir.join("from_disk.png"))?;

    println!("Saved results to {}", out_dir.display());
    Ok(())
}
