use image::{Rgb, Rgba};
use palette::{FromColor, Hsl, Srgb};

/// Generates `n` visually distinct colors spread evenly around the hue circle.
///
/// The first three of `contrasting_colors(3)` are pure-ish red, green and blue.
pub(crate) fn contrasting_colors(n: usize) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * 360.0) / n as f32;
            let srgb: Srgb<u8> = Srgb::from_color(Hsl::new(hue, 0.9, 0.5)).into_format();
            Rgb([srgb.red, srgb.green, srgb.blue])
        })
        .collect()
}

/// Same as [`contrasting_colors`] with a constant alpha channel.
pub(crate) fn contrasting_colors_rgba(n: usize, alpha: u8) -> Vec<Rgba<u8>> {
    contrasting_colors(n)
        .into_iter()
        .map(|Rgb([r, g, b])| Rgba([r, g, b, alpha]))
        .collect()
}
