use std::path::PathBuf;

/// Errors returned by the fallible helpers of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("window is empty after clamping to a {width}x{height} image")]
    EmptyWindow { width: u32, height: u32 },
    #[error("output size must be non-zero, got {0}x{1}")]
    InvalidOutputSize(u32, u32),
    #[error("expected at least 3 channels, got {0}")]
    NotEnoughChannels(u8),
    #[error("image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },
    #[error("axis {axis} limits ({lo}, {hi}) must be finite with lo < hi")]
    InvalidAxisLimits { axis: usize, lo: f32, hi: f32 },
    #[error("canvas size must be non-zero, got {0}x{1}")]
    InvalidCanvasSize(u32, u32),
    #[error("no images to show")]
    NoImages,
    #[error("invalid grid layout: {0}")]
    InvalidLayout(&'static str),
    #[error("failed to load {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
