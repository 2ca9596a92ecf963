//! Visualization and image-manipulation helpers for detection pipelines, built on [imageproc].
//!
//! The utility functions are organized into modules the same categories (as possible) as in [imageproc].

mod colors;
pub mod contrast;
pub mod drawing;
mod error;
pub mod geometric_transformations;
pub mod grid;
pub mod plot;
pub mod rect;
pub mod region_labelling;

pub use error::{Error, Result};
