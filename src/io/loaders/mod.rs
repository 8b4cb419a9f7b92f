//! Built-in array loaders.
//!
//! This module contains implementations of the `ArrayLoader` trait
//! for various file formats.

mod image_loader;
mod npy_loader;

pub use image_loader::ImageLoader;
pub use npy_loader::NpyLoader;
