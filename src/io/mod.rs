//! File reading: loaders for individual formats and path resolution.
//!
//! This module provides:
//! - `LoaderRegistry`: format detection over the registered `ArrayLoader`s
//! - `imread` / `magic_imread`: one file, a directory or a stack of files
//! - `PathReader`: the seam the viewer uses to read `path=` arguments
//!
//! ## Adding New Formats
//!
//! 1. Create a new loader in `loaders/` implementing `ArrayLoader`
//! 2. Register it in `LoaderRegistry::new()` or on a custom registry
//!
//! ```rust,ignore
//! use ndlayers::io::{ArrayLoader, LoaderError, LoaderRegistry, MagicImread};
//!
//! let mut registry = LoaderRegistry::new();
//! registry.register(Box::new(MyFormatLoader));
//! let viewer = Viewer::new().with_path_reader(MagicImread::with_registry(registry));
//! ```

mod loader;
pub mod loaders;
mod path;
mod read;

pub use loader::{ArrayLoader, LoaderError, LoaderRegistry};
pub use path::ImagePath;
pub use read::{MagicImread, PathReader, ReadError, imread, magic_imread};

#[cfg(test)]
pub(crate) use read::tests::scratch_dir;
