//! ndlayers - layer ingestion for an n-dimensional image viewer
//!
//! Typed constructors for image, labels, points, shapes, surface and vectors
//! layers, a registrar that wires every layer's events to the viewer, and an
//! adapter that turns paths and untyped reader-plugin results into layers.
//!
//! ```no_run
//! use ndlayers::Viewer;
//!
//! let mut viewer = Viewer::new();
//! viewer.add_path("cells.npy", false)?;
//! # Ok::<(), ndlayers::ViewerError>(())
//! ```

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod io;
pub mod layers;
pub mod plugins;
pub mod viewer;

pub use config::{ConfigError, ViewerConfig};
pub use data::{ArrayData, ImageData, LayerData, LayerDataTuple, Metadata};
pub use error::{Result, ViewerError};
pub use layers::{Layer, LayerId, LayerKind};
pub use viewer::{Added, Viewer, ViewerHandlers};
