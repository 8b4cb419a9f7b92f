//! Data payloads that flow from readers into layer constructors.
//!
//! This module provides:
//! - `ArrayData`: an n-dimensional array with a runtime element type
//! - `LayerData`: untyped plugin payloads (one array, a list, or a mesh)
//! - `LayerDataTuple`: a plugin result of data, metadata and layer type
//!
//! Conversions into the typed input of each layer constructor live on
//! `LayerData` (`into_image_data`, `into_coordinates`, ...).

mod array;
mod layer_data;

pub use array::{ArrayData, DType};
pub use layer_data::{ImageData, LayerData, LayerDataTuple, Metadata, SurfaceData};
