//! Untyped layer payloads and their conversion into typed constructor input.

use std::fmt;

use ndarray::{Array2, ArrayD, Axis, Ix2};

use crate::data::ArrayData;
use crate::layers::LayerError;

/// Arbitrary key-value mapping attached to layers and plugin results.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Image or label data: a single array or a pyramid of decreasing resolutions.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// One array.
    Single(ArrayData),
    /// Arrays of the same content, largest first.
    Pyramid(Vec<ArrayData>),
}

impl ImageData {
    /// The full resolution array.
    pub fn base(&self) -> Option<&ArrayData> {
        match self {
            ImageData::Single(array) => Some(array),
            ImageData::Pyramid(levels) => levels.first(),
        }
    }

    /// The lowest resolution array, cheapest to scan for value ranges.
    pub fn coarsest(&self) -> Option<&ArrayData> {
        match self {
            ImageData::Single(array) => Some(array),
            ImageData::Pyramid(levels) => levels.last(),
        }
    }

    pub fn is_pyramid(&self) -> bool {
        matches!(self, ImageData::Pyramid(_))
    }

    pub fn levels(&self) -> &[ArrayData] {
        match self {
            ImageData::Single(array) => std::slice::from_ref(array),
            ImageData::Pyramid(levels) => levels,
        }
    }

    /// Shape of the full resolution array.
    pub fn shape(&self) -> &[usize] {
        self.base().map(ArrayData::shape).unwrap_or(&[])
    }
}

impl From<ArrayData> for ImageData {
    fn from(array: ArrayData) -> Self {
        ImageData::Single(array)
    }
}

impl From<Vec<ArrayData>> for ImageData {
    fn from(levels: Vec<ArrayData>) -> Self {
        ImageData::Pyramid(levels)
    }
}

impl<T> From<ArrayD<T>> for ImageData
where
    ArrayData: From<ArrayD<T>>,
{
    fn from(array: ArrayD<T>) -> Self {
        ImageData::Single(ArrayData::from(array))
    }
}

/// Mesh data for surface layers.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceData {
    /// `(V, D)` vertex coordinates.
    pub vertices: Array2<f64>,
    /// `(F, 3)` vertex indices per triangle.
    pub faces: Array2<usize>,
    /// Per-vertex values, vertex axis last: `(V,)` or `(..., V)`.
    pub values: ArrayD<f64>,
}

impl SurfaceData {
    pub fn new(vertices: Array2<f64>, faces: Array2<usize>, values: ArrayD<f64>) -> Self {
        Self {
            vertices,
            faces,
            values,
        }
    }
}

/// Raw data handed over by a plugin before the layer kind is decided.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    /// A single array.
    Array(ArrayData),
    /// A list of arrays (pyramid levels, shapes, or a surface triple).
    Arrays(Vec<ArrayData>),
    /// An already assembled surface mesh.
    Surface(SurfaceData),
}

impl LayerData {
    /// Element type when the payload is a single array.
    pub fn dtype(&self) -> Option<crate::data::DType> {
        match self {
            LayerData::Array(array) => Some(array.dtype()),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            LayerData::Array(array) => {
                format!("{} array of shape {:?}", array.dtype(), array.shape())
            }
            LayerData::Arrays(arrays) => format!("list of {} arrays", arrays.len()),
            LayerData::Surface(_) => "surface mesh".to_string(),
        }
    }

    /// Interpret as image or label data.
    pub fn into_image_data(self) -> Result<ImageData, LayerError> {
        match self {
            LayerData::Array(array) => Ok(ImageData::Single(array)),
            LayerData::Arrays(levels) => Ok(ImageData::Pyramid(levels)),
            other => Err(LayerError::invalid_data(format!(
                "expected an array or a pyramid, got {}",
                other.describe()
            ))),
        }
    }

    /// Interpret as an `(N, D)` coordinate table.
    pub fn into_coordinates(self) -> Result<Array2<f64>, LayerError> {
        match self {
            LayerData::Array(array) => to_matrix(&array),
            other => Err(LayerError::invalid_data(format!(
                "expected an (N, D) array of coordinates, got {}",
                other.describe()
            ))),
        }
    }

    /// Interpret as a list of `(V, D)` shapes.
    pub fn into_shapes(self) -> Result<Vec<Array2<f64>>, LayerError> {
        match self {
            LayerData::Array(array) if array.ndim() == 3 => {
                let data = array.to_f64();
                data.axis_iter(Axis(0))
                    .map(|shape| {
                        shape
                            .to_owned()
                            .into_dimensionality::<Ix2>()
                            .map_err(|e| LayerError::invalid_shape(e.to_string()))
                    })
                    .collect()
            }
            LayerData::Array(array) => Ok(vec![to_matrix(&array)?]),
            LayerData::Arrays(arrays) => arrays.iter().map(to_matrix).collect(),
            other => Err(LayerError::invalid_data(format!(
                "expected shape vertices, got {}",
                other.describe()
            ))),
        }
    }

    /// Interpret as a `(vertices, faces, values)` mesh.
    pub fn into_surface(self) -> Result<SurfaceData, LayerError> {
        match self {
            LayerData::Surface(surface) => Ok(surface),
            LayerData::Arrays(arrays) if arrays.len() == 3 => {
                let vertices = to_matrix(&arrays[0])?;
                let faces = arrays[1]
                    .to_indices()
                    .ok_or_else(|| {
                        LayerError::invalid_data("surface faces must be non-negative integers")
                    })?
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| LayerError::invalid_shape(format!("surface faces: {}", e)))?;
                let values = arrays[2].to_f64();
                Ok(SurfaceData::new(vertices, faces, values))
            }
            other => Err(LayerError::invalid_data(format!(
                "expected (vertices, faces, values), got {}",
                other.describe()
            ))),
        }
    }

    /// Interpret as vector data, either `(N, 2, D)` or a projection grid.
    pub fn into_vectors(self) -> Result<ArrayD<f64>, LayerError> {
        match self {
            LayerData::Array(array) => Ok(array.to_f64()),
            other => Err(LayerError::invalid_data(format!(
                "expected a vector array, got {}",
                other.describe()
            ))),
        }
    }
}

fn to_matrix(array: &ArrayData) -> Result<Array2<f64>, LayerError> {
    array
        .to_f64()
        .into_dimensionality::<Ix2>()
        .map_err(|_| {
            LayerError::invalid_shape(format!(
                "expected a 2D array, got shape {:?}",
                array.shape()
            ))
        })
}

impl From<ArrayData> for LayerData {
    fn from(array: ArrayData) -> Self {
        LayerData::Array(array)
    }
}

impl From<Vec<ArrayData>> for LayerData {
    fn from(arrays: Vec<ArrayData>) -> Self {
        LayerData::Arrays(arrays)
    }
}

impl From<SurfaceData> for LayerData {
    fn from(surface: SurfaceData) -> Self {
        LayerData::Surface(surface)
    }
}

impl<T> From<ArrayD<T>> for LayerData
where
    ArrayData: From<ArrayD<T>>,
{
    fn from(array: ArrayD<T>) -> Self {
        LayerData::Array(ArrayData::from(array))
    }
}

/// One result of a plugin reader: data, optional metadata, optional layer type.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDataTuple {
    pub data: LayerData,
    pub meta: Option<Metadata>,
    pub layer_type: Option<String>,
}

impl LayerDataTuple {
    /// Data without metadata; the layer type is inferred on dispatch.
    pub fn new(data: impl Into<LayerData>) -> Self {
        Self {
            data: data.into(),
            meta: None,
            layer_type: None,
        }
    }

    pub fn with_meta(mut self, meta: Metadata) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_layer_type(mut self, layer_type: impl Into<String>) -> Self {
        self.layer_type = Some(layer_type.into());
        self
    }
}

impl fmt::Display for LayerDataTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {} metadata keys, type {})",
            self.data.describe(),
            self.meta.as_ref().map_or(0, |m| m.len()),
            self.layer_type.as_deref().unwrap_or("<infer>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, arr2};

    #[test]
    fn test_shapes_from_3d_array() {
        let data = LayerData::from(Array3::<f64>::zeros((2, 4, 3)).into_dyn());
        let shapes = data.into_shapes().unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].dim(), (4, 3));
    }

    #[test]
    fn test_surface_from_triple() {
        let vertices = ArrayData::from(arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]]).into_dyn());
        let faces = ArrayData::from(arr2(&[[0i64, 1, 2]]).into_dyn());
        let values = ArrayData::from(ndarray::arr1(&[0.5f32, 1.0, 2.0]).into_dyn());

        let surface = LayerData::Arrays(vec![vertices, faces, values])
            .into_surface()
            .unwrap();
        assert_eq!(surface.faces[[0, 2]], 2);
        assert_eq!(surface.values.len(), 3);
    }

    #[test]
    fn test_surface_rejects_float_faces() {
        let vertices = ArrayData::from(arr2(&[[0.0, 0.0]]).into_dyn());
        let faces = ArrayData::from(arr2(&[[0.0f64, 1.0, 2.0]]).into_dyn());
        let values = ArrayData::from(ndarray::arr1(&[0.5f64]).into_dyn());

        let err = LayerData::Arrays(vec![vertices, faces, values])
            .into_surface()
            .unwrap_err();
        assert!(err.to_string().contains("faces"));
    }

    #[test]
    fn test_coordinates_require_2d() {
        let data = LayerData::from(Array3::<f64>::zeros((1, 2, 3)).into_dyn());
        assert!(matches!(
            data.into_coordinates(),
            Err(LayerError::InvalidShape { .. })
        ));
    }
}
