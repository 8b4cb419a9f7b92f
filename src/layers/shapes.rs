//! Shape layers: rectangles, ellipses, lines, paths and polygons.

use ndarray::{Array2, s};
use serde::Deserialize;

use crate::constants::{MIN_LAYER_NDIM, OVERLAY_OPACITY};
use crate::layers::base::{Blending, CommonParams, LayerBase};
use crate::layers::{LayerError, LayerKind, LayerParams, OneOrMany};

/// Geometry type of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Rectangle,
    Ellipse,
    Line,
    Path,
    Polygon,
}

impl ShapeType {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Line => "line",
            ShapeType::Path => "path",
            ShapeType::Polygon => "polygon",
        }
    }

    /// Minimum number of vertices.
    fn min_vertices(&self) -> usize {
        match self {
            ShapeType::Rectangle | ShapeType::Ellipse | ShapeType::Line | ShapeType::Path => 2,
            ShapeType::Polygon => 3,
        }
    }
}

/// Parameters of [`Viewer::add_shapes`](crate::Viewer::add_shapes).
///
/// Everything except `name` may be given once or per shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapesParams {
    pub shape_type: OneOrMany<ShapeType>,
    pub edge_width: OneOrMany<f64>,
    pub edge_color: OneOrMany<String>,
    pub face_color: OneOrMany<String>,
    /// Drawing priority; higher values are drawn on top
    pub z_index: OneOrMany<i64>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub common: CommonParams,
}

impl Default for ShapesParams {
    fn default() -> Self {
        Self {
            shape_type: OneOrMany::One(ShapeType::Rectangle),
            edge_width: OneOrMany::One(1.0),
            edge_color: OneOrMany::One("black".to_string()),
            face_color: OneOrMany::One("white".to_string()),
            z_index: OneOrMany::One(0),
            name: None,
            common: CommonParams::default(),
        }
    }
}

impl ShapesParams {
    pub fn shape_type(mut self, shape_type: impl Into<OneOrMany<ShapeType>>) -> Self {
        self.shape_type = shape_type.into();
        self
    }

    pub fn z_index(mut self, z_index: impl Into<OneOrMany<i64>>) -> Self {
        self.z_index = z_index.into();
        self
    }
}

impl LayerParams for ShapesParams {
    const KIND: LayerKind = LayerKind::Shapes;
    const FIELDS: &'static [&'static str] = &[
        "shape_type",
        "edge_width",
        "edge_color",
        "face_color",
        "z_index",
        "name",
    ];
}

/// One shape of a shapes layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub shape_type: ShapeType,
    /// `(V, D)` vertices.
    pub data: Array2<f64>,
    pub edge_width: f64,
    pub edge_color: String,
    pub face_color: String,
    pub z_index: i64,
}

/// A collection of shapes sharing one dimensionality.
#[derive(Debug)]
pub struct Shapes {
    pub(crate) base: LayerBase,
    shapes: Vec<Shape>,
    ndim: usize,
}

impl Shapes {
    pub fn new(data: Vec<Array2<f64>>, params: ShapesParams) -> Result<Self, LayerError> {
        Self::with_ndim(data, MIN_LAYER_NDIM, params)
    }

    /// Like [`Shapes::new`], using `ndim` when `data` is empty.
    pub fn with_ndim(
        data: Vec<Array2<f64>>,
        ndim: usize,
        params: ShapesParams,
    ) -> Result<Self, LayerError> {
        let n = data.len();
        let ndim = data.first().map_or(ndim, |shape| shape.ncols());
        if let Some(shape) = data.iter().find(|shape| shape.ncols() != ndim) {
            return Err(LayerError::invalid_shape(format!(
                "all shapes must have {} columns, found {}",
                ndim,
                shape.ncols()
            )));
        }

        let types = params.shape_type.expand("shape_type", n)?;
        let edge_widths = params.edge_width.expand("edge_width", n)?;
        let edge_colors = params.edge_color.expand("edge_color", n)?;
        let face_colors = params.face_color.expand("face_color", n)?;
        let z_indices = params.z_index.expand("z_index", n)?;

        let shapes = data
            .into_iter()
            .zip(types)
            .zip(edge_widths)
            .zip(edge_colors.into_iter().zip(face_colors))
            .zip(z_indices)
            .map(
                |((((vertices, shape_type), edge_width), (edge_color, face_color)), z_index)| {
                    Ok(Shape {
                        data: normalize_vertices(shape_type, vertices)?,
                        shape_type,
                        edge_width,
                        edge_color,
                        face_color,
                        z_index,
                    })
                },
            )
            .collect::<Result<Vec<_>, LayerError>>()?;

        let base = LayerBase::new(
            LayerKind::Shapes,
            params.name,
            params.common,
            OVERLAY_OPACITY,
            Blending::Translucent,
            &shapes_extent(&shapes, ndim),
        )?;

        Ok(Self {
            base,
            shapes,
            ndim,
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Indices of the shapes from top to bottom.
    pub fn z_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.shapes.len()).collect();
        order.sort_by(|&a, &b| self.shapes[b].z_index.cmp(&self.shapes[a].z_index));
        order
    }

    /// Append a shape using the layer's current style.
    pub fn add(&mut self, shape_type: ShapeType, vertices: Array2<f64>) -> Result<(), LayerError> {
        if vertices.ncols() != self.ndim {
            return Err(LayerError::invalid_shape(format!(
                "shape has {} columns but the layer has {} dimensions",
                vertices.ncols(),
                self.ndim
            )));
        }
        let template = self.shapes.last();
        let shape = Shape {
            shape_type,
            data: normalize_vertices(shape_type, vertices)?,
            edge_width: template.map_or(1.0, |s| s.edge_width),
            edge_color: template.map_or_else(|| "black".to_string(), |s| s.edge_color.clone()),
            face_color: template.map_or_else(|| "white".to_string(), |s| s.face_color.clone()),
            z_index: self.shapes.iter().map(|s| s.z_index).max().map_or(0, |z| z + 1),
        };
        self.shapes.push(shape);
        let extent = shapes_extent(&self.shapes, self.ndim);
        self.base.data_changed(&extent);
        Ok(())
    }
}

/// Check the vertex count and expand two-corner boxes to four corners.
fn normalize_vertices(
    shape_type: ShapeType,
    vertices: Array2<f64>,
) -> Result<Array2<f64>, LayerError> {
    let count = vertices.nrows();
    let valid = match shape_type {
        ShapeType::Rectangle | ShapeType::Ellipse => count == 2 || count == 4,
        ShapeType::Line => count == 2,
        ShapeType::Path | ShapeType::Polygon => count >= shape_type.min_vertices(),
    };
    if !valid {
        return Err(LayerError::invalid_shape(format!(
            "{} cannot have {} vertices",
            shape_type.name(),
            count
        )));
    }

    let box_like = matches!(shape_type, ShapeType::Rectangle | ShapeType::Ellipse);
    if !box_like || count == 4 || vertices.ncols() < 2 {
        return Ok(vertices);
    }

    // Corners a, b span the box in the last two dimensions.
    let d = vertices.ncols();
    let (a, b) = (vertices.row(0), vertices.row(1));
    let mut corners = Array2::zeros((4, d));
    corners.row_mut(0).assign(&a);
    corners.row_mut(1).assign(&a);
    corners[[1, d - 1]] = b[d - 1];
    corners.row_mut(2).assign(&b);
    corners.row_mut(3).assign(&b);
    corners[[3, d - 1]] = a[d - 1];
    Ok(corners)
}

fn shapes_extent(shapes: &[Shape], ndim: usize) -> Vec<(f64, f64)> {
    (0..ndim)
        .map(|axis| {
            shapes
                .iter()
                .flat_map(|shape| shape.data.slice(s![.., axis]).to_vec())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .unwrap_or((0.0, 1.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_empty_placeholder_keeps_ndim() {
        let shapes = Shapes::with_ndim(Vec::new(), 3, ShapesParams::default()).unwrap();
        assert!(shapes.is_empty());
        assert_eq!(shapes.ndim(), 3);
        assert_eq!(shapes.base().dims().ndim(), 3);
        assert_eq!(shapes.base().opacity(), 0.7);
    }

    #[test]
    fn test_rectangle_from_two_corners() {
        let shapes = Shapes::new(vec![arr2(&[[0.0, 0.0], [2.0, 3.0]])], ShapesParams::default())
            .unwrap();
        let rect = &shapes.shapes()[0];
        assert_eq!(rect.data, arr2(&[[0.0, 0.0], [0.0, 3.0], [2.0, 3.0], [2.0, 0.0]]));
    }

    #[test]
    fn test_vertex_counts_are_checked() {
        let line = arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        let params = ShapesParams::default().shape_type(ShapeType::Line);
        assert!(Shapes::new(vec![line], params).is_err());

        let polygon = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let params = ShapesParams::default().shape_type(ShapeType::Polygon);
        assert!(Shapes::new(vec![polygon], params).is_err());
    }

    #[test]
    fn test_mixed_columns_rejected() {
        let data = vec![arr2(&[[0.0, 0.0], [1.0, 1.0]]), arr2(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])];
        let params = ShapesParams::default().shape_type(ShapeType::Path);
        assert!(matches!(
            Shapes::new(data, params),
            Err(LayerError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_z_order_highest_first() {
        let data = vec![
            arr2(&[[0.0, 0.0], [1.0, 1.0]]),
            arr2(&[[0.0, 0.0], [2.0, 2.0]]),
            arr2(&[[0.0, 0.0], [3.0, 3.0]]),
        ];
        let params = ShapesParams::default().z_index(OneOrMany::Many(vec![1, 5, 1]));
        let shapes = Shapes::new(data, params).unwrap();
        assert_eq!(shapes.z_order(), vec![1, 0, 2]);
    }

    #[test]
    fn test_add_places_shape_on_top() {
        let mut shapes = Shapes::new(vec![arr2(&[[0.0, 0.0], [1.0, 1.0]])], ShapesParams::default())
            .unwrap();
        shapes
            .add(ShapeType::Polygon, arr2(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0]]))
            .unwrap();
        assert_eq!(shapes.z_order()[0], 1);
        assert_eq!(shapes.base().dims().range()[1], (0.0, 4.0, 1.0));
    }
}
