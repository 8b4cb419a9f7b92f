//! Vector layers: line segments anchored at positions.

use ndarray::{Array3, ArrayD, Axis, Dimension, Ix3};
use serde::Deserialize;

use crate::constants::OVERLAY_OPACITY;
use crate::layers::base::{Blending, CommonParams, LayerBase};
use crate::layers::{LayerError, LayerKind, LayerParams};

/// Parameters of [`Viewer::add_vectors`](crate::Viewer::add_vectors).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VectorsParams {
    pub edge_width: f64,
    pub edge_color: String,
    /// Multiplier on each projection when drawn
    pub length: f64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub common: CommonParams,
}

impl Default for VectorsParams {
    fn default() -> Self {
        Self {
            edge_width: 1.0,
            edge_color: "red".to_string(),
            length: 1.0,
            name: None,
            common: CommonParams::default(),
        }
    }
}

impl VectorsParams {
    pub fn length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }
}

impl LayerParams for VectorsParams {
    const KIND: LayerKind = LayerKind::Vectors;
    const FIELDS: &'static [&'static str] = &[
        "edge_width",
        "edge_color",
        "length",
        "name",
    ];
}

/// `N` vectors stored as `(N, 2, D)`: position then projection.
#[derive(Debug)]
pub struct Vectors {
    pub(crate) base: LayerBase,
    data: Array3<f64>,
    edge_width: f64,
    edge_color: String,
    length: f64,
}

impl Vectors {
    /// Accepts `(N, 2, D)` coordinates or a grid of projections whose last
    /// axis has one entry per remaining axis.
    pub fn new(data: ArrayD<f64>, params: VectorsParams) -> Result<Self, LayerError> {
        if params.edge_width < 0.0 {
            return Err(LayerError::invalid_parameter("edge_width", "must not be negative"));
        }
        if !params.length.is_finite() {
            return Err(LayerError::invalid_parameter("length", "must be finite"));
        }
        let data = to_coordinates(data)?;
        let base = LayerBase::new(
            LayerKind::Vectors,
            params.name,
            params.common,
            OVERLAY_OPACITY,
            Blending::Translucent,
            &vectors_extent(&data, params.length),
        )?;

        Ok(Self {
            base,
            data,
            edge_width: params.edge_width,
            edge_color: params.edge_color,
            length: params.length,
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_width(&self) -> f64 {
        self.edge_width
    }

    pub fn edge_color(&self) -> &str {
        &self.edge_color
    }

    pub fn length(&self) -> f64 {
        self.length
    }
}

fn to_coordinates(data: ArrayD<f64>) -> Result<Array3<f64>, LayerError> {
    let shape = data.shape().to_vec();
    if shape.len() == 3 && shape[1] == 2 {
        return data
            .into_dimensionality::<Ix3>()
            .map_err(|e| LayerError::invalid_shape(e.to_string()));
    }

    // Projection grid: every cell anchors a vector at its own index.
    let Some((&components, grid)) = shape.split_last() else {
        return Err(LayerError::invalid_shape("vector data cannot be zero-dimensional"));
    };
    if grid.is_empty() || components != grid.len() {
        return Err(LayerError::invalid_shape(format!(
            "expected (N, 2, D) or a grid with last axis {}, got {:?}",
            shape.len().saturating_sub(1),
            shape
        )));
    }

    let cells: usize = grid.iter().product();
    let mut out = Array3::zeros((cells, 2, components));
    for (cell, (index, projection)) in ndarray::indices(grid)
        .into_iter()
        .zip(data.lanes(Axis(grid.len())))
        .enumerate()
    {
        for (axis, &i) in index.slice().iter().enumerate() {
            out[[cell, 0, axis]] = i as f64;
        }
        out.slice_mut(ndarray::s![cell, 1, ..]).assign(&projection);
    }
    Ok(out)
}

/// Bounds of anchors and scaled tips along each axis.
fn vectors_extent(data: &Array3<f64>, length: f64) -> Vec<(f64, f64)> {
    (0..data.len_of(Axis(2)))
        .map(|axis| {
            data.outer_iter()
                .flat_map(|vector| {
                    let start = vector[[0, axis]];
                    [start, start + length * vector[[1, axis]]]
                })
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
    use ndarray::{Array3, arr3};

    #[test]
    fn test_coordinate_form() {
        let data = arr3(&[[[0.0, 0.0], [1.0, 2.0]], [[3.0, 3.0], [-1.0, 0.0]]]).into_dyn();
        let vectors = Vectors::new(data, VectorsParams::default()).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.edge_color(), "red");
        assert_eq!(vectors.base().opacity(), 0.7);
        assert_eq!(vectors.base().dims().range()[1], (0.0, 3.0, 1.0));
    }

    #[test]
    fn test_grid_form_becomes_coordinates() {
        let mut grid = Array3::<f64>::zeros((3, 4, 2));
        grid[[2, 1, 0]] = 5.0;
        let vectors = Vectors::new(grid.into_dyn(), VectorsParams::default()).unwrap();
        assert_eq!(vectors.data().dim(), (12, 2, 2));
        // row-major cell (2, 1) is the tenth vector
        assert_eq!(vectors.data()[[9, 0, 0]], 2.0);
        assert_eq!(vectors.data()[[9, 0, 1]], 1.0);
        assert_eq!(vectors.data()[[9, 1, 0]], 5.0);
    }

    #[test]
    fn test_rejects_mismatched_grid() {
        let grid = Array3::<f64>::zeros((3, 4, 3)).into_dyn();
        assert!(matches!(
            Vectors::new(grid, VectorsParams::default()),
            Err(LayerError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_length_scales_extent() {
        let data = arr3(&[[[0.0, 0.0], [1.0, 1.0]]]).into_dyn();
        let vectors = Vectors::new(data, VectorsParams::default().length(3.0)).unwrap();
        assert_eq!(vectors.base().dims().range()[0], (0.0, 3.0, 1.0));
    }
}
