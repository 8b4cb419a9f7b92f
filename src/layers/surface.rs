//! Surface layers: triangle meshes with per-vertex values.

use ndarray::Axis;
use serde::Deserialize;

use crate::constants::DEFAULT_COLORMAP;
use crate::data::SurfaceData;
use crate::layers::base::{Blending, CommonParams, LayerBase};
use crate::layers::image::check_limits;
use crate::layers::{LayerError, LayerKind, LayerParams};

/// Parameters of [`Viewer::add_surface`](crate::Viewer::add_surface).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    pub colormap: String,
    pub contrast_limits: Option<[f64; 2]>,
    pub gamma: f64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub common: CommonParams,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            colormap: DEFAULT_COLORMAP.to_string(),
            contrast_limits: None,
            gamma: 1.0,
            name: None,
            common: CommonParams::default(),
        }
    }
}

impl LayerParams for SurfaceParams {
    const KIND: LayerKind = LayerKind::Surface;
    const FIELDS: &'static [&'static str] = &[
        "colormap",
        "contrast_limits",
        "gamma",
        "name",
    ];
}

/// A triangle mesh coloured by vertex values.
#[derive(Debug)]
pub struct Surface {
    pub(crate) base: LayerBase,
    data: SurfaceData,
    colormap: String,
    contrast_limits: [f64; 2],
    gamma: f64,
}

impl Surface {
    pub fn new(data: SurfaceData, params: SurfaceParams) -> Result<Self, LayerError> {
        let n_vertices = data.vertices.nrows();
        if data.faces.ncols() != 3 {
            return Err(LayerError::invalid_shape(format!(
                "faces must be (F, 3), got {:?}",
                data.faces.shape()
            )));
        }
        if let Some(&index) = data.faces.iter().find(|&&i| i >= n_vertices) {
            return Err(LayerError::invalid_data(format!(
                "face index {} out of range for {} vertices",
                index, n_vertices
            )));
        }
        if data.values.shape().last().copied() != Some(n_vertices) {
            return Err(LayerError::invalid_shape(format!(
                "values {:?} must end with the vertex count {}",
                data.values.shape(),
                n_vertices
            )));
        }
        if !(params.gamma > 0.0 && params.gamma.is_finite()) {
            return Err(LayerError::invalid_parameter("gamma", "must be positive"));
        }

        let contrast_limits = match params.contrast_limits {
            Some(limits) => check_limits("contrast_limits", limits)?,
            None => {
                let lo = data.values.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = data.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if lo.is_finite() && lo < hi { [lo, hi] } else { [0.0, 1.0] }
            }
        };

        let base = LayerBase::new(
            LayerKind::Surface,
            params.name,
            params.common,
            1.0,
            Blending::Translucent,
            &surface_extent(&data),
        )?;

        Ok(Self {
            base,
            data,
            colormap: params.colormap,
            contrast_limits,
            gamma: params.gamma,
        })
    }

    pub fn base(&self) -> &LayerBase {
        &self.base
    }

    pub fn data(&self) -> &SurfaceData {
        &self.data
    }

    pub fn colormap(&self) -> &str {
        &self.colormap
    }

    pub fn contrast_limits(&self) -> [f64; 2] {
        self.contrast_limits
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

/// Leading value axes first, then vertex coordinates.
fn surface_extent(data: &SurfaceData) -> Vec<(f64, f64)> {
    let values_shape = data.values.shape();
    let leading = values_shape[..values_shape.len().saturating_sub(1)]
        .iter()
        .map(|&n| (0.0, n as f64));
    let spatial = data.vertices.axis_iter(Axis(1)).map(|column| {
        column
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 1.0))
    });
    leading.chain(spatial).collect()
}
