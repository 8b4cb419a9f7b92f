//! Typed constructors: one `add_*` method per layer kind.

use ndarray::{Array2, ArrayD};

use crate::constants::MIN_LAYER_NDIM;
use crate::data::{ArrayData, ImageData, SurfaceData};
use crate::error::{Result, ViewerError};
use crate::io::ImagePath;
use crate::layers::{
    Image, ImageParams, Labels, LabelsParams, LayerId, Points, PointsParams, Shapes, ShapesParams,
    Surface, SurfaceParams, Vectors, VectorsParams,
};
use crate::viewer::Viewer;
use crate::viewer::normalize::{resolve_axis, split_params};

/// Layers created by one call: a single layer, or one per split channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Added {
    Layer(LayerId),
    Layers(Vec<LayerId>),
}

impl Added {
    /// The added ids, in order.
    pub fn ids(&self) -> &[LayerId] {
        match self {
            Added::Layer(id) => std::slice::from_ref(id),
            Added::Layers(ids) => ids,
        }
    }

    pub fn into_ids(self) -> Vec<LayerId> {
        match self {
            Added::Layer(id) => vec![id],
            Added::Layers(ids) => ids,
        }
    }

    /// The id of a single layer, `None` for a split.
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Added::Layer(id) => Some(*id),
            Added::Layers(_) => None,
        }
    }
}

impl Viewer {
    /// Add an image, or one image per channel when `channel_axis` is set.
    ///
    /// Exactly one of `data` and `params.path` must be given.
    pub fn add_image(
        &mut self,
        data: Option<ImageData>,
        mut params: ImageParams,
    ) -> Result<Added> {
        let data = self.data_or_path(data, params.path.take())?;

        let Some(axis) = params.channel_axis else {
            let image = Image::new(data, params)?;
            return Ok(Added::Layer(self.add_layer(image)));
        };

        let ndim = data.shape().len();
        let axis = resolve_axis(axis, ndim).ok_or_else(|| {
            ViewerError::invalid_argument(format!(
                "channel_axis {} is out of bounds for data with {} dimensions",
                axis, ndim
            ))
        })?;
        let n_channels = data.shape()[axis];
        log::debug!("Splitting {} channels along axis {}", n_channels, axis);

        let images = split_params(params, n_channels)
            .into_iter()
            .enumerate()
            .map(|(i, params)| {
                let channel = take_channel(&data, i, axis)?;
                Ok(Image::new(channel, params)?)
            })
            .collect::<Result<Vec<_>>>()?;

        let ids = images.into_iter().map(|image| self.add_layer(image)).collect();
        Ok(Added::Layers(ids))
    }

    /// Add an integer label image. Exactly one of `data` and `params.path` must be given.
    pub fn add_labels(
        &mut self,
        data: Option<ImageData>,
        mut params: LabelsParams,
    ) -> Result<LayerId> {
        let data = self.data_or_path(data, params.path.take())?;
        let labels = Labels::new(data, params)?;
        Ok(self.add_layer(labels))
    }

    /// Add points; without data the layer is empty with `max(viewer ndim, 2)` columns.
    pub fn add_points(
        &mut self,
        data: Option<Array2<f64>>,
        params: PointsParams,
    ) -> Result<LayerId> {
        let data = data.unwrap_or_else(|| Array2::zeros((0, self.ndim().max(MIN_LAYER_NDIM))));
        let points = Points::new(data, params)?;
        Ok(self.add_layer(points))
    }

    /// Add shapes; without data the layer is empty with the viewer's dimensionality.
    pub fn add_shapes(
        &mut self,
        data: Option<Vec<Array2<f64>>>,
        params: ShapesParams,
    ) -> Result<LayerId> {
        let shapes = match data {
            Some(data) if !data.is_empty() => Shapes::new(data, params)?,
            _ => Shapes::with_ndim(Vec::new(), self.ndim().max(MIN_LAYER_NDIM), params)?,
        };
        Ok(self.add_layer(shapes))
    }

    pub fn add_surface(&mut self, data: SurfaceData, params: SurfaceParams) -> Result<LayerId> {
        let surface = Surface::new(data, params)?;
        Ok(self.add_layer(surface))
    }

    /// Add vectors given as `(N, 2, D)` or as a grid of projections.
    pub fn add_vectors(&mut self, data: ArrayD<f64>, params: VectorsParams) -> Result<LayerId> {
        let vectors = Vectors::new(data, params)?;
        Ok(self.add_layer(vectors))
    }

    fn data_or_path(&self, data: Option<ImageData>, path: Option<ImagePath>) -> Result<ImageData> {
        match (data, path) {
            (Some(data), None) => Ok(data),
            (None, Some(path)) => {
                log::debug!("Reading layer data from {}", path);
                Ok(ImageData::Single(self.path_reader.imread(&path)?))
            }
            (None, None) => Err(ViewerError::invalid_argument(
                "One of either data or path must be provided",
            )),
            (Some(_), Some(_)) => Err(ViewerError::invalid_argument(
                "Only one of data or path can be provided",
            )),
        }
    }
}

/// Channel `index` along `axis`, level by level for pyramids.
fn take_channel(data: &ImageData, index: usize, axis: usize) -> Result<ImageData> {
    let missing = || {
        ViewerError::invalid_argument(format!(
            "channel {} along axis {} is missing from a pyramid level",
            index, axis
        ))
    };
    match data {
        ImageData::Single(array) => array
            .take(index, axis)
            .map(ImageData::Single)
            .ok_or_else(missing),
        ImageData::Pyramid(levels) => levels
            .iter()
            .map(|level| level.take(index, axis))
            .collect::<Option<Vec<ArrayData>>>()
            .map(ImageData::Pyramid)
            .ok_or_else(missing),
    }
}
