//! Turning untyped plugin results into typed layer constructor calls.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::data::{LayerData, LayerDataTuple, Metadata};
use crate::error::{Result, ViewerError};
use crate::layers::{
    ImageParams, LabelsParams, LayerId, LayerKind, LayerParams, PointsParams, ShapesParams,
    SurfaceParams, VectorsParams,
};
use crate::plugins::ReadRequest;
use crate::viewer::{Added, Viewer};

/// Builds and registers a layer from plugin data and metadata.
pub type LayerFactory = fn(&mut Viewer, LayerData, Metadata) -> Result<Added>;

/// Factory per layer kind.
#[derive(Clone)]
pub struct DispatchTable {
    factories: HashMap<LayerKind, LayerFactory>,
}

impl DispatchTable {
    /// Table with a factory for every layer kind.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.register(LayerKind::Image, image_factory);
        table.register(LayerKind::Labels, labels_factory);
        table.register(LayerKind::Points, points_factory);
        table.register(LayerKind::Shapes, shapes_factory);
        table.register(LayerKind::Surface, surface_factory);
        table.register(LayerKind::Vectors, vectors_factory);
        table
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory, replacing any previous one for the kind.
    pub fn register(&mut self, kind: LayerKind, factory: LayerFactory) {
        if self.factories.insert(kind, factory).is_some() {
            log::debug!("Replaced layer factory for {}", kind);
        }
    }

    pub fn unregister(&mut self, kind: LayerKind) -> Option<LayerFactory> {
        self.factories.remove(&kind)
    }

    pub fn get(&self, kind: LayerKind) -> Option<LayerFactory> {
        self.factories.get(&kind).copied()
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds, in [`LayerKind::ALL`] order.
    pub fn kinds(&self) -> Vec<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Parse metadata into the parameters of `P`, rejecting keys `P` does not accept.
pub(crate) fn params_from_metadata<P: LayerParams>(meta: Metadata) -> Result<P> {
    if let Some(key) = meta.keys().find(|key| !P::accepts(key)) {
        return Err(ViewerError::UnexpectedKeyword {
            key: key.clone(),
            layer_type: P::KIND.name().to_string(),
        });
    }
    serde_json::from_value(Value::Object(meta)).map_err(|source| ViewerError::InvalidMetadata {
        layer_type: P::KIND.name().to_string(),
        source,
    })
}

fn image_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: ImageParams = params_from_metadata(meta)?;
    viewer.add_image(Some(data.into_image_data()?), params)
}

fn labels_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: LabelsParams = params_from_metadata(meta)?;
    viewer
        .add_labels(Some(data.into_image_data()?), params)
        .map(Added::Layer)
}

fn points_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: PointsParams = params_from_metadata(meta)?;
    viewer
        .add_points(Some(data.into_coordinates()?), params)
        .map(Added::Layer)
}

fn shapes_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: ShapesParams = params_from_metadata(meta)?;
    viewer
        .add_shapes(Some(data.into_shapes()?), params)
        .map(Added::Layer)
}

fn surface_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: SurfaceParams = params_from_metadata(meta)?;
    viewer
        .add_surface(data.into_surface()?, params)
        .map(Added::Layer)
}

fn vectors_factory(viewer: &mut Viewer, data: LayerData, meta: Metadata) -> Result<Added> {
    let params: VectorsParams = params_from_metadata(meta)?;
    viewer
        .add_vectors(data.into_vectors()?, params)
        .map(Added::Layer)
}

/// Kind used when a plugin gives no type: labels for wide integer arrays, else image.
fn infer_kind(data: &LayerData) -> LayerKind {
    match data.dtype() {
        Some(dtype) if dtype.is_label_like() => LayerKind::Labels,
        _ => LayerKind::Image,
    }
}

/// One path or several, as accepted by [`Viewer::add_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathInput {
    Single(PathBuf),
    Many(Vec<PathBuf>),
}

impl PathInput {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            PathInput::Single(path) => std::slice::from_ref(path),
            PathInput::Many(paths) => paths,
        }
    }
}

impl From<PathBuf> for PathInput {
    fn from(path: PathBuf) -> Self {
        PathInput::Single(path)
    }
}

impl From<&Path> for PathInput {
    fn from(path: &Path) -> Self {
        PathInput::Single(path.to_path_buf())
    }
}

impl From<&str> for PathInput {
    fn from(path: &str) -> Self {
        PathInput::Single(PathBuf::from(path))
    }
}

impl From<String> for PathInput {
    fn from(path: String) -> Self {
        PathInput::Single(PathBuf::from(path))
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for PathInput {
    fn from(paths: Vec<P>) -> Self {
        PathInput::Many(paths.into_iter().map(Into::into).collect())
    }
}

impl Viewer {
    /// Add the layer(s) described by one plugin result.
    ///
    /// The type tag is case-insensitive; without one, wide integer arrays
    /// become labels and everything else an image. Metadata keys must be
    /// parameters of the chosen kind.
    pub fn add_layer_from_data(
        &mut self,
        data: LayerData,
        meta: Option<Metadata>,
        layer_type: Option<&str>,
    ) -> Result<Added> {
        let tag = layer_type.unwrap_or_default().to_lowercase();
        let kind = if tag.is_empty() {
            let kind = infer_kind(&data);
            log::debug!("Inferred layer type {} for {:?} data", kind, data.dtype());
            kind
        } else {
            tag.parse::<LayerKind>()
                .map_err(|layer_type| ViewerError::UnrecognizedLayerType {
                    layer_type,
                    known: LayerKind::known_names(),
                })?
        };

        let factory = self
            .dispatch
            .get(kind)
            .ok_or_else(|| ViewerError::NotImplemented {
                layer_type: kind.name().to_string(),
            })?;
        log::trace!("Dispatching {} layer", kind);
        factory(self, data, meta.unwrap_or_default())
    }

    /// Read a request through the reader chain and add every returned layer.
    ///
    /// Nothing readable is not an error: it is logged and no layers are added.
    /// A failing tuple stops the loop; layers from earlier tuples stay added.
    pub fn add_layers_with_plugins(&mut self, request: &ReadRequest<'_>) -> Result<Vec<LayerId>> {
        let tuples = self.reader_chain.read(request);
        if tuples.is_empty() {
            log::error!("No plugin found capable of reading {}.", request);
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for LayerDataTuple {
            data,
            meta,
            layer_type,
        } in tuples
        {
            let added = self.add_layer_from_data(data, meta, layer_type.as_deref())?;
            ids.extend(added.into_ids());
        }
        Ok(ids)
    }

    /// Add layers from one path or a list of paths.
    ///
    /// With `stack` the whole list is one request; otherwise each path is read
    /// on its own and the layers come back in path order.
    pub fn add_path(&mut self, path: impl Into<PathInput>, stack: bool) -> Result<Vec<LayerId>> {
        let input: PathInput = path.into();
        let paths = input
            .paths()
            .iter()
            .map(|path| {
                path.to_str().map(str::to_string).ok_or_else(|| {
                    ViewerError::invalid_argument(format!("Path {:?} is not valid UTF-8", path))
                })
            })
            .collect::<Result<Vec<String>>>()?;

        if stack {
            if paths.is_empty() {
                return Err(ViewerError::invalid_argument("Cannot stack an empty list of paths"));
            }
            return self.add_layers_with_plugins(&ReadRequest::Stack(&paths));
        }

        let mut ids = Vec::new();
        for path in &paths {
            ids.extend(self.add_layers_with_plugins(&ReadRequest::Path(path))?);
        }
        Ok(ids)
    }

    /// [`Viewer::add_path`] with stacking taken from the configuration.
    pub fn open(&mut self, path: impl Into<PathInput>) -> Result<Vec<LayerId>> {
        let stack = self.config.stack_paths;
        self.add_path(path, stack)
    }
}
