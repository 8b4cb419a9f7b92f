//! Reader plugin backed by the built-in file loaders.

use std::path::Path;

use crate::data::LayerDataTuple;
use crate::io::{ImagePath, MagicImread, PathReader};
use crate::plugins::{PluginError, ReadRequest, ReaderPlugin};

/// Reads supported files and directories with [`MagicImread`].
///
/// Results carry neither metadata nor a layer type, so the viewer infers the
/// layer kind from the element type.
#[derive(Debug, Default)]
pub struct BuiltinReader {
    reader: MagicImread,
}

impl BuiltinReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(reader: MagicImread) -> Self {
        Self { reader }
    }
}

impl ReaderPlugin for BuiltinReader {
    fn name(&self) -> &str {
        "builtin"
    }

    fn claims(&self, request: &ReadRequest<'_>) -> bool {
        let paths = request.paths();
        !paths.is_empty()
            && paths
                .iter()
                .all(|p| Path::new(p).is_dir() || self.reader.registry().is_supported_file(p))
    }

    fn read(&self, request: &ReadRequest<'_>) -> Result<Vec<LayerDataTuple>, PluginError> {
        let path = match request {
            ReadRequest::Path(path) => ImagePath::from(*path),
            ReadRequest::Stack(paths) => ImagePath::from(paths.to_vec()),
        };
        let array = self.reader.imread(&path)?;
        Ok(vec![LayerDataTuple::new(array)])
    }

    fn priority(&self) -> i32 {
        // Fallback behind any third-party reader
        -100
    }
}
