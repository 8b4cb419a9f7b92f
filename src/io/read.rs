//! Reading arrays from files, directories and stacks of files.

use std::path::{Path, PathBuf};

use crate::data::ArrayData;
use crate::io::loader::{LoaderError, LoaderRegistry};
use crate::io::path::ImagePath;

/// Errors raised while turning paths into arrays.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// File could not be opened or read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No loader could decode the file
    #[error("Failed to load {}: {source}", .path.display())]
    Loader {
        path: PathBuf,
        source: LoaderError,
    },

    /// A directory without any supported file
    #[error("No readable files in {}", .path.display())]
    NoFiles { path: PathBuf },

    /// An empty list of paths
    #[error("Cannot read an empty list of paths")]
    EmptyStack,

    /// Files of one stack disagree in shape or element type
    #[error("Cannot stack {}: {message}", .path.display())]
    StackMismatch { path: PathBuf, message: String },
}

/// Turns a path argument into a single array.
pub trait PathReader {
    fn imread(&self, path: &ImagePath) -> Result<ArrayData, ReadError>;
}

impl<F> PathReader for F
where
    F: Fn(&ImagePath) -> Result<ArrayData, ReadError>,
{
    fn imread(&self, path: &ImagePath) -> Result<ArrayData, ReadError> {
        self(path)
    }
}

/// Default [`PathReader`]: files, directories and stacks through a [`LoaderRegistry`].
#[derive(Debug, Default)]
pub struct MagicImread {
    registry: LoaderRegistry,
}

impl MagicImread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: LoaderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Read one file.
    pub fn read_file(&self, path: &Path) -> Result<ArrayData, ReadError> {
        let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path.file_name().and_then(|name| name.to_str());
        let array = self
            .registry
            .load(&bytes, filename)
            .map_err(|source| ReadError::Loader {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!(
            "Loaded {} as {} array of shape {:?}",
            path.display(),
            array.dtype(),
            array.shape()
        );
        Ok(array)
    }

    /// Replace directories by their supported files in name order.
    fn expand(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, ReadError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.is_dir() {
                files.push(path.clone());
                continue;
            }
            let entries = std::fs::read_dir(path).map_err(|source| ReadError::Io {
                path: path.clone(),
                source,
            })?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .filter(|p| {
                    p.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| self.registry.is_supported_file(name))
                })
                .collect();
            if found.is_empty() {
                return Err(ReadError::NoFiles { path: path.clone() });
            }
            found.sort();
            log::debug!("Expanded {} to {} files", path.display(), found.len());
            files.extend(found);
        }
        Ok(files)
    }
}

impl PathReader for MagicImread {
    /// A single file is returned as is; several files are stacked along a new
    /// leading axis and must agree in shape and element type.
    fn imread(&self, path: &ImagePath) -> Result<ArrayData, ReadError> {
        let files = self.expand(path.paths())?;
        let (first, rest) = files.split_first().ok_or(ReadError::EmptyStack)?;
        let head = self.read_file(first)?;
        if rest.is_empty() {
            return Ok(head);
        }

        let mut arrays = Vec::with_capacity(files.len());
        arrays.push(head);
        for file in rest {
            let array = self.read_file(file)?;
            let reference = &arrays[0];
            if array.shape() != reference.shape() || array.dtype() != reference.dtype() {
                return Err(ReadError::StackMismatch {
                    path: file.clone(),
                    message: format!(
                        "{} {:?} does not match {} {:?}",
                        array.dtype(),
                        array.shape(),
                        reference.dtype(),
                        reference.shape()
                    ),
                });
            }
            arrays.push(array);
        }

        ArrayData::stack(&arrays).ok_or_else(|| ReadError::StackMismatch {
            path: first.clone(),
            message: "arrays could not be stacked".to_string(),
        })
    }
}

/// Read one file with the built-in loaders.
pub fn imread(path: impl AsRef<Path>) -> Result<ArrayData, ReadError> {
    MagicImread::new().read_file(path.as_ref())
}

/// Read a file, a directory or a list of paths with the built-in loaders.
pub fn magic_imread(path: &ImagePath) -> Result<ArrayData, ReadError> {
    MagicImread::new().imread(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::DType;
    use ndarray::{Array2, ArrayD};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh directory under the system temp dir.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "ndlayers-{}-{}-{}",
            std::process::id(),
            name,
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_plane(dir: &Path, name: &str, value: f32, shape: (usize, usize)) -> PathBuf {
        let path = dir.join(name);
        ndarray_npy::write_npy(&path, &Array2::<f32>::from_elem(shape, value)).unwrap();
        path
    }

    #[test]
    fn test_imread_single_file() {
        let dir = scratch_dir("single");
        let path = write_plane(&dir, "a.npy", 1.0, (4, 5));
        let array = imread(&path).unwrap();
        assert_eq!(array.shape(), &[4, 5]);
        assert_eq!(array.dtype(), DType::F32);
    }

    #[test]
    fn test_list_is_stacked_in_order() {
        let dir = scratch_dir("stack");
        let a = write_plane(&dir, "a.npy", 1.0, (4, 5));
        let b = write_plane(&dir, "b.npy", 2.0, (4, 5));
        let array = magic_imread(&ImagePath::from(vec![b, a])).unwrap();
        assert_eq!(array.shape(), &[2, 4, 5]);
        assert_eq!(array.take(0, 0).unwrap().min_max(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_directory_expands_sorted() {
        let dir = scratch_dir("dir");
        write_plane(&dir, "z.npy", 3.0, (2, 2));
        write_plane(&dir, "m.npy", 2.0, (2, 2));
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let array = magic_imread(&ImagePath::from(dir.as_path())).unwrap();
        assert_eq!(array.shape(), &[2, 2, 2]);
        assert_eq!(array.take(0, 0).unwrap().min_max(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_stack_shapes_must_agree() {
        let dir = scratch_dir("mismatch");
        let a = write_plane(&dir, "a.npy", 1.0, (4, 5));
        let b = write_plane(&dir, "b.npy", 1.0, (4, 6));
        let err = magic_imread(&ImagePath::from(vec![a, b])).unwrap_err();
        assert!(matches!(err, ReadError::StackMismatch { .. }));
    }

    #[test]
    fn test_missing_file_and_empty_inputs() {
        let dir = scratch_dir("missing");
        assert!(matches!(
            imread(dir.join("absent.npy")),
            Err(ReadError::Io { .. })
        ));
        assert!(matches!(
            magic_imread(&ImagePath::Stack(Vec::new())),
            Err(ReadError::EmptyStack)
        ));
        assert!(matches!(
            magic_imread(&ImagePath::from(dir.as_path())),
            Err(ReadError::NoFiles { .. })
        ));
    }

    #[test]
    fn test_closure_reader() {
        let reader = |_: &ImagePath| -> Result<ArrayData, ReadError> {
            Ok(ArrayData::from(ArrayD::<u8>::zeros(vec![3, 3])))
        };
        let array = reader.imread(&ImagePath::from("anything.png")).unwrap();
        assert_eq!(array.shape(), &[3, 3]);
    }
}
