//! Trait-based array loading from file bytes.
//!
//! New formats can be added by implementing the `ArrayLoader` trait and
//! registering the loader with a `LoaderRegistry`.
//!
//! ## Supported Formats
//!
//! - **Standard Images**: PNG, JPEG, BMP, TIFF, WebP as `H × W` or `H × W × C`
//! - **NumPy Arrays**: `.npy` files of any shape, element type preserved
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ndlayers::io::LoaderRegistry;
//!
//! let registry = LoaderRegistry::new();
//! let array = registry.load(&bytes, Some("volume.npy"))?;
//! ```

use std::path::Path;

use crate::data::ArrayData;

/// Error type for loader operations.
#[derive(Debug, Clone)]
pub struct LoaderError {
    /// Human-readable error message.
    pub message: String,
    /// The loader that produced this error (if known).
    pub loader_id: Option<&'static str>,
}

impl LoaderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            loader_id: None,
        }
    }

    /// Attach the id of the loader that failed.
    pub fn with_loader(mut self, loader_id: &'static str) -> Self {
        self.loader_id = Some(loader_id);
        self
    }
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loader) = self.loader_id {
            write!(f, "[{}] {}", loader, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<String> for LoaderError {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for LoaderError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A file format that decodes raw bytes into an [`ArrayData`].
pub trait ArrayLoader {
    /// Unique identifier for this loader (e.g., "image", "npy").
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// File extensions this loader handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str];

    /// Check magic bytes or headers for format auto-detection.
    fn can_load(&self, data: &[u8]) -> bool;

    fn load(&self, data: &[u8]) -> Result<ArrayData, LoaderError>;

    /// Priority for format detection (higher = checked first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of available array loaders.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn ArrayLoader>>,
}

impl LoaderRegistry {
    /// Create a registry with all built-in loaders.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(super::loaders::ImageLoader));
        registry.register(Box::new(super::loaders::NpyLoader));
        registry
    }

    /// Create a registry without any loaders.
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Register a loader, keeping the list sorted by priority (highest first).
    pub fn register(&mut self, loader: Box<dyn ArrayLoader>) {
        self.loaders.push(loader);
        self.loaders.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// All supported file extensions, sorted and deduplicated.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .loaders
            .iter()
            .flat_map(|l| l.extensions().iter().copied())
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    fn extension_of(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }

    /// Loaders in the order they are tried for `data`, each at most once:
    /// extension matches, then magic-byte matches, then the rest.
    fn candidates(
        &self,
        data: &[u8],
        filename: Option<&str>,
    ) -> Vec<(&dyn ArrayLoader, &'static str)> {
        let extension = filename.and_then(Self::extension_of);
        let by_extension = |loader: &dyn ArrayLoader| {
            extension
                .as_deref()
                .is_some_and(|ext| loader.extensions().contains(&ext))
        };

        let mut ordered: Vec<(&dyn ArrayLoader, &'static str)> = Vec::new();
        let stages: [(&'static str, &dyn Fn(&dyn ArrayLoader) -> bool); 3] = [
            ("extension", &by_extension),
            ("detection", &|loader| loader.can_load(data)),
            ("fallback", &|_| true),
        ];
        for (reason, matches) in stages {
            for loader in self.loaders.iter().map(|l| l.as_ref()) {
                let seen = ordered.iter().any(|(l, _)| l.id() == loader.id());
                if !seen && matches(loader) {
                    ordered.push((loader, reason));
                }
            }
        }
        ordered
    }

    /// Decode `data`, choosing the loader by file extension, then by magic
    /// bytes, then by trying every remaining loader.
    pub fn load(&self, data: &[u8], filename: Option<&str>) -> Result<ArrayData, LoaderError> {
        let mut failures = Vec::new();
        for (loader, reason) in self.candidates(data, filename) {
            match loader.load(data) {
                Ok(array) => {
                    log::debug!("Loaded with {} loader (by {})", loader.id(), reason);
                    return Ok(array);
                }
                Err(e) => {
                    log::trace!("Loader {} failed: {}", loader.id(), e);
                    failures.push(loader.id());
                }
            }
        }

        let file = filename.map(|f| format!(" (file: {})", f)).unwrap_or_default();
        Err(LoaderError::new(format!(
            "No loader could handle the data{}; tried [{}]",
            file,
            failures.join(", ")
        )))
    }

    /// Whether the file name carries an extension some loader handles.
    pub fn is_supported_file(&self, filename: &str) -> bool {
        Self::extension_of(filename).is_some_and(|ext| {
            self.loaders
                .iter()
                .any(|loader| loader.extensions().contains(&ext.as_str()))
        })
    }

    pub fn loaders(&self) -> &[Box<dyn ArrayLoader>] {
        &self.loaders
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.loaders.iter().map(|l| l.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    struct ConstLoader(i32);

    impl ArrayLoader for ConstLoader {
        fn id(&self) -> &'static str {
            "const"
        }

        fn display_name(&self) -> &'static str {
            "Constant"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["const"]
        }

        fn can_load(&self, data: &[u8]) -> bool {
            data.starts_with(b"CONST")
        }

        fn load(&self, data: &[u8]) -> Result<ArrayData, LoaderError> {
            if !self.can_load(data) {
                return Err(LoaderError::new("not a const file").with_loader(self.id()));
            }
            Ok(ArrayData::from(ArrayD::<i32>::from_elem(vec![1], self.0)))
        }

        fn priority(&self) -> i32 {
            self.0
        }
    }

    #[test]
    fn test_registry_has_loaders() {
        let registry = LoaderRegistry::new();
        assert_eq!(registry.loaders().len(), 2);
        // npy outranks generic images
        assert_eq!(registry.loaders()[0].id(), "npy");
    }

    #[test]
    fn test_supported_extensions() {
        let registry = LoaderRegistry::new();
        let extensions = registry.supported_extensions();
        assert!(extensions.contains(&"png"));
        assert!(extensions.contains(&"tif"));
        assert!(extensions.contains(&"npy"));
    }

    #[test]
    fn test_is_supported_file() {
        let registry = LoaderRegistry::new();
        assert!(registry.is_supported_file("image.png"));
        assert!(registry.is_supported_file("data.npy"));
        assert!(registry.is_supported_file("IMAGE.PNG"));
        assert!(!registry.is_supported_file("document.pdf"));
    }

    #[test]
    fn test_detection_without_extension() {
        let mut registry = LoaderRegistry::empty();
        registry.register(Box::new(ConstLoader(7)));
        let array = registry.load(b"CONST...", None).unwrap();
        assert_eq!(array.dtype(), crate::data::DType::I32);
    }

    #[test]
    fn test_unknown_data_names_file() {
        let registry = LoaderRegistry::new();
        let err = registry.load(b"garbage", Some("notes.txt")).unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
        assert!(err.to_string().contains("tried [npy, image]"));
    }

    #[test]
    fn test_extension_match_tried_first() {
        let mut registry = LoaderRegistry::empty();
        registry.register(Box::new(ConstLoader(1)));
        registry.register(Box::new(ConstLoader(5)));
        let order: Vec<_> = registry
            .candidates(b"CONST", Some("a.const"))
            .into_iter()
            .map(|(_, reason)| reason)
            .collect();
        // both share an id, so only one attempt is made
        assert_eq!(order, vec!["extension"]);
    }

    #[test]
    fn test_loader_error_display() {
        let err = LoaderError::new("bad header").with_loader("npy");
        assert_eq!(err.to_string(), "[npy] bad header");
    }
}
