//! Path arguments for readers.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// One file or directory, or a list read as a stack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImagePath {
    Single(PathBuf),
    Stack(Vec<PathBuf>),
}

impl ImagePath {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            ImagePath::Single(path) => std::slice::from_ref(path),
            ImagePath::Stack(paths) => paths,
        }
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagePath::Single(path) => write!(f, "{}", path.display()),
            ImagePath::Stack(paths) => {
                let names: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

impl From<PathBuf> for ImagePath {
    fn from(path: PathBuf) -> Self {
        ImagePath::Single(path)
    }
}

impl From<&Path> for ImagePath {
    fn from(path: &Path) -> Self {
        ImagePath::Single(path.to_path_buf())
    }
}

impl From<&str> for ImagePath {
    fn from(path: &str) -> Self {
        ImagePath::Single(PathBuf::from(path))
    }
}

impl From<String> for ImagePath {
    fn from(path: String) -> Self {
        ImagePath::Single(PathBuf::from(path))
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for ImagePath {
    fn from(paths: Vec<P>) -> Self {
        ImagePath::Stack(paths.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_single_or_list() {
        let single: ImagePath = serde_json::from_str(r#""a.png""#).unwrap();
        assert_eq!(single, ImagePath::from("a.png"));

        let stack: ImagePath = serde_json::from_str(r#"["a.png", "b.png"]"#).unwrap();
        assert_eq!(stack.paths().len(), 2);
        assert_eq!(stack.to_string(), "[a.png, b.png]");
    }
}
