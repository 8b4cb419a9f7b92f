//! Loader for NumPy `.npy` files.
//!
//! Arrays keep their shape and element type; no axis is reinterpreted.

use std::io::Cursor;

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyExt, ReadableElement};

use crate::data::ArrayData;
use crate::io::loader::{ArrayLoader, LoaderError};

/// Loader for NumPy `.npy` files.
///
/// Supported data types: `u8` to `u64`, `i8` to `i64`, `f32` and `f64`.
pub struct NpyLoader;

impl NpyLoader {
    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

    fn try_read<T>(data: &[u8]) -> Option<ArrayData>
    where
        T: ReadableElement,
        ArrayData: From<ArrayD<T>>,
    {
        ArrayD::<T>::read_npy(Cursor::new(data))
            .ok()
            .map(ArrayData::from)
    }
}

impl ArrayLoader for NpyLoader {
    fn id(&self) -> &'static str {
        "npy"
    }

    fn display_name(&self) -> &'static str {
        "NumPy Array (.npy)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["npy"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<ArrayData, LoaderError> {
        if !self.can_load(data) {
            return Err(LoaderError::new("missing NumPy magic bytes").with_loader(self.id()));
        }

        // The header names one dtype, so at most one of these succeeds.
        let array = Self::try_read::<f32>(data)
            .or_else(|| Self::try_read::<f64>(data))
            .or_else(|| Self::try_read::<u8>(data))
            .or_else(|| Self::try_read::<u16>(data))
            .or_else(|| Self::try_read::<u32>(data))
            .or_else(|| Self::try_read::<u64>(data))
            .or_else(|| Self::try_read::<i8>(data))
            .or_else(|| Self::try_read::<i16>(data))
            .or_else(|| Self::try_read::<i32>(data))
            .or_else(|| Self::try_read::<i64>(data))
            .ok_or_else(|| {
                LoaderError::new("Failed to read NumPy array: unsupported dtype or invalid format")
                    .with_loader(self.id())
            })?;

        log::debug!(
            "NpyLoader: loaded {} array of shape {:?}",
            array.dtype(),
            array.shape()
        );
        Ok(array)
    }

    fn priority(&self) -> i32 {
        // Specific to scientific data, so ahead of generic images
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DType;
    use ndarray::{Array2, Array3};
    use ndarray_npy::WriteNpyExt;

    fn npy_bytes<T: ndarray_npy::WritableElement>(array: &ArrayD<T>) -> Vec<u8> {
        let mut bytes = Vec::new();
        array.write_npy(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_loader_metadata() {
        let loader = NpyLoader;
        assert_eq!(loader.id(), "npy");
        assert!(loader.extensions().contains(&"npy"));
        assert_eq!(loader.priority(), 10);
    }

    #[test]
    fn test_magic_detection() {
        let loader = NpyLoader;
        let valid_magic = [0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00];
        assert!(loader.can_load(&valid_magic));
        let png_magic = [0x89, 0x50, 0x4E, 0x47];
        assert!(!loader.can_load(&png_magic));
    }

    #[test]
    fn test_dtype_is_preserved() {
        let labels = Array3::<i64>::from_elem((2, 3, 4), 7).into_dyn();
        let array = NpyLoader.load(&npy_bytes(&labels)).unwrap();
        assert_eq!(array.dtype(), DType::I64);
        assert_eq!(array.shape(), &[2, 3, 4]);

        let image = Array2::<u16>::zeros((5, 6)).into_dyn();
        let array = NpyLoader.load(&npy_bytes(&image)).unwrap();
        assert_eq!(array.dtype(), DType::U16);
        assert_eq!(array.shape(), &[5, 6]);
    }

    #[test]
    fn test_truncated_file_fails() {
        let image = Array2::<f32>::zeros((5, 6)).into_dyn();
        let bytes = npy_bytes(&image);
        let err = NpyLoader.load(&bytes[..bytes.len() - 8]).unwrap_err();
        assert_eq!(err.loader_id, Some("npy"));
    }
}
