//! Element-typed n-dimensional arrays.
//!
//! Plugins and file readers hand back arrays whose element type is only known
//! at runtime. `ArrayData` keeps the concrete element type so the dispatch
//! layer can inspect it (for example to guess that a 64-bit integer array holds
//! labels) while the layer constructors convert to the representation they need.

use std::fmt;

use ndarray::{ArrayD, Axis, IxDyn};

/// Element type of an [`ArrayData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    /// NumPy style name of the element type.
    pub fn name(&self) -> &'static str {
        match self {
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }

    /// Whether this is a signed or unsigned integer type.
    pub fn is_integer(&self) -> bool {
        !matches!(self, DType::F32 | DType::F64)
    }

    /// Whether this is one of the 32/64-bit integer types that usually hold labels.
    pub fn is_label_like(&self) -> bool {
        matches!(self, DType::I32 | DType::U32 | DType::I64 | DType::U64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An n-dimensional array with a runtime element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Evaluate `$body` with `$arr` bound to the inner array, whatever its element type.
macro_rules! with_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            ArrayData::U8($arr) => $body,
            ArrayData::U16($arr) => $body,
            ArrayData::U32($arr) => $body,
            ArrayData::U64($arr) => $body,
            ArrayData::I8($arr) => $body,
            ArrayData::I16($arr) => $body,
            ArrayData::I32($arr) => $body,
            ArrayData::I64($arr) => $body,
            ArrayData::F32($arr) => $body,
            ArrayData::F64($arr) => $body,
        }
    };
}

/// Like `with_array!`, but rewraps the result in the same variant.
macro_rules! map_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            ArrayData::U8($arr) => ArrayData::U8($body),
            ArrayData::U16($arr) => ArrayData::U16($body),
            ArrayData::U32($arr) => ArrayData::U32($body),
            ArrayData::U64($arr) => ArrayData::U64($body),
            ArrayData::I8($arr) => ArrayData::I8($body),
            ArrayData::I16($arr) => ArrayData::I16($body),
            ArrayData::I32($arr) => ArrayData::I32($body),
            ArrayData::I64($arr) => ArrayData::I64($body),
            ArrayData::F32($arr) => ArrayData::F32($body),
            ArrayData::F64($arr) => ArrayData::F64($body),
        }
    };
}

impl ArrayData {
    /// Element type of the array.
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::U8(_) => DType::U8,
            ArrayData::U16(_) => DType::U16,
            ArrayData::U32(_) => DType::U32,
            ArrayData::U64(_) => DType::U64,
            ArrayData::I8(_) => DType::I8,
            ArrayData::I16(_) => DType::I16,
            ArrayData::I32(_) => DType::I32,
            ArrayData::I64(_) => DType::I64,
            ArrayData::F32(_) => DType::F32,
            ArrayData::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        with_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Select index `index` along `axis`, dropping that axis.
    ///
    /// Returns `None` if the axis or index is out of bounds.
    pub fn take(&self, index: usize, axis: usize) -> Option<ArrayData> {
        if axis >= self.ndim() || index >= self.shape()[axis] {
            return None;
        }
        Some(map_array!(self, a => a.index_axis(Axis(axis), index).to_owned()))
    }

    /// Convert every element to `f64`.
    pub fn to_f64(&self) -> ArrayD<f64> {
        with_array!(self, a => a.mapv(|v| v as f64))
    }

    /// Convert integer elements to indices.
    ///
    /// Returns `None` for floating point arrays or if any element is negative.
    pub fn to_indices(&self) -> Option<ArrayD<usize>> {
        fn convert<T>(array: &ArrayD<T>) -> Option<ArrayD<usize>>
        where
            T: Copy + TryInto<usize>,
        {
            let values = array
                .iter()
                .map(|&v| v.try_into().ok())
                .collect::<Option<Vec<usize>>>()?;
            ArrayD::from_shape_vec(IxDyn(array.shape()), values).ok()
        }

        match self {
            ArrayData::U8(a) => convert(a),
            ArrayData::U16(a) => convert(a),
            ArrayData::U32(a) => convert(a),
            ArrayData::U64(a) => convert(a),
            ArrayData::I8(a) => convert(a),
            ArrayData::I16(a) => convert(a),
            ArrayData::I32(a) => convert(a),
            ArrayData::I64(a) => convert(a),
            ArrayData::F32(_) | ArrayData::F64(_) => None,
        }
    }

    /// Minimum and maximum value, or `None` for an empty array.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        with_array!(self, a => a.iter().map(|&v| v as f64).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        }))
    }

    /// Stack arrays of identical shape and element type along a new leading axis.
    ///
    /// Returns `None` if the list is empty or the arrays disagree.
    pub fn stack(arrays: &[ArrayData]) -> Option<ArrayData> {
        macro_rules! stack_variant {
            ($variant:ident) => {{
                let views = arrays
                    .iter()
                    .map(|a| match a {
                        ArrayData::$variant(inner) => Some(inner.view()),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()?;
                ndarray::stack(Axis(0), &views).ok().map(ArrayData::$variant)
            }};
        }

        match arrays.first()? {
            ArrayData::U8(_) => stack_variant!(U8),
            ArrayData::U16(_) => stack_variant!(U16),
            ArrayData::U32(_) => stack_variant!(U32),
            ArrayData::U64(_) => stack_variant!(U64),
            ArrayData::I8(_) => stack_variant!(I8),
            ArrayData::I16(_) => stack_variant!(I16),
            ArrayData::I32(_) => stack_variant!(I32),
            ArrayData::I64(_) => stack_variant!(I64),
            ArrayData::F32(_) => stack_variant!(F32),
            ArrayData::F64(_) => stack_variant!(F64),
        }
    }
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$ty>> for ArrayData {
                fn from(array: ArrayD<$ty>) -> Self {
                    ArrayData::$variant(array)
                }
            }
        )*
    };
}

impl_from_array!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3};

    #[test]
    fn test_dtype_label_like() {
        assert!(DType::I64.is_label_like());
        assert!(DType::U32.is_label_like());
        assert!(!DType::U8.is_label_like());
        assert!(!DType::F32.is_label_like());
        assert!(DType::U8.is_integer());
    }

    #[test]
    fn test_take_drops_axis() {
        let array = Array::from_shape_fn((2, 3, 4), |(c, y, x)| (c * 100 + y * 10 + x) as f32);
        let data = ArrayData::from(array.into_dyn());

        let channel = data.take(1, 0).unwrap();
        assert_eq!(channel.shape(), &[3, 4]);
        assert_eq!(channel.to_f64()[[2, 3]], 123.0);

        let column = data.take(3, 2).unwrap();
        assert_eq!(column.shape(), &[2, 3]);
        assert_eq!(column.to_f64()[[1, 0]], 103.0);

        assert!(data.take(2, 0).is_none());
        assert!(data.take(0, 3).is_none());
    }

    #[test]
    fn test_to_indices_rejects_negative_and_float() {
        let ok = ArrayData::from(ndarray::arr2(&[[0i64, 1, 2]]).into_dyn());
        assert_eq!(ok.to_indices().unwrap()[[0, 2]], 2);

        let negative = ArrayData::from(ndarray::arr2(&[[0i32, -1, 2]]).into_dyn());
        assert!(negative.to_indices().is_none());

        let float = ArrayData::from(ndarray::arr2(&[[0.0f64, 1.0]]).into_dyn());
        assert!(float.to_indices().is_none());
    }

    #[test]
    fn test_min_max() {
        let data = ArrayData::from(ndarray::arr1(&[3u16, 9, 1]).into_dyn());
        assert_eq!(data.min_max(), Some((1.0, 9.0)));

        let empty = ArrayData::from(Array3::<f32>::zeros((0, 2, 2)).into_dyn());
        assert_eq!(empty.min_max(), None);
    }

    #[test]
    fn test_stack_requires_matching_arrays() {
        let a = ArrayData::from(Array3::<u8>::zeros((2, 2, 3)).into_dyn());
        let b = ArrayData::from(Array3::<u8>::ones((2, 2, 3)).into_dyn());
        let stacked = ArrayData::stack(&[a.clone(), b]).unwrap();
        assert_eq!(stacked.shape(), &[2, 2, 2, 3]);

        let other_dtype = ArrayData::from(Array3::<f32>::zeros((2, 2, 3)).into_dyn());
        assert!(ArrayData::stack(&[a.clone(), other_dtype]).is_none());

        let other_shape = ArrayData::from(Array3::<u8>::zeros((1, 2, 3)).into_dyn());
        assert!(ArrayData::stack(&[a, other_shape]).is_none());
        assert!(ArrayData::stack(&[]).is_none());
    }
}
