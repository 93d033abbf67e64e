//! Host-memory n-dimensional arrays
//!
//! [`Array`] is the only payload the NPZ codec understands: an
//! [`ndarray::ArrayD`] of one of the supported element types, tagged by
//! [`DType`]. Accelerator or gradient-tracking data is brought into this
//! form through [`ToHostArray`] (see [`Tensor`]).
//!
//! ```rust
//! use artifact_sink::array::{Array, DType};
//!
//! let array = Array::from_shape_vec([2, 3], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! assert_eq!(array.dtype(), DType::F32);
//! assert_eq!(array.shape(), &[2, 3]);
//! assert_eq!(array.to_vec::<f32>()?[4], 5.0);
//! # Ok::<(), artifact_sink::Error>(())
//! ```

mod tensor;

pub use tensor::{Device, Tensor, ToHostArray};

use std::fmt;

use ndarray::{Array1, ArrayD, ArrayViewD, IxDyn};
use ndarray_npy::{ViewElement, WritableElement};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Element type of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Boolean, one byte per element
    Bool,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 64-bit integer
    U64,
    /// Signed 64-bit integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl DType {
    /// Size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
            Self::U64 => "uint64",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed storage behind an [`Array`], one variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// `bool` elements
    Bool(ArrayD<bool>),
    /// `u8` elements
    U8(ArrayD<u8>),
    /// `i8` elements
    I8(ArrayD<i8>),
    /// `u16` elements
    U16(ArrayD<u16>),
    /// `i16` elements
    I16(ArrayD<i16>),
    /// `u32` elements
    U32(ArrayD<u32>),
    /// `i32` elements
    I32(ArrayD<i32>),
    /// `u64` elements
    U64(ArrayD<u64>),
    /// `i64` elements
    I64(ArrayD<i64>),
    /// `f32` elements
    F32(ArrayD<f32>),
    /// `f64` elements
    F64(ArrayD<f64>),
}

/// Run `$body` with `$values` bound to the typed `ArrayD` inside an
/// [`ArrayData`].
macro_rules! for_each_data {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            $crate::array::ArrayData::Bool($values) => $body,
            $crate::array::ArrayData::U8($values) => $body,
            $crate::array::ArrayData::I8($values) => $body,
            $crate::array::ArrayData::U16($values) => $body,
            $crate::array::ArrayData::I16($values) => $body,
            $crate::array::ArrayData::U32($values) => $body,
            $crate::array::ArrayData::I32($values) => $body,
            $crate::array::ArrayData::U64($values) => $body,
            $crate::array::ArrayData::I64($values) => $body,
            $crate::array::ArrayData::F32($values) => $body,
            $crate::array::ArrayData::F64($values) => $body,
        }
    };
}

pub(crate) use for_each_data;

/// Rust scalar types that can be stored in an [`Array`].
///
/// The NPY codec for each type comes from `ndarray-npy`.
pub trait Element:
    Copy + Default + WritableElement + ViewElement + Send + Sync + 'static
{
    /// Dtype tag for this element type.
    const DTYPE: DType;

    /// Tag typed storage with its variant.
    fn into_data(values: ArrayD<Self>) -> ArrayData;

    /// Typed storage, if `data` holds this element type.
    fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>>;

    /// Lossy conversion used for metric payloads.
    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn into_data(values: ArrayD<Self>) -> ArrayData {
                    ArrayData::$dtype(values)
                }

                fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>> {
                    match data {
                        ArrayData::$dtype(values) => Some(values),
                        _ => None,
                    }
                }

                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_element! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn into_data(values: ArrayD<Self>) -> ArrayData {
        ArrayData::Bool(values)
    }

    fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>> {
        match data {
            ArrayData::Bool(values) => Some(values),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        f64::from(u8::from(self))
    }
}

const fn dtype_of<T: Element>(_: &ArrayD<T>) -> DType {
    T::DTYPE
}

/// Owned n-dimensional array in host memory.
///
/// A zero-dimensional array (empty shape) holds exactly one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    data: ArrayData,
}

impl Array {
    /// Wrap an existing `ndarray` array.
    #[must_use]
    pub fn from_ndarray<T: Element>(values: ArrayD<T>) -> Self {
        Self {
            data: T::into_data(values),
        }
    }

    /// Create a one-dimensional array from a vector.
    #[must_use]
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self::from_ndarray(Array1::from(values).into_dyn())
    }

    /// Create an array with the given shape from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the element count does not match
    /// the shape.
    pub fn from_shape_vec<T: Element>(shape: impl Into<Vec<usize>>, values: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        let actual = values.len();
        match ArrayD::from_shape_vec(IxDyn(&shape), values) {
            Ok(values) => Ok(Self::from_ndarray(values)),
            Err(_) => Err(Error::ShapeMismatch {
                expected: element_count(&shape).unwrap_or(usize::MAX),
                shape,
                actual,
            }),
        }
    }

    /// Create a zero-filled array (`false` for booleans).
    #[must_use]
    pub fn zeros(dtype: DType, shape: impl Into<Vec<usize>>) -> Self {
        fn filled<T: Element>(shape: &[usize]) -> Array {
            Array::from_ndarray(ArrayD::<T>::default(IxDyn(shape)))
        }

        let shape = shape.into();
        match dtype {
            DType::Bool => filled::<bool>(&shape),
            DType::U8 => filled::<u8>(&shape),
            DType::I8 => filled::<i8>(&shape),
            DType::U16 => filled::<u16>(&shape),
            DType::I16 => filled::<i16>(&shape),
            DType::U32 => filled::<u32>(&shape),
            DType::I32 => filled::<i32>(&shape),
            DType::U64 => filled::<u64>(&shape),
            DType::I64 => filled::<i64>(&shape),
            DType::F32 => filled::<f32>(&shape),
            DType::F64 => filled::<f64>(&shape),
        }
    }

    /// Typed storage.
    #[must_use]
    pub const fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Unwrap into typed storage.
    #[must_use]
    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Element type.
    #[must_use]
    pub fn dtype(&self) -> DType {
        for_each_data!(&self.data, values => dtype_of(values))
    }

    /// Shape (row-major).
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        for_each_data!(&self.data, values => values.shape())
    }

    /// Number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        for_each_data!(&self.data, values => values.len())
    }

    /// Whether the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the elements as an `ndarray` view of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DtypeMismatch`] if `T` is not the stored dtype.
    pub fn view<T: Element>(&self) -> Result<ArrayViewD<'_, T>> {
        T::view_data(&self.data)
            .map(ArrayD::view)
            .ok_or_else(|| Error::DtypeMismatch {
                expected: T::DTYPE,
                actual: self.dtype(),
            })
    }

    /// Copy the elements out as `T`, in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DtypeMismatch`] if `T` is not the stored dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        Ok(self.view::<T>()?.iter().copied().collect())
    }

    /// Copy the elements out as `f64`, whatever the stored dtype.
    #[must_use]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        for_each_data!(&self.data, values => values.iter().copied().map(Element::to_f64).collect())
    }

    /// Return the same elements under a new shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the element count differs.
    pub fn reshape(self, shape: impl Into<Vec<usize>>) -> Result<Self> {
        let shape = shape.into();
        for_each_data!(self.data, values => {
            Self::from_shape_vec(shape, values.iter().copied().collect())
        })
    }
}

impl<T: Element> From<ArrayD<T>> for Array {
    fn from(values: ArrayD<T>) -> Self {
        Self::from_ndarray(values)
    }
}

/// Element count of `shape`, or `None` if it overflows `usize`.
pub(crate) fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |count, &dim| count.checked_mul(dim))
}
