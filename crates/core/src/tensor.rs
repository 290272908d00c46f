//! The native tensor model.
//!
//! A [`Tensor`] is a fully defined [`Shape`] plus a [`TensorData`] payload,
//! a closed tagged variant with one typed buffer per [`DType`]. Wire
//! messages may carry partially defined or unranked shapes; those surface
//! here as [`PartialShape`].
//!
//! Complex elements are stored as `(re, im)` pairs; half-precision floats
//! use [`half::f16`].

use std::fmt;

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element type of an array or tensor.
///
/// A closed set; adding a dtype means adding a [`TensorData`] variant and
/// the codec table entries for it, not branching logic at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    /// Boolean, one byte per element on the wire
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    Uint8,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit unsigned integer
    Uint32,
    /// 64-bit unsigned integer
    Uint64,
    /// IEEE-754 half-precision float
    Float16,
    /// IEEE-754 single-precision float
    Float32,
    /// IEEE-754 double-precision float
    Float64,
    /// Complex number of two f32 components
    Complex64,
    /// Complex number of two f64 components
    Complex128,
    /// Variable-length string
    String,
}

impl DType {
    /// Fixed wire width of one element in bytes, or `None` for
    /// variable-length types (strings).
    pub fn size_of(&self) -> Option<usize> {
        match self {
            DType::Bool | DType::Int8 | DType::Uint8 => Some(1),
            DType::Int16 | DType::Uint16 | DType::Float16 => Some(2),
            DType::Int32 | DType::Uint32 | DType::Float32 => Some(4),
            DType::Int64 | DType::Uint64 | DType::Float64 | DType::Complex64 => Some(8),
            DType::Complex128 => Some(16),
            DType::String => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Float16 => "float16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
            DType::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// A fully defined shape: an ordered sequence of dimension sizes.
///
/// A scalar is the empty shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(Vec<u64>);

impl Shape {
    /// Shape of a scalar.
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    /// Shape with the given dimension sizes.
    pub fn new(dims: Vec<u64>) -> Self {
        Shape(dims)
    }

    /// Dimension sizes in order.
    pub fn dims(&self) -> &[u64] {
        &self.0
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total element count: the product of all dimensions (1 for scalars),
    /// or `None` if the product overflows `u64`.
    pub fn num_elements(&self) -> Option<u64> {
        self.0.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }
}

impl From<&[u64]> for Shape {
    fn from(dims: &[u64]) -> Self {
        Shape(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// A possibly unknown shape.
///
/// Each axis of a ranked shape is either a known size or unknown; a shape
/// may also be entirely unranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartialShape {
    /// Rank and all dimensions unknown.
    Unranked,
    /// Rank known; each axis is `Some(size)` or unknown.
    Ranked(Vec<Option<u64>>),
}

impl PartialShape {
    /// Whether every axis is known.
    pub fn is_fully_defined(&self) -> bool {
        match self {
            PartialShape::Unranked => false,
            PartialShape::Ranked(dims) => dims.iter().all(|d| d.is_some()),
        }
    }

    /// Convert to a fully defined [`Shape`], if possible.
    pub fn to_shape(&self) -> Option<Shape> {
        match self {
            PartialShape::Unranked => None,
            PartialShape::Ranked(dims) => dims
                .iter()
                .map(|d| *d)
                .collect::<Option<Vec<u64>>>()
                .map(Shape::new),
        }
    }
}

/// Typed element storage for one tensor, tagged by dtype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorData {
    /// Bool elements
    Bool(Vec<bool>),
    /// Int8 elements
    Int8(Vec<i8>),
    /// Int16 elements
    Int16(Vec<i16>),
    /// Int32 elements
    Int32(Vec<i32>),
    /// Int64 elements
    Int64(Vec<i64>),
    /// Uint8 elements
    Uint8(Vec<u8>),
    /// Uint16 elements
    Uint16(Vec<u16>),
    /// Uint32 elements
    Uint32(Vec<u32>),
    /// Uint64 elements
    Uint64(Vec<u64>),
    /// Float16 elements
    Float16(Vec<f16>),
    /// Float32 elements
    Float32(Vec<f32>),
    /// Float64 elements
    Float64(Vec<f64>),
    /// Complex64 elements as `(re, im)` pairs
    Complex64(Vec<(f32, f32)>),
    /// Complex128 elements as `(re, im)` pairs
    Complex128(Vec<(f64, f64)>),
    /// String elements
    String(Vec<String>),
}

impl TensorData {
    /// The dtype this buffer stores.
    pub fn dtype(&self) -> DType {
        match self {
            TensorData::Bool(_) => DType::Bool,
            TensorData::Int8(_) => DType::Int8,
            TensorData::Int16(_) => DType::Int16,
            TensorData::Int32(_) => DType::Int32,
            TensorData::Int64(_) => DType::Int64,
            TensorData::Uint8(_) => DType::Uint8,
            TensorData::Uint16(_) => DType::Uint16,
            TensorData::Uint32(_) => DType::Uint32,
            TensorData::Uint64(_) => DType::Uint64,
            TensorData::Float16(_) => DType::Float16,
            TensorData::Float32(_) => DType::Float32,
            TensorData::Float64(_) => DType::Float64,
            TensorData::Complex64(_) => DType::Complex64,
            TensorData::Complex128(_) => DType::Complex128,
            TensorData::String(_) => DType::String,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            TensorData::Bool(v) => v.len(),
            TensorData::Int8(v) => v.len(),
            TensorData::Int16(v) => v.len(),
            TensorData::Int32(v) => v.len(),
            TensorData::Int64(v) => v.len(),
            TensorData::Uint8(v) => v.len(),
            TensorData::Uint16(v) => v.len(),
            TensorData::Uint32(v) => v.len(),
            TensorData::Uint64(v) => v.len(),
            TensorData::Float16(v) => v.len(),
            TensorData::Float32(v) => v.len(),
            TensorData::Float64(v) => v.len(),
            TensorData::Complex64(v) => v.len(),
            TensorData::Complex128(v) => v.len(),
            TensorData::String(v) => v.len(),
        }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed n-dimensional value: a fully defined shape plus element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Shape,
    data: TensorData,
}

impl Tensor {
    /// Create a tensor, checking that the element count matches the shape.
    pub fn new(shape: Shape, data: TensorData) -> Result<Self> {
        let expected = shape.num_elements().ok_or_else(|| {
            Error::invalid_argument(format!(
                "shape {} has an element count that overflows u64",
                shape
            ))
        })?;
        if data.len() as u64 != expected {
            return Err(Error::invalid_argument(format!(
                "shape {} implies {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Tensor { shape, data })
    }

    /// Create a scalar tensor from a single-element buffer.
    pub fn scalar(data: TensorData) -> Result<Self> {
        Tensor::new(Shape::scalar(), data)
    }

    /// The tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The tensor's element buffer.
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// The tensor's element type.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_shape_has_one_element() {
        assert_eq!(Shape::scalar().num_elements(), Some(1));
        assert_eq!(Shape::scalar().rank(), 0);
    }

    #[test]
    fn num_elements_is_dim_product() {
        assert_eq!(Shape::new(vec![2, 3]).num_elements(), Some(6));
        assert_eq!(Shape::new(vec![2, 0]).num_elements(), Some(0));
    }

    #[test]
    fn num_elements_detects_overflow() {
        assert_eq!(Shape::new(vec![u64::MAX, 2]).num_elements(), None);
    }

    #[test]
    fn tensor_rejects_overflowing_shape() {
        let err = Tensor::new(Shape::new(vec![u64::MAX, 2]), TensorData::Int32(vec![1]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn tensor_rejects_element_count_mismatch() {
        let err = Tensor::new(Shape::new(vec![2, 3]), TensorData::Int32(vec![1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn tensor_accepts_matching_count() {
        let tensor = Tensor::new(
            Shape::new(vec![2, 3]),
            TensorData::Int32(vec![1, 2, 3, 4, 5, 6]),
        )
        .unwrap();
        assert_eq!(tensor.dtype(), DType::Int32);
        assert_eq!(tensor.shape().dims(), &[2, 3]);
    }

    #[test]
    fn partial_shape_classification() {
        let full = PartialShape::Ranked(vec![Some(2), Some(3)]);
        assert!(full.is_fully_defined());
        assert_eq!(full.to_shape(), Some(Shape::new(vec![2, 3])));

        let partial = PartialShape::Ranked(vec![Some(2), None]);
        assert!(!partial.is_fully_defined());
        assert_eq!(partial.to_shape(), None);

        assert!(!PartialShape::Unranked.is_fully_defined());
        assert_eq!(PartialShape::Unranked.to_shape(), None);
    }

    #[test]
    fn dtype_widths() {
        assert_eq!(DType::Bool.size_of(), Some(1));
        assert_eq!(DType::Float16.size_of(), Some(2));
        assert_eq!(DType::Complex64.size_of(), Some(8));
        assert_eq!(DType::Complex128.size_of(), Some(16));
        assert_eq!(DType::String.size_of(), None);
    }
}
