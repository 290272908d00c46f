//! The wire-level typed-array message.
//!
//! An [`Array`] crosses the service boundary: a dtype tag, an
//! [`ArrayShape`] that may be partially defined or unranked, and content
//! carried either as packed little-endian bytes or as a typed element
//! list. The codec crate converts between this message and the native
//! [`Tensor`](crate::Tensor); both content encodings of the same logical
//! value must decode identically.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tensor::{DType, Shape, TensorData};

/// Wire encoding of a shape.
///
/// A negative dimension means "unknown in that axis"; `unknown_rank`
/// means the rank itself is unknown (in which case `dims` is ignored).
/// `{dims: [], unknown_rank: false}` is a scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayShape {
    /// Ordered dimension sizes; negative = unknown in that axis
    pub dims: Vec<i64>,
    /// Whether the rank itself is unknown
    pub unknown_rank: bool,
}

impl ArrayShape {
    /// A ranked shape with the given dimensions.
    pub fn new(dims: Vec<i64>) -> Self {
        ArrayShape {
            dims,
            unknown_rank: false,
        }
    }

    /// The scalar shape.
    pub fn scalar() -> Self {
        ArrayShape::new(Vec::new())
    }

    /// A shape of entirely unknown rank.
    pub fn unranked() -> Self {
        ArrayShape {
            dims: Vec::new(),
            unknown_rank: true,
        }
    }
}

impl TryFrom<&Shape> for ArrayShape {
    type Error = Error;

    /// Fails with `InvalidArgument` if a dimension exceeds `i64::MAX`,
    /// since the wire encoding reserves negative values for unknown axes.
    fn try_from(shape: &Shape) -> Result<Self> {
        let dims = shape
            .dims()
            .iter()
            .map(|&d| {
                i64::try_from(d).map_err(|_| {
                    Error::invalid_argument(format!(
                        "dimension {} does not fit the signed wire shape encoding",
                        d
                    ))
                })
            })
            .collect::<Result<Vec<i64>>>()?;
        Ok(ArrayShape::new(dims))
    }
}

/// Wire encoding of array content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayContent {
    /// Packed little-endian bytes. Fixed-width types occupy exactly
    /// `num_elements * size_of(dtype)` bytes; strings are a u64-LE
    /// length-prefixed concatenation.
    Bytes(Vec<u8>),
    /// Typed repeated elements, tagged with their dtype.
    Elements(TensorData),
}

/// A typed n-dimensional payload as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    /// Element type
    pub dtype: DType,
    /// Shape, possibly partial or unranked
    pub shape: ArrayShape,
    /// Element content in one of the two encodings
    pub content: ArrayContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_shape_from_native_shape() {
        let shape = Shape::new(vec![2, 3]);
        let wire = ArrayShape::try_from(&shape).unwrap();
        assert_eq!(wire.dims, vec![2, 3]);
        assert!(!wire.unknown_rank);
    }

    #[test]
    fn array_shape_rejects_unencodable_dimension() {
        let shape = Shape::new(vec![u64::MAX]);
        let err = ArrayShape::try_from(&shape).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn wire_shapes_serialize_stably() {
        let wire = ArrayShape::new(vec![2, -1]);
        let json = serde_json::to_string(&wire).unwrap();
        assert_eq!(json, r#"{"dims":[2,-1],"unknown_rank":false}"#);
        let back: ArrayShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wire);
    }
}
