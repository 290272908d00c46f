//! # Manifold Codec
//!
//! Pure conversion functions between the wire-level typed-array message
//! ([`Array`](manifold_core::Array)) and the native in-memory tensor
//! representation ([`Tensor`](manifold_core::Tensor)).
//!
//! The codec is stateless and preserves dtype, shape, and exact byte
//! content across the boundary. Content may arrive either as packed
//! little-endian bytes or as a typed element list; both encodings of the
//! same logical value decode to identical tensors.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod convert;

pub use convert::{
    array_content_from_tensor, array_from_tensor, partial_shape_from_wire, shape_from_wire,
    tensor_from_array, tensor_from_array_content,
};
