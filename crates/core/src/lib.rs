//! Core types and contracts for Manifold
//!
//! This crate defines the foundational types used throughout the system:
//! - CardinalityMap: participant counts per placement, with a canonical signature
//! - ExecutorId / ValueId / OwnedValueId / ValueRef: the remote-visible handle space
//! - Executor: the contract an underlying executor instance must satisfy
//! - DType / Shape / PartialShape / Tensor: the native tensor model
//! - Array / ArrayShape / ArrayContent: the wire-level typed-array message
//! - Error / StatusCode: the error taxonomy shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod cardinality;
pub mod error;
pub mod executor;
pub mod handle;
pub mod tensor;

pub use array::{Array, ArrayContent, ArrayShape};
pub use cardinality::CardinalityMap;
pub use error::{Error, Result, StatusCode};
pub use executor::{Executor, ExecutorFactory, ValuePayload};
pub use handle::{ExecutorId, OwnedValueId, ValueId, ValueRef};
pub use tensor::{DType, PartialShape, Shape, Tensor, TensorData};
