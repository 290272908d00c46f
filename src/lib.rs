//! Manifold - a cardinality-multiplexed executor service for distributed
//! computations.
//!
//! A service accepts a value-graph of operations (construct a value, call
//! a function, build a tuple, select an element, materialize a result,
//! dispose a value) addressed against a remote-visible handle space, and
//! routes each operation to one of several underlying executor instances.
//! Executors are multiplexed by cardinality: sessions requesting the same
//! participant counts per placement transparently share one instance via
//! reference counting.
//!
//! # Quick Start
//!
//! ```ignore
//! use manifold::{CardinalityMap, ExecutorService};
//!
//! let service = ExecutorService::new(factory);
//!
//! let cardinalities = CardinalityMap::new().with("clients", 4).with("server", 1);
//! let executor = service.get_executor(&cardinalities)?;
//!
//! let value_ref = service.create_value(&executor, &payload)?;
//! let result = service.compute(&executor, &value_ref)?;
//! ```
//!
//! # Architecture
//!
//! - `manifold-core` defines the handle space, the executor contract,
//!   the tensor model, and the error taxonomy.
//! - `manifold-codec` converts between the wire array message and the
//!   native tensor representation.
//! - `manifold-service` resolves executor instances by cardinality and
//!   routes value-graph operations to them.

pub use manifold_codec::{
    array_content_from_tensor, array_from_tensor, partial_shape_from_wire, shape_from_wire,
    tensor_from_array, tensor_from_array_content,
};
pub use manifold_core::{
    Array, ArrayContent, ArrayShape, CardinalityMap, DType, Error, Executor, ExecutorFactory,
    ExecutorId, OwnedValueId, PartialShape, Result, Shape, StatusCode, Tensor, TensorData,
    ValueId, ValuePayload, ValueRef,
};
pub use manifold_service::{ExecutorEntry, ExecutorResolver, ExecutorService, Request, Response};
