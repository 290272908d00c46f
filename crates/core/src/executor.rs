//! The contract an underlying executor instance must satisfy.
//!
//! Each executor instance executes value-graph operations for one fixed
//! cardinality configuration. Implementations live elsewhere; this crate
//! only defines the capability set the resolver and protocol layer
//! consume. Implementations must be safe to call concurrently for
//! different value ids on the same instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cardinality::CardinalityMap;
use crate::error::Result;
use crate::handle::ValueId;
use crate::tensor::Tensor;
use crate::Array;

/// Payload of a `CreateValue` request.
///
/// Opaque to the resolver and protocol layer: the service forwards it to
/// the executor instance unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePayload {
    /// A literal tensor in wire array form.
    Array(Array),
    /// An encoded computation; the encoding is a collaborator concern.
    Computation(Vec<u8>),
}

/// Capability set of one executor instance.
///
/// Value ids returned here are meaningful only within the instance that
/// produced them. Errors carry a category from the shared
/// [`Error`](crate::Error) taxonomy; a `FailedPrecondition` means the
/// instance is no longer usable.
pub trait Executor: Send + Sync {
    /// Embed a value into the executor, returning its handle.
    fn create_value(&self, value: &ValuePayload) -> Result<ValueId>;

    /// Call a function value, optionally with an argument value.
    fn create_call(&self, function: ValueId, argument: Option<ValueId>) -> Result<ValueId>;

    /// Build a structure from an ordered sequence of values.
    fn create_struct(&self, elements: &[ValueId]) -> Result<ValueId>;

    /// Select one element out of a structure value.
    fn create_selection(&self, source: ValueId, index: u32) -> Result<ValueId>;

    /// Compute a value and return its native tensor result.
    ///
    /// Materialization of structured (non-tensor) results is a
    /// collaborator concern and not modeled here.
    fn materialize(&self, id: ValueId) -> Result<Tensor>;

    /// Release a value owned by this executor.
    fn dispose(&self, id: ValueId) -> Result<()>;
}

/// Factory injected into the resolver: builds one executor instance for a
/// fixed cardinality configuration.
pub type ExecutorFactory =
    Box<dyn Fn(&CardinalityMap) -> Result<Arc<dyn Executor>> + Send + Sync>;
