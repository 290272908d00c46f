//! The request protocol layer.
//!
//! One operation per value-graph primitive, each following the same
//! shape: resolve the named executor, translate wire refs to local
//! handles, invoke the executor contract, translate the result back.
//! [`ExecutorService::handle`] dispatches a serialized [`Request`] to the
//! corresponding typed method.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use manifold_codec::array_from_tensor;
use manifold_core::{
    Array, CardinalityMap, Error, Executor, ExecutorFactory, ExecutorId, OwnedValueId, Result,
    ValuePayload, ValueRef,
};

use crate::resolver::ExecutorResolver;

/// A wire request against the executor service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Resolve (or share) an executor for the given cardinalities.
    GetExecutor {
        /// Participant counts per placement
        cardinalities: CardinalityMap,
    },
    /// Embed a value into an executor.
    CreateValue {
        /// Target executor
        executor: ExecutorId,
        /// Domain-defined payload, forwarded unchanged
        value: ValuePayload,
    },
    /// Call a function value, optionally with an argument.
    CreateCall {
        /// Target executor
        executor: ExecutorId,
        /// Ref of the function value
        function_ref: ValueRef,
        /// Ref of the argument value, if any
        argument_ref: Option<ValueRef>,
    },
    /// Build a structure from ordered elements.
    CreateStruct {
        /// Target executor
        executor: ExecutorId,
        /// Refs of the elements; order is significant and preserved
        element_refs: Vec<ValueRef>,
    },
    /// Select one element out of a structure value.
    CreateSelection {
        /// Target executor
        executor: ExecutorId,
        /// Ref of the source structure
        source_ref: ValueRef,
        /// Zero-based element index
        index: u32,
    },
    /// Materialize a value as a wire array.
    Compute {
        /// Target executor
        executor: ExecutorId,
        /// Ref of the value to materialize
        value_ref: ValueRef,
    },
    /// Release values owned by an executor. Best-effort per ref.
    Dispose {
        /// Target executor
        executor: ExecutorId,
        /// Refs to release
        value_refs: Vec<ValueRef>,
    },
    /// Release one lease on an executor.
    DisposeExecutor {
        /// The executor lease to release
        executor: ExecutorId,
    },
}

/// A wire response from the executor service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// The resolved executor lease.
    Executor {
        /// Wire-visible executor identity
        executor: ExecutorId,
    },
    /// A created value's wire reference.
    Value {
        /// Ref of the created value
        value_ref: ValueRef,
    },
    /// A materialized value.
    Computed {
        /// The materialized array
        value: Array,
    },
    /// Operation completed with nothing to return.
    Unit,
}

/// The service-facing surface over the resolver and executor contract.
///
/// Thread-safe: concurrent requests share the resolver's reader/writer
/// lock and whatever concurrency the executor instances themselves
/// provide. No operation here blocks except by delegating to an executor.
pub struct ExecutorService {
    resolver: ExecutorResolver,
}

impl ExecutorService {
    /// Create a service around an injected executor factory.
    pub fn new(factory: ExecutorFactory) -> Self {
        ExecutorService {
            resolver: ExecutorResolver::new(factory),
        }
    }

    /// Dispatch a wire request to the corresponding operation.
    pub fn handle(&self, request: Request) -> Result<Response> {
        match request {
            Request::GetExecutor { cardinalities } => {
                let executor = self.get_executor(&cardinalities)?;
                Ok(Response::Executor { executor })
            }
            Request::CreateValue { executor, value } => {
                let value_ref = self.create_value(&executor, &value)?;
                Ok(Response::Value { value_ref })
            }
            Request::CreateCall {
                executor,
                function_ref,
                argument_ref,
            } => {
                let value_ref = self.create_call(&executor, &function_ref, argument_ref.as_ref())?;
                Ok(Response::Value { value_ref })
            }
            Request::CreateStruct {
                executor,
                element_refs,
            } => {
                let value_ref = self.create_struct(&executor, &element_refs)?;
                Ok(Response::Value { value_ref })
            }
            Request::CreateSelection {
                executor,
                source_ref,
                index,
            } => {
                let value_ref = self.create_selection(&executor, &source_ref, index)?;
                Ok(Response::Value { value_ref })
            }
            Request::Compute {
                executor,
                value_ref,
            } => {
                let value = self.compute(&executor, &value_ref)?;
                Ok(Response::Computed { value })
            }
            Request::Dispose {
                executor,
                value_refs,
            } => {
                self.dispose(&executor, &value_refs)?;
                Ok(Response::Unit)
            }
            Request::DisposeExecutor { executor } => {
                self.dispose_executor(&executor)?;
                Ok(Response::Unit)
            }
        }
    }

    /// Resolve (or share) an executor for the given cardinalities.
    pub fn get_executor(&self, cardinalities: &CardinalityMap) -> Result<ExecutorId> {
        let entry = self.resolver.resolve(cardinalities)?;
        Ok(entry.executor_id)
    }

    /// Embed a value into the named executor.
    pub fn create_value(&self, id: &ExecutorId, value: &ValuePayload) -> Result<ValueRef> {
        let executor = self.require_executor(id)?;
        let raw = executor
            .create_value(value)
            .map_err(|err| self.classify(err, id))?;
        let owned = OwnedValueId::new(executor, raw);
        // Ownership moves into the response: the value must survive past
        // the end of this request.
        Ok(ValueRef::from(owned.forget()))
    }

    /// Call a function value, optionally with an argument value.
    pub fn create_call(
        &self,
        id: &ExecutorId,
        function_ref: &ValueRef,
        argument_ref: Option<&ValueRef>,
    ) -> Result<ValueRef> {
        let executor = self.require_executor(id)?;
        let function = function_ref.parse()?;
        let argument = argument_ref.map(|r| r.parse()).transpose()?;
        let raw = executor
            .create_call(function, argument)
            .map_err(|err| self.classify(err, id))?;
        let owned = OwnedValueId::new(executor, raw);
        Ok(ValueRef::from(owned.forget()))
    }

    /// Build a structure from an ordered sequence of value refs.
    pub fn create_struct(&self, id: &ExecutorId, element_refs: &[ValueRef]) -> Result<ValueRef> {
        let executor = self.require_executor(id)?;
        let elements = element_refs
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<_>>>()?;
        let raw = executor
            .create_struct(&elements)
            .map_err(|err| self.classify(err, id))?;
        let owned = OwnedValueId::new(executor, raw);
        Ok(ValueRef::from(owned.forget()))
    }

    /// Select one element out of a structure value.
    pub fn create_selection(
        &self,
        id: &ExecutorId,
        source_ref: &ValueRef,
        index: u32,
    ) -> Result<ValueRef> {
        let executor = self.require_executor(id)?;
        let source = source_ref.parse()?;
        let raw = executor
            .create_selection(source, index)
            .map_err(|err| self.classify(err, id))?;
        let owned = OwnedValueId::new(executor, raw);
        Ok(ValueRef::from(owned.forget()))
    }

    /// Materialize a value and convert it to its wire array form.
    pub fn compute(&self, id: &ExecutorId, value_ref: &ValueRef) -> Result<Array> {
        let executor = self.require_executor(id)?;
        let value = value_ref.parse()?;
        let tensor = executor
            .materialize(value)
            .map_err(|err| self.classify(err, id))?;
        array_from_tensor(&tensor)
    }

    /// Release values owned by the named executor.
    ///
    /// If the executor itself is already gone the values certainly are
    /// too, so the request succeeds. A malformed ref is skipped without
    /// failing the rest of the batch; a genuine disposal failure aborts
    /// the remaining batch and surfaces.
    pub fn dispose(&self, id: &ExecutorId, value_refs: &[ValueRef]) -> Result<()> {
        let executor = match self.require_executor(id) {
            Ok(executor) => executor,
            Err(_) => return Ok(()),
        };
        for value_ref in value_refs {
            let value = match value_ref.parse() {
                Ok(value) => value,
                Err(err) => {
                    debug!(value_ref = %value_ref, error = %err, "skipping malformed ref in dispose batch");
                    continue;
                }
            };
            executor
                .dispose(value)
                .map_err(|err| self.classify(err, id))?;
        }
        Ok(())
    }

    /// Release one lease on the named executor.
    ///
    /// Releasing an already-gone executor succeeds: duplicate delivery of
    /// this request must be tolerated.
    pub fn dispose_executor(&self, id: &ExecutorId) -> Result<()> {
        self.resolver.release(id)
    }

    /// The resolver behind this service. Escape hatch for hosts that
    /// manage executor lifetime directly.
    pub fn resolver(&self) -> &ExecutorResolver {
        &self.resolver
    }

    fn require_executor(&self, id: &ExecutorId) -> Result<Arc<dyn Executor>> {
        Ok(self.resolver.lookup(id)?.executor)
    }

    /// Uniform failure classification: a `FailedPrecondition` from the
    /// executor contract means the instance is no longer usable, so its
    /// entry is evicted before the error surfaces. Every other kind
    /// surfaces unchanged.
    fn classify(&self, err: Error, id: &ExecutorId) -> Error {
        if matches!(err, Error::FailedPrecondition { .. }) {
            warn!(executor_id = %id, error = %err, "executor reported failed precondition, destroying");
            self.resolver.force_destroy(id);
        }
        err
    }
}
