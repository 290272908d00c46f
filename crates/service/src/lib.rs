//! # Manifold Service
//!
//! The service-facing half of the executor engine:
//!
//! - [`ExecutorResolver`] owns the map from cardinality signature to a
//!   shared, refcounted executor instance: created on first request,
//!   shared by refcount on subsequent requests, destroyed at count zero
//!   or on fatal failure.
//! - [`ExecutorService`] is the request protocol layer: it translates
//!   wire value refs into local handles, dispatches value-graph
//!   operations to the executor contract, and converts materialized
//!   tensors through the codec.
//!
//! Recovery is caller-driven: a `FailedPrecondition` from an executor
//! evicts its entry, and the caller re-resolves a fresh executor before
//! retrying. No retry policy lives in this layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod resolver;
mod service;

#[cfg(test)]
mod tests;

pub use resolver::{ExecutorEntry, ExecutorResolver};
pub use service::{ExecutorService, Request, Response};
