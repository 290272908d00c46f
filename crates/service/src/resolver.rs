//! Executor lifecycle: creation, sharing, refcounting, destruction.
//!
//! The resolver keys executor instances by the canonical cardinality
//! signature. Remote sessions requesting the same cardinalities share one
//! instance via a remote refcount; sessions with different cardinalities
//! get independent instances. The two maps (signature -> entry,
//! executor id -> signature) are the only long-lived shared mutable state
//! in this subsystem and sit behind a single reader/writer lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use manifold_core::{
    CardinalityMap, Error, Executor, ExecutorFactory, ExecutorId, Result,
};

/// A leased, shared executor instance.
///
/// Copies of an entry share the same underlying executor; the refcount in
/// a copy is a snapshot taken under the resolver lock.
#[derive(Clone)]
pub struct ExecutorEntry {
    /// The shared executor instance.
    pub executor: Arc<dyn Executor>,
    /// Number of remote sessions currently leasing this instance.
    pub remote_refcount: u64,
    /// Wire-visible identity of this lease, unique for the life of the
    /// process.
    pub executor_id: ExecutorId,
}

impl fmt::Debug for ExecutorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorEntry")
            .field("remote_refcount", &self.remote_refcount)
            .field("executor_id", &self.executor_id)
            .finish()
    }
}

#[derive(Default)]
struct ResolverState {
    /// Cardinality signature -> live entry.
    executors: HashMap<String, ExecutorEntry>,
    /// Executor id -> cardinality signature. Every key here must refer to
    /// an entry in `executors`.
    ids: HashMap<String, String>,
    /// Monotonic, never reused; makes ids collision-free by construction.
    next_index: u64,
}

/// Owns executor instances keyed by cardinality signature.
pub struct ExecutorResolver {
    factory: ExecutorFactory,
    service_id: String,
    state: RwLock<ResolverState>,
}

impl ExecutorResolver {
    /// Create a resolver around an injected executor factory.
    pub fn new(factory: ExecutorFactory) -> Self {
        ExecutorResolver {
            factory,
            service_id: Uuid::new_v4().to_string(),
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// Resolve an executor for the given cardinality requirements.
    ///
    /// First request for a signature constructs a new instance via the
    /// factory with refcount 1; subsequent requests increment the
    /// refcount and return a copy of the same entry. Factory failure
    /// propagates and inserts nothing.
    pub fn resolve(&self, cardinalities: &CardinalityMap) -> Result<ExecutorEntry> {
        let mut state = self.state.write();
        let signature = cardinalities.signature();
        if let Some(entry) = state.executors.get_mut(&signature) {
            entry.remote_refcount += 1;
            return Ok(entry.clone());
        }
        let executor = (self.factory)(cardinalities).map_err(|err| {
            error!(cardinalities = %signature, error = %err, "failed to construct executor");
            err
        })?;
        // The index increments on every construction so the next call
        // yields another unique id, even for a revived signature.
        let executor_id = ExecutorId::from(format!(
            "{}/{}/{}",
            signature, self.service_id, state.next_index
        ));
        state.next_index += 1;
        let entry = ExecutorEntry {
            executor,
            remote_refcount: 1,
            executor_id: executor_id.clone(),
        };
        state
            .ids
            .insert(executor_id.as_str().to_string(), signature.clone());
        state.executors.insert(signature.clone(), entry.clone());
        debug!(cardinalities = %signature, executor_id = %executor_id, "created executor");
        Ok(entry)
    }

    /// Resolve an executor id to its entry.
    ///
    /// An unknown id is a `FailedPrecondition`: retryable, provided the
    /// caller first re-resolves a fresh id. An id that maps to a
    /// signature with no entry is an `Internal` map inconsistency.
    pub fn lookup(&self, id: &ExecutorId) -> Result<ExecutorEntry> {
        let state = self.state.read();
        let signature = state.ids.get(id.as_str()).ok_or_else(|| {
            Error::failed_precondition(format!("no executor found for id '{}'", id))
        })?;
        state.executors.get(signature).cloned().ok_or_else(|| {
            Error::internal(format!(
                "no executor found for cardinalities '{}', referred to by executor id '{}'",
                signature, id
            ))
        })
    }

    /// Release one lease on an executor id.
    ///
    /// Destroys the entry when the refcount reaches zero. Releasing an
    /// already-absent id is a no-op success: duplicate release calls must
    /// be safe under at-most-once delivery uncertainty.
    pub fn release(&self, id: &ExecutorId) -> Result<()> {
        let mut state = self.state.write();
        let signature = match state.ids.get(id.as_str()) {
            Some(signature) => signature.clone(),
            // A release can arrive for an executor destroyed after a
            // failure while the caller retries; that is not an error.
            None => return Ok(()),
        };
        let entry = state.executors.get_mut(&signature).ok_or_else(|| {
            Error::internal(format!(
                "no executor found for cardinalities '{}', referred to by executor id '{}'",
                signature, id
            ))
        })?;
        entry.remote_refcount -= 1;
        if entry.remote_refcount == 0 {
            state.executors.remove(&signature);
            state.ids.remove(id.as_str());
            debug!(executor_id = %id, "destroyed executor at refcount zero");
        }
        Ok(())
    }

    /// Unconditionally remove an entry, regardless of refcount.
    ///
    /// Used when the protocol layer detects the underlying executor is in
    /// an unrecoverable state. Destroying an already-absent id is a no-op.
    pub fn force_destroy(&self, id: &ExecutorId) {
        let mut state = self.state.write();
        match state.ids.remove(id.as_str()) {
            Some(signature) => {
                state.executors.remove(&signature);
                debug!(executor_id = %id, "force-destroyed executor");
            }
            None => {
                debug!(executor_id = %id, "attempted to destroy already-absent executor");
            }
        }
    }
}
