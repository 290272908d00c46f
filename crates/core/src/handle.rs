//! The remote-visible handle space.
//!
//! A [`ValueId`] is an opaque integer identity into one executor's value
//! space; it is never valid across instances. On the wire it travels as a
//! [`ValueRef`], its decimal string form. [`OwnedValueId`] adds disposal
//! ownership: it releases the value on drop unless ownership was
//! explicitly forgotten. [`ExecutorId`] names a leased executor instance.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::executor::Executor;

/// Opaque local handle into one executor's value space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u64);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire encoding of a [`ValueId`]: its decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRef(String);

impl ValueRef {
    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the decimal string back into a [`ValueId`].
    ///
    /// A string that does not parse as an integer id is a client protocol
    /// error.
    pub fn parse(&self) -> Result<ValueId> {
        self.0.parse::<u64>().map(ValueId).map_err(|_| {
            Error::invalid_argument(format!(
                "expected value ref to be an integer id, found '{}'",
                self.0
            ))
        })
    }
}

impl From<ValueId> for ValueRef {
    fn from(id: ValueId) -> Self {
        ValueRef(id.to_string())
    }
}

impl From<&str> for ValueRef {
    fn from(s: &str) -> Self {
        ValueRef(s.to_string())
    }
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire-visible identity of a leased executor instance.
///
/// Opaque to clients; allocated by the resolver as
/// `{cardinality-signature}/{service-id}/{index}` and never reused after
/// destruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutorId(String);

impl ExecutorId {
    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExecutorId {
    fn from(s: String) -> Self {
        ExecutorId(s)
    }
}

impl From<&str> for ExecutorId {
    fn from(s: &str) -> Self {
        ExecutorId(s.to_string())
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A [`ValueId`] with disposal ownership.
///
/// Dropping the wrapper disposes the value in its owning executor;
/// [`forget`](OwnedValueId::forget) suppresses that exactly once and hands
/// the raw id back, for values that must outlive the scope that created
/// them (e.g. handed off into a response).
pub struct OwnedValueId {
    id: ValueId,
    executor: Option<Arc<dyn Executor>>,
}

impl OwnedValueId {
    /// Take ownership of `id` within `executor`.
    pub fn new(executor: Arc<dyn Executor>, id: ValueId) -> Self {
        OwnedValueId {
            id,
            executor: Some(executor),
        }
    }

    /// The wrapped id, without transferring ownership.
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// Transfer ownership away: no disposal will occur on drop.
    pub fn forget(mut self) -> ValueId {
        self.executor = None;
        self.id
    }
}

impl Drop for OwnedValueId {
    fn drop(&mut self) {
        if let Some(executor) = self.executor.take() {
            if let Err(err) = executor.dispose(self.id) {
                tracing::warn!(id = %self.id, error = %err, "failed to dispose owned value");
            }
        }
    }
}

impl fmt::Debug for OwnedValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedValueId")
            .field("id", &self.id)
            .field("owned", &self.executor.is_some())
            .finish()
    }
}
