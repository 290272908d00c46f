//! A scripted in-memory executor for resolver and protocol tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use manifold_codec::tensor_from_array;
use manifold_core::{
    CardinalityMap, Error, Executor, ExecutorFactory, Result, Tensor, ValueId, ValuePayload,
};

#[derive(Clone)]
enum MockValue {
    Tensor(Tensor),
    Opaque,
    Struct(Vec<ValueId>),
}

/// An executor that tracks its value space in a map and can be scripted
/// to fail its next operation.
pub struct MockExecutor {
    next_id: AtomicU64,
    values: Mutex<HashMap<ValueId, MockValue>>,
    fail_next: Mutex<Option<Error>>,
    disposed: Mutex<Vec<ValueId>>,
}

impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(MockExecutor {
            next_id: AtomicU64::new(1),
            values: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
            disposed: Mutex::new(Vec::new()),
        })
    }

    /// Script the next contract call to fail with `err`.
    pub fn fail_next(&self, err: Error) {
        *self.fail_next.lock() = Some(err);
    }

    /// Ids passed to `dispose` so far, in order.
    pub fn disposed(&self) -> Vec<ValueId> {
        self.disposed.lock().clone()
    }

    /// Whether a value id is still live in the mock's value space.
    pub fn is_live(&self, id: ValueId) -> bool {
        self.values.lock().contains_key(&id)
    }

    fn check_scripted_failure(&self) -> Result<()> {
        match self.fail_next.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn store(&self, value: MockValue) -> ValueId {
        let id = ValueId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.values.lock().insert(id, value);
        id
    }

    fn get(&self, id: ValueId) -> Result<MockValue> {
        self.values
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::invalid_argument(format!("unknown value id {}", id)))
    }
}

impl Executor for MockExecutor {
    fn create_value(&self, value: &ValuePayload) -> Result<ValueId> {
        self.check_scripted_failure()?;
        let stored = match value {
            ValuePayload::Array(array) => MockValue::Tensor(tensor_from_array(array)?),
            ValuePayload::Computation(_) => MockValue::Opaque,
        };
        Ok(self.store(stored))
    }

    fn create_call(&self, function: ValueId, argument: Option<ValueId>) -> Result<ValueId> {
        self.check_scripted_failure()?;
        self.get(function)?;
        // Identity call semantics: the result carries the argument's value.
        let result = match argument {
            Some(argument) => self.get(argument)?,
            None => MockValue::Opaque,
        };
        Ok(self.store(result))
    }

    fn create_struct(&self, elements: &[ValueId]) -> Result<ValueId> {
        self.check_scripted_failure()?;
        for &element in elements {
            self.get(element)?;
        }
        Ok(self.store(MockValue::Struct(elements.to_vec())))
    }

    fn create_selection(&self, source: ValueId, index: u32) -> Result<ValueId> {
        self.check_scripted_failure()?;
        match self.get(source)? {
            MockValue::Struct(elements) => {
                let element = elements.get(index as usize).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "selection index {} out of range for struct of {} elements",
                        index,
                        elements.len()
                    ))
                })?;
                let value = self.get(*element)?;
                Ok(self.store(value))
            }
            _ => Err(Error::invalid_argument(format!(
                "value {} is not a struct",
                source
            ))),
        }
    }

    fn materialize(&self, id: ValueId) -> Result<Tensor> {
        self.check_scripted_failure()?;
        match self.get(id)? {
            MockValue::Tensor(tensor) => Ok(tensor),
            _ => Err(Error::invalid_argument(format!(
                "value {} has no tensor result",
                id
            ))),
        }
    }

    fn dispose(&self, id: ValueId) -> Result<()> {
        self.check_scripted_failure()?;
        self.values.lock().remove(&id);
        self.disposed.lock().push(id);
        Ok(())
    }
}

/// Counts factory invocations and hands out fresh mock executors.
pub struct MockFactory {
    state: Arc<FactoryState>,
}

struct FactoryState {
    created: AtomicUsize,
    last: Mutex<Option<Arc<MockExecutor>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        MockFactory {
            state: Arc::new(FactoryState {
                created: AtomicUsize::new(0),
                last: Mutex::new(None),
            }),
        }
    }

    /// Number of executor instances constructed so far.
    pub fn created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }

    /// The most recently constructed executor instance.
    pub fn last(&self) -> Option<Arc<MockExecutor>> {
        self.state.last.lock().clone()
    }

    pub fn as_factory(&self) -> ExecutorFactory {
        let state = self.state.clone();
        Box::new(move |_cardinalities: &CardinalityMap| {
            state.created.fetch_add(1, Ordering::SeqCst);
            let executor = MockExecutor::new();
            *state.last.lock() = Some(executor.clone());
            let executor: Arc<dyn Executor> = executor;
            Ok(executor)
        })
    }
}

/// A factory that always fails, for factory-error propagation tests.
pub fn failing_factory(reason: &str) -> ExecutorFactory {
    let reason = reason.to_string();
    Box::new(move |_cardinalities: &CardinalityMap| Err(Error::unavailable(reason.clone())))
}
