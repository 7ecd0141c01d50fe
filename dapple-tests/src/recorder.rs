use dapple_core::{CommandDefinition, CommandType, IsolationLevel, ParameterList};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// A call received by one of the test doubles.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetConnectionString(String),
    Open,
    Close,
    Dispose,
    /// `None` when no isolation level was requested.
    BeginTransaction(Option<IsolationLevel>),
    Commit,
    Rollback,
    ChangeDatabase(String),
    CreateCommand,
    Run(CommandDefinition),
    Query(AccessorCall),
    Execute(AccessorCall),
}

/// Arguments received by a `DataAccessor` query or execute.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorCall {
    pub sql: String,
    pub parameters: ParameterList,
    pub transaction: bool,
    pub timeout: Option<Duration>,
    pub command_type: CommandType,
}

/// Shared log of calls, cloned into the doubles and kept by the test to verify them.
#[derive(Default, Debug, Clone)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, call: Call) {
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Number of recorded calls equal to `call`.
    pub fn times(&self, call: &Call) -> usize {
        self.lock().iter().filter(|c| *c == call).count()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().iter().filter(|c| predicate(c)).count()
    }

    /// Whether both handles share the same log.
    pub fn same_as(&self, other: &Recorder) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
