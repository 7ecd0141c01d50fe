use crate::{Call, Recorder};
use dapple_core::{
    CommandDefinition, Connection, ConnectionOptions, ConnectionState, Error, Executor,
    IsolationLevel, QueryResult, Result, Transaction,
    stream::{self, Stream},
};
use std::{collections::VecDeque, time::Duration};

/// What the next `run` produces.
#[derive(Debug, Clone)]
pub enum Response {
    Results(Vec<QueryResult>),
    Error(String),
}

/// In memory [`Connection`] recording every forwarded call.
///
/// `open` and `close` move the state between `Open` and `Closed`, everything
/// else only records. Use [`with_state`](Self::with_state) to start from any state.
#[derive(Debug)]
pub struct FakeConnection {
    recorder: Recorder,
    connection_string: String,
    database: String,
    timeout: Duration,
    state: ConnectionState,
    open_error: Option<String>,
    close_error: Option<String>,
    dispose_error: Option<String>,
    responses: VecDeque<Response>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            recorder: Recorder::new(),
            connection_string: "fake://".into(),
            database: String::new(),
            timeout: ConnectionOptions::DEFAULT_TIMEOUT,
            state: ConnectionState::Closed,
            open_error: None,
            close_error: None,
            dispose_error: None,
            responses: VecDeque::new(),
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn with_state(mut self, state: ConnectionState) -> Self {
        self.state = state;
        self
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    pub fn failing_open(mut self, message: impl Into<String>) -> Self {
        self.open_error = Some(message.into());
        self
    }

    pub fn failing_close(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }

    pub fn failing_dispose(mut self, message: impl Into<String>) -> Self {
        self.dispose_error = Some(message.into());
        self
    }

    /// Queue the results of the next `run`. Without a queued response `run` yields nothing.
    pub fn respond_with(mut self, results: impl IntoIterator<Item = QueryResult>) -> Self {
        self.responses
            .push_back(Response::Results(results.into_iter().collect()));
        self
    }

    pub fn respond_with_error(mut self, message: impl Into<String>) -> Self {
        self.responses.push_back(Response::Error(message.into()));
        self
    }
}

impl Default for FakeConnection {
    fn default() -> Self {
        Self::new()
    }
}

fn fail(message: &Option<String>) -> Result<()> {
    match message {
        Some(message) => Err(Error::msg(message.clone())),
        None => Ok(()),
    }
}

impl Connection for FakeConnection {
    type Transaction = FakeTransaction;
    type Command = CommandDefinition;

    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn set_connection_string(&mut self, connection_string: String) {
        self.recorder
            .record(Call::SetConnectionString(connection_string.clone()));
        self.connection_string = connection_string;
    }

    fn connection_timeout(&self) -> Duration {
        self.timeout
    }

    fn database(&self) -> &str {
        &self.database
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn open(&mut self) -> Result<()> {
        self.recorder.record(Call::Open);
        fail(&self.open_error)?;
        self.state = ConnectionState::Open;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.recorder.record(Call::Close);
        fail(&self.close_error)?;
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<FakeTransaction> {
        self.recorder.record(Call::BeginTransaction(None));
        Ok(FakeTransaction::new(
            IsolationLevel::Unspecified,
            self.recorder.clone(),
        ))
    }

    fn begin_transaction_with(&mut self, isolation_level: IsolationLevel) -> Result<FakeTransaction> {
        self.recorder
            .record(Call::BeginTransaction(Some(isolation_level)));
        Ok(FakeTransaction::new(isolation_level, self.recorder.clone()))
    }

    /// Transactions are told apart by the recorder they share with their connection.
    fn owns_transaction(&self, transaction: &FakeTransaction) -> bool {
        transaction.recorder.same_as(&self.recorder)
    }

    fn change_database(&mut self, database: &str) -> Result<()> {
        self.recorder.record(Call::ChangeDatabase(database.into()));
        self.database = database.into();
        Ok(())
    }

    fn create_command(&mut self) -> CommandDefinition {
        self.recorder.record(Call::CreateCommand);
        CommandDefinition::default().with_timeout(Some(self.timeout))
    }

    fn dispose(&mut self) -> Result<()> {
        self.recorder.record(Call::Dispose);
        fail(&self.dispose_error)
    }
}

impl Executor for FakeConnection {
    fn run(&mut self, command: CommandDefinition) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.recorder.record(Call::Run(command));
        let items: Vec<Result<QueryResult>> = match self.responses.pop_front() {
            Some(Response::Results(results)) => results.into_iter().map(Ok).collect(),
            Some(Response::Error(message)) => vec![Err(Error::msg(message))],
            None => Vec::new(),
        };
        stream::iter(items)
    }
}

/// Transaction handed out by the doubles, records commit and rollback.
#[derive(Debug)]
pub struct FakeTransaction {
    isolation_level: IsolationLevel,
    active: bool,
    recorder: Recorder,
}

impl FakeTransaction {
    pub fn new(isolation_level: IsolationLevel, recorder: Recorder) -> Self {
        Self {
            isolation_level,
            active: true,
            recorder,
        }
    }

    /// A transaction that already completed.
    pub fn completed(recorder: Recorder) -> Self {
        Self {
            isolation_level: IsolationLevel::Unspecified,
            active: false,
            recorder,
        }
    }
}

impl Transaction for FakeTransaction {
    fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn commit(self) -> Result<()> {
        self.recorder.record(Call::Commit);
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.recorder.record(Call::Rollback);
        Ok(())
    }
}
