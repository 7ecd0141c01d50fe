use crate::{AccessorCall, Call, FakeTransaction, Recorder};
use dapple_core::{
    CommandType, DataAccessor, Error, FromRow, Parameters, Result, RowLabeled, Transaction,
    future::{self, Either, Future, Pending, Ready},
};
use std::time::Duration;

/// [`DataAccessor`] with scripted results, recording open, close and every command.
#[derive(Debug, Default)]
pub struct FakeAccessor {
    recorder: Recorder,
    rows: Vec<RowLabeled>,
    affected: u64,
    open_error: Option<String>,
    close_error: Option<String>,
    query_error: Option<String>,
    execute_error: Option<String>,
    pending: bool,
}

impl FakeAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    /// Rows returned by every query.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = RowLabeled>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    /// Count returned by every execute.
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
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

    pub fn failing_query(mut self, message: impl Into<String>) -> Self {
        self.query_error = Some(message.into());
        self
    }

    pub fn failing_execute(mut self, message: impl Into<String>) -> Self {
        self.execute_error = Some(message.into());
        self
    }

    /// Queries and executes never complete, to drop them mid-operation.
    pub fn pending(mut self) -> Self {
        self.pending = true;
        self
    }

    fn accessor_call<P: Parameters>(
        sql: &str,
        params: P,
        transaction: Option<&FakeTransaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> AccessorCall {
        AccessorCall {
            sql: sql.into(),
            parameters: params.into_parameters(),
            transaction: transaction.is_some_and(Transaction::is_active),
            timeout,
            command_type,
        }
    }
}

fn respond<T>(pending: bool, result: Result<T>) -> Either<Pending<Result<T>>, Ready<Result<T>>> {
    if pending {
        Either::Left(future::pending())
    } else {
        Either::Right(future::ready(result))
    }
}

fn fail(message: &Option<String>) -> Result<()> {
    match message {
        Some(message) => Err(Error::msg(message.clone())),
        None => Ok(()),
    }
}

impl DataAccessor for FakeAccessor {
    type Transaction = FakeTransaction;

    fn open(&mut self) -> Result<()> {
        self.recorder.record(Call::Open);
        fail(&self.open_error)
    }

    fn close(&mut self) -> Result<()> {
        self.recorder.record(Call::Close);
        fail(&self.close_error)
    }

    fn query<R, P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&FakeTransaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<Vec<R>>> + Send
    where
        R: FromRow + Send,
        P: Parameters,
    {
        self.recorder.record(Call::Query(Self::accessor_call(
            sql,
            params,
            transaction,
            timeout,
            command_type,
        )));
        let result = fail(&self.query_error).and_then(|_| {
            self.rows
                .iter()
                .cloned()
                .map(R::from_row)
                .collect::<Result<Vec<R>>>()
        });
        respond(self.pending, result)
    }

    fn execute<P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&FakeTransaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        P: Parameters,
    {
        self.recorder.record(Call::Execute(Self::accessor_call(
            sql,
            params,
            transaction,
            timeout,
            command_type,
        )));
        respond(
            self.pending,
            fail(&self.execute_error).map(|_| self.affected),
        )
    }
}
