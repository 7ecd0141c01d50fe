use crate::{CommandType, FromRow, Parameters, Result, Transaction};
use std::{future::Future, time::Duration};

/// Lifecycle plus parameterized query and execute, the capability needed by
/// [`DataCommands`](crate::DataCommands).
pub trait DataAccessor: Send {
    type Transaction: Transaction;

    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    /// Run a query and map every returned row through [`FromRow`].
    ///
    /// A `transaction` must be active and started by this accessor.
    fn query<R, P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&Self::Transaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<Vec<R>>> + Send
    where
        R: FromRow + Send,
        P: Parameters;

    /// Run a command and return the number of rows it affected.
    fn execute<P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&Self::Transaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        P: Parameters;
}

impl<A: DataAccessor> DataAccessor for &mut A {
    type Transaction = A::Transaction;

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn query<R, P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&Self::Transaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<Vec<R>>> + Send
    where
        R: FromRow + Send,
        P: Parameters,
    {
        (**self).query(sql, params, transaction, timeout, command_type)
    }

    fn execute<P>(
        &mut self,
        sql: &str,
        params: P,
        transaction: Option<&Self::Transaction>,
        timeout: Option<Duration>,
        command_type: CommandType,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        P: Parameters,
    {
        (**self).execute(sql, params, transaction, timeout, command_type)
    }
}
