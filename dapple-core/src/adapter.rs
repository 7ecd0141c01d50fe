use crate::{
    ArgumentNullError, CommandDefinition, CommandType, Connection, ConnectionState, DataAccessor,
    Error, Executor, FromRow, IsolationLevel, Parameters, Result, Transaction,
    stream::{StreamExt, TryStreamExt},
};
use std::{future::Future, time::Duration};

/// Decorates a [`Connection`] forwarding every member one to one.
///
/// Two guards are added on top of plain forwarding:
/// * [`open`](Self::open) only reaches the underlying connection when it is not already open.
/// * [`dispose`](Self::dispose) closes an open connection before releasing it.
///
/// The adapter holds no state besides the wrapped connection. Wrap a `&mut C`
/// to keep ownership of the connection outside of the adapter.
///
/// When the wrapped connection is also an [`Executor`], the adapter is a
/// [`DataAccessor`] and can be handed to [`DataCommands`](crate::DataCommands).
#[derive(Debug)]
pub struct ConnectionAdapter<C: Connection> {
    connection: C,
}

impl<C: Connection> ConnectionAdapter<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Fails with [`ArgumentNullError`] when `connection` is `None`.
    pub fn try_new(connection: Option<C>) -> Result<Self> {
        match connection {
            Some(connection) => Ok(Self::new(connection)),
            None => Err(Error::new(ArgumentNullError::new("connection"))),
        }
    }

    /// The wrapped connection, for code that needs the native capability.
    pub fn underlying_connection(&self) -> &C {
        &self.connection
    }

    pub fn underlying_connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn into_inner(self) -> C {
        self.connection
    }

    pub fn connection_string(&self) -> &str {
        self.connection.connection_string()
    }

    pub fn set_connection_string(&mut self, connection_string: String) {
        self.connection.set_connection_string(connection_string)
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection.connection_timeout()
    }

    pub fn database(&self) -> &str {
        self.connection.database()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Open the underlying connection unless it already reports [`ConnectionState::Open`].
    pub fn open(&mut self) -> Result<()> {
        if self.connection.state().is_open() {
            log::debug!(
                "Connection to `{}` is already open, not opening it again",
                self.connection.database()
            );
            return Ok(());
        }
        log::trace!("Opening connection to `{}`", self.connection.database());
        self.connection.open()
    }

    pub fn close(&mut self) -> Result<()> {
        log::trace!("Closing connection to `{}`", self.connection.database());
        self.connection.close()
    }

    pub fn begin_transaction(&mut self) -> Result<C::Transaction> {
        log::trace!("Beginning a transaction");
        self.connection.begin_transaction()
    }

    pub fn begin_transaction_with(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<C::Transaction> {
        log::trace!("Beginning a transaction with isolation level {isolation_level:?}");
        self.connection.begin_transaction_with(isolation_level)
    }

    pub fn owns_transaction(&self, transaction: &C::Transaction) -> bool {
        self.connection.owns_transaction(transaction)
    }

    pub fn change_database(&mut self, database: &str) -> Result<()> {
        log::trace!("Changing database to `{database}`");
        self.connection.change_database(database)
    }

    pub fn create_command(&mut self) -> C::Command {
        self.connection.create_command()
    }

    /// Close the connection if it is open, then release it.
    ///
    /// The release is forwarded even when closing fails, the close error is
    /// returned afterwards. Calling it again is as safe as the driver's own
    /// release is.
    pub fn dispose(&mut self) -> Result<()> {
        let closed = if self.connection.state().is_open() {
            log::trace!(
                "Closing connection to `{}` before disposing it",
                self.connection.database()
            );
            self.connection.close().inspect_err(|e| {
                log::error!("{:#}", e);
            })
        } else {
            Ok(())
        };
        log::trace!("Disposing connection to `{}`", self.connection.database());
        let disposed = self.connection.dispose();
        closed.and(disposed)
    }
}

impl<C: Connection> TryFrom<Option<C>> for ConnectionAdapter<C> {
    type Error = Error;

    fn try_from(value: Option<C>) -> Result<Self> {
        Self::try_new(value)
    }
}

impl<C: Connection> Connection for ConnectionAdapter<C> {
    type Transaction = C::Transaction;
    type Command = C::Command;

    fn connection_string(&self) -> &str {
        Self::connection_string(self)
    }
    fn set_connection_string(&mut self, connection_string: String) {
        Self::set_connection_string(self, connection_string)
    }
    fn connection_timeout(&self) -> Duration {
        Self::connection_timeout(self)
    }
    fn database(&self) -> &str {
        Self::database(self)
    }
    fn state(&self) -> ConnectionState {
        Self::state(self)
    }
    fn open(&mut self) -> Result<()> {
        Self::open(self)
    }
    fn close(&mut self) -> Result<()> {
        Self::close(self)
    }
    fn begin_transaction(&mut self) -> Result<Self::Transaction> {
        Self::begin_transaction(self)
    }
    fn begin_transaction_with(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<Self::Transaction> {
        Self::begin_transaction_with(self, isolation_level)
    }
    fn owns_transaction(&self, transaction: &Self::Transaction) -> bool {
        Self::owns_transaction(self, transaction)
    }
    fn change_database(&mut self, database: &str) -> Result<()> {
        Self::change_database(self, database)
    }
    fn create_command(&mut self) -> Self::Command {
        Self::create_command(self)
    }
    fn dispose(&mut self) -> Result<()> {
        Self::dispose(self)
    }
}

/// A transaction can only be passed along while active and on the connection that started it.
fn ensure_enlisted<C: Connection>(
    connection: &C,
    transaction: Option<&C::Transaction>,
) -> Result<()> {
    let Some(transaction) = transaction else {
        return Ok(());
    };
    if !transaction.is_active() {
        return Err(Error::msg(
            "The transaction has already completed and can no longer be used",
        ));
    }
    if !connection.owns_transaction(transaction) {
        return Err(Error::msg(
            "The transaction was started by a different connection",
        ));
    }
    Ok(())
}

impl<C: Connection + Executor> DataAccessor for ConnectionAdapter<C> {
    type Transaction = C::Transaction;

    fn open(&mut self) -> Result<()> {
        Self::open(self)
    }

    fn close(&mut self) -> Result<()> {
        Self::close(self)
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
        let command = CommandDefinition::new(sql)
            .with_parameters(params)
            .with_timeout(timeout)
            .with_command_type(command_type);
        let enlisted = ensure_enlisted(&self.connection, transaction);
        async move {
            enlisted?;
            log::debug!("Querying: {command}");
            self.connection
                .fetch(command)
                .map(|row| row.and_then(R::from_row))
                .try_collect()
                .await
        }
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
        let command = CommandDefinition::new(sql)
            .with_parameters(params)
            .with_timeout(timeout)
            .with_command_type(command_type);
        let enlisted = ensure_enlisted(&self.connection, transaction);
        async move {
            enlisted?;
            log::debug!("Executing: {command}");
            Ok(self.connection.execute(command).await?.rows_affected)
        }
    }
}
