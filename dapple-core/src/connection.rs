use crate::{ConnectionState, IsolationLevel, Result};
use std::time::Duration;

/// A database session capability.
///
/// This is the surface every driver exposes and the one [`ConnectionAdapter`](crate::ConnectionAdapter)
/// decorates. Lifecycle calls are synchronous; running commands is the job of
/// [`Executor`](crate::Executor).
pub trait Connection: Send {
    type Transaction: Transaction;
    type Command: Send;

    fn connection_string(&self) -> &str;
    fn set_connection_string(&mut self, connection_string: String);
    /// Time to wait while establishing a connection.
    fn connection_timeout(&self) -> Duration;
    /// Name of the current database.
    fn database(&self) -> &str;
    fn state(&self) -> ConnectionState;

    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    fn begin_transaction(&mut self) -> Result<Self::Transaction>;
    fn begin_transaction_with(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<Self::Transaction>;

    /// Whether `transaction` was started by this session.
    ///
    /// Drivers that can tell their transactions apart override it, the default accepts any.
    fn owns_transaction(&self, _transaction: &Self::Transaction) -> bool {
        true
    }

    fn change_database(&mut self, database: &str) -> Result<()>;
    fn create_command(&mut self) -> Self::Command;

    /// Release the resources held by the session.
    fn dispose(&mut self) -> Result<()>;
}

/// A transaction started by a [`Connection`].
pub trait Transaction: Send + Sync {
    fn isolation_level(&self) -> IsolationLevel;
    /// False once the transaction was committed, rolled back or its connection went away.
    fn is_active(&self) -> bool;
    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    type Transaction = C::Transaction;
    type Command = C::Command;

    fn connection_string(&self) -> &str {
        (**self).connection_string()
    }
    fn set_connection_string(&mut self, connection_string: String) {
        (**self).set_connection_string(connection_string)
    }
    fn connection_timeout(&self) -> Duration {
        (**self).connection_timeout()
    }
    fn database(&self) -> &str {
        (**self).database()
    }
    fn state(&self) -> ConnectionState {
        (**self).state()
    }
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
    fn begin_transaction(&mut self) -> Result<Self::Transaction> {
        (**self).begin_transaction()
    }
    fn begin_transaction_with(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<Self::Transaction> {
        (**self).begin_transaction_with(isolation_level)
    }
    fn owns_transaction(&self, transaction: &Self::Transaction) -> bool {
        (**self).owns_transaction(transaction)
    }
    fn change_database(&mut self, database: &str) -> Result<()> {
        (**self).change_database(database)
    }
    fn create_command(&mut self) -> Self::Command {
        (**self).create_command()
    }
    fn dispose(&mut self) -> Result<()> {
        (**self).dispose()
    }
}
