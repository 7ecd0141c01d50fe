use crate::{SharedHandle, lock, not_open};
use dapple_core::{Context, Error, IsolationLevel, Result, Transaction};
use std::sync::Arc;

/// Transaction over a [`SqliteConnection`](crate::SqliteConnection), rolled back when dropped unfinished.
///
/// SQLite transactions are always serializable, `ReadUncommitted` is honored
/// through the `read_uncommitted` pragma for the lifetime of the transaction.
#[derive(Debug)]
pub struct SqliteTransaction {
    handle: SharedHandle,
    isolation_level: IsolationLevel,
    completed: bool,
}

impl SqliteTransaction {
    pub(crate) fn begin(handle: SharedHandle, isolation_level: IsolationLevel) -> Result<Self> {
        let effective = match isolation_level {
            IsolationLevel::Chaos => {
                return Err(Error::msg(
                    "SQLite does not support the isolation level Chaos",
                ));
            }
            IsolationLevel::ReadUncommitted => IsolationLevel::ReadUncommitted,
            _ => IsolationLevel::Serializable,
        };
        {
            let guard = lock(&handle)?;
            let connection = guard.as_ref().ok_or_else(not_open)?;
            if !connection.is_autocommit() {
                return Err(Error::msg("SQLite does not support nested transactions"));
            }
            let sql = if effective == IsolationLevel::ReadUncommitted {
                "PRAGMA read_uncommitted = 1; BEGIN"
            } else {
                "BEGIN"
            };
            connection
                .execute_batch(sql)
                .context("Could not begin the transaction")?;
        }
        log::debug!("Began a transaction with isolation level {effective:?}");
        Ok(Self {
            handle,
            isolation_level: effective,
            completed: false,
        })
    }

    pub(crate) fn started_on(&self, handle: &SharedHandle) -> bool {
        Arc::ptr_eq(&self.handle, handle)
    }

    fn finish(&mut self, sql: &str) -> Result<()> {
        self.completed = true;
        let guard = lock(&self.handle)?;
        let connection = guard.as_ref().ok_or_else(|| {
            Error::msg("The sqlite connection was closed before the transaction completed")
        })?;
        let result = connection
            .execute_batch(sql)
            .with_context(|| format!("Could not {} the transaction", sql.to_lowercase()));
        if self.isolation_level == IsolationLevel::ReadUncommitted {
            connection.execute_batch("PRAGMA read_uncommitted = 0")?;
        }
        result.inspect_err(|e| log::error!("{:#}", e))
    }
}

impl Transaction for SqliteTransaction {
    fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    fn is_active(&self) -> bool {
        !self.completed
            && lock(&self.handle).is_ok_and(|v| v.as_ref().is_some_and(|c| !c.is_autocommit()))
    }

    fn commit(mut self) -> Result<()> {
        self.finish("COMMIT")
    }

    fn rollback(mut self) -> Result<()> {
        self.finish("ROLLBACK")
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        log::warn!("Transaction dropped without commit or rollback, rolling it back");
        let _ = self.finish("ROLLBACK");
    }
}
