use crate::{CommandType, DataAccessor, FromRow, Parameters, Result};
use std::ops::{Deref, DerefMut};

/// Reads and saves data, each call inside its own open scope.
///
/// Every call opens the accessor, runs one plain text command and closes the
/// accessor again. Errors from the command are returned unchanged, close still
/// runs exactly once before they are.
#[derive(Debug)]
pub struct DataCommands<A: DataAccessor> {
    accessor: A,
}

impl<A: DataAccessor> DataCommands<A> {
    pub fn new(accessor: A) -> Self {
        Self { accessor }
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    pub fn into_inner(self) -> A {
        self.accessor
    }

    /// Run the query `sql` with `params` and return the mapped rows.
    pub async fn read<P, R>(&mut self, sql: &str, params: P) -> Result<Vec<R>>
    where
        P: Parameters,
        R: FromRow + Send,
    {
        let mut scope = OpenScope::open(&mut self.accessor)?;
        let result = scope
            .query(sql, params, None, None, CommandType::Text)
            .await;
        scope.finish(result)
    }

    /// Run the command `sql` with `params` and return the number of affected rows.
    pub async fn save<P>(&mut self, sql: &str, params: P) -> Result<u64>
    where
        P: Parameters,
    {
        let mut scope = OpenScope::open(&mut self.accessor)?;
        let result = scope
            .execute(sql, params, None, None, CommandType::Text)
            .await;
        scope.finish(result)
    }
}

/// Keeps a [`DataAccessor`] open for as long as it lives.
///
/// Prefer [`finish`](Self::finish) or [`close`](Self::close) to end the scope,
/// they report the close error. A scope dropped before that (early return,
/// cancelled future, panic) still closes the accessor and logs a failure.
pub struct OpenScope<'a, A: DataAccessor> {
    accessor: &'a mut A,
    closed: bool,
}

impl<'a, A: DataAccessor> OpenScope<'a, A> {
    /// Open the accessor. Nothing is closed if opening fails.
    pub fn open(accessor: &'a mut A) -> Result<Self> {
        accessor.open()?;
        Ok(Self {
            accessor,
            closed: false,
        })
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.accessor.close()
    }

    /// Close the scope and combine the outcome with the one of the operation.
    ///
    /// The operation error wins over the close error, which is then only logged.
    pub fn finish<T>(self, result: Result<T>) -> Result<T> {
        let closed = self.close();
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(..), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close)) => {
                log::error!("{:#}", close.context("While closing after a failed operation"));
                Err(e)
            }
        }
    }
}

impl<A: DataAccessor> Deref for OpenScope<'_, A> {
    type Target = A;

    fn deref(&self) -> &A {
        self.accessor
    }
}

impl<A: DataAccessor> DerefMut for OpenScope<'_, A> {
    fn deref_mut(&mut self) -> &mut A {
        self.accessor
    }
}

impl<A: DataAccessor> Drop for OpenScope<'_, A> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        log::warn!("Open scope dropped before being finished, closing the accessor");
        if let Err(e) = self.accessor.close() {
            log::error!("{:#}", e);
        }
    }
}
