use crate::{
    CommandDefinition, QueryResult, Result, RowLabeled, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

pub trait Executor: Send {
    /// General method to send any command and return any result type (either row or count)
    fn run(&mut self, command: CommandDefinition) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the command and returns the rows.
    fn fetch(
        &mut self,
        command: CommandDefinition,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(command).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the command and return the total number of rows affected.
    fn execute(
        &mut self,
        command: CommandDefinition,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(command)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }
}

impl<E: Executor> Executor for &mut E {
    fn run(&mut self, command: CommandDefinition) -> impl Stream<Item = Result<QueryResult>> + Send {
        (**self).run(command)
    }

    fn fetch(
        &mut self,
        command: CommandDefinition,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        (**self).fetch(command)
    }

    fn execute(
        &mut self,
        command: CommandDefinition,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        (**self).execute(command)
    }
}
