use crate::{
    NAME, SharedHandle, SqliteTransaction,
    extract::{bind_value, extract_value},
    lock, not_open,
};
use dapple_core::{
    CommandDefinition, CommandType, Connection, ConnectionOptions, ConnectionState, Context, Error,
    Executor, IsolationLevel, ParameterList, QueryResult, Result, Row, RowLabeled, RowNames,
    RowsAffected,
    future::TryFutureExt,
    stream::{self, Stream},
    truncate_long,
};
use rusqlite::{Connection as Handle, OpenFlags, Statement};
use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::spawn_blocking;

/// Connection to a SQLite database, configured by a `sqlite://path?key=value` string.
///
/// Recognized parameters:
/// * `mode`: `ro`, `rw`, `rwc` (default) or `memory`.
/// * `timeout`: busy timeout in whole seconds.
///
/// Creating the connection does not touch the database, [`open`](Connection::open) does.
#[derive(Debug)]
pub struct SqliteConnection {
    connection_string: String,
    options: Option<ConnectionOptions>,
    handle: SharedHandle,
}

impl SqliteConnection {
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        let connection_string = connection_string.into();
        let options = parse_options(&connection_string)?;
        Ok(Self {
            connection_string,
            options: Some(options),
            handle: Arc::new(Mutex::new(None)),
        })
    }

    pub fn options(&self) -> Option<&ConnectionOptions> {
        self.options.as_ref()
    }
}

fn parse_options(connection_string: &str) -> Result<ConnectionOptions> {
    let options = ConnectionOptions::parse(connection_string)?;
    if options.driver != NAME {
        let error = Error::msg(format!(
            "Expected sqlite connection string to start with `{NAME}://`"
        ));
        log::error!("{:#}", error);
        return Err(error);
    }
    open_flags(&options)?;
    Ok(options)
}

fn open_flags(options: &ConnectionOptions) -> Result<OpenFlags> {
    let flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(flags
        | match options.parameter("mode") {
            Some("ro") => OpenFlags::SQLITE_OPEN_READ_ONLY,
            Some("rw") => OpenFlags::SQLITE_OPEN_READ_WRITE,
            Some("rwc") | None => OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            Some("memory") => {
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_MEMORY
            }
            Some(mode) => {
                return Err(Error::msg(format!(
                    "Unknown sqlite mode `{mode}`, expected one of `ro`, `rw`, `rwc`, `memory`"
                )));
            }
        })
}

impl Connection for SqliteConnection {
    type Transaction = SqliteTransaction;
    type Command = CommandDefinition;

    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Takes effect on the next open, which also reports a malformed string.
    fn set_connection_string(&mut self, connection_string: String) {
        self.options = parse_options(&connection_string)
            .inspect_err(|e| log::warn!("{:#}", e))
            .ok();
        self.connection_string = connection_string;
    }

    fn connection_timeout(&self) -> Duration {
        self.options
            .as_ref()
            .map_or(ConnectionOptions::DEFAULT_TIMEOUT, |v| v.timeout)
    }

    fn database(&self) -> &str {
        self.options.as_ref().map_or("", |v| v.database.as_str())
    }

    fn state(&self) -> ConnectionState {
        match lock(&self.handle) {
            Ok(handle) if handle.is_some() => ConnectionState::Open,
            Ok(..) => ConnectionState::Closed,
            Err(..) => ConnectionState::Broken,
        }
    }

    fn open(&mut self) -> Result<()> {
        let mut handle = lock(&self.handle)?;
        if handle.is_some() {
            return Ok(());
        }
        let options = parse_options(&self.connection_string)?;
        let flags = open_flags(&options)?;
        let connection = Handle::open_with_flags(&options.database, flags)
            .and_then(|v| v.busy_timeout(options.timeout).map(|_| v))
            .with_context(|| {
                format!(
                    "Could not open the sqlite database `{}`",
                    truncate_long!(options.database)
                )
            })
            .inspect_err(|e| log::error!("{:#}", e))?;
        log::debug!("Opened the sqlite database `{}`", options.database);
        *handle = Some(connection);
        self.options = Some(options);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(connection) = lock(&self.handle)?.take() else {
            return Ok(());
        };
        connection
            .close()
            .map_err(|(_, e)| Error::new(e).context("Could not close the sqlite database"))
            .inspect_err(|e| log::error!("{:#}", e))
    }

    fn begin_transaction(&mut self) -> Result<SqliteTransaction> {
        self.begin_transaction_with(IsolationLevel::Unspecified)
    }

    fn begin_transaction_with(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<SqliteTransaction> {
        SqliteTransaction::begin(self.handle.clone(), isolation_level)
            .inspect_err(|e| log::error!("{:#}", e))
    }

    fn owns_transaction(&self, transaction: &SqliteTransaction) -> bool {
        transaction.started_on(&self.handle)
    }

    /// Point the connection to another database file, reopening it when it was open.
    fn change_database(&mut self, database: &str) -> Result<()> {
        let mut options = parse_options(&self.connection_string)?;
        options.database = database.into();
        let reopen = self.state().is_open();
        if reopen {
            self.close()?;
        }
        self.connection_string = options.to_string();
        self.options = Some(options);
        if reopen {
            self.open()?;
        }
        Ok(())
    }

    fn create_command(&mut self) -> CommandDefinition {
        CommandDefinition::default().with_timeout(Some(self.connection_timeout()))
    }

    fn dispose(&mut self) -> Result<()> {
        self.close()
    }
}

impl Executor for SqliteConnection {
    fn run(&mut self, command: CommandDefinition) -> impl Stream<Item = Result<QueryResult>> + Send {
        let handle = self.handle.clone();
        let timeout = self.connection_timeout();
        async move {
            let results = spawn_blocking(move || run_command(&handle, &command, timeout)).await??;
            Ok::<_, Error>(stream::iter(results.into_iter().map(Ok::<_, Error>)))
        }
        .try_flatten_stream()
    }
}

fn run_command(
    handle: &Mutex<Option<Handle>>,
    command: &CommandDefinition,
    default_timeout: Duration,
) -> Result<Vec<QueryResult>> {
    let handle = lock(handle)?;
    let connection = handle.as_ref().ok_or_else(not_open)?;
    let sql: Cow<str> = match command.command_type {
        CommandType::Text => Cow::Borrowed(&command.text),
        CommandType::TableDirect => Cow::Owned(format!(
            "SELECT * FROM \"{}\"",
            command.text.replace('"', "\"\"")
        )),
        CommandType::StoredProcedure => {
            let error = Error::msg("SQLite does not support stored procedures");
            log::error!("{:#}", error);
            return Err(error);
        }
    };
    if let Some(timeout) = command.timeout {
        connection.busy_timeout(timeout)?;
    }
    let result = run_statement(connection, &sql, &command.parameters)
        .with_context(|| format!("While running the query:\n{}", truncate_long!(sql)))
        .inspect_err(|e| log::error!("{:#}", e));
    if command.timeout.is_some() {
        connection.busy_timeout(default_timeout)?;
    }
    result
}

fn run_statement(
    connection: &Handle,
    sql: &str,
    parameters: &ParameterList,
) -> Result<Vec<QueryResult>> {
    let mut statement = connection.prepare(sql)?;
    bind_parameters(&mut statement, parameters)?;
    let count = statement.column_count();
    if count == 0 {
        // `changes()` keeps the count of the last DML statement across DDL
        let changes = connection.total_changes();
        let rowid = connection.last_insert_rowid();
        statement.raw_execute()?;
        let rows_affected = connection.total_changes().saturating_sub(changes);
        let inserted = connection.last_insert_rowid() != rowid
            || (rows_affected > 0 && is_insert(sql));
        return Ok(vec![
            RowsAffected {
                rows_affected,
                last_affected_id: inserted.then(|| connection.last_insert_rowid()),
            }
            .into(),
        ]);
    }
    let labels: RowNames = statement
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut result = Vec::new();
    let mut rows = statement.raw_query();
    while let Some(row) = rows.next()? {
        let values = (0..count)
            .map(|i| row.get_ref(i).map(extract_value))
            .collect::<rusqlite::Result<Row>>()?;
        result.push(RowLabeled::new(labels.clone(), values).into());
    }
    Ok(result)
}

fn is_insert(sql: &str) -> bool {
    let sql = sql.trim_start();
    ["INSERT", "REPLACE"].iter().any(|v| {
        sql.get(..v.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(v))
    })
}

/// Named parameters are looked up as `@name`, `:name` and `$name`, the ones the
/// statement does not use are skipped. Positional parameters bind in order.
fn bind_parameters(statement: &mut Statement<'_>, parameters: &ParameterList) -> Result<()> {
    let mut position = 0;
    for parameter in parameters {
        let index = match &parameter.name {
            Some(name) => {
                let found = ["@", ":", "$"]
                    .iter()
                    .find_map(|prefix| {
                        statement
                            .parameter_index(&format!("{prefix}{name}"))
                            .transpose()
                    })
                    .transpose()?;
                let Some(index) = found else {
                    log::debug!("Parameter `{name}` is not used by the statement, skipping it");
                    continue;
                };
                index
            }
            None => {
                position += 1;
                position
            }
        };
        statement
            .raw_bind_parameter(index, bind_value(parameter.value.clone())?)
            .with_context(|| match &parameter.name {
                Some(name) => format!("While binding the parameter `{name}`"),
                None => format!("While binding the positional parameter {index}"),
            })?;
    }
    Ok(())
}
