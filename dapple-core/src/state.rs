use std::fmt::{self, Display};

/// Lifecycle state reported by a connection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Closed,
    Open,
    Connecting,
    Executing,
    Broken,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        *self == ConnectionState::Open
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Open => "open",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Executing => "executing",
            ConnectionState::Broken => "broken",
        })
    }
}

/// Locking behavior requested when starting a transaction.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    #[default]
    Unspecified,
    Chaos,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

/// How the text of a command is interpreted.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Literal SQL statement.
    #[default]
    Text,
    /// Name of a stored procedure.
    StoredProcedure,
    /// Name of a table, all of its rows are read.
    TableDirect,
}
