mod connection;
mod extract;
mod transaction;

use dapple_core::{Error, Result};
use rusqlite::Connection as Handle;
use std::sync::{Arc, Mutex, MutexGuard};

pub use connection::*;
pub use transaction::*;

/// Scheme of the connection strings accepted by this driver.
pub const NAME: &str = "sqlite";

/// Native connection shared between a connection and its transactions, `None` while closed.
pub(crate) type SharedHandle = Arc<Mutex<Option<Handle>>>;

pub(crate) fn lock(handle: &Mutex<Option<Handle>>) -> Result<MutexGuard<'_, Option<Handle>>> {
    handle
        .lock()
        .map_err(|_| Error::msg("The sqlite connection was poisoned by a panic"))
}

pub(crate) fn not_open() -> Error {
    Error::msg("The sqlite connection is not open")
}
