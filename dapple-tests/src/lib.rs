mod fake_accessor;
mod fake_connection;
mod lifecycle;
mod read_save;
mod recorder;
mod transaction1;

pub use fake_accessor::*;
pub use fake_connection::*;
pub use recorder::*;

use crate::{lifecycle::lifecycle, read_save::read_save};
use dapple_core::{Connection, ConnectionAdapter, Executor};
use log::LevelFilter;
use std::env;
#[cfg(not(feature = "disable-transactions"))]
use transaction1::transaction1;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Behavior every driver must show once wrapped in a [`ConnectionAdapter`].
///
/// The connection must start closed and point to a writable database that
/// keeps its content across close and open (no in memory database).
pub async fn execute_tests<C: Connection + Executor>(connection: C) {
    let mut adapter = ConnectionAdapter::new(connection);
    lifecycle(&mut adapter);
    read_save(&mut adapter).await;
    #[cfg(not(feature = "disable-transactions"))]
    transaction1(&mut adapter).await;
    adapter.dispose().expect("Failed to dispose the connection");
    assert!(!adapter.state().is_open());
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
