mod accessor;
mod adapter;
mod as_value;
mod commands;
mod connection;
mod error;
mod executor;
mod from_row;
mod options;
mod parameters;
mod query;
mod state;
mod util;
mod value;

pub use ::anyhow::Context;
pub use accessor::*;
pub use adapter::*;
pub use as_value::*;
pub use commands::*;
pub use connection::*;
pub use error::*;
pub use executor::*;
pub use from_row::*;
pub use options::*;
pub use parameters::*;
pub use query::*;
pub use state::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
