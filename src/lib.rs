//! Thin data access layer.
//!
//! * [`ConnectionAdapter`] forwards every member of a [`Connection`], opening it
//!   only when it is not open yet and closing it before disposing it.
//! * [`DataCommands`] reads and saves data through any [`DataAccessor`], each
//!   call inside its own open and close.
//!
//! ```rust
//! use dapple::{ConnectionAdapter, DataCommands, params};
//! # use dapple::{Connection, Executor};
//! # async fn run<C: Connection + Executor>(connection: C) -> dapple::Result<()> {
//! let mut commands = DataCommands::new(ConnectionAdapter::new(connection));
//! let names: Vec<(String,)> = commands
//!     .read("SELECT name FROM users WHERE id = @Id", params! { "Id" => 7 })
//!     .await?;
//! # Ok(())
//! # }
//! ```
pub use ::dapple_core::*;
