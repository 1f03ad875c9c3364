//! # SQLite
//!
//! SQLite is an embedded SQL database engine. This library wraps its C API in safe types: a
//! [`Connection`] to a database, [`Statement`]s prepared on it, and [`Row`]s read while iterating
//! a result set.
//!
//! ```
//! use sqlite_api::{Connection, RowReader};
//!
//! let conn = Connection::in_memory()?;
//! let mut stmt = conn.prepare("select ?1 union all select ?2", ("hello", "World"))?;
//! let words = stmt
//!     .map_rows(|row| row.get_string(0).into_owned())
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(words, ["hello", "World"]);
//! # Ok::<(), sqlite_api::Error>(())
//! ```

mod connection;
mod cursor;
mod error;
mod parameter;
mod parameter_collection;
mod row;
mod statement;

pub mod handles;

pub use self::{
    connection::{AccessMode, Connection, ConnectionOptions, MEMORY},
    cursor::{MappedRows, RowIterator},
    error::Error,
    parameter::{IntoParameter, Parameter},
    parameter_collection::ParameterCollection,
    row::{ColumnType, Row, RowReader},
    statement::{Binding, Statement},
};
// Reexports
/// Reexports `libsqlite3-sys` as sys to enable applications to always use the same version as this
/// crate.
pub use libsqlite3_sys as sys;
pub use widestring::{U16CStr, U16CString, U16Str, U16String};
