//! Provides basic abstraction over valid (i.e. successfully opened or prepared) SQLite handles.
//!
//! Two decisions are already baked into this module:
//!
//! * Treat diagnostics by logging them with `log`.
//! * Every native resource is owned by exactly one [`Handle`], which releases it exactly once.

mod as_handle;
mod buffer;
mod connection;
mod diagnostics;
mod ffi;
mod handle;
mod logging;
mod sql_result;
mod statement;

pub use {
    as_handle::{AsHandle, HandleType, SessionRef},
    connection::{ConnectionHandle, ConnectionKind},
    diagnostics::{Diagnostics, Record},
    handle::{Handle, HandleKind},
    logging::{forward_engine_log, log_diagnostics},
    sql_result::{ExtSqlReturn, SqlResult},
    statement::{StatementHandle, StatementKind},
};

pub(crate) use {
    buffer::{clamp_int, nul_terminated, nul_terminated_utf16, slice_from_raw, slice_to_cow_utf8},
    connection::release_unopened,
    ffi::{
        sqlite3_bind_text16, sqlite3_column_bytes16, sqlite3_column_text16, sqlite3_open16,
        sqlite3_prepare16_v2,
    },
};

use libsqlite3_sys::SQLITE_OK;
use std::{os::raw::c_int, thread::panicking};

/// Helper function checking the result of releasing a native resource and panicking on errors. Yet
/// if the release is triggered during another panic, the function will simply ignore errors from
/// failed releases.
fn check_release(result: c_int, function: &'static str) {
    if result != SQLITE_OK {
        // Avoid panicking, if we already have a panic. We don't want to mask the first error.
        if !panicking() {
            panic!("Unexpected return value of {function}: {result}")
        }
    }
}
