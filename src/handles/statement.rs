use super::{handle::Handle, HandleKind};
use libsqlite3_sys::{sqlite3_finalize, sqlite3_stmt};
use std::ptr::null_mut;

/// Native prepared statements, as created by `sqlite3_prepare_v2` or `sqlite3_prepare16_v2`.
#[derive(Debug)]
pub struct StatementKind;

unsafe impl HandleKind for StatementKind {
    type Raw = *mut sqlite3_stmt;

    const INVALID: *mut sqlite3_stmt = null_mut();

    unsafe fn close(raw: *mut sqlite3_stmt) {
        // The result of `sqlite3_finalize` repeats the error of the last failed step, which has
        // already been reported by `step`. The statement is released in any case.
        sqlite3_finalize(raw);
    }
}

/// Owns a native prepared statement.
pub type StatementHandle = Handle<StatementKind>;
