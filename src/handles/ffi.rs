//! Functions of the SQLite C API which `libsqlite3-sys` does not generate bindings for. Its
//! bindings leave out the UTF-16 interface and `sqlite3_close_v2`, yet the bundled library exports
//! both.

use libsqlite3_sys::{sqlite3, sqlite3_destructor_type, sqlite3_stmt};
use std::os::raw::{c_int, c_void};

extern "C" {
    pub fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;

    pub fn sqlite3_open16(filename: *const c_void, pp_db: *mut *mut sqlite3) -> c_int;

    pub fn sqlite3_prepare16_v2(
        db: *mut sqlite3,
        sql: *const c_void,
        n_byte: c_int,
        pp_stmt: *mut *mut sqlite3_stmt,
        pz_tail: *mut *const c_void,
    ) -> c_int;

    pub fn sqlite3_bind_text16(
        stmt: *mut sqlite3_stmt,
        index: c_int,
        text: *const c_void,
        n_byte: c_int,
        destructor: sqlite3_destructor_type,
    ) -> c_int;

    pub fn sqlite3_column_text16(stmt: *mut sqlite3_stmt, column: c_int) -> *const c_void;

    pub fn sqlite3_column_bytes16(stmt: *mut sqlite3_stmt, column: c_int) -> c_int;
}
