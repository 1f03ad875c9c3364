use super::{check_release, ffi::sqlite3_close_v2, handle::Handle, HandleKind};
use libsqlite3_sys::sqlite3;
use log::info;
use std::ptr::null_mut;

/// Native database sessions, as opened by `sqlite3_open_v2` or `sqlite3_open16`.
#[derive(Debug)]
pub struct ConnectionKind;

unsafe impl HandleKind for ConnectionKind {
    type Raw = *mut sqlite3;

    const INVALID: *mut sqlite3 = null_mut();

    unsafe fn close(raw: *mut sqlite3) {
        close_session(raw);
        info!("Connection closed");
    }
}

/// Owns a native database session.
pub type ConnectionHandle = Handle<ConnectionKind>;

/// Releases the session SQLite allocates for a failed open. It has never been reported as opened,
/// so its close is not logged either.
pub fn release_unopened(handle: &mut ConnectionHandle) {
    let raw = handle.detach();
    if !raw.is_null() {
        unsafe { close_session(raw) }
    }
}

unsafe fn close_session(raw: *mut sqlite3) {
    // `sqlite3_close_v2` defers releasing the session until the last statement prepared on it is
    // finalized, so it never reports `SQLITE_BUSY`.
    check_release(sqlite3_close_v2(raw), "sqlite3_close_v2");
}
