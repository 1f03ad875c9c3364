use super::{
    as_handle::{AsHandle, HandleType},
    buffer::c_str_to_string,
};
use libsqlite3_sys::{sqlite3_errmsg, sqlite3_errstr, sqlite3_extended_errcode};
use std::fmt;

/// Report diagnostics from the last call to an SQLite function using a handle.
pub trait Diagnostics {
    /// Call this method to retrieve diagnostic information for the last call to an SQLite function.
    /// Error code and message are read from the session immediately, so they must be fetched
    /// before the handle which produced them is closed.
    ///
    /// # Result
    ///
    /// * `Some(rec)` - Error code and message of the last failed call.
    /// * `None` - There is no session to ask. E.g. opening a connection failed before a session
    ///   could be allocated.
    fn diagnostic_record(&self) -> Option<Record>;

    /// Type of the handle the diagnostic is reported for.
    fn handle_type(&self) -> HandleType;
}

impl<T: AsHandle + ?Sized> Diagnostics for T {
    fn diagnostic_record(&self) -> Option<Record> {
        let session = self.as_session();
        if session.is_null() {
            return None;
        }
        let (code, message) = unsafe {
            (
                sqlite3_extended_errcode(session),
                c_str_to_string(sqlite3_errmsg(session)),
            )
        };
        Some(Record { code, message })
    }

    fn handle_type(&self) -> HandleType {
        AsHandle::handle_type(self)
    }
}

/// SQLite diagnostic record
///
/// Use `std::fmt::Display` to retrieve both code and message.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Record {
    /// Extended result code, e.g. `SQLITE_CONSTRAINT_UNIQUE` (2067).
    pub code: i32,
    /// English-language text describing the error, as reported by the session.
    pub message: String,
}

impl Record {
    /// Creates a record without a session, describing `code` with the generic text SQLite has for
    /// it.
    pub fn from_code(code: i32) -> Self {
        let message = unsafe { c_str_to_string(sqlite3_errstr(code)) };
        Self { code, message }
    }

    /// Primary result code. The lower eight bits of the extended result code, e.g.
    /// `SQLITE_CONSTRAINT` (19).
    pub fn primary_code(&self) -> i32 {
        self.code & 0xff
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code: {}, Message: {}", self.code, self.message)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
