use libsqlite3_sys::{SQLITE_DONE, SQLITE_OK, SQLITE_ROW};
use std::os::raw::c_int;

/// Result of an SQLite function call. Variants hold the same meaning as the result codes. This type
/// may hold results, but it is still the responsibility of the user to fetch and handle the
/// diagnostics in case of an Error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlResult<T> {
    /// The function has been executed successfully (`SQLITE_OK`).
    Success(T),
    /// A new row of data is ready to be read (`SQLITE_ROW`).
    Row(T),
    /// The statement has finished executing (`SQLITE_DONE`).
    Done,
    /// The function returned an error code. Check diagnostics.
    Error {
        /// Result code returned by the call. Used if the session does not provide a more specific
        /// one.
        code: c_int,
        /// Name of the SQLite Api call which caused the error. This might help interpreting the
        /// error if it is bubbled all the way up to the end users output, but the context is lost.
        function: &'static str,
    },
}

impl SqlResult<()> {
    /// Append a return value a successful to Result
    pub fn on_success<F, T>(self, f: F) -> SqlResult<T>
    where
        F: FnOnce() -> T,
    {
        self.map(|()| f())
    }
}

impl<T> SqlResult<T> {
    /// `True` if variant is [`SqlResult::Error`].
    pub fn is_err(&self) -> bool {
        matches!(self, SqlResult::Error { .. })
    }

    /// Applies `f` to any value wrapped in `Success` or `Row`.
    pub fn map<U, F>(self, f: F) -> SqlResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            SqlResult::Success(v) => SqlResult::Success(f(v)),
            SqlResult::Row(v) => SqlResult::Row(f(v)),
            SqlResult::Done => SqlResult::Done,
            SqlResult::Error { code, function } => SqlResult::Error { code, function },
        }
    }
}

pub trait ExtSqlReturn {
    fn into_sql_result(self, function_name: &'static str) -> SqlResult<()>;
}

impl ExtSqlReturn for c_int {
    fn into_sql_result(self, function: &'static str) -> SqlResult<()> {
        match self {
            SQLITE_OK => SqlResult::Success(()),
            SQLITE_ROW => SqlResult::Row(()),
            SQLITE_DONE => SqlResult::Done,
            code => SqlResult::Error { code, function },
        }
    }
}

#[cfg(test)]
mod tests {
    use libsqlite3_sys::{SQLITE_BUSY, SQLITE_DONE, SQLITE_OK, SQLITE_ROW};

    use super::{ExtSqlReturn, SqlResult};

    #[test]
    fn map_result_codes() {
        assert_eq!(SqlResult::Success(()), SQLITE_OK.into_sql_result("f"));
        assert_eq!(SqlResult::Row(()), SQLITE_ROW.into_sql_result("f"));
        assert_eq!(SqlResult::Done, SQLITE_DONE.into_sql_result("f"));
        assert_eq!(
            SqlResult::Error {
                code: SQLITE_BUSY,
                function: "sqlite3_step"
            },
            SQLITE_BUSY.into_sql_result("sqlite3_step")
        );
    }
}
