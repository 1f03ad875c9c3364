use thiserror::Error as ThisError;

use crate::handles::{
    log_diagnostics, Diagnostics, HandleType, Record as DiagnosticRecord, SqlResult,
};

#[derive(Debug, ThisError)]
/// Error type used to indicate a low level SQLite call failed.
pub enum Error {
    /// Opening or closing a database session failed. A diagnostic record is obtained from the
    /// session and associated with this error.
    #[error("SQLite emitted an error calling '{function}' on a connection:\n{record}")]
    Connection {
        /// Diagnostic record read from the session at the time of failure.
        record: DiagnosticRecord,
        /// SQLite API call which produced the diagnostic record.
        function: &'static str,
    },
    /// Preparing, binding or stepping a statement failed. A diagnostic record is obtained from the
    /// session the statement belongs to and associated with this error.
    #[error("SQLite emitted an error calling '{function}' on a statement:\n{record}")]
    Statement {
        /// Diagnostic record read from the session at the time of failure.
        record: DiagnosticRecord,
        /// SQLite API call which produced the diagnostic record.
        function: &'static str,
    },
    /// A call failed before a session existed to hold a diagnostic record. Most likely SQLite has
    /// been unable to allocate memory for a new session.
    #[error(
        "No Diagnostics available. The SQLite function call to {function} returned error code \
        {code}, but there is no session to ask for a message."
    )]
    NoDiagnostics {
        /// SQLite API call which returned the error.
        function: &'static str,
        /// Result code returned by the call.
        code: i32,
    },
    /// Filenames passed to SQLite are terminated by zero. A text with an interior zero can not be
    /// passed without truncating it.
    #[error("Text passed to SQLite contains an interior nul character at position {position}.")]
    InteriorNul {
        /// Index of the first nul character, in code units.
        position: usize,
    },
    /// SQLite accepts statement texts up to `i32::MAX` bytes.
    #[error("Statement text of {length} bytes is too large to be prepared by SQLite.")]
    TooLargeText {
        /// Length of the rejected statement text in bytes.
        length: usize,
    },
    /// SQLite rejected a global configuration change. Exclusively emitted by
    /// [`crate::handles::forward_engine_log`].
    #[error("SQLite rejected changing its global configuration with code {code}.")]
    EngineConfiguration {
        /// Result code returned by `sqlite3_config`.
        code: i32,
    },
}

impl Error {
    /// Extended result code reported by SQLite, if the error originates from the engine.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Connection { record, .. } | Error::Statement { record, .. } => Some(record.code),
            Error::NoDiagnostics { code, .. } | Error::EngineConfiguration { code } => Some(*code),
            Error::InteriorNul { .. } | Error::TooLargeText { .. } => None,
        }
    }

    /// Message reported by SQLite, if the error originates from a session.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Connection { record, .. } | Error::Statement { record, .. } => {
                Some(&record.message)
            }
            _ => None,
        }
    }
}

impl SqlResult<()> {
    /// Use this instead of [`Self::into_result`] if you expect [`SqlResult::Done`] to be a valid
    /// value. [`SqlResult::Done`] is mapped to `Ok(false)`, all other success values are
    /// `Ok(true)`.
    pub fn into_result_bool(self, handle: &(impl Diagnostics + ?Sized)) -> Result<bool, Error> {
        self.on_success(|| true).into_result_with(handle, Some(false))
    }
}

// Conversions into `Error` live next to `Error` rather than in the `sql_result` mod.
impl<T> SqlResult<T> {
    /// [`Self::Success`] and [`Self::Row`] are mapped to Ok. [`Self::Error`] is mapped to error.
    pub fn into_result(self, handle: &(impl Diagnostics + ?Sized)) -> Result<T, Error> {
        self.into_result_with(handle, None)
    }

    /// Most flexible way of converting an `SqlResult` to an idiomatic `Result`.
    ///
    /// # Parameters
    ///
    /// * `handle`: This handle is used to extract diagnostics in case `self` is
    ///   [`SqlResult::Error`]. The type of the handle decides whether a connection or a statement
    ///   error is returned.
    /// * `done`: Controls the behaviour for [`SqlResult::Done`]. `None` indicates that the result
    ///   is never expected to be [`SqlResult::Done`] and would panic in that case. `Some(value)`
    ///   would cause [`SqlResult::Done`] to be mapped to `Ok(value)`.
    pub fn into_result_with(
        self,
        handle: &(impl Diagnostics + ?Sized),
        done: Option<T>,
    ) -> Result<T, Error> {
        match self {
            SqlResult::Success(value) | SqlResult::Row(value) => Ok(value),
            SqlResult::Done => {
                Ok(done.expect("Unexpected SQLITE_DONE returned by SQLite function"))
            }
            SqlResult::Error { code, function } => {
                if let Some(mut record) = handle.diagnostic_record() {
                    log_diagnostics(handle);
                    // Some calls (e.g. misuse detected before touching the session) do not update
                    // the error state of the session.
                    if record.primary_code() == 0 {
                        record = DiagnosticRecord::from_code(code);
                    }
                    Err(match handle.handle_type() {
                        HandleType::Connection => Error::Connection { record, function },
                        HandleType::Statement => Error::Statement { record, function },
                    })
                } else {
                    Err(Error::NoDiagnostics { function, code })
                }
            }
        }
    }
}
