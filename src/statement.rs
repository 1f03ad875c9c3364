use crate::{
    cursor::{MappedRows, RowIterator},
    handles::{
        clamp_int, sqlite3_bind_text16, sqlite3_prepare16_v2, AsHandle, ExtSqlReturn, HandleType,
        SessionRef, StatementHandle,
    },
    parameter::{IntoParameter, Parameter},
    Connection, Error, ParameterCollection, Row, RowReader,
};
use libsqlite3_sys::{
    sqlite3, sqlite3_bind_blob64, sqlite3_bind_double, sqlite3_bind_int, sqlite3_bind_int64,
    sqlite3_bind_null, sqlite3_bind_parameter_count, sqlite3_bind_text, sqlite3_bind_text64,
    sqlite3_clear_bindings, sqlite3_column_name, sqlite3_db_handle, sqlite3_prepare_v2,
    sqlite3_reset, sqlite3_step, sqlite3_stmt, SQLITE_STATIC, SQLITE_TRANSIENT, SQLITE_UTF16,
    SQLITE_UTF8,
};
use std::{
    borrow::Cow,
    ffi::CStr,
    marker::PhantomData,
    os::raw::{c_char, c_int, c_uchar, c_void},
    ptr::null_mut,
};
use widestring::U16Str;

/// How SQLite holds on to text and blobs bound to a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// SQLite copies the value before the bind call returns (`SQLITE_TRANSIENT`).
    Transient,
    /// SQLite references the buffer of the caller until the statement is finalized or the
    /// parameter is bound anew (`SQLITE_STATIC`).
    Static,
}

/// A prepared statement. Created by preparing statement text on an open [`Connection`], which it
/// borrows for its entire lifetime. Finalized then dropped.
///
/// A statement is either unprepared (e.g. created by [`Statement::new`], or prepared from text
/// without any SQL in it) or prepared.
///
/// # Example
///
/// ```
/// use sqlite_api::{Connection, RowReader};
///
/// let conn = Connection::in_memory()?;
/// let mut stmt = conn.prepare("select ?1 union all select ?2", ("hello", "World"))?;
///
/// let mut rows = stmt.rows()?;
/// let mut greeting = Vec::new();
/// while let Some(row) = rows.row() {
///     greeting.push(row.get_string(0).into_owned());
///     rows.advance()?;
/// }
/// assert_eq!(greeting, ["hello", "World"]);
/// # Ok::<(), sqlite_api::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Statement<'c> {
    handle: StatementHandle,
    connection: PhantomData<&'c Connection>,
}

unsafe impl AsHandle for Statement<'_> {
    fn as_session(&self) -> *mut sqlite3 {
        unsafe { sqlite3_db_handle(self.handle.get()) }
    }

    fn handle_type(&self) -> HandleType {
        HandleType::Statement
    }
}

/// Reads the columns of the row the statement is positioned on.
unsafe impl RowReader for Statement<'_> {
    fn as_stmt(&self) -> *mut sqlite3_stmt {
        self.handle.get()
    }
}

impl<'c> Statement<'c> {
    /// An unprepared statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the statement holds a native prepared statement.
    pub fn is_prepared(&self) -> bool {
        self.handle.is_valid()
    }

    /// The native statement. Ownership stays with `self`.
    pub fn as_sys(&self) -> *mut sqlite3_stmt {
        self.handle.get()
    }

    /// Compiles the first SQL statement in `text` on `connection` and binds `params` to its
    /// placeholders, the first one to ordinal `1`. Any statement previously held by `self` is
    /// finalized, but only once the new one has been prepared and bound successfully. On error
    /// `self` is left unchanged.
    ///
    /// Text without any SQL in it (e.g. only whitespace or comments) leaves `self` unprepared.
    ///
    /// # Panics
    ///
    /// If `connection` is not open.
    pub fn prepare<'p>(
        &mut self,
        connection: &'c Connection,
        text: &str,
        params: impl ParameterCollection<'p>,
    ) -> Result<(), Error> {
        let length =
            c_int::try_from(text.len()).map_err(|_| Error::TooLargeText { length: text.len() })?;
        self.prepare_impl(connection, params, "sqlite3_prepare_v2", |session, slot| unsafe {
            sqlite3_prepare_v2(session, text.as_ptr() as *const c_char, length, slot, null_mut())
        })
    }

    /// Like [`Self::prepare`], but takes statement text encoded as UTF-16.
    pub fn prepare_utf16<'p>(
        &mut self,
        connection: &'c Connection,
        text: &U16Str,
        params: impl ParameterCollection<'p>,
    ) -> Result<(), Error> {
        let bytes = text.len() * 2;
        let length = c_int::try_from(bytes).map_err(|_| Error::TooLargeText { length: bytes })?;
        self.prepare_impl(connection, params, "sqlite3_prepare16_v2", |session, slot| unsafe {
            sqlite3_prepare16_v2(session, text.as_ptr() as *const c_void, length, slot, null_mut())
        })
    }

    fn prepare_impl<'p>(
        &mut self,
        connection: &'c Connection,
        params: impl ParameterCollection<'p>,
        function: &'static str,
        prepare: impl FnOnce(*mut sqlite3, *mut *mut sqlite3_stmt) -> c_int,
    ) -> Result<(), Error> {
        assert!(
            connection.is_open(),
            "Statements can only be prepared on an open connection."
        );
        let session = connection.as_sys();
        let mut prepared = Statement::new();
        // A failed prepare leaves no statement behind, the diagnostics are in the session of the
        // connection.
        prepare(session, prepared.handle.prepare_for_assignment() as *mut _)
            .into_sql_result(function)
            .into_result(&unsafe { SessionRef::new(session, HandleType::Statement) })?;
        if prepared.is_prepared() {
            params.bind_parameters_to(1, &mut prepared)?;
        }
        self.handle.swap(&mut prepared.handle);
        Ok(())
    }

    /// Binds `value` to the placeholder at `position` (starting with `1`). Text and blobs are
    /// copied by SQLite, so `value` may be dropped right after the call.
    pub fn bind<'p>(
        &mut self,
        position: usize,
        value: impl IntoParameter<'p>,
    ) -> Result<(), Error> {
        let parameter = value.into_parameter();
        unsafe { self.bind_parameter_unchecked(position, &parameter, Binding::Transient) }
    }

    /// Binds `value` to the placeholder at `position` (starting with `1`), without copying borrowed
    /// text or blobs. SQLite references the buffer directly, which is why it must live for
    /// `'static`. Owned values are still copied.
    pub fn bind_static(
        &mut self,
        position: usize,
        value: impl IntoParameter<'static>,
    ) -> Result<(), Error> {
        // Borrowed buffers live for `'static`, owned ones are copied.
        let parameter = value.into_parameter();
        unsafe { self.bind_parameter_unchecked(position, &parameter, Binding::Static) }
    }

    /// Binds all elements of `params`, the first one to placeholder `1`.
    pub fn bind_all<'p>(&mut self, params: impl ParameterCollection<'p>) -> Result<(), Error> {
        params.bind_parameters_to(1, self)
    }

    /// Binds a single parameter. With [`Binding::Static`] SQLite keeps a pointer to the buffer of
    /// borrowed text and blobs.
    ///
    /// # Safety
    ///
    /// If `binding` is [`Binding::Static`], the buffer of borrowed text and blobs in `parameter`
    /// must stay valid and unchanged until the statement is finalized or the placeholder is bound
    /// anew.
    pub unsafe fn bind_parameter_unchecked(
        &mut self,
        position: usize,
        parameter: &Parameter<'_>,
        binding: Binding,
    ) -> Result<(), Error> {
        assert!(
            self.is_prepared(),
            "Parameters can only be bound to a prepared statement."
        );
        let stmt = self.handle.get();
        let index = clamp_int(position);
        let destructor = if binding == Binding::Static && !parameter.is_owned() {
            SQLITE_STATIC()
        } else {
            SQLITE_TRANSIENT()
        };
        let (result, function) = match parameter {
            Parameter::Null => (sqlite3_bind_null(stmt, index), "sqlite3_bind_null"),
            Parameter::Int(value) => (sqlite3_bind_int(stmt, index, *value), "sqlite3_bind_int"),
            Parameter::Int64(value) => {
                (sqlite3_bind_int64(stmt, index, *value), "sqlite3_bind_int64")
            }
            Parameter::Double(value) => {
                (sqlite3_bind_double(stmt, index, *value), "sqlite3_bind_double")
            }
            Parameter::Text(text) => (
                sqlite3_bind_text64(
                    stmt,
                    index,
                    text.as_ptr() as *const c_char,
                    text.len() as u64,
                    destructor,
                    SQLITE_UTF8 as c_uchar,
                ),
                "sqlite3_bind_text64",
            ),
            Parameter::CText(text) => (
                sqlite3_bind_text(stmt, index, text.as_ptr(), -1, destructor),
                "sqlite3_bind_text",
            ),
            Parameter::WideText(text) => (
                sqlite3_bind_text64(
                    stmt,
                    index,
                    text.as_ptr() as *const c_char,
                    (text.len() * 2) as u64,
                    destructor,
                    // Native byte order
                    SQLITE_UTF16 as c_uchar,
                ),
                "sqlite3_bind_text64",
            ),
            Parameter::WideCText(text) => (
                sqlite3_bind_text16(stmt, index, text.as_ptr() as *const c_void, -1, destructor),
                "sqlite3_bind_text16",
            ),
            Parameter::Blob(blob) => (
                sqlite3_bind_blob64(
                    stmt,
                    index,
                    blob.as_ptr() as *const c_void,
                    blob.len() as u64,
                    destructor,
                ),
                "sqlite3_bind_blob64",
            ),
        };
        result.into_sql_result(function).into_result(self)
    }

    /// Number of the largest placeholder in the statement. Usually the number of placeholders,
    /// unless `?NNN` placeholders leave gaps.
    pub fn parameter_count(&self) -> usize {
        unsafe { sqlite3_bind_parameter_count(self.handle.get()) as usize }
    }

    /// Sets all placeholders back to `NULL`.
    pub fn clear_bindings(&mut self) {
        assert!(
            self.is_prepared(),
            "Parameters can only be cleared on a prepared statement."
        );
        unsafe {
            sqlite3_clear_bindings(self.handle.get());
        }
    }

    /// Advances the statement to the next row.
    ///
    /// # Return
    ///
    /// `true` if a row is available. `false` if the statement has finished executing. Stepping a
    /// finished statement again starts a new execution.
    ///
    /// # Panics
    ///
    /// If the statement is not prepared.
    pub fn step(&mut self) -> Result<bool, Error> {
        assert!(self.is_prepared(), "Only a prepared statement can be stepped.");
        unsafe { sqlite3_step(self.handle.get()) }
            .into_sql_result("sqlite3_step")
            .into_result_bool(self)
    }

    /// Executes a statement which does not produce any rows, e.g. `INSERT` or `CREATE TABLE`.
    ///
    /// # Panics
    ///
    /// If the statement produces a row. Use [`Self::rows`] for queries.
    pub fn execute(&mut self) -> Result<(), Error> {
        let has_row = self.step()?;
        assert!(
            !has_row,
            "Executed statement produced a row. Use `rows` to fetch results of queries."
        );
        Ok(())
    }

    /// Rewinds the statement, so the next step starts a new execution. Bound parameters are kept.
    /// Reports the error of the last step again, if it failed.
    pub fn reset(&mut self) -> Result<(), Error> {
        unsafe { sqlite3_reset(self.handle.get()) }
            .into_sql_result("sqlite3_reset")
            .into_result(self)
    }

    /// Name SQLite assigns to the result column at `column`, starting with `0`. Either the `AS`
    /// clause, or a name derived from the expression. `None` if `column` is out of range.
    pub fn column_name(&self, column: usize) -> Option<Cow<'_, str>> {
        let name = unsafe { sqlite3_column_name(self.handle.get(), clamp_int(column)) };
        if name.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(name) }.to_string_lossy())
        }
    }

    /// Advances the statement and returns a view of the next row, or `None` once the statement has
    /// finished executing.
    pub fn next_row(&mut self) -> Result<Option<Row<'_>>, Error> {
        let row = if self.step()? {
            Some(unsafe { Row::new(self.handle.get()) })
        } else {
            None
        };
        Ok(row)
    }

    /// Executes the statement and positions it on the first row. See [`RowIterator`].
    pub fn rows(&mut self) -> Result<RowIterator<'_, 'c>, Error> {
        RowIterator::new(self)
    }

    /// An iterator over the rows of the statement, which turns every row into an owned value using
    /// `map`.
    ///
    /// ```
    /// use sqlite_api::{Connection, RowReader};
    ///
    /// let conn = Connection::in_memory()?;
    /// let mut stmt = conn.prepare("SELECT 1 UNION ALL SELECT 2", ())?;
    /// let numbers = stmt
    ///     .map_rows(|row| row.get_int(0))
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(numbers, [1, 2]);
    /// # Ok::<(), sqlite_api::Error>(())
    /// ```
    pub fn map_rows<T, F>(&mut self, map: F) -> MappedRows<'_, 'c, F>
    where
        F: FnMut(&mut Row<'_>) -> T,
    {
        MappedRows::new(self, map)
    }
}
