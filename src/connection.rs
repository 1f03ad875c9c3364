use crate::{
    handles::{
        nul_terminated, nul_terminated_utf16, release_unopened, sqlite3_open16, AsHandle,
        ConnectionHandle, Diagnostics, ExtSqlReturn, HandleType, Record, SessionRef,
    },
    Error, ParameterCollection, Statement,
};
use libsqlite3_sys::{
    sqlite3, sqlite3_changes, sqlite3_close, sqlite3_exec, sqlite3_last_insert_rowid,
    sqlite3_open_v2, SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE,
    SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE, SQLITE_ROW,
};
use log::info;
use std::{
    os::raw::{c_int, c_void},
    ptr::{null, null_mut},
};
use widestring::{U16Str, U16String};

/// Target which opens a private, temporary database held entirely in memory.
pub const MEMORY: &str = ":memory:";

/// How a database file is accessed. See [`ConnectionOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Open an existing database for reading only.
    ReadOnly,
    /// Open an existing database for reading and writing.
    ReadWrite,
    /// Open a database for reading and writing, creating it if it does not exist.
    #[default]
    Create,
}

impl AccessMode {
    fn flags(self) -> c_int {
        match self {
            AccessMode::ReadOnly => SQLITE_OPEN_READONLY,
            AccessMode::ReadWrite => SQLITE_OPEN_READWRITE,
            AccessMode::Create => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
        }
    }
}

/// Options passed to [`Connection::open_with`] and [`Connection::connect_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionOptions {
    /// Defaults to [`AccessMode::Create`].
    pub access_mode: AccessMode,
}

/// A session with a single SQLite database. Either open or closed. An open connection closes its
/// session once dropped. Statements prepared on the connection borrow it, so it can not be closed
/// or replaced while any of them is alive.
///
/// # Example
///
/// ```
/// use sqlite_api::{Connection, RowReader};
///
/// let conn = Connection::in_memory()?;
/// conn.execute("CREATE TABLE Users (name TEXT)", ())?;
/// conn.execute("INSERT INTO Users (name) VALUES (?)", "Joe")?;
///
/// let mut stmt = conn.prepare("SELECT name FROM Users", ())?;
/// let mut rows = stmt.rows()?;
/// assert_eq!("Joe", rows.row().unwrap().get_string(0));
/// # Ok::<(), sqlite_api::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Connection {
    handle: ConnectionHandle,
}

unsafe impl AsHandle for Connection {
    fn as_session(&self) -> *mut sqlite3 {
        self.handle.get()
    }

    fn handle_type(&self) -> HandleType {
        HandleType::Connection
    }
}

impl Connection {
    /// A closed connection. Use [`Self::connect`] to open it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the database file at `target`, creating it if it does not exist. Pass [`MEMORY`] to
    /// open an in-memory database.
    pub fn open(target: &str) -> Result<Self, Error> {
        Self::open_with(target, ConnectionOptions::default())
    }

    /// Opens the database file at `target` using `options`.
    pub fn open_with(target: &str, options: ConnectionOptions) -> Result<Self, Error> {
        let mut connection = Self::new();
        connection.connect_with(target, options)?;
        Ok(connection)
    }

    /// Opens the database file at `target`, which is encoded as UTF-16.
    pub fn open_utf16(target: &U16Str) -> Result<Self, Error> {
        let mut connection = Self::new();
        connection.connect_utf16(target)?;
        Ok(connection)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, Error> {
        Self::open(MEMORY)
    }

    /// Opens a private in-memory database, passing the target to SQLite as UTF-16.
    pub fn in_memory_utf16() -> Result<Self, Error> {
        Self::open_utf16(&U16String::from_str(MEMORY))
    }

    /// Opens a session with the database at `target` and makes it the session of `self`. An
    /// already open session is closed, but only after the new one has been opened successfully.
    /// On failure `self` is left unchanged.
    pub fn connect(&mut self, target: &str) -> Result<(), Error> {
        self.connect_with(target, ConnectionOptions::default())
    }

    /// Like [`Self::connect`], but uses the access mode of `options`.
    pub fn connect_with(&mut self, target: &str, options: ConnectionOptions) -> Result<(), Error> {
        let filename = nul_terminated(target)?;
        self.connect_impl("sqlite3_open_v2", |slot| unsafe {
            sqlite3_open_v2(filename.as_ptr(), slot, options.access_mode.flags(), null())
        })?;
        info!("Connection opened: {target}");
        Ok(())
    }

    /// Like [`Self::connect`], but takes a target encoded as UTF-16. The database is always
    /// opened for reading and writing and created if it does not exist.
    pub fn connect_utf16(&mut self, target: &U16Str) -> Result<(), Error> {
        let filename = nul_terminated_utf16(target)?;
        self.connect_impl("sqlite3_open16", |slot| unsafe {
            sqlite3_open16(filename.as_ptr() as *const c_void, slot)
        })?;
        info!("Connection opened: {}", target.display());
        Ok(())
    }

    fn connect_impl(
        &mut self,
        function: &'static str,
        open: impl FnOnce(*mut *mut sqlite3) -> c_int,
    ) -> Result<(), Error> {
        let mut opened = ConnectionHandle::empty();
        // SQLite allocates a session even if opening fails. It holds the error message and must
        // be closed as well.
        let result = open(opened.prepare_for_assignment() as *mut _)
            .into_sql_result(function)
            .into_result(&unsafe { SessionRef::new(opened.get(), HandleType::Connection) });
        if let Err(error) = result {
            release_unopened(&mut opened);
            return Err(error);
        }
        self.handle.swap(&mut opened);
        Ok(())
    }

    /// `true` if the connection holds an open session.
    pub fn is_open(&self) -> bool {
        self.handle.is_valid()
    }

    /// The native session. Ownership stays with `self`.
    pub fn as_sys(&self) -> *mut sqlite3 {
        self.handle.get()
    }

    /// Diagnostics of the most recent failed call on the session. `None` if the connection is
    /// closed, or if the most recent call succeeded (including steps which yielded a row or
    /// finished the statement).
    pub fn last_error(&self) -> Option<Record> {
        self.diagnostic_record().filter(|record| {
            !matches!(record.primary_code(), SQLITE_OK | SQLITE_ROW | SQLITE_DONE)
        })
    }

    /// Closes the session. Closing a closed connection does nothing. Fails with `SQLITE_BUSY` if
    /// native statements prepared on the session have not been finalized, in which case the
    /// connection stays open.
    ///
    /// Dropping an open connection closes it, too. Yet any error is reported by panicking then.
    pub fn close(&mut self) -> Result<(), Error> {
        if !self.is_open() {
            return Ok(());
        }
        unsafe { sqlite3_close(self.handle.get()) }
            .into_sql_result("sqlite3_close")
            .into_result(self)?;
        self.handle.detach();
        info!("Connection closed");
        Ok(())
    }

    /// Prepares the first SQL statement in `text` and binds `params` to its placeholders. See
    /// [`Statement::prepare`].
    pub fn prepare<'p>(
        &self,
        text: &str,
        params: impl ParameterCollection<'p>,
    ) -> Result<Statement<'_>, Error> {
        let mut statement = Statement::new();
        statement.prepare(self, text, params)?;
        Ok(statement)
    }

    /// Like [`Self::prepare`], but takes statement text encoded as UTF-16.
    pub fn prepare_utf16<'p>(
        &self,
        text: &U16Str,
        params: impl ParameterCollection<'p>,
    ) -> Result<Statement<'_>, Error> {
        let mut statement = Statement::new();
        statement.prepare_utf16(self, text, params)?;
        Ok(statement)
    }

    /// Prepares and executes a single statement which does not produce any rows. Text without any
    /// SQL in it is accepted and does nothing.
    ///
    /// # Panics
    ///
    /// If the statement produces a row.
    pub fn execute<'p>(
        &self,
        text: &str,
        params: impl ParameterCollection<'p>,
    ) -> Result<(), Error> {
        let mut statement = self.prepare(text, params)?;
        if statement.is_prepared() {
            statement.execute()?;
        }
        Ok(())
    }

    /// Executes all semicolon separated statements in `text`, discarding any rows they produce.
    /// Stops at the first failing statement.
    ///
    /// # Panics
    ///
    /// If the connection is closed.
    pub fn execute_batch(&self, text: &str) -> Result<(), Error> {
        let sql = nul_terminated(text)?;
        let session = self.open_session();
        unsafe { sqlite3_exec(session, sql.as_ptr(), None, null_mut(), null_mut()) }
            .into_sql_result("sqlite3_exec")
            .into_result(&unsafe { SessionRef::new(session, HandleType::Statement) })
    }

    /// Number of rows modified, inserted or deleted by the most recently completed `INSERT`,
    /// `UPDATE` or `DELETE` statement.
    pub fn changes(&self) -> usize {
        unsafe { sqlite3_changes(self.open_session()) as usize }
    }

    /// Row id of the most recent successful `INSERT`. `0` if there has not been any.
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { sqlite3_last_insert_rowid(self.open_session()) }
    }

    fn open_session(&self) -> *mut sqlite3 {
        assert!(self.is_open(), "Connection must be open.");
        self.handle.get()
    }
}
