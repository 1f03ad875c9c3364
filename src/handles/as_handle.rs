use libsqlite3_sys::sqlite3;
use std::marker::PhantomData;

/// Which kind of handle a diagnostic is reported for. Decides whether a failure surfaces as
/// [`crate::Error::Connection`] or [`crate::Error::Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    /// An open database session.
    Connection,
    /// A prepared statement.
    Statement,
}

/// Provides access to the native session diagnostics of a handle are stored in.
///
/// # Safety
///
/// The session provided by `as_session` must either be `NULL` or a valid, open session.
pub unsafe trait AsHandle {
    /// The native session which holds error code and message of the last failed call made with
    /// this handle. SQLite keeps diagnostics of statements in the session they have been prepared
    /// on.
    fn as_session(&self) -> *mut sqlite3;

    /// The type of the handle. This is a method rather than a constant in order to make the trait
    /// object safe.
    fn handle_type(&self) -> HandleType;
}

/// Borrows a native session to report diagnostics on behalf of a handle of another type. E.g. a
/// statement which failed to be prepared has no handle yet, yet the error is stored in the session
/// of the connection.
pub struct SessionRef<'s> {
    session: *mut sqlite3,
    handle_type: HandleType,
    parent: PhantomData<&'s sqlite3>,
}

impl SessionRef<'_> {
    /// # Safety
    ///
    /// `session` must either be `NULL` or a valid session, which outlives the returned instance.
    pub unsafe fn new(session: *mut sqlite3, handle_type: HandleType) -> Self {
        Self {
            session,
            handle_type,
            parent: PhantomData,
        }
    }
}

unsafe impl AsHandle for SessionRef<'_> {
    fn as_session(&self) -> *mut sqlite3 {
        self.session
    }

    fn handle_type(&self) -> HandleType {
        self.handle_type
    }
}
