use crate::handles::{
    clamp_int, slice_from_raw, slice_to_cow_utf8, sqlite3_column_bytes16, sqlite3_column_text16,
};
use libsqlite3_sys::{
    sqlite3_column_blob, sqlite3_column_bytes, sqlite3_column_count, sqlite3_column_double,
    sqlite3_column_int, sqlite3_column_int64, sqlite3_column_text, sqlite3_column_type,
    sqlite3_stmt, SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT,
};
use std::{borrow::Cow, marker::PhantomData};
use widestring::U16Str;

/// Fundamental datatype of a value in the current row, as reported by `sqlite3_column_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

/// Typed access to the columns of the row a native statement is currently positioned on.
///
/// Columns are indexed starting with `0`. Values are converted by SQLite if the type requested
/// differs from the type stored. All views returned borrow storage of the statement and are
/// therefore only valid until it is stepped or finalized. The borrow checker enforces this, as
/// stepping requires mutable access to the statement.
///
/// Requesting the UTF-16 representation of a column invalidates views of its UTF-8
/// representation (and the other way round), since SQLite converts the value in place. The same
/// holds for switching between text and blob. This is why the wide and the blob accessors require
/// `&mut self`.
///
/// # Safety
///
/// `as_stmt` must return either `NULL` or a valid statement, which stays valid while the
/// implementer exists.
pub unsafe trait RowReader {
    /// The native statement the current row is read from.
    fn as_stmt(&self) -> *mut sqlite3_stmt;

    /// Number of columns in the result set. `0` for statements which do not return data.
    fn column_count(&self) -> usize {
        unsafe { sqlite3_column_count(self.as_stmt()) as usize }
    }

    /// Type of the value stored in `column`.
    fn column_type(&self, column: usize) -> ColumnType {
        match unsafe { sqlite3_column_type(self.as_stmt(), clamp_int(column)) } {
            SQLITE_INTEGER => ColumnType::Integer,
            SQLITE_FLOAT => ColumnType::Float,
            SQLITE_TEXT => ColumnType::Text,
            SQLITE_BLOB => ColumnType::Blob,
            SQLITE_NULL => ColumnType::Null,
            other => panic!("Unexpected column type reported by SQLite: {other}"),
        }
    }

    /// `true` if the value in `column` is `NULL`.
    fn is_null(&self, column: usize) -> bool {
        self.column_type(column) == ColumnType::Null
    }

    /// Value of `column` as 32 Bit integer. `NULL` is reported as `0`.
    fn get_int(&self, column: usize) -> i32 {
        unsafe { sqlite3_column_int(self.as_stmt(), clamp_int(column)) }
    }

    /// Value of `column` as 64 Bit integer. `NULL` is reported as `0`.
    fn get_int64(&self, column: usize) -> i64 {
        unsafe { sqlite3_column_int64(self.as_stmt(), clamp_int(column)) }
    }

    /// Value of `column` as floating point number. `NULL` is reported as `0.0`.
    fn get_double(&self, column: usize) -> f64 {
        unsafe { sqlite3_column_double(self.as_stmt(), clamp_int(column)) }
    }

    /// UTF-8 representation of `column`, without terminating zero. `NULL` is reported as an empty
    /// slice.
    fn get_string_bytes(&self, column: usize) -> &[u8] {
        let stmt = self.as_stmt();
        let column = clamp_int(column);
        unsafe {
            // Text must be requested before its length, so the length refers to the converted
            // value.
            let text = sqlite3_column_text(stmt, column);
            let len = sqlite3_column_bytes(stmt, column) as usize;
            slice_from_raw(text, len)
        }
    }

    /// Value of `column` as text. Borrows the buffer of the statement, unless the text is not valid
    /// UTF-8, in which case invalid sequences are replaced with placeholder characters.
    fn get_string(&self, column: usize) -> Cow<'_, str> {
        slice_to_cow_utf8(self.get_string_bytes(column))
    }

    /// Length in bytes of the UTF-8 representation of `column`.
    fn get_string_length(&self, column: usize) -> usize {
        self.get_string_bytes(column).len()
    }

    /// UTF-16 representation of `column`, without terminating zero.
    fn get_wide_string(&mut self, column: usize) -> &U16Str {
        let stmt = self.as_stmt();
        let column = clamp_int(column);
        unsafe {
            let text = sqlite3_column_text16(stmt, column) as *const u16;
            let bytes = sqlite3_column_bytes16(stmt, column) as usize;
            U16Str::from_slice(slice_from_raw(text, bytes / 2))
        }
    }

    /// Length in code units of the UTF-16 representation of `column`.
    fn get_wide_string_length(&mut self, column: usize) -> usize {
        unsafe { sqlite3_column_bytes16(self.as_stmt(), clamp_int(column)) as usize / 2 }
    }

    /// Value of `column` as binary data. `NULL` and empty blobs are reported as empty slices.
    fn get_blob(&mut self, column: usize) -> &[u8] {
        let stmt = self.as_stmt();
        let column = clamp_int(column);
        unsafe {
            let blob = sqlite3_column_blob(stmt, column) as *const u8;
            let len = sqlite3_column_bytes(stmt, column) as usize;
            slice_from_raw(blob, len)
        }
    }
}

/// An individual row of a result set. See [`crate::RowIterator::row`] or
/// [`crate::Statement::next_row`].
///
/// A row is a view of the current position of a statement, not a copy. It borrows the statement
/// mutably, so it can not outlive the step which produced it.
pub struct Row<'s> {
    statement: *mut sqlite3_stmt,
    parent: PhantomData<&'s mut sqlite3_stmt>,
}

impl Row<'_> {
    /// # Safety
    ///
    /// `statement` must be positioned on a row and exclusively borrowed for the lifetime of the
    /// row.
    pub(crate) unsafe fn new(statement: *mut sqlite3_stmt) -> Self {
        Row {
            statement,
            parent: PhantomData,
        }
    }
}

unsafe impl RowReader for Row<'_> {
    fn as_stmt(&self) -> *mut sqlite3_stmt {
        self.statement
    }
}
