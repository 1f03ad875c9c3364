use crate::{Error, Row, Statement};
use std::ptr;

/// Walks the rows of an executing statement, one step at a time. Either positioned on a row
/// ("has row") or exhausted. Exhaustion is final: once the statement reports there are no more
/// rows, or stepping fails, the iterator never yields a row again.
///
/// The iterator borrows the statement mutably, and every [`Row`] it hands out borrows the
/// iterator mutably. Rows are therefore views which can not outlive the next [`Self::advance`].
///
/// # Example
///
/// ```
/// use sqlite_api::{Connection, RowIterator, RowReader};
///
/// let conn = Connection::in_memory()?;
/// let mut stmt = conn.prepare("SELECT 42", ())?;
/// let mut rows = stmt.rows()?;
/// assert_eq!(42, rows.row().unwrap().get_int(0));
/// rows.advance()?;
/// assert!(rows == RowIterator::exhausted());
/// # Ok::<(), sqlite_api::Error>(())
/// ```
#[derive(Debug)]
pub struct RowIterator<'s, 'c> {
    /// `None` once exhausted.
    statement: Option<&'s mut Statement<'c>>,
}

impl<'s, 'c> RowIterator<'s, 'c> {
    /// Steps `statement` once. The iterator is positioned on the first row, or exhausted right
    /// away if the result set is empty.
    pub fn new(statement: &'s mut Statement<'c>) -> Result<Self, Error> {
        let statement = if statement.step()? {
            Some(statement)
        } else {
            None
        };
        Ok(Self { statement })
    }

    /// An iterator which does not refer to any statement. Every exhausted iterator compares equal
    /// to it.
    pub fn exhausted() -> Self {
        Self { statement: None }
    }

    pub fn is_exhausted(&self) -> bool {
        self.statement.is_none()
    }

    /// The current row, `None` if exhausted.
    pub fn row(&mut self) -> Option<Row<'_>> {
        self.statement
            .as_deref_mut()
            .map(|statement| unsafe { Row::new(statement.as_sys()) })
    }

    /// Moves to the next row. The iterator is exhausted afterwards if there is none, or if
    /// stepping fails. Advancing an exhausted iterator does nothing.
    pub fn advance(&mut self) -> Result<(), Error> {
        if let Some(statement) = self.statement.take() {
            if statement.step()? {
                self.statement = Some(statement);
            }
        }
        Ok(())
    }
}

impl PartialEq for RowIterator<'_, '_> {
    /// Two iterators are equal if both are exhausted or both walk the same statement.
    fn eq(&self, other: &Self) -> bool {
        match (&self.statement, &other.statement) {
            (None, None) => true,
            (Some(a), Some(b)) => ptr::eq::<Statement>(&**a, &**b),
            _ => false,
        }
    }
}

/// Iterator returned by [`Statement::map_rows`]. Steps the statement for each call to `next` and
/// converts the row using a closure. Stops after the last row or the first error.
pub struct MappedRows<'s, 'c, F> {
    statement: Option<&'s mut Statement<'c>>,
    map: F,
}

impl<'s, 'c, F> MappedRows<'s, 'c, F> {
    pub(crate) fn new(statement: &'s mut Statement<'c>, map: F) -> Self {
        Self {
            statement: Some(statement),
            map,
        }
    }
}

impl<F, T> Iterator for MappedRows<'_, '_, F>
where
    F: FnMut(&mut Row<'_>) -> T,
{
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let statement = self.statement.take()?;
        match statement.step() {
            Ok(true) => {
                let value = {
                    let mut row = unsafe { Row::new(statement.as_sys()) };
                    (self.map)(&mut row)
                };
                self.statement = Some(statement);
                Some(Ok(value))
            }
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }
}
