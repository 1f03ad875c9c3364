use crate::{
    parameter::{IntoParameter, Parameter},
    Error, Statement,
};
use std::{borrow::Cow, ffi::CStr};
use widestring::{U16CStr, U16Str, U16String};

mod tuple;

/// SQL Parameters used to execute a query.
///
/// SQLite allows to place question marks (`?`) in the statement text as placeholders. For each
/// such placeholder a parameter needs to be bound to the statement before executing it. A
/// collection binds its elements in order, the first element to placeholder `1`.
///
/// # Examples
///
/// This trait is implemented by single parameters.
///
/// ```
/// use sqlite_api::Connection;
///
/// let conn = Connection::in_memory()?;
/// let year = 1980;
/// let mut stmt = conn.prepare("SELECT ? + 1", year)?;
/// assert!(stmt.step()?);
/// # Ok::<(), sqlite_api::Error>(())
/// ```
///
/// Tuples of parameters implement this trait, too. The unit type `()` is used to signal no
/// parameters.
///
/// ```
/// use sqlite_api::{Connection, RowReader};
///
/// let conn = Connection::in_memory()?;
/// let mut stmt = conn.prepare("SELECT ?1 || ' ' || ?2", ("hello", String::from("World")))?;
/// assert!(stmt.step()?);
/// assert_eq!("hello World", stmt.get_string(0));
/// # Ok::<(), sqlite_api::Error>(())
/// ```
///
/// And so do arrays, slices and vectors of parameters.
///
/// ```
/// use sqlite_api::{Connection, IntoParameter};
///
/// let conn = Connection::in_memory()?;
/// let params = vec![1i32.into_parameter(), "two".into_parameter()];
/// let mut stmt = conn.prepare("SELECT ?, ?", params)?;
/// assert!(stmt.step()?);
/// # Ok::<(), sqlite_api::Error>(())
/// ```
pub trait ParameterCollection<'a> {
    /// Binds all elements of the collection, the first one to placeholder `first`.
    fn bind_parameters_to(self, first: usize, stmt: &mut Statement<'_>) -> Result<(), Error>;
}

macro_rules! impl_single_parameter {
    ($($t:ty),* $(,)?) => (
        $(
            impl<'a> ParameterCollection<'a> for $t {
                fn bind_parameters_to(
                    self,
                    first: usize,
                    stmt: &mut Statement<'_>,
                ) -> Result<(), Error> {
                    stmt.bind(first, self)
                }
            }
        )*
    );
}

impl_single_parameter! {
    i32, i64, f64, String, U16String, Parameter<'a>, &'a [u8], &'a str, &'a String, &'a CStr,
    &'a U16Str, &'a U16String, &'a U16CStr, Cow<'a, str>,
}

impl<'a, 'b> ParameterCollection<'a> for &'b [Parameter<'a>] {
    fn bind_parameters_to(self, first: usize, stmt: &mut Statement<'_>) -> Result<(), Error> {
        for (offset, parameter) in self.iter().enumerate() {
            stmt.bind(first + offset, parameter)?;
        }
        Ok(())
    }
}

impl<'a, T> ParameterCollection<'a> for Vec<T>
where
    T: IntoParameter<'a>,
{
    fn bind_parameters_to(self, first: usize, stmt: &mut Statement<'_>) -> Result<(), Error> {
        for (offset, parameter) in self.into_iter().enumerate() {
            stmt.bind(first + offset, parameter)?;
        }
        Ok(())
    }
}

impl<'a, T, const N: usize> ParameterCollection<'a> for [T; N]
where
    T: IntoParameter<'a>,
{
    fn bind_parameters_to(self, first: usize, stmt: &mut Statement<'_>) -> Result<(), Error> {
        for (offset, parameter) in self.into_iter().enumerate() {
            stmt.bind(first + offset, parameter)?;
        }
        Ok(())
    }
}
