//! Values which can be bound to the placeholders (`?`, `?NNN`) of a statement.

use std::{borrow::Cow, ffi::CStr};

use widestring::{U16CStr, U16Str, U16String};

/// A single value bound to a placeholder of a statement.
///
/// Text and blobs are either borrowed or owned. How the engine stores them is decided by how they
/// are bound, see [`crate::Statement::bind`] and [`crate::Statement::bind_static`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter<'a> {
    /// SQL `NULL`.
    Null,
    /// 32 Bit integer, bound with `sqlite3_bind_int`.
    Int(i32),
    /// 64 Bit integer, bound with `sqlite3_bind_int64`.
    Int64(i64),
    /// Floating point number, bound with `sqlite3_bind_double`.
    Double(f64),
    /// UTF-8 text with explicit length.
    Text(Cow<'a, str>),
    /// UTF-8 text terminated by zero. The length is determined by SQLite.
    CText(&'a CStr),
    /// UTF-16 text with explicit length.
    WideText(Cow<'a, U16Str>),
    /// UTF-16 text terminated by zero. The length is determined by SQLite.
    WideCText(&'a U16CStr),
    /// Binary data.
    Blob(Cow<'a, [u8]>),
}

impl Parameter<'_> {
    /// `true` if the value lives in a buffer owned by the parameter itself, rather than in one
    /// borrowed from the caller. Owned buffers die with the parameter and must always be copied by
    /// the engine.
    pub fn is_owned(&self) -> bool {
        matches!(
            self,
            Parameter::Text(Cow::Owned(_))
                | Parameter::WideText(Cow::Owned(_))
                | Parameter::Blob(Cow::Owned(_))
        )
    }
}

/// An instance can be consumed to create a [`Parameter`] which can be bound to a statement.
pub trait IntoParameter<'a> {
    fn into_parameter(self) -> Parameter<'a>;
}

impl<'a> IntoParameter<'a> for Parameter<'a> {
    fn into_parameter(self) -> Parameter<'a> {
        self
    }
}

impl<'a> IntoParameter<'a> for &Parameter<'a> {
    fn into_parameter(self) -> Parameter<'a> {
        self.clone()
    }
}

impl<'a> IntoParameter<'a> for i32 {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Int(self)
    }
}

impl<'a> IntoParameter<'a> for i64 {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Int64(self)
    }
}

impl<'a> IntoParameter<'a> for f64 {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Double(self)
    }
}

impl<'a> IntoParameter<'a> for &'a str {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Text(Cow::Borrowed(self))
    }
}

impl<'a> IntoParameter<'a> for &'a String {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Text(Cow::Borrowed(self.as_str()))
    }
}

impl<'a> IntoParameter<'a> for String {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Text(Cow::Owned(self))
    }
}

impl<'a> IntoParameter<'a> for Cow<'a, str> {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Text(self)
    }
}

impl<'a> IntoParameter<'a> for &'a CStr {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::CText(self)
    }
}

impl<'a> IntoParameter<'a> for &'a U16Str {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::WideText(Cow::Borrowed(self))
    }
}

impl<'a> IntoParameter<'a> for &'a U16String {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::WideText(Cow::Borrowed(self.as_ustr()))
    }
}

impl<'a> IntoParameter<'a> for U16String {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::WideText(Cow::Owned(self))
    }
}

impl<'a> IntoParameter<'a> for &'a U16CStr {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::WideCText(self)
    }
}

impl<'a> IntoParameter<'a> for &'a [u8] {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Blob(Cow::Borrowed(self))
    }
}

impl<'a> IntoParameter<'a> for Vec<u8> {
    fn into_parameter(self) -> Parameter<'a> {
        Parameter::Blob(Cow::Owned(self))
    }
}

impl<'a, T> IntoParameter<'a> for Option<T>
where
    T: IntoParameter<'a>,
{
    fn into_parameter(self) -> Parameter<'a> {
        match self {
            Some(value) => value.into_parameter(),
            None => Parameter::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{IntoParameter, Parameter};

    #[test]
    fn none_becomes_null() {
        assert_eq!(Parameter::Null, None::<i32>.into_parameter());
        assert_eq!(Parameter::Int(5), Some(5).into_parameter());
    }

    #[test]
    fn only_owned_buffers_are_owned() {
        assert!(String::from("Joe").into_parameter().is_owned());
        assert!(!"Joe".into_parameter().is_owned());
        assert!(!42i64.into_parameter().is_owned());
        assert_eq!(
            Parameter::Text(Cow::Borrowed("Joe")),
            String::from("Joe").into_parameter()
        );
    }
}
