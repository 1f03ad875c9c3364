use std::{
    borrow::Cow,
    cmp::min,
    ffi::{CStr, CString},
    os::raw::{c_char, c_int},
    slice,
};

use widestring::{U16CString, U16Str};

use crate::Error;

/// Clamps a usize between `0` and `c_int::MAX`.
pub fn clamp_int(n: usize) -> c_int {
    min(n, c_int::MAX as usize) as c_int
}

/// Copies a zero terminated string owned by SQLite. `NULL` is treated as an empty string, invalid
/// UTF-8 is replaced with placeholder characters.
///
/// # Safety
///
/// `ptr` must either be `NULL` or point to a zero terminated string.
pub unsafe fn c_str_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// View a buffer owned by SQLite as slice. SQLite represents empty values with `NULL` pointers,
/// which are mapped to empty slices.
///
/// # Safety
///
/// `ptr` must either be `NULL` or point to `len` valid elements, which outlive `'a`.
pub unsafe fn slice_from_raw<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len)
    }
}

/// Copies `text` into a zero terminated buffer, as required by functions of the C API which do not
/// take a length argument (e.g. `sqlite3_open_v2`).
pub fn nul_terminated(text: &str) -> Result<CString, Error> {
    CString::new(text).map_err(|error| Error::InteriorNul {
        position: error.nul_position(),
    })
}

/// Wide counterpart to [`nul_terminated`].
pub fn nul_terminated_utf16(text: &U16Str) -> Result<U16CString, Error> {
    U16CString::from_ustr(text).map_err(|error| Error::InteriorNul {
        position: error.nul_position(),
    })
}

/// Converts text received from SQLite to UTF-8, without copying if it is valid UTF-8 already.
pub fn slice_to_cow_utf8(text: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(text)
}
