use super::{buffer::c_str_to_string, Diagnostics};
use crate::Error;
use libsqlite3_sys::{sqlite3_config, SQLITE_CONFIG_LOG, SQLITE_NOTICE, SQLITE_OK};
use log::{info, warn, Level};
use std::{
    os::raw::{c_char, c_int, c_void},
    ptr::null_mut,
};

/// This function inspects the diagnostics of a handle and logs its text message. It is going to
/// print placeholder characters, if it cannot convert the message to UTF-8.
pub fn log_diagnostics(handle: &(impl Diagnostics + ?Sized)) {
    if log::max_level() < Level::Warn {
        // Early return to safe work creating the log record in case we would not log anything.
        return;
    }

    if let Some(rec) = handle.diagnostic_record() {
        warn!("{}", rec);
    }
}

/// Routes the error log of the SQLite engine itself to the `log` crate. The engine reports e.g.
/// syntax errors including the offending statement text, recovered journals or automatic indices
/// there. Notices are logged as `info`, everything else as `warn`.
///
/// # Safety
///
/// SQLite does not synchronize changes to its global configuration. No other thread may use
/// SQLite while this function runs. Call it at the start of your application.
pub unsafe fn forward_engine_log() -> Result<(), Error> {
    let callback: extern "C" fn(*mut c_void, c_int, *const c_char) = engine_log;
    match sqlite3_config(SQLITE_CONFIG_LOG, callback, null_mut::<c_void>()) {
        SQLITE_OK => Ok(()),
        code => Err(Error::EngineConfiguration { code }),
    }
}

extern "C" fn engine_log(_user_data: *mut c_void, code: c_int, message: *const c_char) {
    let message = unsafe { c_str_to_string(message) };
    if code & 0xff == SQLITE_NOTICE {
        info!("SQLite ({code}): {message}")
    } else {
        warn!("SQLite ({code}): {message}")
    }
}
