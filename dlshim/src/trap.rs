//! Fatal traps.
//!
//! A broken C library contract on this kernel means the runtime and the
//! shim were built against different expectations. There is nothing to
//! recover: the diagnostic is logged and the machine halts.

use core::ffi::{c_char, c_uint, CStr};
use core::fmt;
use core::panic::Location;

use crate::error::{CStrExt, ShimError};

#[cfg(not(test))]
extern "C" {
    /// Kernel halt primitive.
    fn hlt();
}

/// Everything known about a fatal error at the moment it is raised.
pub struct Diagnostic<'a> {
    pub file: &'a dyn fmt::Display,
    pub line: u32,
    pub function: &'a dyn fmt::Display,
    pub message: &'a dyn fmt::Display,
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.file, self.function, self.line, self.message
        )
    }
}

/// Log `message` against its source location and halt.
pub fn fail(
    message: &dyn fmt::Display,
    file: &dyn fmt::Display,
    line: u32,
    function: &dyn fmt::Display,
) -> ! {
    emit_and_halt(&Diagnostic {
        file,
        line,
        function,
        message,
    })
}

/// Trap for a library function that was never ported.
#[track_caller]
pub fn unimplemented(name: &'static str) -> ! {
    raise(ShimError::UnimplementedCall(name), &name)
}

/// Trap on a typed failure, recording the caller's location.
#[track_caller]
pub fn raise(err: ShimError<'_>, function: &dyn fmt::Display) -> ! {
    let location = Location::caller();
    emit_and_halt(&Diagnostic {
        file: &location.file(),
        line: location.line(),
        function,
        message: &err,
    })
}

fn emit_and_halt(diag: &Diagnostic<'_>) -> ! {
    log::error!(target: "dlshim::trap", "{}", diag);
    halt(diag)
}

#[cfg(not(test))]
fn halt(_diag: &Diagnostic<'_>) -> ! {
    loop {
        unsafe { hlt() };
    }
}

// Host tests observe the halt as a panic carrying the diagnostic.
#[cfg(test)]
fn halt(diag: &Diagnostic<'_>) -> ! {
    panic!("{}", diag)
}

/// C `assert()` failure hook.
///
/// # Safety
///
/// Non-null string arguments must point to NUL-terminated strings.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn __assert_fail(
    err: *const c_char,
    file: *const c_char,
    line: c_uint,
    function: *const c_char,
) -> ! {
    // SAFETY: forwarded from the caller's contract.
    let (err, file, function) = unsafe { (c_arg(err), c_arg(file), c_arg(function)) };
    assert_failed(err, file, line, function)
}

fn assert_failed(err: &CStr, file: &CStr, line: c_uint, function: &CStr) -> ! {
    fail(
        &format_args!("assert: {}", err.escaped()),
        &file.escaped(),
        line,
        &function.escaped(),
    )
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn c_arg<'a>(ptr: *const c_char) -> &'a CStr {
    if ptr.is_null() {
        c"(null)"
    } else {
        unsafe { CStr::from_ptr(ptr) }
    }
}
