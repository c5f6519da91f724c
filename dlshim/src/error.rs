//! Shim error types

use core::ffi::CStr;
use core::fmt;
use core::slice::EscapeAscii;

/// Result alias used by the Rust-side operations.
pub type Result<'a, T> = core::result::Result<T, ShimError<'a>>;

/// Failure raised by a shim operation.
///
/// None of these reach the C caller as a return value: the exported
/// entry points hand them to [`crate::trap::raise`], which halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimError<'a> {
    /// The caller broke the C library contract.
    ContractViolation(Violation<'a>),
    /// A library function that was never ported got called.
    UnimplementedCall(&'static str),
}

/// Ways the caller can break the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation<'a> {
    /// `dlopen` of anything but the running image.
    ForeignImage(&'a CStr),
    /// A handle other than [`crate::MAIN_IMAGE`].
    BadHandle(usize),
    /// `dlsym` for a name missing from the symbol table.
    UnknownSymbol(&'a CStr),
    /// `dl_iterate_phdr` without a callback.
    NullCallback,
}

impl fmt::Display for ShimError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShimError::ContractViolation(v) => write!(f, "{}", v),
            ShimError::UnimplementedCall(name) => write!(f, "unimplemented: {}", name),
        }
    }
}

impl fmt::Display for Violation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ForeignImage(path) => {
                write!(f, "called with filename={}", path.escaped())
            }
            Violation::BadHandle(handle) => write!(f, "bad handle: {:#x}", handle),
            Violation::UnknownSymbol(name) => {
                write!(f, "bad symbol: {}", name.escaped())
            }
            Violation::NullCallback => write!(f, "null callback"),
        }
    }
}

impl<'a> From<Violation<'a>> for ShimError<'a> {
    fn from(v: Violation<'a>) -> Self {
        ShimError::ContractViolation(v)
    }
}

/// Printable form of a C string: non-ASCII and control bytes escaped.
pub(crate) trait CStrExt {
    fn escaped(&self) -> EscapeAscii<'_>;
}

impl CStrExt for CStr {
    fn escaped(&self) -> EscapeAscii<'_> {
        self.to_bytes().escape_ascii()
    }
}
