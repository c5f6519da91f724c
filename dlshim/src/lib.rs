//! Dynamic linker shim for a single-image kernel.
//!
//! A prebuilt language runtime expects to be linked against a C library
//! and to run under a real dynamic linker. On the kernel there is neither:
//! the kernel binary is the only image and nothing loads anything. This
//! crate answers exactly the calls the runtime makes and treats every
//! other call as a fatal integration error.
//!
//! # Modules
//!
//! - `trap`: fatal diagnostics + halt (`__assert_fail`)
//! - `memory`: legacy `bzero` forwarded onto `memset`
//! - `dl`: `dlopen` / `dlsym` / `dlclose` / `dladdr` against the one image
//! - `symbols`: the fixed name-to-address table used by `dlsym`
//! - `phdr`: `dl_iterate_phdr` with a single zeroed descriptor
//! - `unported`: functions the runtime links against but never gets
//! - `error`: typed failures raised before trapping
//!
//! # Collaborators
//!
//! The kernel links in `hlt`, `memset` and the
//! `swift2_protocol_conformances_start` marker, and installs the `log`
//! logger that receives every diagnostic.

#![cfg_attr(not(test), no_std)]

/// Debug trace of a C entry point, compiled in with `trace-calls`.
macro_rules! trace_call {
    ($($arg:tt)*) => {
        if cfg!(feature = "trace-calls") {
            log::debug!(target: "dlshim::call", $($arg)*);
        }
    };
}

pub mod dl;
pub mod error;
pub mod memory;
pub mod phdr;
pub mod symbols;
pub mod trap;
pub mod unported;

pub use dl::{DlFlags, DlInfo, MAIN_IMAGE};
pub use error::{Result, ShimError, Violation};
pub use phdr::DlPhdrInfo;
pub use trap::Diagnostic;
