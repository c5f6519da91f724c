//! Legacy zero-fill entry point.

use core::ffi::{c_int, c_void};

extern "C" {
    fn memset(dest: *mut c_void, c: c_int, n: usize) -> *mut c_void;
}

/// Zero `count` bytes at `dest` through the kernel's `memset`.
///
/// # Safety
///
/// `dest` must be valid for writes of `count` bytes.
pub unsafe fn zero_fill(dest: *mut u8, count: usize) {
    unsafe { memset(dest.cast(), 0, count) };
}

/// BSD `bzero`.
///
/// # Safety
///
/// `dest` must be valid for writes of `count` bytes.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn bzero(dest: *mut c_void, count: usize) {
    unsafe { zero_fill(dest.cast(), count) }
}
