//! `dl_iterate_phdr` over the single loaded image.
//!
//! Callers walk loaded objects to learn each one's name and base. There
//! is one object here and nobody needs its name, so a zeroed descriptor
//! is reported once.
//!
//! The descriptor is a writable static, like the C `struct dl_phdr_info`
//! callers expect behind a non-const pointer. It is shared by every
//! call, so callbacks treat it as read-only.

use core::cell::UnsafeCell;
use core::ffi::{c_char, c_int, c_void};
use core::mem::size_of;
use core::ptr;

use crate::error::Violation;
use crate::trap;

/// `struct dl_phdr_info` (glibc layout).
#[repr(C)]
#[derive(Debug)]
pub struct DlPhdrInfo {
    pub dlpi_addr: usize,
    pub dlpi_name: *const c_char,
    pub dlpi_phdr: *const c_void,
    pub dlpi_phnum: u16,
    pub dlpi_adds: u64,
    pub dlpi_subs: u64,
    pub dlpi_tls_modid: usize,
    pub dlpi_tls_data: *mut c_void,
}

/// Callback type taken by `dl_iterate_phdr`.
pub type PhdrCallback =
    unsafe extern "C" fn(info: *mut DlPhdrInfo, size: usize, data: *mut c_void) -> c_int;

struct EmptyInfo(UnsafeCell<DlPhdrInfo>);

// SAFETY: the shim itself never writes the record.
unsafe impl Sync for EmptyInfo {}

static EMPTY_INFO: EmptyInfo = EmptyInfo(UnsafeCell::new(DlPhdrInfo {
    dlpi_addr: 0,
    dlpi_name: ptr::null(),
    dlpi_phdr: ptr::null(),
    dlpi_phnum: 0,
    dlpi_adds: 0,
    dlpi_subs: 0,
    dlpi_tls_modid: 0,
    dlpi_tls_data: ptr::null_mut(),
}));

/// Report the one image to `f` and return its result.
pub fn iterate_images<F>(f: F) -> c_int
where
    F: FnOnce(*mut DlPhdrInfo, usize) -> c_int,
{
    f(EMPTY_INFO.0.get(), size_of::<DlPhdrInfo>())
}

/// # Safety
///
/// `callback` must be safe to call with the shared descriptor and `data`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn dl_iterate_phdr(
    callback: Option<PhdrCallback>,
    data: *mut c_void,
) -> c_int {
    trace_call!("dl_iterate_phdr({:?}, {:p})", callback.map(|cb| cb as *const c_void), data);
    let Some(callback) = callback else {
        trap::raise(Violation::NullCallback.into(), &"dl_iterate_phdr")
    };
    iterate_images(|info, size| unsafe { callback(info, size, data) })
}
