//! `<dlfcn.h>` for a kernel with exactly one image.
//!
//! The only handle that exists is [`MAIN_IMAGE`], returned by
//! `dlopen(NULL, ..)`. Lookups go through the fixed table in
//! [`crate::symbols`]. Anything else the runtime asks for is a build
//! mismatch and traps.
//!
//! | C function | Behaviour |
//! |------------|-----------|
//! | `dlopen()` | `NULL` path only, returns [`MAIN_IMAGE`] |
//! | `dlsym()` | [`MAIN_IMAGE`] + a name from the symbol table |
//! | `dlclose()` | [`MAIN_IMAGE`] only, returns 0 |
//! | `dladdr()` | always "not found" |

use core::ffi::{c_char, c_int, c_void, CStr};
use core::ptr;

use bitflags::bitflags;

use crate::error::{CStrExt, Result, Violation};
use crate::{symbols, trap};

/// Handle of the running image, the only one there is.
pub const MAIN_IMAGE: *mut c_void = 1 as *mut c_void;

bitflags! {
    /// `dlopen` mode bits (glibc values).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DlFlags: c_int {
        const LAZY = 0x00001;
        const NOW = 0x00002;
        const NOLOAD = 0x00004;
        const DEEPBIND = 0x00008;
        const GLOBAL = 0x00100;
        const NODELETE = 0x01000;
    }
}

/// `Dl_info` as filled in by `dladdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DlInfo {
    pub dli_fname: *const c_char,
    pub dli_fbase: *mut c_void,
    pub dli_sname: *const c_char,
    pub dli_saddr: *mut c_void,
}

impl DlInfo {
    /// A record with every field null.
    pub const fn empty() -> Self {
        DlInfo {
            dli_fname: ptr::null(),
            dli_fbase: ptr::null_mut(),
            dli_sname: ptr::null(),
            dli_saddr: ptr::null_mut(),
        }
    }
}

fn check_handle<'a>(handle: *mut c_void) -> Result<'a, ()> {
    if handle == MAIN_IMAGE {
        Ok(())
    } else {
        Err(Violation::BadHandle(handle as usize).into())
    }
}

/// Open an image. `None` means the running image.
pub fn open_image(path: Option<&CStr>, _flags: DlFlags) -> Result<'_, *mut c_void> {
    match path {
        None => Ok(MAIN_IMAGE),
        Some(path) => Err(Violation::ForeignImage(path).into()),
    }
}

/// Resolve `name` in the image behind `handle`.
pub fn resolve<'a>(handle: *mut c_void, name: &'a CStr) -> Result<'a, *const c_void> {
    check_handle(handle)?;
    symbols::find(name)
        .map(|entry| entry.address())
        .ok_or(Violation::UnknownSymbol(name).into())
}

/// Release a handle. The running image is never unloaded.
pub fn close_image<'a>(handle: *mut c_void) -> Result<'a, c_int> {
    check_handle(handle)?;
    Ok(0)
}

/// Find the image and symbol containing `addr`.
///
/// Nothing records symbol extents for the kernel image yet, so every
/// address is reported as not found.
pub fn describe_address(_addr: *const c_void, info: &mut DlInfo) -> c_int {
    *info = DlInfo::empty();
    0
}

/// # Safety
///
/// `filename` must be null or point to a NUL-terminated string.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn dlopen(filename: *const c_char, flag: c_int) -> *mut c_void {
    let path = if filename.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(filename) })
    };
    let flags = DlFlags::from_bits_retain(flag);
    match path {
        Some(p) => trace_call!("dlopen({}, {:?})", p.escaped(), flags),
        None => trace_call!("dlopen(NULL, {:?})", flags),
    }

    open_image(path, flags).unwrap_or_else(|e| trap::raise(e, &"dlopen"))
}

/// # Safety
///
/// `symbol` must point to a NUL-terminated string.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    let name = unsafe { CStr::from_ptr(symbol) };
    let addr = resolve(handle, name).unwrap_or_else(|e| trap::raise(e, &"dlsym"));
    trace_call!("dlsym({:p}, \"{}\")={:p}", handle, name.escaped(), addr);
    addr.cast_mut()
}

#[cfg_attr(not(test), no_mangle)]
pub extern "C" fn dlclose(handle: *mut c_void) -> c_int {
    trace_call!("dlclose({:p})", handle);
    close_image(handle).unwrap_or_else(|e| trap::raise(e, &"dlclose"))
}

/// # Safety
///
/// `info` must point to a writable `Dl_info`.
#[cfg_attr(not(test), no_mangle)]
pub unsafe extern "C" fn dladdr(addr: *const c_void, info: *mut DlInfo) -> c_int {
    log::warn!("dladdr() required for {:p}", addr);
    // `info` is declared nonnull in <dlfcn.h>.
    describe_address(addr, unsafe { &mut *info })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShimError;
    use crate::symbols::CONFORMANCES_START;

    fn marker() -> *const c_void {
        ptr::addr_of!(crate::symbols::swift2_protocol_conformances_start).cast()
    }

    #[test]
    fn test_open_self_ignores_flags() {
        for bits in [0, 1, 2, 0x102, 0x1000, -1, c_int::MIN, c_int::MAX] {
            let flags = DlFlags::from_bits_retain(bits);
            assert_eq!(open_image(None, flags), Ok(MAIN_IMAGE));
        }
    }

    #[test]
    fn test_open_named_image_is_violation() {
        assert_eq!(
            open_image(Some(c"libicuuc.so.52"), DlFlags::NOW),
            Err(ShimError::ContractViolation(Violation::ForeignImage(
                c"libicuuc.so.52"
            )))
        );
        // An empty path still names something other than NULL.
        assert!(open_image(Some(c""), DlFlags::LAZY).is_err());
    }

    #[test]
    fn test_resolve_conformances_start() {
        assert_eq!(resolve(MAIN_IMAGE, CONFORMANCES_START), Ok(marker()));
    }

    #[test]
    fn test_resolve_unknown_symbol() {
        assert_eq!(
            resolve(MAIN_IMAGE, c"swift_retain"),
            Err(ShimError::ContractViolation(Violation::UnknownSymbol(
                c"swift_retain"
            )))
        );
    }

    #[test]
    fn test_resolve_checks_handle_first() {
        for handle in [ptr::null_mut(), 2 as *mut c_void, usize::MAX as *mut c_void] {
            assert_eq!(
                resolve(handle, CONFORMANCES_START),
                Err(ShimError::ContractViolation(Violation::BadHandle(
                    handle as usize
                )))
            );
        }
    }

    #[test]
    fn test_close_image() {
        assert_eq!(close_image(MAIN_IMAGE), Ok(0));
        assert_eq!(
            close_image(ptr::null_mut()),
            Err(ShimError::ContractViolation(Violation::BadHandle(0)))
        );
    }

    #[test]
    fn test_describe_address_not_found() {
        let mut info = DlInfo {
            dli_fname: c"kernel.elf".as_ptr(),
            dli_fbase: 0x10_0000 as *mut c_void,
            dli_sname: c"main".as_ptr(),
            dli_saddr: 0x10_1000 as *mut c_void,
        };
        for addr in [ptr::null(), marker(), test_describe_address_not_found as *const c_void] {
            assert_eq!(describe_address(addr, &mut info), 0);
            assert!(info.dli_fname.is_null());
            assert!(info.dli_fbase.is_null());
            assert!(info.dli_sname.is_null());
            assert!(info.dli_saddr.is_null());
        }
    }

    #[test]
    fn test_c_entry_points_happy_path() {
        let handle = unsafe { dlopen(ptr::null(), 0x102) };
        assert_eq!(handle, MAIN_IMAGE);

        let addr = unsafe { dlsym(handle, CONFORMANCES_START.as_ptr()) };
        assert_eq!(addr.cast_const(), marker());

        assert_eq!(dlclose(handle), 0);

        let mut info = DlInfo::empty();
        assert_eq!(unsafe { dladdr(addr, &mut info) }, 0);
        assert!(info.dli_fname.is_null());
    }

    #[test]
    fn test_flags_keep_unknown_bits() {
        let flags = DlFlags::from_bits_retain(0x102 | 0x8000);
        assert!(flags.contains(DlFlags::NOW | DlFlags::GLOBAL));
        assert_eq!(flags.bits(), 0x8102);
    }
}
