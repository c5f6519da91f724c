//! Symbols `dlsym` can resolve.
//!
//! The runtime asks for exactly one address at startup: the start of the
//! protocol conformance records the compiler emits into their own
//! section. The kernel's linker script defines the marker.

use core::ffi::{c_void, CStr};
use core::ptr;

#[cfg(not(test))]
extern "C" {
    static swift2_protocol_conformances_start: u8;
}

// Stand-in for the linker script marker in host builds.
#[cfg(test)]
#[allow(non_upper_case_globals)]
pub(crate) static swift2_protocol_conformances_start: u8 = 0;

/// Name of the protocol conformance start marker.
pub const CONFORMANCES_START: &CStr = c".swift2_protocol_conformances_start";

/// A fixed name-to-address association.
pub struct SymbolEntry {
    pub name: &'static CStr,
    address: fn() -> *const c_void,
}

impl SymbolEntry {
    /// Address the symbol resolves to.
    pub fn address(&self) -> *const c_void {
        (self.address)()
    }
}

fn conformances_start() -> *const c_void {
    // SAFETY: only the address of the marker is taken, never its contents.
    unsafe { ptr::addr_of!(swift2_protocol_conformances_start) }.cast()
}

/// Every symbol the image exports to `dlsym`.
pub static SYMBOLS: &[SymbolEntry] = &[SymbolEntry {
    name: CONFORMANCES_START,
    address: conformances_start,
}];

/// Exact-match lookup.
pub fn find(name: &CStr) -> Option<&'static SymbolEntry> {
    SYMBOLS.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformances_marker_resolves() {
        let entry = find(CONFORMANCES_START).unwrap();
        assert_eq!(
            entry.address(),
            ptr::addr_of!(swift2_protocol_conformances_start).cast()
        );
    }

    #[test]
    fn test_no_partial_matches() {
        assert!(find(c"swift2_protocol_conformances_start").is_none());
        assert!(find(c".swift2_protocol_conformances").is_none());
        assert!(find(c".swift2_protocol_conformances_start_").is_none());
        assert!(find(c"").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in SYMBOLS.iter().enumerate() {
            for b in &SYMBOLS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
