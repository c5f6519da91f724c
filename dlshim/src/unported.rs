//! Library functions the runtime links against that were never ported.
//!
//! Each symbol exists only so the kernel links; calling one traps with
//! the function's name. Arguments are ignored, which the C calling
//! convention permits.

macro_rules! unported {
    ($($name:ident),* $(,)?) => {
        $(
            mod $name {
                #[track_caller]
                pub(super) fn body() -> ! {
                    $crate::trap::unimplemented(stringify!($name))
                }
            }

            #[cfg_attr(not(test), no_mangle)]
            pub extern "C" fn $name() -> ! {
                $name::body()
            }
        )*

        #[cfg(test)]
        static STUBS: &[(&str, fn() -> !)] = &[$((stringify!($name), $name::body)),*];
    };
}

unported! {
    __getdelim,

    // ICU collation and case mapping
    ucol_closeElements_52,
    ucol_next_52,
    ucol_open_52,
    ucol_openElements_52,
    ucol_setAttribute_52,
    ucol_strcoll_52,
    uiter_setString_52,
    uiter_setUTF8_52,
    u_strToLower_52,
    u_strToUpper_52,
    ucol_strcollIter_52,
}
