pub mod bindings;
#[cfg(target_os = "macos")]
pub mod kperf;

macro_rules! kpc {
    ($call:ident, $($arg:expr),* $(,)?) => {{
        #[cfg(target_os = "macos")]
        let val = $crate::ffi::kperf::$call($($arg),*);
        #[cfg(not(target_os = "macos"))]
        let val = {
            $(let _ = $arg;)*
            Err($crate::Error::Unsupported)
        };
        val
    }};
}
pub(crate) use kpc;

/// Turns a status code into a result, keeping the raw code on failure.
#[inline]
pub fn check(call: &'static str, code: i32) -> crate::Result<()> {
    match code {
        0 => Ok(()),
        code => Err(crate::Error::Kpc { call, code }),
    }
}
