//! Console logging
//!
//! On wasm32 messages go to the browser console through `web_sys::console`.
//! Native builds (unit tests, tooling) compile the macros down to nothing,
//! but the format arguments are still type-checked.

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub fn __log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub fn __warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

/// Informational console message.
#[macro_export]
macro_rules! fx_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            $crate::core::utils::console::__log(&format!($($arg)*));
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            if false {
                let _ = format!($($arg)*);
            }
        }
    }};
}

/// Diagnostic warning (backend fallback, failed effect setup, pool pressure).
#[macro_export]
macro_rules! fx_warn {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            $crate::core::utils::console::__warn(&format!($($arg)*));
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            if false {
                let _ = format!($($arg)*);
            }
        }
    }};
}
