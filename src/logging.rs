// Browser console on wasm32. Native builds (tests, tooling) have no console
// import to call, so informational lines are dropped and warnings go to stderr.

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(_message: &str) {}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    eprintln!("warning: {}", message);
}

#[macro_export]
macro_rules! console_log {
    ($fmt:expr $(, $args:expr)* $(,)?) => {
        $crate::logging::log(&format!($fmt, $($args),*))
    }
}

#[macro_export]
macro_rules! console_warn {
    ($fmt:expr $(, $args:expr)* $(,)?) => {
        $crate::logging::warn(&format!($fmt, $($args),*))
    }
}
