//! Uncaught panic interception.

use std::{
    cell::Cell,
    panic::{AssertUnwindSafe, PanicHookInfo, catch_unwind, set_hook, take_hook},
    thread::Result as ThreadResult,
};

use crate::error::{
    normalize::{UNKNOWN_ERROR_MESSAGE, panic_message},
    operational::ErrorReporter,
};

thread_local! {
    /// Set while a boundary builds its subtree under `catch_subtree_panic`.
    static CAPTURING_SUBTREE: Cell<bool> = const { Cell::new(false) };
}

/// Formats an uncaught failure as `"{message}\nAt: {source}:{line}:{column}"`.
pub fn format_uncaught(message: &str, source: &str, line: u32, column: u32) -> String {
    format!("{message}\nAt: {source}:{line}:{column}")
}

/// Describes a panic for the overlay.
pub fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let message = panic_message(info.payload()).unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
    match info.location() {
        Some(location) => format_uncaught(
            &message,
            location.file(),
            location.line(),
            location.column(),
        ),
        None => format_uncaught(&message, "<unknown>", 0, 0),
    }
}

/// Wraps the current panic hook so panics are forwarded to the overlay.
///
/// The previously installed hook (the default one prints to stderr) still
/// runs after the forward.
pub(crate) fn install(reporter: ErrorReporter) {
    let previous = take_hook();
    set_hook(Box::new(move |info| {
        if !CAPTURING_SUBTREE.with(Cell::get) {
            reporter.report(describe_panic(info));
        }
        previous(info);
    }));
}

/// Runs `build` and catches a panic raised by it.
///
/// Panics caught here belong to the calling boundary: the panic hook still
/// delegates to the previous hook but does not forward them to the overlay.
pub fn catch_subtree_panic<R>(build: impl FnOnce() -> R) -> ThreadResult<R> {
    let was_capturing = CAPTURING_SUBTREE.with(|flag| flag.replace(true));
    let result = catch_unwind(AssertUnwindSafe(build));
    CAPTURING_SUBTREE.with(|flag| flag.set(was_capturing));
    result
}

#[cfg(test)]
mod tests {
    use crate::{
        error::normalize::ErrorNormalizer,
        intercept::panic_hook::{catch_subtree_panic, format_uncaught},
    };

    #[test]
    fn test_format_uncaught() {
        assert_eq!(
            format_uncaught("index out of bounds", "src/ui/list.rs", 42, 17),
            "index out of bounds\nAt: src/ui/list.rs:42:17"
        );
    }

    #[test]
    fn test_catch_subtree_panic_returns_value() {
        assert_eq!(catch_subtree_panic(|| 7).unwrap(), 7);
    }

    #[test]
    fn test_catch_subtree_panic_captures_payload() {
        let payload = catch_subtree_panic(|| -> u8 { panic!("widget factory failed") }).unwrap_err();
        assert_eq!(
            ErrorNormalizer::from_panic_payload(payload.as_ref()).message,
            "widget factory failed"
        );
    }
}
