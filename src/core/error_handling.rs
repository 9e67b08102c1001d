//! Generic error handling utilities
//!
//! Lets startup and the collector log failures the same way whether they came
//! from configuration, the SAST API, or the metrics endpoint.

/// Errors that can tell an operator-fixable problem from an internal one
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the operator can fix this (bad configuration, rejected
    /// credentials), false for transport and internal failures
    fn is_user_actionable(&self) -> bool;

    /// Operator-facing message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the detail level appropriate to its kind
///
/// User-actionable errors log their own message; everything else logs the
/// operation context, with full detail at debug level.
///
/// # Examples
/// ```rust,no_run
/// # use sastwatch::core::error_handling::log_error_with_context;
/// # use sastwatch::sast::api::SastError;
/// let err = SastError::Unauthenticated;
/// log_error_with_context(&err, "SAST logon");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
