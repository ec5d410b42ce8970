//! Fail-fast guards
//!
//! Every validation step in the crate is expressed as a guard that returns
//! early with a labelled error when its precondition does not hold.

use crate::error::{Error, Result};

/// Return `Err(AssertionFailed)` when `condition` is false
///
/// The error message reads `Assertion failed: {message}`.
///
/// # Example
/// ```
/// use teleos_gateway::invariant;
///
/// assert!(invariant(1 + 1 == 2, "math is broken").is_ok());
/// assert_eq!(
///     invariant(false, "some error").unwrap_err().to_string(),
///     "Assertion failed: some error"
/// );
/// ```
pub fn invariant(condition: bool, message: impl Into<String>) -> Result<()> {
    ensure(condition, || Error::AssertionFailed(Some(message.into())))
}

/// Return the error built by `error` when `condition` is false
pub(crate) fn ensure(condition: bool, error: impl FnOnce() -> Error) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(error())
    }
}
