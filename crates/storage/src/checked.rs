//! Outcome slot that must be inspected before it is overwritten.
//!
//! Store operations that report through a shared slot (environment open,
//! commit, abort) hand back a `CheckedResult`. Reading the outcome marks it
//! checked. Overwriting an unread failure is a caller bug and panics.

use core::cell::Cell;
use core::fmt;
use sqlkv_core::{Error, Result};
use tracing::warn;

/// Panic message raised when an unread failure is overwritten.
pub const UNCHECKED_ERROR_DISCARDED: &str = "unchecked error discarded";

/// An operation outcome plus a flag recording whether it has been read.
#[must_use = "a failure must be inspected before it is dropped"]
pub struct CheckedResult {
    outcome: Result<()>,
    checked: Cell<bool>,
}

impl CheckedResult {
    /// Creates a successful outcome.
    pub fn ok() -> Self {
        Self::new(Ok(()))
    }

    /// Wraps an outcome, unchecked.
    pub fn new(outcome: Result<()>) -> Self {
        Self {
            outcome,
            checked: Cell::new(false),
        }
    }

    /// Replaces the outcome.
    ///
    /// # Panics
    ///
    /// Panics if the current outcome is a failure nobody has read.
    pub fn set(&mut self, outcome: Result<()>) {
        if let Err(previous) = &self.outcome {
            if !self.checked.get() {
                panic!("{}: {}", UNCHECKED_ERROR_DISCARDED, previous);
            }
        }
        self.outcome = outcome;
        self.checked.set(false);
    }

    /// Returns the failure, if any, and marks the outcome checked.
    pub fn rc(&self) -> Option<&Error> {
        self.checked.set(true);
        self.outcome.as_ref().err()
    }

    /// Returns true on success and marks the outcome checked.
    pub fn is_ok(&self) -> bool {
        self.rc().is_none()
    }

    /// Returns true on failure and marks the outcome checked.
    pub fn is_err(&self) -> bool {
        self.rc().is_some()
    }

    /// Returns a readable message and marks the outcome checked.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns whether the outcome has been read since it was last set.
    #[inline]
    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Consumes the slot into a plain result for `?` propagation.
    pub fn into_result(mut self) -> Result<()> {
        self.checked.set(true);
        core::mem::replace(&mut self.outcome, Ok(()))
    }
}

impl Default for CheckedResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<Result<()>> for CheckedResult {
    fn from(outcome: Result<()>) -> Self {
        Self::new(outcome)
    }
}

impl fmt::Display for CheckedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rc() {
            None => write!(f, "success"),
            Some(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Debug for CheckedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedResult")
            .field("outcome", &self.outcome)
            .field("checked", &self.checked.get())
            .finish()
    }
}

impl Drop for CheckedResult {
    fn drop(&mut self) {
        if let Err(err) = &self.outcome {
            if !self.checked.get() {
                warn!(error = %err, "dropping unchecked failure");
            }
        }
    }
}
