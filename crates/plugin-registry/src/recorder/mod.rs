//! Error recorder capability and the registry's link to it.
//!
//! The recorder is an external diagnostic sink. The registry never owns it:
//! [`RecorderLink`] holds at most one recorder and signals every change of
//! ownership through [`ErrorRecorder::inc_ref_count`] and
//! [`ErrorRecorder::dec_ref_count`]. There is no default recorder, so
//! diagnostics are dropped until one is set.

use std::sync::{Arc, PoisonError, RwLock};

mod buffered;

pub use self::buffered::BufferedErrorRecorder;

/// Reference count reported by the acquire/release protocol.
pub type RefCount = i32;

/// Classification of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Execution completed without error.
    Success,
    /// An error that does not fit any other category.
    UnspecifiedError,
    /// A non-recoverable internal error.
    InternalError,
    /// An argument passed to the registry was invalid.
    InvalidArgument,
    /// A configuration value was invalid.
    InvalidConfig,
    /// An allocation failed.
    FailedAllocation,
    /// A module or creator failed to initialise.
    FailedInitialization,
    /// Execution failed.
    FailedExecution,
    /// A computation produced an invalid result.
    FailedComputation,
    /// The registry was in a state that forbids the operation.
    InvalidState,
    /// The requested feature is not supported.
    UnsupportedState,
}

impl ErrorCode {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UnspecifiedError => "unspecified_error",
            Self::InternalError => "internal_error",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidConfig => "invalid_config",
            Self::FailedAllocation => "failed_allocation",
            Self::FailedInitialization => "failed_initialization",
            Self::FailedExecution => "failed_execution",
            Self::FailedComputation => "failed_computation",
            Self::InvalidState => "invalid_state",
            Self::UnsupportedState => "unsupported_state",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External sink for registry diagnostics.
///
/// Implementations must be safe to call from any thread. The registry calls
/// [`ErrorRecorder::inc_ref_count`] when it starts referencing a recorder and
/// [`ErrorRecorder::dec_ref_count`] exactly once when it stops.
pub trait ErrorRecorder: Send + Sync {
    /// Records an error; returns `true` if the recorder considers it fatal.
    fn report_error(&self, code: ErrorCode, description: &str) -> bool;

    /// Returns the number of recorded errors.
    fn num_errors(&self) -> usize;

    /// Returns the code of the error at `index`, if recorded.
    fn error_code(&self, index: usize) -> Option<ErrorCode>;

    /// Returns the description of the error at `index`, if recorded.
    fn error_desc(&self, index: usize) -> Option<String>;

    /// Returns `true` if errors were dropped because storage was full.
    fn has_overflowed(&self) -> bool;

    /// Discards every recorded error.
    fn clear(&self);

    /// Signals that one more holder references this recorder.
    fn inc_ref_count(&self) -> RefCount;

    /// Signals that one holder released this recorder.
    fn dec_ref_count(&self) -> RefCount;
}

/// Single swappable, non-owning slot for an [`ErrorRecorder`].
#[derive(Default)]
pub struct RecorderLink {
    slot: RwLock<Option<Arc<dyn ErrorRecorder>>>,
}

impl RecorderLink {
    /// Creates an empty link.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held recorder.
    ///
    /// A new recorder is acquired before the previous one is released.
    /// Setting the recorder that is already held leaves both the slot and the
    /// reference counts untouched.
    pub fn set(&self, recorder: Option<Arc<dyn ErrorRecorder>>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let (Some(current), Some(incoming)) = (slot.as_ref(), recorder.as_ref())
            && same_recorder(current, incoming)
        {
            return;
        }
        if let Some(incoming) = recorder.as_ref() {
            incoming.inc_ref_count();
        }
        let previous = std::mem::replace(&mut *slot, recorder);
        if let Some(released) = previous {
            released.dec_ref_count();
        }
    }

    /// Returns the held recorder, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<dyn ErrorRecorder>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forwards a diagnostic to the held recorder; dropped when none is set.
    pub fn report(&self, code: ErrorCode, description: &str) {
        if let Some(recorder) = self.get() {
            recorder.report_error(code, description);
        }
    }
}

impl Drop for RecorderLink {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(released) = slot.take() {
            released.dec_ref_count();
        }
    }
}

impl std::fmt::Debug for RecorderLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderLink")
            .field("set", &self.get().is_some())
            .finish()
    }
}

fn same_recorder(left: &Arc<dyn ErrorRecorder>, right: &Arc<dyn ErrorRecorder>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}
