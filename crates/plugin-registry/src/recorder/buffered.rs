//! Bounded in-memory [`ErrorRecorder`].

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{ErrorCode, ErrorRecorder, RefCount};

/// Default number of errors retained before overflowing.
const DEFAULT_CAPACITY: usize = 256;

/// Recorder that keeps the first `capacity` errors in memory.
///
/// # Example
///
/// ```
/// use plugin_registry::{BufferedErrorRecorder, ErrorCode, ErrorRecorder};
///
/// let recorder = BufferedErrorRecorder::with_capacity(1);
/// recorder.report_error(ErrorCode::InvalidArgument, "duplicate creator");
/// recorder.report_error(ErrorCode::InvalidArgument, "another one");
///
/// assert_eq!(recorder.num_errors(), 1);
/// assert!(recorder.has_overflowed());
/// ```
#[derive(Debug)]
pub struct BufferedErrorRecorder {
    errors: Mutex<Vec<(ErrorCode, String)>>,
    capacity: usize,
    overflowed: AtomicBool,
    references: AtomicI32,
}

impl BufferedErrorRecorder {
    /// Creates a recorder with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a recorder that retains at most `capacity` errors.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            errors: Mutex::new(Vec::new()),
            capacity,
            overflowed: AtomicBool::new(false),
            references: AtomicI32::new(0),
        }
    }

    /// Returns the current reference count.
    #[must_use]
    pub fn ref_count(&self) -> RefCount {
        self.references.load(Ordering::Acquire)
    }

    /// Returns a copy of every retained error in report order.
    #[must_use]
    pub fn errors(&self) -> Vec<(ErrorCode, String)> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for BufferedErrorRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRecorder for BufferedErrorRecorder {
    fn report_error(&self, code: ErrorCode, description: &str) -> bool {
        let mut errors = self.errors.lock().unwrap_or_else(PoisonError::into_inner);
        if errors.len() < self.capacity {
            errors.push((code, description.to_owned()));
        } else {
            self.overflowed.store(true, Ordering::Release);
        }
        false
    }

    fn num_errors(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn error_code(&self, index: usize) -> Option<ErrorCode> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map(|(code, _)| *code)
    }

    fn error_desc(&self, index: usize) -> Option<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map(|(_, description)| description.clone())
    }

    fn has_overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.overflowed.store(false, Ordering::Release);
    }

    fn inc_ref_count(&self) -> RefCount {
        self.references.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn dec_ref_count(&self) -> RefCount {
        self.references.fetch_sub(1, Ordering::AcqRel) - 1
    }
}
