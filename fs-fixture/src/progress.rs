//! Coarse progress reporting for long writes.
//!
//! Progress is a side channel: observers cannot fail the operation they
//! observe, and dropping every notification is always valid.

/// Minimum advance, in percentage points, between two notifications.
pub const PROGRESS_STEP: u8 = 5;

pub trait ProgressObserver {
    fn on_progress(&mut self, percent: u8, bytes_done: u64, total: u64);
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8, u64, u64),
{
    fn on_progress(&mut self, percent: u8, bytes_done: u64, total: u64) {
        self(percent, bytes_done, total)
    }
}

/// Reports progress through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, percent: u8, _bytes_done: u64, _total: u64) {
        log::info!("Progress: {}% complete", percent);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8, _bytes_done: u64, _total: u64) {}
}

/// Decides when a notification is due.
///
/// The first advance always reports; after that a report is due only once
/// the floored percentage has grown by at least [`PROGRESS_STEP`].
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: u64,
    last_reported: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            last_reported: None,
        }
    }

    /// Returns the percentage to report, if any, after `done` bytes.
    pub fn advance(&mut self, done: u64) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let done = done.min(self.total);
        let percent = (done as u128 * 100 / self.total as u128) as u8;
        match self.last_reported {
            Some(last) if percent < last + PROGRESS_STEP => None,
            _ => {
                self.last_reported = Some(percent);
                Some(percent)
            }
        }
    }
}
