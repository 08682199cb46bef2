use std::io::{stdout, Write};

use fs_fixture::ProgressObserver;

/// Rewrites a single `Progress: N% complete` line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    printed: bool,
}

impl ConsoleProgress {
    /// Moves past the progress line if anything was printed.
    pub fn finish(&mut self) {
        if self.printed {
            println!();
            self.printed = false;
        }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, percent: u8, _bytes_done: u64, _total: u64) {
        let mut out = stdout().lock();
        // progress is best effort
        let _ = write!(out, "Progress: {}% complete\r", percent);
        let _ = out.flush();
        self.printed = true;
    }
}
