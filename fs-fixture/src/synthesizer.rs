use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use data_error::{FixtureError, IoContext, IoOp, Result};

use crate::pattern::{fill_pattern, PATTERN_PERIOD};
use crate::progress::{LogProgress, ProgressObserver, ProgressTracker};

/// What [`FileSynthesizer::synthesize`] had to do to satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// A file of the requested size was already present and left untouched.
    AlreadySatisfied,
    /// No file existed at the path.
    Created,
    /// A file existed with a different size and has been replaced.
    Regenerated { previous_size: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisReport {
    pub outcome: SynthesisOutcome,
    pub bytes_written: u64,
    pub writes: u64,
}

/// Writes pattern files of an exact size through one reusable scratch buffer.
#[derive(Debug, Clone, Copy)]
pub struct FileSynthesizer {
    scratch_buffer_size: usize,
}

impl FileSynthesizer {
    pub fn new(scratch_buffer_size: usize) -> Result<Self> {
        if scratch_buffer_size == 0 {
            return Err(FixtureError::InvalidConfig(
                "scratch buffer size must be positive".to_owned(),
            ));
        }
        Ok(Self {
            scratch_buffer_size,
        })
    }

    pub fn scratch_buffer_size(&self) -> usize {
        self.scratch_buffer_size
    }

    /// Make sure `path` holds exactly `target_size` pattern bytes,
    /// reporting progress through the log.
    pub fn synthesize<P: AsRef<Path>>(
        &self,
        path: P,
        target_size: u64,
    ) -> Result<SynthesisReport> {
        self.synthesize_with(path, target_size, &mut LogProgress)
    }

    /// Same as [`synthesize`](Self::synthesize) with a custom observer.
    ///
    /// On an I/O failure the partially written file is left behind;
    /// deleting or retrying is up to the caller.
    pub fn synthesize_with<P: AsRef<Path>>(
        &self,
        path: P,
        target_size: u64,
        observer: &mut dyn ProgressObserver,
    ) -> Result<SynthesisReport> {
        let path = path.as_ref();

        let outcome = match fs::metadata(path) {
            Ok(meta) if meta.is_file() && meta.len() == target_size => {
                log::info!(
                    "Using existing fixture {} ({} bytes)",
                    path.display(),
                    target_size
                );
                return Ok(SynthesisReport {
                    outcome: SynthesisOutcome::AlreadySatisfied,
                    bytes_written: 0,
                    writes: 0,
                });
            }
            Ok(meta) => {
                log::info!(
                    "Existing fixture {} has incorrect size ({} bytes instead of {}). Regenerating...",
                    path.display(),
                    meta.len(),
                    target_size
                );
                SynthesisOutcome::Regenerated {
                    previous_size: meta.len(),
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "Generating {} fixture at {}...",
                    crate::format_size(target_size),
                    path.display()
                );
                SynthesisOutcome::Created
            }
            Err(e) => return Err(FixtureError::io(IoOp::Stat, path, e)),
        };

        let scratch_len = self.scratch_len(target_size)?;
        let mut file = File::create(path).with_path(IoOp::Create, path)?;

        let mut scratch = vec![0u8; scratch_len];
        fill_pattern(&mut scratch, 0);

        let mut tracker = ProgressTracker::new(target_size);
        let mut bytes_written: u64 = 0;
        let mut writes: u64 = 0;
        while bytes_written < target_size {
            let write_size =
                (target_size - bytes_written).min(scratch.len() as u64) as usize;
            file.write_all(&scratch[..write_size])
                .with_path(IoOp::Write, path)?;
            bytes_written += write_size as u64;
            writes += 1;

            if let Some(percent) = tracker.advance(bytes_written) {
                observer.on_progress(percent, bytes_written, target_size);
            }
        }
        file.flush().with_path(IoOp::Flush, path)?;

        log::info!(
            "Fixture {} complete: {} bytes in {} writes",
            path.display(),
            bytes_written,
            writes
        );
        Ok(SynthesisReport {
            outcome,
            bytes_written,
            writes,
        })
    }

    /// Length of the scratch buffer used for a file of `target_size` bytes.
    ///
    /// Every write must start on a pattern period boundary, so a scratch
    /// buffer that does not cover the whole file is rounded down to a
    /// multiple of the period.
    fn scratch_len(&self, target_size: u64) -> Result<usize> {
        let requested = self.scratch_buffer_size as u64;
        if requested >= target_size {
            return Ok(target_size as usize);
        }
        if requested < PATTERN_PERIOD {
            return Err(FixtureError::InvalidConfig(format!(
                "scratch buffer of {} bytes is shorter than the {}-byte pattern period and cannot cover {} bytes",
                requested, PATTERN_PERIOD, target_size
            )));
        }
        Ok((requested - requested % PATTERN_PERIOD) as usize)
    }
}

/// Make sure `path` holds exactly `target_size` pattern bytes.
pub fn synthesize<P: AsRef<Path>>(
    path: P,
    target_size: u64,
    scratch_buffer_size: usize,
) -> Result<SynthesisReport> {
    FileSynthesizer::new(scratch_buffer_size)?.synthesize(path, target_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialize;
    use crate::pattern::first_mismatch;
    use crate::progress::{NoProgress, PROGRESS_STEP};
    use rstest::rstest;
    use tempdir::TempDir;

    const SCRATCH: usize = 1024;

    fn assert_fixture(path: &Path, size: u64) {
        let content = fs::read(path).unwrap();
        assert_eq!(content.len() as u64, size);
        assert_eq!(first_mismatch(0, &content), None);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(255)]
    #[case(256)]
    #[case(257)]
    #[case(SCRATCH as u64 - 1)]
    #[case(SCRATCH as u64)]
    #[case(SCRATCH as u64 + 1)]
    #[case(10 * SCRATCH as u64 + 17)]
    fn exact_size_and_pattern(#[case] size: u64) {
        initialize();
        let dir = TempDir::new("exact_size").unwrap();
        let path = dir.path().join("fixture.bin");

        let report = synthesize(&path, size, SCRATCH).unwrap();
        assert_eq!(report.outcome, SynthesisOutcome::Created);
        assert_eq!(report.bytes_written, size);
        assert_eq!(report.writes, size.div_ceil(SCRATCH as u64));
        assert_fixture(&path, size);
    }

    #[test]
    fn second_call_is_a_no_op() {
        initialize();
        let dir = TempDir::new("idempotent").unwrap();
        let path = dir.path().join("fixture.bin");
        let size = 3 * SCRATCH as u64 + 5;

        synthesize(&path, size, SCRATCH).unwrap();
        let first = fs::read(&path).unwrap();

        let report = synthesize(&path, size, SCRATCH).unwrap();
        assert_eq!(report.outcome, SynthesisOutcome::AlreadySatisfied);
        assert_eq!(report.bytes_written, 0);
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[rstest]
    #[case(4000, 100)]
    #[case(100, 4000)]
    fn different_size_replaces_the_file(
        #[case] before: u64,
        #[case] after: u64,
    ) {
        initialize();
        let dir = TempDir::new("regenerate").unwrap();
        let path = dir.path().join("fixture.bin");

        synthesize(&path, before, SCRATCH).unwrap();
        let report = synthesize(&path, after, SCRATCH).unwrap();
        assert_eq!(
            report.outcome,
            SynthesisOutcome::Regenerated {
                previous_size: before
            }
        );
        assert_fixture(&path, after);
    }

    #[test]
    fn foreign_content_of_wrong_size_is_replaced() {
        initialize();
        let dir = TempDir::new("foreign").unwrap();
        let path = dir.path().join("fixture.bin");
        fs::write(&path, b"not a fixture").unwrap();

        synthesize(&path, 600, SCRATCH).unwrap();
        assert_fixture(&path, 600);
    }

    #[test]
    fn unaligned_scratch_keeps_the_pattern() {
        initialize();
        let dir = TempDir::new("unaligned").unwrap();
        let path = dir.path().join("fixture.bin");

        let report = synthesize(&path, 5000, 1000).unwrap();
        // 1000 rounds down to 768
        assert_eq!(report.writes, 7);
        assert_fixture(&path, 5000);
    }

    #[test]
    fn tiny_scratch_is_fine_when_it_covers_the_file() {
        initialize();
        let dir = TempDir::new("tiny").unwrap();
        let path = dir.path().join("fixture.bin");

        synthesize(&path, 100, 100).unwrap();
        assert_fixture(&path, 100);

        let err = synthesize(&path, 1000, 100).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidConfig(_)));
    }

    #[test]
    fn existing_file_ignores_scratch_size() {
        initialize();
        let dir = TempDir::new("existing_tiny").unwrap();
        let path = dir.path().join("fixture.bin");

        synthesize(&path, 1000, 4096).unwrap();
        let first = fs::read(&path).unwrap();

        let report = synthesize(&path, 1000, 100).unwrap();
        assert_eq!(report.outcome, SynthesisOutcome::AlreadySatisfied);
        assert_eq!(report.writes, 0);
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn zero_scratch_is_rejected() {
        let err = FileSynthesizer::new(0).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidConfig(_)));
    }

    #[test]
    fn unwritable_path_reports_create_failure() {
        initialize();
        let dir = TempDir::new("unwritable").unwrap();
        let path = dir.path().join("missing").join("fixture.bin");

        let err = synthesize(&path, 10, SCRATCH).unwrap_err();
        match err {
            FixtureError::Io { op, path: failed, .. } => {
                assert_eq!(op, IoOp::Create);
                assert_eq!(failed, path);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn path_under_a_regular_file_reports_stat_failure() {
        initialize();
        let dir = TempDir::new("not_a_dir").unwrap();
        let plain = dir.path().join("plain");
        fs::write(&plain, b"regular file").unwrap();
        let path = plain.join("fixture.bin");

        match synthesize(&path, 10, SCRATCH).unwrap_err() {
            FixtureError::Io { op, path: failed, source } => {
                assert_eq!(op, IoOp::Stat);
                assert_eq!(failed, path);
                assert_ne!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fs::read(&plain).unwrap(), b"regular file");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_failure_leaves_the_target_in_place() {
        initialize();
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = TempDir::new("write_failure").unwrap();
        let path = dir.path().join("fixture.bin");
        std::os::unix::fs::symlink(full, &path).unwrap();

        match synthesize(&path, 10 * SCRATCH as u64, SCRATCH).unwrap_err() {
            FixtureError::Io { op, path: failed, .. } => {
                assert!(op == IoOp::Write || op == IoOp::Flush, "{}", op);
                assert_eq!(failed, path);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(fs::symlink_metadata(&path).unwrap().file_type().is_symlink());
    }

    #[test]
    fn progress_is_coarse_and_monotonic() {
        initialize();
        let dir = TempDir::new("progress").unwrap();
        let path = dir.path().join("fixture.bin");
        let synthesizer = FileSynthesizer::new(SCRATCH).unwrap();

        let mut seen: Vec<(u8, u64)> = Vec::new();
        let mut observer =
            |percent: u8, done: u64, _total: u64| seen.push((percent, done));
        synthesizer
            .synthesize_with(&path, 100 * SCRATCH as u64, &mut observer)
            .unwrap();

        assert_eq!(seen.first(), Some(&(1, SCRATCH as u64)));
        for pair in seen.windows(2) {
            assert!(pair[1].0 >= pair[0].0 + PROGRESS_STEP);
            assert!(pair[1].1 > pair[0].1);
        }
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn empty_target_reports_no_progress() {
        initialize();
        let dir = TempDir::new("empty").unwrap();
        let path = dir.path().join("fixture.bin");
        let synthesizer = FileSynthesizer::new(SCRATCH).unwrap();

        let mut calls = 0;
        let mut observer = |_: u8, _: u64, _: u64| calls += 1;
        synthesizer
            .synthesize_with(&path, 0, &mut observer)
            .unwrap();
        assert_eq!(calls, 0);
        assert_fixture(&path, 0);

        let report = synthesizer
            .synthesize_with(&path, 0, &mut NoProgress)
            .unwrap();
        assert_eq!(report.outcome, SynthesisOutcome::AlreadySatisfied);
    }
}
