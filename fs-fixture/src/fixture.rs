use std::path::Path;

use data_error::{FixtureError, Result};

use crate::async_stream::{open_async, AsyncChunkStream};
use crate::chunk_reader::ChunkReader;
use crate::config::FixtureConfig;
use crate::pattern::first_mismatch;
use crate::progress::{LogProgress, ProgressObserver};
use crate::synthesizer::SynthesisReport;

/// A pattern file that is generated on demand and streamed in chunks.
///
/// Nothing touches the disk until [`ensure`](Fixture::ensure) is called,
/// and streaming is refused before that.
#[derive(Debug, Clone)]
pub struct Fixture {
    config: FixtureConfig,
    ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub chunks: u64,
    pub bytes: u64,
}

impl Fixture {
    pub fn new(config: FixtureConfig) -> Self {
        Self {
            config,
            ready: false,
        }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn size(&self) -> u64 {
        self.config.target_size
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Generate the file unless it already has the configured size.
    pub fn ensure(&mut self) -> Result<SynthesisReport> {
        self.ensure_with(&mut LogProgress)
    }

    pub fn ensure_with(
        &mut self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<SynthesisReport> {
        self.config.validate()?;
        let report = self.config.synthesizer()?.synthesize_with(
            &self.config.path,
            self.config.target_size,
            observer,
        )?;
        self.ready = true;
        Ok(report)
    }

    pub fn stream(&self, chunk_size: usize) -> Result<ChunkReader> {
        self.check_ready()?;
        ChunkReader::open(&self.config.path, chunk_size)
    }

    pub async fn stream_async(
        &self,
        chunk_size: usize,
    ) -> Result<AsyncChunkStream> {
        self.check_ready()?;
        open_async(&self.config.path, chunk_size).await
    }

    /// Read the whole file back and check size and content.
    ///
    /// Does not require [`ensure`](Fixture::ensure); a file produced
    /// elsewhere can be checked as well.
    pub fn verify(&self, chunk_size: usize) -> Result<VerifyReport> {
        let reader = ChunkReader::open(&self.config.path, chunk_size)?;
        if reader.total_size() != self.config.target_size {
            return Err(FixtureError::SizeMismatch {
                expected: self.config.target_size,
                actual: reader.total_size(),
            });
        }

        let mut report = VerifyReport {
            chunks: 0,
            bytes: 0,
        };
        for chunk in reader {
            let chunk = chunk?;
            if let Some(m) = first_mismatch(report.bytes, &chunk) {
                return Err(FixtureError::PatternMismatch {
                    offset: m.offset,
                    expected: m.expected,
                    found: m.found,
                });
            }
            report.chunks += 1;
            report.bytes += chunk.len() as u64;
        }

        if report.bytes != self.config.target_size {
            return Err(FixtureError::SizeMismatch {
                expected: self.config.target_size,
                actual: report.bytes,
            });
        }
        log::info!(
            "Verified {}: {} bytes in {} chunks",
            self.config.path.display(),
            report.bytes,
            report.chunks
        );
        Ok(report)
    }

    fn check_ready(&self) -> Result<()> {
        if !self.ready {
            return Err(FixtureError::NotReady(self.config.path.clone()));
        }
        Ok(())
    }
}
