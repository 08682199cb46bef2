use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use data_error::{FixtureError, IoContext, IoOp, Result};

use crate::synthesizer::FileSynthesizer;
use crate::{
    DEFAULT_FILE_NAME, DEFAULT_SCRATCH_BUFFER_SIZE, DEFAULT_TARGET_SIZE,
};

/// Where the fixture lives, how big it is and how it is written.
///
/// Stored as JSON, e.g.
/// ```json
/// { "path": "testData.bin", "target_size": 1394606080, "scratch_buffer_size": 67108864 }
/// ```
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub path: PathBuf,
    pub target_size: u64,
    pub scratch_buffer_size: usize,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_NAME),
            target_size: DEFAULT_TARGET_SIZE,
            scratch_buffer_size: DEFAULT_SCRATCH_BUFFER_SIZE,
        }
    }
}

impl FixtureConfig {
    pub fn new(path: impl Into<PathBuf>, target_size: u64) -> Self {
        Self {
            path: path.into(),
            target_size,
            ..Self::default()
        }
    }

    pub fn with_scratch_buffer_size(
        mut self,
        scratch_buffer_size: usize,
    ) -> Self {
        self.scratch_buffer_size = scratch_buffer_size;
        self
    }

    /// Read a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_path(IoOp::Open, path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        log::debug!(
            "Loaded fixture config from {}: {:?}",
            path.display(),
            config
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scratch_buffer_size == 0 {
            return Err(FixtureError::InvalidConfig(
                "scratch_buffer_size must be positive".to_owned(),
            ));
        }
        if self.path.as_os_str().is_empty() {
            return Err(FixtureError::InvalidConfig(
                "path must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn synthesizer(&self) -> Result<FileSynthesizer> {
        FileSynthesizer::new(self.scratch_buffer_size)
    }
}
