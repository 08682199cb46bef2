use std::path::PathBuf;

use clap::Subcommand;
use fs_fixture::{
    FixtureConfig, DEFAULT_FILE_NAME, DEFAULT_SCRATCH_BUFFER_SIZE,
    DEFAULT_TARGET_SIZE,
};

use crate::error::AppError;

mod generate;
mod stream;
mod verify;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create the fixture file unless it already has the right size")]
    Generate(generate::Generate),
    #[command(about = "Stream the fixture in chunks and count them")]
    Stream(stream::Stream),
    #[command(about = "Check the fixture's size and byte pattern")]
    Verify(verify::Verify),
}

/// Options shared by every command that needs to locate the fixture.
#[derive(Clone, Debug, clap::Args)]
pub struct FixtureArgs {
    #[clap(
        long,
        value_parser,
        default_value = DEFAULT_FILE_NAME,
        help = "Path of the fixture file"
    )]
    path: PathBuf,
    #[clap(long, default_value_t = DEFAULT_TARGET_SIZE, help = "Fixture size in bytes")]
    size: u64,
    #[clap(
        long,
        default_value_t = DEFAULT_SCRATCH_BUFFER_SIZE,
        help = "Scratch buffer size used while writing, in bytes"
    )]
    scratch: usize,
    #[clap(
        long,
        value_parser,
        help = "JSON config file, takes precedence over the flags above"
    )]
    config: Option<PathBuf>,
}

impl FixtureArgs {
    pub fn to_config(&self) -> Result<FixtureConfig, AppError> {
        let config = match &self.config {
            Some(path) => FixtureConfig::load(path).map_err(|e| {
                AppError::ConfigLoadError(format!("{}: {}", path.display(), e))
            })?,
            None => FixtureConfig::new(&self.path, self.size)
                .with_scratch_buffer_size(self.scratch),
        };
        config.validate()?;
        Ok(config)
    }
}
