use fs_fixture::{Fixture, DEFAULT_CHUNK_SIZE};

use super::FixtureArgs;
use crate::error::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "verify", about = "Check the fixture's size and pattern")]
pub struct Verify {
    #[command(flatten)]
    fixture: FixtureArgs,
    #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Chunk size in bytes")]
    chunk: usize,
}

impl Verify {
    pub fn run(&self) -> Result<(), AppError> {
        let fixture = Fixture::new(self.fixture.to_config()?);
        let report = fixture.verify(self.chunk)?;
        println!(
            "{} is valid: {} bytes in {} chunks",
            fixture.path().display(),
            report.bytes,
            report.chunks
        );
        Ok(())
    }
}
