use fs_fixture::{format_size, Fixture, SynthesisOutcome};

use super::FixtureArgs;
use crate::error::AppError;
use crate::progress::ConsoleProgress;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "generate", about = "Create the fixture file")]
pub struct Generate {
    #[command(flatten)]
    fixture: FixtureArgs,
}

impl Generate {
    pub fn run(&self) -> Result<(), AppError> {
        let mut fixture = Fixture::new(self.fixture.to_config()?);
        println!(
            "Preparing {} test data file at {}...",
            format_size(fixture.size()),
            fixture.path().display()
        );

        let mut progress = ConsoleProgress::default();
        let report = fixture.ensure_with(&mut progress);
        progress.finish();
        let report = report?;

        match report.outcome {
            SynthesisOutcome::AlreadySatisfied => println!(
                "Using existing test data file ({})",
                format_size(fixture.size())
            ),
            SynthesisOutcome::Created => {
                println!("Test data file generation complete.")
            }
            SynthesisOutcome::Regenerated { previous_size } => println!(
                "Test data file regenerated (previous size was {} bytes).",
                previous_size
            ),
        }
        Ok(())
    }
}
