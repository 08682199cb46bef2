use futures::TryStreamExt;

use fs_fixture::{
    expected_chunk_count, format_size, validate_chunk_size, Fixture,
    DEFAULT_CHUNK_SIZE,
};

use super::FixtureArgs;
use crate::error::AppError;
use crate::progress::ConsoleProgress;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "stream", about = "Stream the fixture and count chunks")]
pub struct Stream {
    #[command(flatten)]
    fixture: FixtureArgs,
    #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Chunk size in bytes")]
    chunk: usize,
    #[clap(long = "async", action, help = "Read through the async stream")]
    use_async: bool,
    #[clap(short, long, action, help = "Print every chunk")]
    verbose: bool,
}

impl Stream {
    pub async fn run(&self) -> Result<(), AppError> {
        let mut fixture = Fixture::new(self.fixture.to_config()?);
        validate_chunk_size(self.chunk)?;

        println!("{}", chunk_banner(self.chunk));
        println!("File size: {}", format_size(fixture.size()));

        let mut progress = ConsoleProgress::default();
        let report = fixture.ensure_with(&mut progress);
        progress.finish();
        report?;

        let mut chunks: u64 = 0;
        let mut bytes: u64 = 0;
        if self.use_async {
            let mut stream = fixture.stream_async(self.chunk).await?;
            while let Some(chunk) = stream.try_next().await? {
                chunks += 1;
                bytes += chunk.len() as u64;
                self.report_chunk(chunks, chunk.len());
            }
        } else {
            for chunk in fixture.stream(self.chunk)? {
                let chunk = chunk?;
                chunks += 1;
                bytes += chunk.len() as u64;
                self.report_chunk(chunks, chunk.len());
            }
        }

        let expected = expected_chunk_count(fixture.size(), self.chunk);
        println!("Total chunks: {}", chunks);
        println!("Total bytes: {}", bytes);
        if chunks != expected {
            return Err(AppError::ChunkCountMismatch {
                expected,
                actual: chunks,
            });
        }
        Ok(())
    }

    fn report_chunk(&self, index: u64, len: usize) {
        if self.verbose {
            println!("Chunk {}, size: {}", index, len);
        }
    }
}

fn chunk_banner(chunk_size: usize) -> String {
    format!(
        "Testing stream with chunk size: {}",
        format_size(chunk_size as u64)
    )
}
