pub mod async_stream;
pub mod chunk_reader;
pub mod config;
pub mod fixture;
pub mod pattern;
pub mod progress;
pub mod synthesizer;

pub use async_stream::{from_async_reader, open_async, AsyncChunkStream};
pub use chunk_reader::{
    expected_chunk_count, validate_chunk_size, ChunkReader,
};
pub use config::FixtureConfig;
pub use fixture::{Fixture, VerifyReport};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use synthesizer::{
    synthesize, FileSynthesizer, SynthesisOutcome, SynthesisReport,
};

pub const KILOBYTE: u64 = 1024;
pub const MEGABYTE: u64 = 1024 * KILOBYTE;
pub const GIGABYTE: u64 = 1024 * MEGABYTE;

/// 1330 MiB, the "1.3 GB" upload fixture.
pub const DEFAULT_TARGET_SIZE: u64 = 1330 * MEGABYTE;
pub const DEFAULT_SCRATCH_BUFFER_SIZE: usize = 64 * MEGABYTE as usize;
pub const DEFAULT_CHUNK_SIZE: usize = 64 * MEGABYTE as usize;
pub const DEFAULT_FILE_NAME: &str = "testData.bin";

/// Human readable size, e.g. `1.30GB` or `64.00MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GIGABYTE {
        format!("{:.2}GB", bytes as f64 / GIGABYTE as f64)
    } else if bytes >= MEGABYTE {
        format!("{:.2}MB", bytes as f64 / MEGABYTE as f64)
    } else if bytes >= KILOBYTE {
        format!("{:.2}KB", bytes as f64 / KILOBYTE as f64)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
pub(crate) fn initialize() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fixture_is_twenty_one_default_chunks() {
        assert_eq!(DEFAULT_TARGET_SIZE, 1_394_606_080);
        assert_eq!(
            expected_chunk_count(DEFAULT_TARGET_SIZE, DEFAULT_CHUNK_SIZE),
            21
        );
    }

    #[test]
    fn sizes_are_formatted_with_the_largest_unit() {
        assert_eq!(format_size(DEFAULT_TARGET_SIZE), "1.30GB");
        assert_eq!(format_size(64 * MEGABYTE), "64.00MB");
        assert_eq!(format_size(1536), "1.50KB");
        assert_eq!(format_size(17), "17B");
    }
}
