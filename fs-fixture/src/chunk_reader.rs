use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use data_error::{FixtureError, IoContext, IoOp, Result};

/// Number of chunks a source of `total_size` bytes splits into.
///
/// `ceil(total_size / chunk_size)`, and zero for an empty source.
pub fn expected_chunk_count(total_size: u64, chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    total_size.div_ceil(chunk_size as u64)
}

pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(FixtureError::InvalidConfig(
            "chunk size must be positive".to_owned(),
        ));
    }
    Ok(())
}

/// Position bookkeeping and short-read policy shared by the blocking and
/// the async readers.
#[derive(Debug)]
pub(crate) struct ChunkCursor {
    path: PathBuf,
    chunk_size: usize,
    total_size: u64,
    position: u64,
    short_reads: Arc<AtomicU64>,
}

impl ChunkCursor {
    pub(crate) fn new(
        path: PathBuf,
        total_size: u64,
        chunk_size: usize,
    ) -> Result<Self> {
        validate_chunk_size(chunk_size)?;
        Ok(Self {
            path,
            chunk_size,
            total_size,
            position: 0,
            short_reads: Arc::new(AtomicU64::new(0)),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_done(&self) -> bool {
        self.position >= self.total_size
    }

    /// Buffer for the next chunk, or `None` once the captured size is read.
    pub(crate) fn next_buffer(&self) -> Option<Vec<u8>> {
        if self.is_done() {
            return None;
        }
        let bytes_to_read = (self.total_size - self.position)
            .min(self.chunk_size as u64) as usize;
        Some(vec![0u8; bytes_to_read])
    }

    /// Turns a buffer filled with `bytes_read` bytes into the next chunk.
    ///
    /// A zero-byte fill ends the stream. A partial fill is still yielded.
    pub(crate) fn accept(
        &mut self,
        mut buffer: Vec<u8>,
        bytes_read: usize,
    ) -> Option<Vec<u8>> {
        if bytes_read == 0 {
            log::debug!(
                "{} ended at offset {} out of {} bytes",
                self.path.display(),
                self.position,
                self.total_size
            );
            return None;
        }
        if bytes_read < buffer.len() {
            log::warn!(
                "Short read from {} at offset {}: {} of {} bytes, was the file modified?",
                self.path.display(),
                self.position,
                bytes_read,
                buffer.len()
            );
            self.short_reads.fetch_add(1, Ordering::Relaxed);
            buffer.truncate(bytes_read);
        }
        self.position += bytes_read as u64;
        Some(buffer)
    }

    pub(crate) fn short_reads_counter(&self) -> Arc<AtomicU64> {
        self.short_reads.clone()
    }
}

/// Sequential reader yielding a source as owned chunks of `chunk_size` bytes.
///
/// The total size is captured once when the reader is created. Every chunk
/// is `chunk_size` long except the last one, which holds the remainder.
/// The source is dropped exactly once: when the end is reached, after a
/// read error, or when the reader itself is dropped.
pub struct ChunkReader<R = File> {
    source: Option<R>,
    cursor: ChunkCursor,
}

impl ChunkReader<File> {
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();
        validate_chunk_size(chunk_size)?;

        let file = File::open(path).with_path(IoOp::Open, path)?;
        let total_size = file.metadata().with_path(IoOp::Stat, path)?.len();
        log::debug!(
            "Streaming {} ({} bytes) in chunks of {} bytes",
            path.display(),
            total_size,
            chunk_size
        );

        Self::from_reader(path, file, total_size, chunk_size)
    }
}

impl<R: Read> ChunkReader<R> {
    /// Reads `total_size` bytes from an arbitrary source.
    ///
    /// `origin` only names the source in errors and logs.
    pub fn from_reader(
        origin: impl Into<PathBuf>,
        source: R,
        total_size: u64,
        chunk_size: usize,
    ) -> Result<Self> {
        let cursor = ChunkCursor::new(origin.into(), total_size, chunk_size)?;
        let mut reader = Self {
            source: Some(source),
            cursor,
        };
        if total_size == 0 {
            reader.release();
        }
        Ok(reader)
    }

    pub fn path(&self) -> &Path {
        &self.cursor.path
    }

    pub fn chunk_size(&self) -> usize {
        self.cursor.chunk_size
    }

    pub fn total_size(&self) -> u64 {
        self.cursor.total_size
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.cursor.position
    }

    /// Number of chunks that came back shorter than requested.
    pub fn short_reads(&self) -> u64 {
        self.cursor.short_reads.load(Ordering::Relaxed)
    }

    /// Whether the underlying source is still held.
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    fn release(&mut self) {
        if self.source.take().is_some() {
            log::trace!(
                "Released {} at offset {}",
                self.cursor.path.display(),
                self.cursor.position
            );
        }
    }

    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buffer = match self.cursor.next_buffer() {
            Some(buffer) => buffer,
            None => {
                self.release();
                return Ok(None);
            }
        };
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Ok(None),
        };

        let bytes_read =
            fill(source, &mut buffer).with_path(IoOp::Read, &self.cursor.path)?;
        let chunk = self.cursor.accept(buffer, bytes_read);
        if chunk.is_none() || self.cursor.is_done() {
            self.release();
        }
        Ok(chunk)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_chunk() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.release();
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if !self.is_open() {
            return (0, Some(0));
        }
        let remaining = expected_chunk_count(
            self.cursor.total_size - self.cursor.position,
            self.cursor.chunk_size,
        );
        (0, usize::try_from(remaining).ok())
    }
}

impl<R: Read> FusedIterator for ChunkReader<R> {}

/// Reads until `buf` is full or the source reports end of data.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
