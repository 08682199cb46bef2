use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use data_error::{IoContext, IoOp, Result};

use crate::chunk_reader::{validate_chunk_size, ChunkCursor};

/// Chunks of a source, read one at a time as the stream is polled.
///
/// Dropping the stream, letting it run out, or hitting a read error closes
/// the source.
pub struct AsyncChunkStream {
    inner: BoxStream<'static, Result<Vec<u8>>>,
    short_reads: Arc<AtomicU64>,
}

impl AsyncChunkStream {
    /// Number of chunks that came back shorter than requested so far.
    pub fn short_reads(&self) -> u64 {
        self.short_reads.load(Ordering::Relaxed)
    }
}

impl Stream for AsyncChunkStream {
    type Item = Result<Vec<u8>>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Asynchronous counterpart of [`ChunkReader::open`](crate::ChunkReader::open).
pub async fn open_async<P: AsRef<Path>>(
    path: P,
    chunk_size: usize,
) -> Result<AsyncChunkStream> {
    let path = path.as_ref();
    validate_chunk_size(chunk_size)?;

    let file = File::open(path).await.with_path(IoOp::Open, path)?;
    let total_size = file
        .metadata()
        .await
        .with_path(IoOp::Stat, path)?
        .len();

    from_async_reader(path, file, total_size, chunk_size)
}

/// Asynchronous counterpart of
/// [`ChunkReader::from_reader`](crate::ChunkReader::from_reader).
pub fn from_async_reader<R>(
    origin: impl Into<PathBuf>,
    source: R,
    total_size: u64,
    chunk_size: usize,
) -> Result<AsyncChunkStream>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let cursor = ChunkCursor::new(origin.into(), total_size, chunk_size)?;
    let short_reads = cursor.short_reads_counter();
    let inner = stream::try_unfold((source, cursor), next_chunk).boxed();
    Ok(AsyncChunkStream { inner, short_reads })
}

async fn next_chunk<R: AsyncRead + Unpin>(
    (mut source, mut cursor): (R, ChunkCursor),
) -> Result<Option<(Vec<u8>, (R, ChunkCursor))>> {
    let mut buffer = match cursor.next_buffer() {
        Some(buffer) => buffer,
        None => return Ok(None),
    };
    let bytes_read = fill(&mut source, &mut buffer)
        .await
        .with_path(IoOp::Read, cursor.path())?;

    Ok(cursor
        .accept(buffer, bytes_read)
        .map(|chunk| (chunk, (source, cursor))))
}

async fn fill<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
