//! # Output sinks for discovered primes.
//!
//! A [`Sink`] accepts integers from the collector, one at a time, in arrival
//! order. Only the collector ever touches the sink, so implementations need
//! no internal synchronisation for writes.
//!
//! Built-in sinks:
//! - [`LineSink`]: one decimal integer per line, newline-terminated, over any
//!   [`AsyncWrite`]; [`LineSink::create`] truncate-creates a file.
//! - [`MemorySink`]: collects values in memory (cloneable handle).
//!
//! ## Error semantics
//! - Opening a file sink is **fatal** ([`SinkError::Open`]).
//! - A failed `accept` or `flush` is reported by the collector and the stream continues.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::error::SinkError;

/// Destination for discovered primes.
#[async_trait]
pub trait Sink: Send + 'static {
    /// Writes a single value.
    async fn accept(&mut self, prime: i64) -> Result<(), SinkError>;

    /// Pushes buffered output to the destination.
    ///
    /// Called once by the collector after the stream is closed.
    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes each value as a decimal line.
pub struct LineSink<W> {
    out: BufWriter<W>,
}

impl LineSink<File> {
    /// Creates (or truncates) `path` and wraps it in a line sink.
    ///
    /// # Errors
    /// [`SinkError::Open`] if the file cannot be created.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let file = File::create(path).await.map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> LineSink<W> {
    /// Wraps an async writer.
    pub fn new(writer: W) -> Self {
        Self {
            out: BufWriter::new(writer),
        }
    }

    /// Returns the underlying writer. Unflushed bytes are discarded.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> Sink for LineSink<W> {
    async fn accept(&mut self, prime: i64) -> Result<(), SinkError> {
        let line = format!("{prime}\n");
        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(|source| SinkError::Write { prime, source })
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.out
            .flush()
            .await
            .map_err(|source| SinkError::Flush { source })
    }
}

/// In-memory sink; clones share the same storage.
#[derive(Clone, Default)]
pub struct MemorySink {
    values: Arc<Mutex<Vec<i64>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the values in arrival order.
    pub async fn snapshot(&self) -> Vec<i64> {
        self.values.lock().await.clone()
    }

    /// Returns a sorted copy of the values.
    pub async fn sorted(&self) -> Vec<i64> {
        let mut v = self.snapshot().await;
        v.sort_unstable();
        v
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn accept(&mut self, prime: i64) -> Result<(), SinkError> {
        self.values.lock().await.push(prime);
        Ok(())
    }
}
