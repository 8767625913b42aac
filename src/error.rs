//! Error types untuk operasi flush/fill.
//!
//! Truncation pada take/skip dan overflow format tidak pernah menjadi error;
//! keduanya hanya di-log.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type untuk operasi buffer.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Errors yang bisa terjadi saat buffer menjalankan I/O.
#[derive(Debug, Error)]
pub enum BufferError {
    /// send/recv/write/poll gagal.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// File tujuan tidak bisa dibuka.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Descriptor berhenti menerima data sebelum seluruh buffer tertulis.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    /// Socket tidak siap dalam batas waktu.
    #[error("timed out after {0:?} waiting for socket readiness")]
    Timeout(Duration),
    /// Cancel token di-set saat menunggu readiness.
    #[error("operation cancelled")]
    Cancelled,
}

impl BufferError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
