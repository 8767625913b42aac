//! Fill family: isi buffer dari socket
//!
//! Scratch chunk dialokasikan per call, tidak ada buffer global.

use tracing::{debug, error};

use super::wait_until_ready;
use crate::core::ByteBuffer;
use crate::error::{BufferError, Result};
use crate::network::{CancelToken, Direction, ReadinessWaiter, SocketIo};
use crate::LOG_TARGET;

/// Chunk maksimum untuk hint besar (64KB)
pub const MAX_READ_CHUNK: usize = 64 * 1024;
/// Hint >= nilai ini memakai `MAX_READ_CHUNK`
pub const LARGE_HINT: usize = MAX_READ_CHUNK * 16;
/// Hint >= nilai ini memakai `hint / 16`
pub const MEDIUM_HINT: usize = 1024 * 16;

/// Hasil `read_bounded`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundedRead {
    /// Target `max_bytes` tercapai
    Complete,
    /// Peer berhenti mengirim lebih dulu; berisi jumlah byte yang diterima
    Short(usize),
}

/// Ukuran chunk recv berdasarkan size hint.
///
/// `hint >= 16*64KB` → 64KB, `hint >= 16*1KB` → `hint/16`, selain itu
/// `default`.
#[inline]
pub fn chunk_size_for(hint: usize, default: usize) -> usize {
    if hint >= LARGE_HINT {
        MAX_READ_CHUNK
    } else if hint >= MEDIUM_HINT {
        hint / 16
    } else {
        default
    }
}

fn recv_failed(err: std::io::Error, received: usize) -> BufferError {
    error!(target: LOG_TARGET, error = %err, received, "Error reading from socket");
    BufferError::Io(err)
}

impl ByteBuffer {
    /// Baca dari socket sampai peer close, append setiap chunk.
    ///
    /// Returns total byte yang diterima. Saat error, data yang sudah
    /// diterima tetap ada di buffer.
    pub fn read_all_from_socket<S>(&mut self, socket: &mut S, size_hint: usize) -> Result<usize>
    where
        S: SocketIo + ?Sized,
    {
        let mut scratch = vec![0u8; chunk_size_for(size_hint, self.config().read_chunk)];
        let mut total = 0;

        loop {
            let n = socket
                .recv(&mut scratch)
                .map_err(|err| recv_failed(err, total))?;
            if n == 0 {
                break;
            }
            self.append(&scratch[..n]);
            total += n;
        }

        debug!(target: LOG_TARGET, bytes = total, "socket closed after read_all");
        Ok(total)
    }

    /// Seperti `read_all_from_socket`, dengan progress dan cancel.
    ///
    /// Kalau `cancel` diberikan, setiap recv didahului tunggu readability
    /// dengan cek token per poll interval. Setelah setiap chunk, `progress`
    /// dipanggil dengan `diterima / known_size` (1.0 kalau `known_size`
    /// nol). Peer close kapan pun mengakhiri loop dengan sukses.
    pub fn read_all_with_progress<S, W, F>(
        &mut self,
        socket: &mut S,
        waiter: &mut W,
        known_size: usize,
        cancel: Option<&CancelToken>,
        mut progress: F,
    ) -> Result<usize>
    where
        S: SocketIo + ?Sized,
        W: ReadinessWaiter<S> + ?Sized,
        F: FnMut(f32),
    {
        let interval = self.config().poll_interval;
        let mut scratch = vec![0u8; chunk_size_for(known_size, self.config().progress_chunk)];
        let mut total = 0;

        loop {
            if cancel.is_some() {
                wait_until_ready(&*socket, waiter, Direction::Read, interval, None, cancel)?;
            }

            let n = socket
                .recv(&mut scratch)
                .map_err(|err| recv_failed(err, total))?;
            if n == 0 {
                debug!(target: LOG_TARGET, bytes = total, known_size, "socket closed after progress read");
                return Ok(total);
            }

            self.append(&scratch[..n]);
            total += n;

            let fraction = if known_size == 0 {
                1.0
            } else {
                total as f32 / known_size as f32
            };
            progress(fraction);
        }
    }

    /// Terima sampai `max_bytes` byte dalam chunk kecil.
    ///
    /// Setiap recv tidak pernah meminta lebih dari sisa target.
    pub fn read_bounded<S>(&mut self, socket: &mut S, max_bytes: usize) -> Result<BoundedRead>
    where
        S: SocketIo + ?Sized,
    {
        let mut chunk = vec![0u8; self.config().bounded_chunk];
        let mut received = 0;

        while received < max_bytes {
            let want = (max_bytes - received).min(chunk.len());
            let n = socket
                .recv(&mut chunk[..want])
                .map_err(|err| recv_failed(err, received))?;
            if n == 0 {
                return Ok(BoundedRead::Short(received));
            }
            self.append(&chunk[..n]);
            received += n;
        }

        Ok(BoundedRead::Complete)
    }
}
