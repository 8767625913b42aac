//! Flush family: drain buffer ke descriptor, file, atau socket

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::BorrowedFd;

use tracing::{debug, error};

use super::wait_until_ready;
use crate::core::ByteBuffer;
use crate::error::{BufferError, Result};
use crate::network::{CancelToken, Direction, ReadinessWaiter, SocketIo};
use crate::LOG_TARGET;

#[cfg(unix)]
use crate::network::write_all_fd;

impl ByteBuffer {
    /// Tulis seluruh buffer ke descriptor dalam satu write-all blocking.
    ///
    /// Buffer dikosongkan hanya kalau semua byte tertulis. Short write atau
    /// error meninggalkan buffer utuh; berapa byte yang sudah sampai ke
    /// descriptor tidak diketahui, jadi retry tidak idempotent.
    #[cfg(unix)]
    pub fn flush_to_descriptor(&mut self, fd: BorrowedFd<'_>) -> Result<()> {
        let expected = self.len();
        let written = write_all_fd(fd, self.as_bytes()).map_err(|err| {
            error!(target: LOG_TARGET, error = %err, expected, "descriptor flush failed");
            BufferError::Io(err)
        })?;

        self.settle_descriptor_write(written, expected)
    }

    /// Kosongkan buffer hanya kalau seluruh `expected` byte tertulis.
    #[cfg(unix)]
    fn settle_descriptor_write(&mut self, written: usize, expected: usize) -> Result<()> {
        if written != expected {
            error!(target: LOG_TARGET, written, expected, "descriptor flush short write");
            return Err(BufferError::ShortWrite { written, expected });
        }

        self.clear();
        Ok(())
    }

    /// Snapshot isi buffer ke file (create/truncate). Buffer tidak diubah.
    pub fn flush_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|source| {
            error!(target: LOG_TARGET, path = %path.display(), error = %source, "cannot open file for flush");
            BufferError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        if !self.is_empty() {
            file.write_all(self.as_bytes()).map_err(|err| {
                error!(target: LOG_TARGET, path = %path.display(), error = %err, "file flush failed");
                BufferError::Io(err)
            })?;
        }

        debug!(target: LOG_TARGET, path = %path.display(), bytes = self.len(), "flushed to file");
        Ok(())
    }

    /// Kirim seluruh buffer ke socket, loop atas partial send.
    ///
    /// Kalau `timeout` atau `cancel` diberikan, setiap send didahului
    /// tunggu writability dalam slice `IoConfig::poll_interval`, dengan cek
    /// token sebelum tiap slice. Budget `timeout` di-reset sebelum setiap
    /// send. Budget dihitung per slice: setiap slice yang belum siap
    /// memakan satu poll interval, jadi `timeout` adalah jumlah slice yang
    /// boleh gagal, bukan batas wall clock. Tanpa keduanya, send langsung
    /// (blocking). `timeout = None` berarti tanpa batas.
    ///
    /// Buffer hanya dikosongkan setelah semua byte terkirim. Saat gagal,
    /// buffer tidak diubah tetapi sebagian data mungkin sudah sampai ke
    /// peer: kontraknya at-most-once dengan progress tidak diketahui.
    pub fn flush_to_socket<S, W>(
        &mut self,
        socket: &mut S,
        waiter: &mut W,
        timeout: Option<Duration>,
        cancel: Option<&CancelToken>,
    ) -> Result<()>
    where
        S: SocketIo + ?Sized,
        W: ReadinessWaiter<S> + ?Sized,
    {
        let interval = self.config().poll_interval;
        let backoff = self.config().send_backoff;
        let wait_first = timeout.is_some() || cancel.is_some();
        let end = self.len();
        let mut pos = 0;

        while pos < end {
            if wait_first {
                wait_until_ready(&*socket, waiter, Direction::Write, interval, timeout, cancel)?;
            }

            // Socket non-blocking yang penuh dihitung sebagai send 0 byte
            let sent = match socket.send(&self.as_bytes()[pos..end]) {
                Ok(n) => n,
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => 0,
                Err(err) => {
                    error!(target: LOG_TARGET, error = %err, sent = pos, total = end, "socket flush failed");
                    return Err(BufferError::Io(err));
                }
            };
            pos += sent;

            // Socket buffer penuh, jangan spin
            if sent == 0 && timeout.is_none() {
                thread::sleep(backoff);
            }
        }

        debug!(target: LOG_TARGET, bytes = end, "flushed to socket");
        self.clear();
        Ok(())
    }
}
