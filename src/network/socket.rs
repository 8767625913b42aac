//! Raw blocking send/recv primitive
//!
//! Di unix memakai `libc::send`/`libc::recv` langsung supaya bisa pakai
//! `MSG_NOSIGNAL` (peer yang sudah close tidak memicu SIGPIPE).
//! EINTR selalu di-retry di dalam primitive.

use std::io;
use std::net::TcpStream;

#[cfg(unix)]
use std::os::unix::io::{AsRawFd, BorrowedFd, RawFd};
#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Blocking socket I/O
///
/// `recv` mengembalikan `Ok(0)` saat peer close dengan rapi.
/// `send` mengembalikan jumlah byte yang benar-benar terkirim
/// (partial send itu normal).
pub trait SocketIo {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: SocketIo + ?Sized> SocketIo for &mut T {
    #[inline]
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).send(buf)
    }

    #[inline]
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;

// Platform tanpa MSG_NOSIGNAL: flag kosong
#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))
))]
const SEND_FLAGS: libc::c_int = 0;

#[cfg(unix)]
pub(crate) fn send_fd(fd: RawFd, buf: &[u8]) -> io::Result<usize> {
    loop {
        // SAFETY: buf valid untuk buf.len() byte selama call
        let rc = unsafe { libc::send(fd, buf.as_ptr().cast(), buf.len(), SEND_FLAGS) };
        if rc >= 0 {
            return Ok(rc as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
pub(crate) fn recv_fd(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        // SAFETY: buf writable untuk buf.len() byte selama call
        let rc = unsafe { libc::recv(fd, buf.as_mut_ptr().cast(), buf.len(), 0) };
        if rc >= 0 {
            return Ok(rc as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Tulis seluruh `data` ke descriptor dengan `write(2)` berulang.
///
/// Returns jumlah byte yang tertulis. Kurang dari `data.len()` berarti
/// descriptor berhenti menerima (write mengembalikan 0).
#[cfg(unix)]
pub fn write_all_fd(fd: BorrowedFd<'_>, data: &[u8]) -> io::Result<usize> {
    let raw = fd.as_raw_fd();
    let mut written = 0;

    while written < data.len() {
        let rest = &data[written..];
        // SAFETY: rest valid untuk rest.len() byte, fd dipinjam selama call
        let rc = unsafe { libc::write(raw, rest.as_ptr().cast(), rest.len()) };
        match rc {
            0 => break,
            n if n > 0 => written += n as usize,
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }

    Ok(written)
}

impl SocketIo for TcpStream {
    #[cfg(unix)]
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        send_fd(self.as_raw_fd(), buf)
    }

    #[cfg(unix)]
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        recv_fd(self.as_raw_fd(), buf)
    }

    #[cfg(not(unix))]
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match io::Write::write(self, buf) {
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    #[cfg(not(unix))]
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match io::Read::read(self, buf) {
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

#[cfg(unix)]
impl SocketIo for UnixStream {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        send_fd(self.as_raw_fd(), buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        recv_fd(self.as_raw_fd(), buf)
    }
}
