//! Readiness poll dengan timeout
//!
//! `ReadinessWaiter` adalah seam antara buffer dan poller. Implementasi
//! produksi (`PollWaiter`) memakai mio: descriptor di-register sebagai
//! `SourceFd` hanya selama satu `wait`, lalu di-deregister lagi.
//! `Waker` milik waiter bisa di-bind ke `CancelToken` sehingga cancel
//! langsung membangunkan poll tanpa menunggu interval habis.

use std::io;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;
#[cfg(unix)]
use std::sync::Arc;
#[cfg(unix)]
use std::time::Instant;

#[cfg(unix)]
use mio::unix::SourceFd;
#[cfg(unix)]
use mio::{Events, Interest, Poll, Token, Waker};

#[cfg(unix)]
use super::CancelToken;

/// Arah readiness yang ditunggu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Poll-with-timeout pada sebuah socket
///
/// `wait` tidak boleh blocking lebih lama dari `interval`.
/// `Ok(false)` berarti belum siap: interval habis, atau poll dibangunkan
/// oleh cancel. Implementasi sebaiknya tidak kembali lebih awal karena
/// EINTR, karena caller menghitung budget timeout per slice.
pub trait ReadinessWaiter<S: ?Sized> {
    fn wait(&mut self, socket: &S, interval: Duration, direction: Direction) -> io::Result<bool>;
}

impl<S: ?Sized, W: ReadinessWaiter<S> + ?Sized> ReadinessWaiter<S> for &mut W {
    #[inline]
    fn wait(&mut self, socket: &S, interval: Duration, direction: Direction) -> io::Result<bool> {
        (**self).wait(socket, interval, direction)
    }
}

#[cfg(unix)]
const SOCKET_TOKEN: Token = Token(0);
#[cfg(unix)]
const WAKE_TOKEN: Token = Token(1);
#[cfg(unix)]
const EVENTS_CAPACITY: usize = 8;

#[cfg(unix)]
impl Direction {
    fn interest(self) -> Interest {
        match self {
            Direction::Read => Interest::READABLE,
            Direction::Write => Interest::WRITABLE,
        }
    }
}

/// mio-backed readiness waiter
///
/// Satu waiter per thread I/O; bisa dipakai ulang untuk banyak socket
/// secara berurutan.
#[cfg(unix)]
pub struct PollWaiter {
    poll: Poll,
    events: Events,
    pub(super) waker: Arc<Waker>,
}

#[cfg(unix)]
impl PollWaiter {
    pub fn new() -> io::Result<Self> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKE_TOKEN)?);

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            waker,
        })
    }

    /// Hubungkan waiter ke token: `token.cancel()` akan langsung
    /// membangunkan `wait` yang sedang berjalan. Token hanya memegang
    /// referensi lemah, jadi drop waiter tetap menutup eventfd-nya.
    pub fn bind(&self, token: &CancelToken) {
        token.register_waker(&self.waker);
    }

    /// Poll sampai `deadline`. EINTR tidak memotong slice: poll diulang
    /// dengan sisa waktu. Wake dari cancel mengakhiri slice lebih awal.
    fn poll_until(&mut self, deadline: Instant) -> io::Result<bool> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.poll.poll(&mut self.events, Some(remaining)) {
                Ok(()) => {
                    // Event apa pun pada socket (termasuk hup/error) dianggap
                    // siap: send/recv berikutnya yang melaporkan status sebenarnya.
                    return Ok(self
                        .events
                        .iter()
                        .any(|event| event.token() == SOCKET_TOKEN));
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {
                    if remaining.is_zero() {
                        return Ok(false);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(unix)]
impl std::fmt::Debug for PollWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollWaiter").finish_non_exhaustive()
    }
}

#[cfg(unix)]
impl<S: AsRawFd + ?Sized> ReadinessWaiter<S> for PollWaiter {
    fn wait(&mut self, socket: &S, interval: Duration, direction: Direction) -> io::Result<bool> {
        let fd = socket.as_raw_fd();
        let deadline = Instant::now() + interval;

        self.poll
            .registry()
            .register(&mut SourceFd(&fd), SOCKET_TOKEN, direction.interest())?;
        let outcome = self.poll_until(deadline);
        // Deregister dulu supaya fd tidak tertinggal di poll saat error
        self.poll.registry().deregister(&mut SourceFd(&fd))?;

        outcome
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Instant;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_writable_immediately() {
        let (a, _b) = UnixStream::pair().unwrap();
        let mut waiter = PollWaiter::new().unwrap();
        assert!(waiter.wait(&a, SHORT, Direction::Write).unwrap());
    }

    #[test]
    fn test_not_readable_until_data() {
        let (a, mut b) = UnixStream::pair().unwrap();
        let mut waiter = PollWaiter::new().unwrap();

        let start = Instant::now();
        assert!(!waiter.wait(&a, SHORT, Direction::Read).unwrap());
        assert!(start.elapsed() >= SHORT / 2);

        b.write_all(b"x").unwrap();
        assert!(waiter.wait(&a, SHORT, Direction::Read).unwrap());
    }

    #[test]
    fn test_peer_close_counts_as_readable() {
        let (a, b) = UnixStream::pair().unwrap();
        drop(b);
        let mut waiter = PollWaiter::new().unwrap();
        assert!(waiter.wait(&a, SHORT, Direction::Read).unwrap());
    }

    #[test]
    fn test_reuse_same_socket() {
        let (a, _b) = UnixStream::pair().unwrap();
        let mut waiter = PollWaiter::new().unwrap();
        for _ in 0..3 {
            assert!(waiter.wait(&a, SHORT, Direction::Write).unwrap());
        }
    }

    #[test]
    fn test_cancel_wakes_wait() {
        let (a, _b) = UnixStream::pair().unwrap();
        let mut waiter = PollWaiter::new().unwrap();
        let token = CancelToken::new();
        waiter.bind(&token);

        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });

        let start = Instant::now();
        let ready = waiter
            .wait(&a, Duration::from_secs(10), Direction::Read)
            .unwrap();
        handle.join().unwrap();

        assert!(!ready);
        assert!(token.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
