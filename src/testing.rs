//! Mock socket & waiter untuk unit test transfer
//!
//! Tidak ada sleep di sini: interval poll diabaikan supaya test cepat.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::network::{CancelToken, Direction, ReadinessWaiter, SocketIo};

/// Satu langkah skrip recv
pub(crate) enum Incoming {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Socket palsu: send dibatasi `max_send` byte per call, recv mengikuti skrip.
/// Skrip recv yang habis berarti peer close (`Ok(0)`).
pub(crate) struct MockSocket {
    pub max_send: usize,
    pub zero_sends: usize,
    pub would_block: usize,
    pub fail_send_at: Option<usize>,
    pub sent: Vec<u8>,
    pub send_calls: usize,
    pub incoming: VecDeque<Incoming>,
    pub recv_sizes: Vec<usize>,
}

impl MockSocket {
    pub fn new() -> Self {
        Self {
            max_send: usize::MAX,
            zero_sends: 0,
            would_block: 0,
            fail_send_at: None,
            sent: Vec::new(),
            send_calls: 0,
            incoming: VecDeque::new(),
            recv_sizes: Vec::new(),
        }
    }

    pub fn chunked(max_send: usize) -> Self {
        Self {
            max_send,
            ..Self::new()
        }
    }

    pub fn with_incoming(chunks: &[&[u8]]) -> Self {
        let mut socket = Self::new();
        for chunk in chunks {
            socket.incoming.push_back(Incoming::Data(chunk.to_vec()));
        }
        socket
    }
}

impl SocketIo for MockSocket {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let call = self.send_calls;
        self.send_calls += 1;

        if self.fail_send_at == Some(call) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock send failure"));
        }
        if self.would_block > 0 {
            self.would_block -= 1;
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        if self.zero_sends > 0 {
            self.zero_sends -= 1;
            return Ok(0);
        }

        let n = buf.len().min(self.max_send);
        self.sent.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_sizes.push(buf.len());

        match self.incoming.pop_front() {
            None => Ok(0),
            Some(Incoming::Fail(kind)) => Err(io::Error::new(kind, "mock recv failure")),
            Some(Incoming::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.incoming.push_front(Incoming::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

/// Waiter palsu dengan jawaban ready/tidak yang di-skrip.
pub(crate) struct MockWaiter {
    pub script: VecDeque<bool>,
    pub fallback: bool,
    pub calls: usize,
    pub directions: Vec<Direction>,
    pub intervals: Vec<Duration>,
    /// Cancel token ini pada call ke-N (0-based) dan laporkan "belum siap"
    pub cancel_at: Option<(usize, CancelToken)>,
}

impl MockWaiter {
    pub fn always_ready() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: true,
            calls: 0,
            directions: Vec::new(),
            intervals: Vec::new(),
            cancel_at: None,
        }
    }

    pub fn never_ready() -> Self {
        Self {
            fallback: false,
            ..Self::always_ready()
        }
    }

    pub fn scripted(answers: &[bool]) -> Self {
        Self {
            script: answers.iter().copied().collect(),
            ..Self::always_ready()
        }
    }
}

impl<S: ?Sized> ReadinessWaiter<S> for MockWaiter {
    fn wait(&mut self, _socket: &S, interval: Duration, direction: Direction) -> io::Result<bool> {
        let call = self.calls;
        self.calls += 1;
        self.directions.push(direction);
        self.intervals.push(interval);

        if let Some((at, token)) = &self.cancel_at {
            if *at == call {
                token.cancel();
                return Ok(false);
            }
        }

        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }
}

/// Pasang subscriber fmt sekali; error "sudah terpasang" diabaikan.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
