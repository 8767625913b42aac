//! Transfer Layer: flush buffer ke I/O dan fill buffer dari I/O
//!
//! Semua operasi di sini blocking. Timeout hanya dihitung selama menunggu
//! readiness, bukan selama send/recv sedang berjalan.

mod fill;
mod flush;

pub use fill::{chunk_size_for, BoundedRead, LARGE_HINT, MAX_READ_CHUNK, MEDIUM_HINT};

use std::time::Duration;

use tracing::{debug, error};

use crate::error::{BufferError, Result};
use crate::network::{CancelToken, Direction, ReadinessWaiter};
use crate::LOG_TARGET;

/// Tunggu socket siap dalam slice `interval`.
///
/// Token dicek sebelum setiap slice. Dengan `timeout`, budget dihitung
/// dalam slice, bukan wall clock: setiap slice yang belum siap dibebankan
/// satu `interval` penuh, walaupun waiter kembali lebih cepat. Budget
/// habis berarti `Timeout`.
pub(crate) fn wait_until_ready<S, W>(
    socket: &S,
    waiter: &mut W,
    direction: Direction,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: Option<&CancelToken>,
) -> Result<()>
where
    S: ?Sized,
    W: ReadinessWaiter<S> + ?Sized,
{
    let mut spent = Duration::ZERO;

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            debug!(target: LOG_TARGET, ?direction, "cancelled while waiting for socket");
            return Err(BufferError::Cancelled);
        }

        let ready = waiter.wait(socket, interval, direction).map_err(|err| {
            error!(target: LOG_TARGET, ?direction, error = %err, "readiness poll failed");
            BufferError::Io(err)
        })?;
        if ready {
            return Ok(());
        }

        if let Some(limit) = timeout {
            spent += interval;
            if spent > limit {
                error!(target: LOG_TARGET, ?direction, ?limit, "socket wait timed out");
                return Err(BufferError::Timeout(limit));
            }
        }
    }
}
