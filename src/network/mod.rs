//! Network Layer: raw blocking I/O primitives
//!
//! Tiga kolaborator untuk buffer:
//! - `SocketIo`: blocking send/recv (libc di unix, MSG_NOSIGNAL)
//! - `ReadinessWaiter`: poll-with-timeout (mio di unix)
//! - `CancelToken`: cancellation kooperatif yang bisa membangunkan poll

mod cancel;
mod readiness;
mod socket;

pub use cancel::CancelToken;
pub use readiness::{Direction, ReadinessWaiter};
pub use socket::SocketIo;

#[cfg(unix)]
pub use readiness::PollWaiter;
#[cfg(unix)]
pub use socket::write_all_fd;
