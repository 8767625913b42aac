//! Stagebuf - Byte Staging Buffer untuk Socket & File I/O
//!
//! Arsitektur:
//! - Core: `ByteBuffer` FIFO (append di tail, consume dari head) + CRLF framing
//! - Network: raw send/recv primitive, readiness poll (mio), cancel token
//! - Transfer: flush ke descriptor/file/socket, fill dari socket
//!
//! Semua operasi blocking hanya terjadi di `transfer`. Buffer tidak punya
//! sinkronisasi internal: satu buffer per koneksi, satu thread per buffer.
//!
//! ```
//! use stagebuf::ByteBuffer;
//!
//! let mut buf = ByteBuffer::new();
//! buf.append(b"HELLO\r\nrest");
//! assert_eq!(buf.take_line_crlf().as_deref(), Some(&b"HELLO"[..]));
//! assert_eq!(buf.as_bytes(), b"rest");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod transfer;

#[cfg(test)]
mod testing;

pub use crate::config::IoConfig;
pub use crate::core::ByteBuffer;
pub use crate::error::{BufferError, Result};
pub use crate::network::{CancelToken, Direction, ReadinessWaiter, SocketIo};
pub use crate::transfer::{chunk_size_for, BoundedRead};

#[cfg(unix)]
pub use crate::network::PollWaiter;

/// Target `tracing` untuk semua log dari crate ini.
pub const LOG_TARGET: &str = "stagebuf::io";
