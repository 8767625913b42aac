//! Core module: byte staging buffer
//!
//! Prinsip desain:
//! - FIFO: append di tail, consume dari head, tidak ada reorder
//! - Contiguous: byte yang di-consume dihapus fisik dari depan
//! - Single owner: tidak ada lock, akses diserialisasi oleh pemilik

mod byte_buffer;
pub(crate) mod format;

pub use byte_buffer::ByteBuffer;
