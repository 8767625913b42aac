//! ByteBuffer: FIFO byte accumulator
//!
//! Staging area antara kode aplikasi dan descriptor socket/file.
//! Operasi I/O (flush/fill) ada di `crate::transfer`.

use std::fmt;
use std::io;

use memchr::memmem;
use tracing::{error, warn};

use super::format::render_bounded;
use crate::config::IoConfig;
use crate::LOG_TARGET;

const CRLF: &[u8] = b"\r\n";

/// Append formatted text ke buffer, dengan batas scratch dari `IoConfig`.
///
/// ```
/// let mut buf = stagebuf::ByteBuffer::new();
/// stagebuf::buffer_printf!(buf, "{} {}\r\n", "PING", 7);
/// assert_eq!(buf.as_bytes(), b"PING 7\r\n");
/// ```
#[macro_export]
macro_rules! buffer_printf {
    ($buf:expr, $($arg:tt)*) => {
        $buf.append_formatted(::std::format_args!($($arg)*))
    };
}

/// Byte staging buffer
///
/// Ukuran yang dilaporkan selalu sama dengan jumlah byte yang belum
/// di-consume. Tidak ada flush otomatis saat drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
    config: IoConfig,
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.data.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ByteBuffer {
    /// Membuat buffer kosong dengan config default
    pub fn new() -> Self {
        Self::default()
    }

    /// Membuat buffer kosong dengan config tertentu
    pub fn with_config(config: IoConfig) -> Self {
        Self {
            data: Vec::new(),
            config,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    /// Jumlah byte yang belum di-consume
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View ke seluruh isi buffer (zero-copy, tidak consume)
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    // ------------------------------------------------------------------
    // Append family
    // ------------------------------------------------------------------

    /// Reserve `length` byte baru di tail dan kembalikan region tersebut.
    ///
    /// Region di-zero-fill; pemanggil mengisinya sebelum operasi lain.
    /// Slice yang dikembalikan hidup sampai mutasi berikutnya pada buffer.
    /// Untuk `length == 0` hasilnya slice kosong.
    pub fn reserve_append(&mut self, length: usize) -> &mut [u8] {
        let old_len = self.data.len();
        if length > 0 {
            self.data.resize(old_len + length, 0);
        }
        &mut self.data[old_len..]
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.reserve_append(bytes.len()).copy_from_slice(bytes);
    }

    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Copy seluruh isi `other`. No-op kalau `other` kosong.
    pub fn append_buffer(&mut self, other: &ByteBuffer) {
        if !other.is_empty() {
            self.append(&other.data);
        }
    }

    /// Render `args` ke scratch terbatas (`IoConfig::format_capacity`)
    /// lalu append byte yang benar-benar dihasilkan.
    ///
    /// Truncation atau kegagalan `Display` hanya di-log, tidak pernah
    /// dikembalikan ke pemanggil. Biasanya dipakai lewat `buffer_printf!`.
    pub fn append_formatted(&mut self, args: fmt::Arguments<'_>) {
        let rendered = render_bounded(self.config.format_capacity, args);
        if rendered.truncated {
            error!(
                target: LOG_TARGET,
                capacity = self.config.format_capacity,
                "append_formatted truncated output"
            );
        }
        if rendered.failed {
            error!(target: LOG_TARGET, "append_formatted failed");
        }
        self.append(&rendered.bytes);
    }

    /// Append angka desimal tanpa separator
    pub fn append_int(&mut self, value: i64) {
        self.append_formatted(format_args!("{value}"));
    }

    // ------------------------------------------------------------------
    // Consumption family
    // ------------------------------------------------------------------

    /// Clamp `length` ke ukuran buffer, log warning kalau terpotong
    fn clamp(&self, length: usize, op: &'static str) -> usize {
        let available = self.data.len();
        if length > available {
            warn!(
                target: LOG_TARGET,
                requested = length,
                available,
                "Truncating length in {}",
                op
            );
            available
        } else {
            length
        }
    }

    /// Ambil tepat `length` byte dari depan (di-clamp ke ukuran buffer).
    pub fn take(&mut self, length: usize) -> Vec<u8> {
        let length = self.clamp(length, "take");
        self.data.drain(..length).collect()
    }

    /// Copy `length` byte dari depan ke `dest` lalu hapus dari buffer.
    ///
    /// Di-clamp ke ukuran buffer dan ke `dest.len()`. Returns jumlah byte
    /// yang di-copy.
    pub fn take_into(&mut self, length: usize, dest: &mut [u8]) -> usize {
        let mut length = self.clamp(length, "take_into");
        if length > dest.len() {
            warn!(
                target: LOG_TARGET,
                requested = length,
                destination = dest.len(),
                "Truncating length in take_into to destination size"
            );
            length = dest.len();
        }
        dest[..length].copy_from_slice(&self.data[..length]);
        self.data.drain(..length);
        length
    }

    /// Ambil semua isi buffer, buffer menjadi kosong
    pub fn take_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    /// Hapus `length` byte dari depan tanpa mengembalikannya
    pub fn skip(&mut self, length: usize) {
        let length = self.clamp(length, "skip");
        self.data.drain(..length);
    }

    /// Offset byte setelah CRLF pertama, atau `None`.
    ///
    /// Hanya scan isi saat ini; tidak pernah blocking atau fill.
    pub fn find_crlf(&self) -> Option<usize> {
        memmem::find(&self.data, CRLF).map(|pos| pos + CRLF.len())
    }

    /// Ambil satu baris tanpa terminator CRLF.
    ///
    /// `None` kalau belum ada CRLF; buffer tidak diubah. Panjang baris
    /// yang di-consume (tanpa CRLF) sama dengan panjang vector.
    pub fn take_line_crlf(&mut self) -> Option<Vec<u8>> {
        let after = self.find_crlf()?;
        let line = self.data[..after - CRLF.len()].to_vec();
        self.data.drain(..after);
        Some(line)
    }

    /// Buang satu baris beserta CRLF-nya.
    ///
    /// Returns panjang baris tanpa terminator, atau `None` tanpa mutasi.
    pub fn skip_line_crlf(&mut self) -> Option<usize> {
        let after = self.find_crlf()?;
        self.data.drain(..after);
        Some(after - CRLF.len())
    }

    /// Copy seluruh isi tanpa consume
    pub fn peek_all(&self) -> Vec<u8> {
        self.data.clone()
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data,
            config: IoConfig::default(),
        }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl From<&str> for ByteBuffer {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Append tanpa batas; `flush` tidak melakukan I/O apa pun.
impl io::Write for ByteBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
