//! Tuning knobs untuk operasi I/O buffer
//!
//! Semua nilai default mengikuti ukuran yang sudah terbukti di lapangan.
//! Config bersifat immutable per buffer dan bukan bagian dari isi buffer.

use std::time::Duration;

/// Interval polling readiness + cek cancel (0.25s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Sleep setelah send 0 byte tanpa timeout, supaya tidak hot-spin
pub const DEFAULT_SEND_BACKOFF: Duration = Duration::from_millis(1);
/// Kapasitas scratch untuk `append_formatted`
pub const DEFAULT_FORMAT_CAPACITY: usize = 2048;
/// Chunk default untuk `read_all_from_socket`
pub const DEFAULT_READ_CHUNK: usize = 4096;
/// Chunk default untuk `read_all_with_progress`
pub const DEFAULT_PROGRESS_CHUNK: usize = 1024;
/// Chunk tetap untuk `read_bounded`
pub const DEFAULT_BOUNDED_CHUNK: usize = 1024;

/// I/O configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoConfig {
    pub poll_interval: Duration,
    pub send_backoff: Duration,
    pub format_capacity: usize,
    pub read_chunk: usize,
    pub progress_chunk: usize,
    pub bounded_chunk: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            send_backoff: DEFAULT_SEND_BACKOFF,
            format_capacity: DEFAULT_FORMAT_CAPACITY,
            read_chunk: DEFAULT_READ_CHUNK,
            progress_chunk: DEFAULT_PROGRESS_CHUNK,
            bounded_chunk: DEFAULT_BOUNDED_CHUNK,
        }
    }
}

impl IoConfig {
    /// Ganti interval poll. Interval nol dinaikkan ke 1ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_send_backoff(mut self, backoff: Duration) -> Self {
        self.send_backoff = backoff;
        self
    }

    pub fn with_format_capacity(mut self, capacity: usize) -> Self {
        self.format_capacity = capacity;
        self
    }

    /// Ganti ukuran chunk default. Nilai nol dinaikkan ke 1 byte.
    pub fn with_read_chunks(mut self, read: usize, progress: usize, bounded: usize) -> Self {
        self.read_chunk = read.max(1);
        self.progress_chunk = progress.max(1);
        self.bounded_chunk = bounded.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IoConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.send_backoff, Duration::from_millis(1));
        assert_eq!(config.format_capacity, 2048);
        assert_eq!(config.read_chunk, 4096);
        assert_eq!(config.progress_chunk, 1024);
        assert_eq!(config.bounded_chunk, 1024);
    }

    #[test]
    fn test_builders_clamp_zero() {
        let config = IoConfig::default()
            .with_poll_interval(Duration::ZERO)
            .with_read_chunks(0, 0, 0);
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.read_chunk, 1);
        assert_eq!(config.progress_chunk, 1);
        assert_eq!(config.bounded_chunk, 1);
    }
}
