//! Bounded formatting scratch
//!
//! Render `fmt::Arguments` ke area scratch dengan kapasitas tetap.
//! Output yang melebihi kapasitas dibuang, bukan di-panic.

use std::fmt::{self, Write};

/// Hasil render ke scratch
#[derive(Debug)]
pub(crate) struct Rendered {
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub failed: bool,
}

/// Scratch per-call, dialokasikan sekali dengan kapasitas penuh
struct BoundedScratch {
    buf: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

impl Write for BoundedScratch {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.buf.len();
        if s.len() > room {
            self.buf.extend_from_slice(&s.as_bytes()[..room]);
            self.truncated = true;
        } else {
            self.buf.extend_from_slice(s.as_bytes());
        }
        // Tetap Ok supaya sisa argumen tidak memicu error palsu
        Ok(())
    }
}

/// Render `args` dengan batas `capacity` byte.
pub(crate) fn render_bounded(capacity: usize, args: fmt::Arguments<'_>) -> Rendered {
    let mut scratch = BoundedScratch {
        buf: Vec::with_capacity(capacity),
        capacity,
        truncated: false,
    };
    let failed = scratch.write_fmt(args).is_err();

    Rendered {
        bytes: scratch.buf,
        truncated: scratch.truncated,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_fits() {
        let r = render_bounded(16, format_args!("{}-{}", 12, "ab"));
        assert_eq!(r.bytes, b"12-ab");
        assert!(!r.truncated);
        assert!(!r.failed);
    }

    #[test]
    fn test_exact_capacity_not_truncated() {
        let r = render_bounded(4, format_args!("abcd"));
        assert_eq!(r.bytes, b"abcd");
        assert!(!r.truncated);
    }

    #[test]
    fn test_truncates_at_capacity() {
        let r = render_bounded(4, format_args!("{}{}", "abc", "defg"));
        assert_eq!(r.bytes, b"abcd");
        assert!(r.truncated);
        assert!(!r.failed);
    }

    #[test]
    fn test_failed_display_keeps_prefix() {
        let r = render_bounded(32, format_args!("ok {}", Broken));
        assert_eq!(r.bytes, b"ok ");
        assert!(r.failed);
    }
}
