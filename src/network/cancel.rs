//! Cooperative cancellation
//!
//! Token di-sample oleh loop flush/fill setiap poll interval. Di unix,
//! `PollWaiter` yang di-bind juga dibangunkan langsung saat `cancel()`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(unix)]
use std::sync::{Mutex, PoisonError, Weak};

#[cfg(unix)]
use tracing::debug;

#[cfg(unix)]
use crate::LOG_TARGET;

#[derive(Default)]
struct Shared {
    cancelled: AtomicBool,
    #[cfg(unix)]
    // Weak: waiter yang sudah di-drop tidak boleh menahan eventfd-nya
    wakers: Mutex<Vec<Weak<mio::Waker>>>,
}

/// Token untuk membatalkan operasi blocking.
///
/// Clone-able dan thread-safe: satu clone dipegang thread I/O, clone lain
/// dipegang pihak yang ingin membatalkan.
#[derive(Clone, Default)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation dan bangunkan semua waiter yang di-bind.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);

        #[cfg(unix)]
        {
            let mut wakers = self.lock_wakers();
            wakers.retain(|weak| match weak.upgrade() {
                Some(waker) => {
                    if let Err(err) = waker.wake() {
                        debug!(target: LOG_TARGET, error = %err, "failed to wake poll waiter");
                    }
                    true
                }
                None => false,
            });
        }
    }

    /// Reset ke status belum dibatalkan. Waker yang sudah di-bind tetap.
    pub fn reset(&self) {
        self.shared.cancelled.store(false, Ordering::SeqCst);
    }

    /// Simpan waker sebagai `Weak`; entry milik waiter yang sudah di-drop
    /// dibuang di sini dan di `cancel()`.
    #[cfg(unix)]
    pub(crate) fn register_waker(&self, waker: &Arc<mio::Waker>) {
        let mut wakers = self.lock_wakers();
        wakers.retain(|known| known.strong_count() > 0);
        if !wakers.iter().any(|known| known.as_ptr() == Arc::as_ptr(waker)) {
            wakers.push(Arc::downgrade(waker));
        }
    }

    #[cfg(unix)]
    fn lock_wakers(&self) -> std::sync::MutexGuard<'_, Vec<Weak<mio::Waker>>> {
        self.shared
            .wakers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clones() {
        let token = CancelToken::new();
        let remote = token.clone();

        thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn test_bind_is_idempotent() {
        let waiter = crate::network::PollWaiter::new().unwrap();
        let token = CancelToken::new();
        waiter.bind(&token);
        waiter.bind(&token);
        assert_eq!(token.shared.wakers.lock().unwrap().len(), 1);
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn test_dropped_waiters_are_released() {
        let token = CancelToken::new();
        let mut weak_wakers = Vec::new();
        for _ in 0..200 {
            let waiter = crate::network::PollWaiter::new().unwrap();
            waiter.bind(&token);
            weak_wakers.push(Arc::downgrade(&waiter.waker));
        }

        // Token tidak menahan waker (dan eventfd-nya) setelah waiter di-drop
        assert!(weak_wakers.iter().all(|weak| weak.upgrade().is_none()));

        let live = crate::network::PollWaiter::new().unwrap();
        live.bind(&token);
        assert_eq!(token.shared.wakers.lock().unwrap().len(), 1);

        drop(live);
        token.cancel();
        assert!(token.shared.wakers.lock().unwrap().is_empty());
    }
}
