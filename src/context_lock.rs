//! Single-holder exclusive lock keyed by context tokens.
//!
//! The lock is a monitor: the holder token sits behind a `Mutex` and blocked acquirers
//! wait on a `Condvar`. Releasing wakes every waiter; each re-attempts the claim under
//! the mutex, so exactly one of them wins and the rest go back to waiting. There is no
//! fairness, no timeout and no reentrancy beyond token equality.

use std::sync::{Condvar, Mutex, MutexGuard};

/// Exclusive lock whose holder is identified by an opaque string token.
///
/// # Examples
///
/// ```rust
/// use stamplog::ContextLock;
///
/// let lock = ContextLock::new();
/// assert!(lock.try_acquire("req-1"));
/// assert!(!lock.try_acquire("req-2"));
/// assert_eq!(lock.holder().as_deref(), Some("req-1"));
///
/// lock.release();
/// assert!(!lock.is_locked());
/// ```
#[derive(Debug, Default)]
pub struct ContextLock {
    /// Empty string means unlocked.
    holder: Mutex<String>,
    released: Condvar,
}

impl ContextLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, String> {
        self.holder.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Check-and-set on an already locked state.
    ///
    /// The empty token never takes the lock; it only passes while the lock is free.
    fn claim(holder: &mut String, token: &str) -> bool {
        if holder.is_empty() {
            holder.push_str(token);
            true
        } else {
            holder == token
        }
    }

    /// Takes the lock for `token` if it is free, without blocking.
    ///
    /// Returns `true` when the lock is now held by `token`, including when `token`
    /// already held it.
    pub fn try_acquire(&self, token: &str) -> bool {
        Self::claim(&mut self.state(), token)
    }

    /// Blocks until the lock can be taken for `token`.
    ///
    /// Waiting is cooperative (condition variable), never a spin. There is no timeout:
    /// a holder that never releases blocks every other token forever.
    pub fn acquire(&self, token: &str) {
        let mut holder = self.state();
        while !Self::claim(&mut holder, token) {
            tracing::trace!(token, holder = holder.as_str(), "blocked on context lock");
            holder = self
                .released
                .wait(holder)
                .unwrap_or_else(|p| p.into_inner());
        }
        tracing::trace!(token, "context lock acquired");
    }

    /// Acquires the lock and returns a guard that releases it when dropped.
    pub fn lock(&self, token: impl Into<String>) -> ContextGuard<'_> {
        let token = token.into();
        self.acquire(&token);
        ContextGuard { lock: self, token }
    }

    /// Clears the holder unconditionally and wakes every waiter.
    ///
    /// Returns the token that held the lock, if any.
    pub fn release(&self) -> Option<String> {
        let previous = std::mem::take(&mut *self.state());
        self.released.notify_all();
        if previous.is_empty() {
            None
        } else {
            tracing::trace!(token = previous.as_str(), "context lock released");
            Some(previous)
        }
    }

    /// Releases the lock only if `token` holds it.
    fn release_held(&self, token: &str) -> bool {
        let mut holder = self.state();
        if holder.is_empty() || *holder != token {
            return false;
        }
        holder.clear();
        drop(holder);
        self.released.notify_all();
        tracing::trace!(token, "context lock released");
        true
    }

    /// The current holder token, `None` when unlocked.
    pub fn holder(&self) -> Option<String> {
        let holder = self.state();
        if holder.is_empty() {
            None
        } else {
            Some(holder.clone())
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.state().is_empty()
    }
}

/// Holds a [`ContextLock`] on behalf of one token until dropped.
///
/// Dropping the guard releases the lock on every exit path, including unwinding.
/// If the lock was meanwhile force-released and taken by another token, dropping the
/// guard leaves the new holder in place.
#[must_use = "the context lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard<'a> {
    lock: &'a ContextLock,
    token: String,
}

impl ContextGuard<'_> {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_held(&self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_try_acquire_and_release() {
        let lock = ContextLock::new();
        assert!(!lock.is_locked());
        assert_eq!(lock.holder(), None);

        assert!(lock.try_acquire("X"));
        assert!(lock.try_acquire("X"));
        assert!(!lock.try_acquire("Y"));
        assert_eq!(lock.holder().as_deref(), Some("X"));

        assert_eq!(lock.release().as_deref(), Some("X"));
        assert_eq!(lock.release(), None);
        assert!(lock.try_acquire("Y"));
    }

    #[test]
    fn test_empty_token_never_holds() {
        let lock = ContextLock::new();
        assert!(lock.try_acquire(""));
        assert!(!lock.is_locked());

        lock.acquire("X");
        assert!(!lock.try_acquire(""));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = ContextLock::new();
        {
            let guard = lock.lock("X");
            assert_eq!(guard.token(), "X");
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let lock = Arc::new(ContextLock::new());
        let lock_clone = lock.clone();

        let result = thread::spawn(move || {
            let _guard = lock_clone.lock("X");
            panic!("boom");
        })
        .join();

        assert!(result.is_err());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_stale_guard_keeps_new_holder() {
        let lock = ContextLock::new();
        let guard = lock.lock("X");

        lock.release();
        assert!(lock.try_acquire("Y"));

        drop(guard);
        assert_eq!(lock.holder().as_deref(), Some("Y"));
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let lock = Arc::new(ContextLock::new());
        lock.acquire("X");

        let (tx, rx) = mpsc::channel();
        let lock_clone = lock.clone();
        let handle = thread::spawn(move || {
            lock_clone.acquire("Y");
            tx.send(()).unwrap();
        });

        // Y must still be waiting while X holds the lock
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(lock.holder().as_deref(), Some("X"));

        lock.release();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
        assert_eq!(lock.holder().as_deref(), Some("Y"));
    }

    #[test]
    fn test_single_winner_per_release() {
        const WAITERS: usize = 4;

        let lock = Arc::new(ContextLock::new());
        lock.acquire("holder");

        let barrier = Arc::new(Barrier::new(WAITERS + 1));
        let proceeded = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        let handles: Vec<_> = (0..WAITERS)
            .map(|i| {
                let lock = lock.clone();
                let barrier = barrier.clone();
                let proceeded = proceeded.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    let token = format!("waiter-{}", i);
                    barrier.wait();
                    lock.acquire(&token);
                    proceeded.fetch_add(1, Ordering::SeqCst);
                    tx.send(token).unwrap();
                })
            })
            .collect();

        barrier.wait();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(proceeded.load(Ordering::SeqCst), 0);

        for round in 1..=WAITERS {
            lock.release();
            let winner = rx.recv_timeout(Duration::from_secs(5)).unwrap();

            // The others stay blocked until the winner releases
            thread::sleep(Duration::from_millis(50));
            assert_eq!(proceeded.load(Ordering::SeqCst), round);
            assert_eq!(lock.holder(), Some(winner));
        }

        lock.release();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
