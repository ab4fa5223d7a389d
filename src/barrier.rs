// src/barrier.rs
//! Running-actor counter with a blocking wait.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts actors currently considered running and lets threads block until
/// that count reaches zero or one.
///
/// Mutators change the count while holding the monitor lock and then notify
/// every waiter; waiters re-check the count after each wakeup. A change can
/// therefore never slip in between a waiter's check and its sleep.
///
/// Once closed, the count stays at zero and both mutators are no-ops.
#[derive(Default)]
pub struct RunningBarrier {
    running: AtomicUsize,
    /// Closed flag; also the monitor lock.
    lock: Mutex<bool>,
    changed: Condvar,
}

impl RunningBarrier {
    /// Open barrier with a count of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one running actor and wake all waiters.
    pub fn inc_running(&self) {
        let closed = self.lock.lock();
        if *closed {
            return;
        }
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(running = now, "running count incremented");
        self.changed.notify_all();
    }

    /// Callers must pair every decrement with an earlier increment. An
    /// unpaired decrement saturates at zero instead of wrapping.
    pub fn dec_running(&self) {
        let closed = self.lock.lock();
        if *closed {
            return;
        }
        match self
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(prev) => tracing::trace!(running = prev - 1, "running count decremented"),
            Err(_) => {
                tracing::error!("dec_running called with no running actors");
                debug_assert!(false, "unpaired dec_running");
            }
        }
        self.changed.notify_all();
    }

    /// Snapshot of the count; never blocks.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Block until the count equals `expected`, which must be 0 or 1.
    ///
    /// There is no timeout: if the count never gets there, this never
    /// returns. See [`Self::await_running_count_equal_timeout`].
    pub fn await_running_count_equal(&self, expected: usize) {
        assert!(expected <= 1, "expected running count must be 0 or 1");
        let mut guard = self.lock.lock();
        while self.running() != expected {
            self.changed.wait(&mut guard);
        }
    }

    /// Like [`Self::await_running_count_equal`], giving up after `timeout`.
    /// Returns whether the count was reached.
    pub fn await_running_count_equal_timeout(&self, expected: usize, timeout: Duration) -> bool {
        assert!(expected <= 1, "expected running count must be 0 or 1");
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        while self.running() != expected {
            if self.changed.wait_until(&mut guard, deadline).timed_out() {
                return self.running() == expected;
            }
        }
        true
    }

    /// Force the count to zero for good and wake everyone. Used on registry
    /// stop.
    pub(crate) fn close(&self) {
        let mut closed = self.lock.lock();
        *closed = true;
        self.running.store(0, Ordering::SeqCst);
        self.changed.notify_all();
    }

    /// True once `close` has run.
    pub fn is_closed(&self) -> bool {
        *self.lock.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counts_up_and_down() {
        let barrier = RunningBarrier::new();
        assert_eq!(barrier.running(), 0);
        barrier.inc_running();
        assert_eq!(barrier.running(), 1);
        barrier.dec_running();
        assert_eq!(barrier.running(), 0);
    }

    #[test]
    fn zero_wait_returns_immediately() {
        let barrier = RunningBarrier::new();
        barrier.await_running_count_equal(0);
    }

    #[test]
    fn waiter_sees_the_decrement() {
        let barrier = Arc::new(RunningBarrier::new());
        barrier.inc_running();
        let decremented = Arc::new(AtomicBool::new(false));

        let worker = {
            let barrier = barrier.clone();
            let decremented = decremented.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                decremented.store(true, Ordering::SeqCst);
                barrier.dec_running();
            })
        };

        barrier.await_running_count_equal(0);
        assert!(decremented.load(Ordering::SeqCst));
        worker.join().unwrap();
    }

    #[test]
    fn waits_for_exactly_one() {
        let barrier = Arc::new(RunningBarrier::new());
        let worker = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.inc_running())
        };
        barrier.await_running_count_equal(1);
        assert_eq!(barrier.running(), 1);
        worker.join().unwrap();
    }

    #[test]
    fn timeout_expires_when_count_is_stuck() {
        let barrier = RunningBarrier::new();
        barrier.inc_running();
        assert!(!barrier.await_running_count_equal_timeout(0, Duration::from_millis(20)));
        assert!(barrier.await_running_count_equal_timeout(1, Duration::from_millis(20)));
    }

    #[test]
    fn close_releases_zero_waiters() {
        let barrier = Arc::new(RunningBarrier::new());
        barrier.inc_running();
        barrier.inc_running();
        let waiter = {
            let barrier = barrier.clone();
            thread::spawn(move || barrier.await_running_count_equal(0))
        };
        thread::sleep(Duration::from_millis(20));
        barrier.close();
        waiter.join().unwrap();
        assert_eq!(barrier.running(), 0);
        assert!(barrier.is_closed());
    }

    #[test]
    fn closed_barrier_ignores_mutators() {
        let barrier = RunningBarrier::new();
        barrier.inc_running();
        barrier.close();

        // A late exit from before the close must not underflow.
        barrier.dec_running();
        assert_eq!(barrier.running(), 0);

        barrier.inc_running();
        barrier.dec_running();
        barrier.inc_running();
        assert_eq!(barrier.running(), 0);
        barrier.await_running_count_equal(0);
    }

    #[test]
    #[should_panic(expected = "0 or 1")]
    fn rejects_other_targets() {
        RunningBarrier::new().await_running_count_equal(2);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn unpaired_decrement_saturates() {
        let barrier = RunningBarrier::new();
        barrier.dec_running();
        assert_eq!(barrier.running(), 0);
    }
}
