//! Animation Scheduler: Dedicated thread for periodic frame ticks.
//!
//! The scheduler calls its tick callback once immediately and then at a
//! fixed interval until stopped. Timing comes from a crossbeam `tick`
//! channel, whose single-slot buffer drops deadlines that pass while a tick
//! is still running instead of queueing them.

use crate::error::{AnimationError, Result};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Periodic tick driver running on its own thread.
pub struct AnimationScheduler {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Dropped to signal shutdown.
    stop: Option<Sender<()>>,
    /// Time between ticks.
    interval: Duration,
}

impl AnimationScheduler {
    /// Spawn a scheduler thread.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between ticks. The first tick is immediate.
    /// * `name` - Name for the ticker thread.
    /// * `on_tick` - Called once per tick, never concurrently with itself.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::InvalidInterval`] for a zero interval and
    /// [`AnimationError::Spawn`] if the thread cannot be created.
    pub fn start<F>(interval: Duration, name: String, on_tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(AnimationError::InvalidInterval);
        }

        // Never sent on; disconnecting it is the stop signal
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                Self::run_loop(&stop_rx, interval, on_tick);
            })?;

        Ok(Self {
            handle: Some(handle),
            stop: Some(stop_tx),
            interval,
        })
    }

    /// The configured tick interval.
    #[inline]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop ticking and wait for the thread to finish.
    ///
    /// A tick already in progress runs to completion; no tick starts after
    /// this returns. Calling it from inside a tick only signals the thread,
    /// which exits once the tick returns. Stopping twice is a no-op.
    pub fn stop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop<F: FnMut()>(stop: &Receiver<()>, interval: Duration, mut on_tick: F) {
        let ticker = tick(interval);
        on_tick();

        loop {
            select! {
                recv(stop) -> _ => break,
                recv(ticker) -> _ => {
                    // Both may be ready at once; stopping takes priority
                    if matches!(stop.try_recv(), Err(TryRecvError::Disconnected)) {
                        break;
                    }
                    on_tick();
                }
            }
        }
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn counting() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        (count, move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_zero_interval_rejected() {
        let (_, on_tick) = counting();
        let result = AnimationScheduler::start(Duration::ZERO, "t".to_string(), on_tick);
        assert!(matches!(result, Err(AnimationError::InvalidInterval)));
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let start = Instant::now();
        let mut scheduler = AnimationScheduler::start(
            Duration::from_secs(10),
            "first-tick".to_string(),
            move || {
                let _ = tx.send(Instant::now());
            },
        )
        .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(first - start < Duration::from_secs(1));
        scheduler.stop();
    }

    #[test]
    fn test_ticks_repeat() {
        let (count, on_tick) = counting();
        let mut scheduler =
            AnimationScheduler::start(Duration::from_millis(10), "repeat".to_string(), on_tick)
                .unwrap();
        assert_eq!(scheduler.interval(), Duration::from_millis(10));

        thread::sleep(Duration::from_millis(100));
        scheduler.stop();
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let (count, on_tick) = counting();
        let mut scheduler =
            AnimationScheduler::start(Duration::from_millis(5), "after-stop".to_string(), on_tick)
                .unwrap();
        thread::sleep(Duration::from_millis(30));
        scheduler.stop();

        let seen = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(count.load(Ordering::SeqCst), seen);

        // Idempotent
        scheduler.stop();
    }

    #[test]
    fn test_slow_ticks_are_skipped_not_queued() {
        let (count, _) = counting();
        let ticks = count.clone();
        let mut scheduler = AnimationScheduler::start(
            Duration::from_millis(5),
            "slow".to_string(),
            move || {
                ticks.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
            },
        )
        .unwrap();

        thread::sleep(Duration::from_millis(180));
        scheduler.stop();

        // 180ms of 50ms ticks is four at most; queueing would run many more
        assert!(count.load(Ordering::SeqCst) <= 5);
    }
}
