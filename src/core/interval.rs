//! Periodic background worker with cooperative cancellation
//!
//! An [`IntervalTask`] runs its action, sleeps for the period and repeats.
//! Cancellation is observed at the top of each iteration and before each
//! sleep; an action that is running when cancellation arrives always
//! finishes. A cancelled sleep ends early.

use super::error::{LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct TokenInner {
    cancelled: AtomicBool,
    // Dropped on cancel; sleepers waiting on `wake_rx` see a disconnect.
    wake_tx: Mutex<Option<Sender<()>>>,
    wake_rx: Receiver<()>,
}

/// Cancellation signal shared between a task and its owner
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(0);
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                wake_tx: Mutex::new(Some(wake_tx)),
                wake_rx,
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        drop(self.inner.wake_tx.lock().take());
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `period` unless cancelled first. Returns `true` if cancelled.
    pub fn wait_timeout(&self, period: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.inner.wake_rx.recv_timeout(period) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_cancelled(),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler for errors and panics escaping a task action
pub type TaskErrorHandler = Arc<dyn Fn(LoggerError) + Send + Sync>;

/// A background thread invoking an action at a fixed period
///
/// # Example
///
/// ```
/// use rust_log_spooler::core::{IntervalTask, LoggerError};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let ticks = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&ticks);
/// let task = IntervalTask::start(
///     "ticker",
///     Duration::from_millis(5),
///     move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     },
///     Arc::new(|err: LoggerError| eprintln!("{}", err)),
/// )
/// .unwrap();
///
/// std::thread::sleep(Duration::from_millis(30));
/// assert!(task.stop(Duration::from_secs(1)));
/// assert!(ticks.load(Ordering::Relaxed) >= 1);
/// ```
pub struct IntervalTask {
    name: String,
    period: Duration,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl IntervalTask {
    /// Spawn the worker thread. The first invocation happens immediately.
    pub fn start<F>(
        name: impl Into<String>,
        period: Duration,
        action: F,
        on_error: TaskErrorHandler,
    ) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let name = name.into();
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let worker_name = name.clone();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(&worker_name, period, &worker_token, action, &on_error))
            .map_err(|e| {
                LoggerError::io_operation(
                    "spawning interval task",
                    format!("Failed to start '{}'", name),
                    e,
                )
            })?;

        Ok(Self {
            name,
            period,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request cancellation; the current iteration still completes
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel and wait up to `timeout` for the worker to exit.
    ///
    /// Returns `false` if the worker is still running after the timeout or
    /// if it panicked outside the action.
    pub fn stop(mut self, timeout: Duration) -> bool {
        self.token.cancel();
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[SPOOLER ERROR] Interval task '{}' panicked: {:?}", self.name, e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[SPOOLER WARNING] Interval task '{}' did not finish within {:?}.",
                    self.name, timeout
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        // Detach; the worker exits after its current iteration.
        self.token.cancel();
    }
}

fn run_loop<F>(
    name: &str,
    period: Duration,
    token: &CancellationToken,
    mut action: F,
    on_error: &TaskErrorHandler,
) where
    F: FnMut() -> Result<()>,
{
    loop {
        if token.is_cancelled() {
            break;
        }

        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(&mut action)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => on_error(e),
            Err(panic_info) => on_error(LoggerError::worker_panic(name, &*panic_info)),
        }

        if token.wait_timeout(period) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn collecting_handler() -> (TaskErrorHandler, Arc<Mutex<Vec<String>>>) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let handler: TaskErrorHandler =
            Arc::new(move |e: LoggerError| sink.lock().push(e.to_string()));
        (handler, errors)
    }

    #[test]
    fn test_token_wait_returns_on_cancel() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let cancelled = waiter.wait_timeout(Duration::from_secs(10));
            (cancelled, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        token.cancel();
        let (cancelled, elapsed) = handle.join().unwrap();
        assert!(cancelled);
        assert!(elapsed < Duration::from_secs(5));
        assert!(token.wait_timeout(Duration::from_secs(10)));
    }

    #[test]
    fn test_token_wait_times_out() {
        let token = CancellationToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(5)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_task_runs_repeatedly_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let (handler, errors) = collecting_handler();

        let task = IntervalTask::start(
            "test-ticker",
            Duration::from_millis(2),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            handler,
        )
        .unwrap();
        assert_eq!(task.name(), "test-ticker");

        thread::sleep(Duration::from_millis(50));
        assert!(task.stop(Duration::from_secs(2)));

        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "only {} ticks", after_stop);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
        assert!(errors.lock().is_empty());
    }

    #[test]
    fn test_errors_and_panics_are_reported_and_schedule_continues() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let (handler, errors) = collecting_handler();

        let task = IntervalTask::start(
            "flaky",
            Duration::from_millis(1),
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                match n {
                    0 => Err(LoggerError::other("first tick failed")),
                    1 => panic!("second tick panicked"),
                    _ => Ok(()),
                }
            },
            handler,
        )
        .unwrap();

        let start = Instant::now();
        while ticks.load(Ordering::SeqCst) < 3 && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(task.stop(Duration::from_secs(2)));

        let errors = errors.lock();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "first tick failed");
        assert_eq!(errors[1], "Worker 'flaky' panicked: second tick panicked");
    }

    #[test]
    fn test_cancel_lets_running_action_finish() {
        let started = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let started_flag = Arc::clone(&started);
        let finished_flag = Arc::clone(&finished);
        let (handler, _) = collecting_handler();

        let task = IntervalTask::start(
            "slow",
            Duration::from_secs(60),
            move || {
                started_flag.store(true, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(30));
                finished_flag.store(true, Ordering::SeqCst);
                Ok(())
            },
            handler,
        )
        .unwrap();

        while !started.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        task.cancel();
        assert!(task.is_cancelled());
        assert!(task.stop(Duration::from_secs(2)));
        assert!(finished.load(Ordering::SeqCst));
    }
}
