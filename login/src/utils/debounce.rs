//! Debounce utility for superseding rapid input.
//!
//! A [`Debouncer`] holds at most one pending value per key. Each new value for
//! a key replaces the pending one and restarts its timer; only a value that
//! survives a full quiet interval is emitted. This is the building block for
//! live validation: every keystroke supersedes the previous check.
//!
//! # Architecture
//!
//! A background task owns the pending map. Callers talk to it over a channel:
//!
//! 1. `send(key, value)` replaces the pending value and resets the deadline
//! 2. `cancel(key)` drops the pending value without emitting it
//! 3. When a deadline passes, the value is emitted on the output channel
//!
//! Dropping the debouncer closes the input channel; pending values are
//! discarded, not flushed.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//! use login_form::utils::debounce::Debouncer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (output_tx, mut output_rx) = mpsc::channel(16);
//!     let debouncer = Debouncer::new(Duration::from_millis(300), output_tx);
//!
//!     debouncer.send("email", "adm".to_string()).await.unwrap();
//!     debouncer.send("email", "admin@".to_string()).await.unwrap();
//!
//!     // Only the last value survives the quiet interval
//!     let (_, value) = output_rx.recv().await.unwrap();
//!     assert_eq!(value, "admin@");
//! }
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Capacity of the input channel.
const INPUT_CHANNEL_CAPACITY: usize = 256;

/// Error type for debouncer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DebouncerError {
    /// The debouncer's background task has stopped.
    #[error("debouncer channel closed")]
    ChannelClosed,
}

enum Command<K, V> {
    Put(K, V),
    Cancel(K),
}

/// A value waiting for its quiet interval to pass.
#[derive(Debug)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

/// A debouncer where each value supersedes the pending one for its key.
///
/// # Type Parameters
///
/// * `K` - The key type used to group values (e.g. a form field)
/// * `V` - The value type
#[derive(Debug)]
pub struct Debouncer<K, V>
where
    K: Clone + Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    input_tx: mpsc::Sender<Command<K, V>>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl<K, V> std::fmt::Debug for Command<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Put(..) => f.write_str("Put"),
            Self::Cancel(..) => f.write_str("Cancel"),
        }
    }
}

impl<K, V> Debouncer<K, V>
where
    K: Clone + Eq + Hash + Send + std::fmt::Debug + 'static,
    V: Send + 'static,
{
    /// Creates a new debouncer with the specified quiet interval.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `interval` - How long a value must go unsuperseded before it is emitted
    /// * `output_tx` - Channel for emitting surviving values
    #[must_use]
    pub fn new(interval: Duration, output_tx: mpsc::Sender<(K, V)>) -> Self {
        let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

        let task_handle = tokio::spawn(async move {
            run_debounce_loop(interval, input_rx, output_tx).await;
        });

        Self {
            input_tx,
            task_handle,
        }
    }

    /// Sends a value, superseding any pending value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `DebouncerError::ChannelClosed` if the background task has
    /// terminated.
    pub async fn send(&self, key: K, value: V) -> Result<(), DebouncerError> {
        self.input_tx
            .send(Command::Put(key, value))
            .await
            .map_err(|_| DebouncerError::ChannelClosed)
    }

    /// Attempts to send a value without waiting.
    ///
    /// Returns `true` if the value was queued, `false` if the channel is
    /// full or closed.
    pub fn try_send(&self, key: K, value: V) -> bool {
        self.input_tx.try_send(Command::Put(key, value)).is_ok()
    }

    /// Drops the pending value for `key`, if any, without emitting it.
    ///
    /// Returns `true` if the request was queued.
    pub fn cancel(&self, key: K) -> bool {
        self.input_tx.try_send(Command::Cancel(key)).is_ok()
    }
}

impl<K, V> Drop for Debouncer<K, V>
where
    K: Clone + Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}

/// Runs the debounce loop until the input channel closes.
async fn run_debounce_loop<K, V>(
    interval: Duration,
    mut input_rx: mpsc::Receiver<Command<K, V>>,
    output_tx: mpsc::Sender<(K, V)>,
) where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    let mut pending: HashMap<K, Pending<V>> = HashMap::new();

    debug!(interval_ms = interval.as_millis(), "Starting debounce loop");

    loop {
        let next_deadline = pending.values().map(|p| p.deadline).min();

        tokio::select! {
            command = input_rx.recv() => {
                match command {
                    Some(Command::Put(key, value)) => {
                        trace!(key = ?key, "Value superseded, resetting deadline");
                        let deadline = Instant::now() + interval;
                        pending.insert(key, Pending { value, deadline });
                    }
                    Some(Command::Cancel(key)) => {
                        if pending.remove(&key).is_some() {
                            trace!(key = ?key, "Pending value cancelled");
                        }
                    }
                    None => {
                        debug!(
                            discarded = pending.len(),
                            "Input channel closed, discarding pending values"
                        );
                        break;
                    }
                }
            }

            () = async {
                match next_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                emit_expired(&mut pending, &output_tx).await;
            }
        }
    }

    debug!("Debounce loop terminated");
}

/// Emits all values whose deadlines have passed.
async fn emit_expired<K, V>(pending: &mut HashMap<K, Pending<V>>, output_tx: &mpsc::Sender<(K, V)>)
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    let now = Instant::now();

    let expired: Vec<K> = pending
        .iter()
        .filter(|(_, p)| p.deadline <= now)
        .map(|(key, _)| key.clone())
        .collect();

    for key in expired {
        if let Some(p) = pending.remove(&key) {
            trace!(key = ?key, "Emitting debounced value");
            if output_tx.send((key.clone(), p.value)).await.is_err() {
                warn!(key = ?key, "Debounce output channel closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    fn test_debouncer<K, V>(interval_ms: u64) -> (Debouncer<K, V>, mpsc::Receiver<(K, V)>)
    where
        K: Clone + Eq + Hash + Send + std::fmt::Debug + 'static,
        V: Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(Duration::from_millis(interval_ms), tx);
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_value_emitted_after_interval() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(300);

        debouncer.send("email", 1).await.unwrap();

        let result = timeout(Duration::from_millis(400), rx.recv()).await;
        assert_eq!(result.unwrap(), Some(("email", 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_emitted_before_interval() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(300);

        debouncer.send("email", 1).await.unwrap();

        let early = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(early.is_err(), "Should not emit before the interval");

        let late = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(late.is_ok(), "Should emit after the interval");
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_value_supersedes_pending() {
        let (debouncer, mut rx) = test_debouncer::<&str, String>(300);

        debouncer.send("email", "a".to_string()).await.unwrap();
        sleep(Duration::from_millis(200)).await;
        debouncer.send("email", "ab".to_string()).await.unwrap();
        sleep(Duration::from_millis(200)).await;
        debouncer.send("email", "abc".to_string()).await.unwrap();

        let (key, value) = timeout(Duration::from_millis(400), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, "email");
        assert_eq!(value, "abc");

        let more = timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(more.is_err(), "Superseded values must not be emitted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(100);

        debouncer.send("a", 1).await.unwrap();
        debouncer.send("b", 10).await.unwrap();
        debouncer.send("a", 2).await.unwrap();

        let mut received = HashMap::new();
        for _ in 0..2 {
            if let Ok(Some((key, value))) = timeout(Duration::from_millis(200), rx.recv()).await {
                received.insert(key, value);
            }
        }

        assert_eq!(received.len(), 2);
        assert_eq!(received.get("a"), Some(&2));
        assert_eq!(received.get("b"), Some(&10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(100);

        debouncer.send("email", 1).await.unwrap();
        assert!(debouncer.cancel("email"));

        let result = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(result.is_err(), "Cancelled value must not be emitted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(100);

        debouncer.send("email", 1).await.unwrap();
        drop(debouncer);

        let result = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(
            !matches!(result, Ok(Some(_))),
            "Dropped debouncer must not emit"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_send() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(50);

        assert!(debouncer.try_send("email", 42));

        let result = timeout(Duration::from_millis(200), rx.recv()).await;
        assert_eq!(result.unwrap(), Some(("email", 42)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_values_both_emitted() {
        let (debouncer, mut rx) = test_debouncer::<&str, i32>(50);

        debouncer.send("email", 1).await.unwrap();
        let first = timeout(Duration::from_millis(200), rx.recv()).await;
        assert_eq!(first.unwrap(), Some(("email", 1)));

        debouncer.send("email", 2).await.unwrap();
        let second = timeout(Duration::from_millis(200), rx.recv()).await;
        assert_eq!(second.unwrap(), Some(("email", 2)));
    }

    #[test]
    fn test_debouncer_error_display() {
        assert_eq!(
            DebouncerError::ChannelClosed.to_string(),
            "debouncer channel closed"
        );
    }
}
