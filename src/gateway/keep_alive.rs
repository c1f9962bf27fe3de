use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::events::{self, GatewayMessage};

/// Heartbeat scheduling and sequence bookkeeping for one session.
///
/// A cloneable handle over shared interior. Single writer per field:
/// the read loop bumps `sequence`, the heartbeat loop writes
/// `last_sent`, the ack handler only reads.
#[derive(Clone)]
pub struct KeepAlive {
    sequence: Arc<AtomicU64>,
    last_sent: Arc<Mutex<Option<Instant>>>,
}

impl KeepAlive {
    pub fn new() -> Self {
        Self {
            sequence: Arc::new(AtomicU64::new(0)),
            last_sent: Arc::new(Mutex::new(None)),
        }
    }

    /// Current dispatch sequence cursor.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Count one received dispatch frame. Returns the new cursor.
    pub fn bump_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn shared_sequence(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sequence)
    }

    /// Record that a heartbeat is being transmitted.
    pub async fn mark_sent(&self) {
        *self.last_sent.lock().await = Some(Instant::now());
    }

    /// Elapsed time since the most recent heartbeat send. `None` before
    /// the first heartbeat. Saturates at zero, never negative.
    pub async fn rtt_since_last_beat(&self) -> Option<Duration> {
        self.last_sent
            .lock()
            .await
            .map(|sent| Instant::now().saturating_duration_since(sent))
    }

    /// Start the heartbeat loop as an independent task.
    ///
    /// Sleeps `interval` between iterations and queues
    /// `{op: HEARTBEAT, d: sequence}` on the outbound channel. Exits as
    /// soon as the channel is closed (writer gone or session torn
    /// down) instead of retrying against a dead transport; the caller
    /// aborts the returned handle on teardown.
    pub fn start(
        &self,
        interval: Duration,
        outbound: mpsc::UnboundedSender<GatewayMessage>,
    ) -> JoinHandle<()> {
        let keep_alive = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let seq = keep_alive.sequence();
                keep_alive.mark_sent().await;
                if outbound.send(events::heartbeat(seq)).is_err() {
                    tracing::debug!("outbound channel closed, heartbeat loop stopping");
                    break;
                }
                tracing::trace!(sequence = seq, "heartbeat sent");
            }
        })
    }
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_counts_up_by_one() {
        let ka = KeepAlive::new();
        assert_eq!(ka.sequence(), 0);
        assert_eq!(ka.bump_sequence(), 1);
        assert_eq!(ka.bump_sequence(), 2);
        assert_eq!(ka.sequence(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_rtt_before_first_beat() {
        let ka = KeepAlive::new();
        assert_eq!(ka.rtt_since_last_beat().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rtt_measures_from_last_send() {
        let ka = KeepAlive::new();
        ka.mark_sent().await;
        tokio::time::advance(Duration::from_millis(120)).await;
        assert_eq!(
            ka.rtt_since_last_beat().await,
            Some(Duration::from_millis(120))
        );

        // a newer send supersedes the old timestamp
        ka.mark_sent().await;
        tokio::time::advance(Duration::from_millis(5)).await;
        assert_eq!(
            ka.rtt_since_last_beat().await,
            Some(Duration::from_millis(5))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeats_carry_current_sequence() {
        let ka = KeepAlive::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ka.start(Duration::from_secs_f64(41.25), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.op, 1);
        assert_eq!(first.d.unwrap(), 0);

        ka.bump_sequence();
        ka.bump_sequence();
        let second = rx.recv().await.unwrap();
        assert_eq!(second.d.unwrap(), 2);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_when_channel_closes() {
        let ka = KeepAlive::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ka.start(Duration::from_secs(1), tx);
        drop(rx);

        // next tick hits the closed channel and the task exits on its own
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("heartbeat loop should stop")
            .unwrap();
    }
}
