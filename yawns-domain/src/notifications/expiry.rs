use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::engine::EngineCommand;
use super::types::NotificationId;

/// One single-shot countdown per active record.
///
/// Owned by the engine worker, so no locking: `start` and `cancel` only
/// run on the serialized mutation path. A fire is delivered as an
/// [`EngineCommand::Expired`] carrying the epoch it was armed with; the
/// worker drops fires whose epoch is stale, which closes the window where
/// a timer sends its command just before a re-arm aborts it.
pub(crate) struct ExpiryScheduler {
    commands: mpsc::Sender<EngineCommand>,
    timers: HashMap<NotificationId, (u64, JoinHandle<()>)>,
    next_epoch: u64,
}

impl ExpiryScheduler {
    pub fn new(commands: mpsc::Sender<EngineCommand>) -> Self {
        Self {
            commands,
            timers: HashMap::new(),
            next_epoch: 0,
        }
    }

    /// Arms or re-arms the countdown for `id`. Any pending fire for the
    /// same id is cancelled first.
    pub fn start(&mut self, id: NotificationId, duration: Duration) {
        self.cancel(id);
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let commands = self.commands.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if commands
                .send(EngineCommand::Expired { id, epoch })
                .await
                .is_err()
            {
                debug!(id, "engine gone before expiry fired");
            }
        });
        self.timers.insert(id, (epoch, handle));
    }

    /// Always safe, including for unknown or already-fired ids.
    pub fn cancel(&mut self, id: NotificationId) {
        if let Some((_, handle)) = self.timers.remove(&id) {
            handle.abort();
        }
    }

    /// Whether a delivered fire is the one currently armed for `id`.
    pub fn is_current(&self, id: NotificationId, epoch: u64) -> bool {
        self.timers
            .get(&id)
            .map(|(armed, _)| *armed == epoch)
            .unwrap_or(false)
    }

    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.timers.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Duration};

    fn expired_id(cmd: EngineCommand) -> Option<(NotificationId, u64)> {
        match cmd {
            EngineCommand::Expired { id, epoch } => Some((id, epoch)),
            _ => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_configured_duration() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = ExpiryScheduler::new(tx);
        scheduler.start(7, Duration::from_millis(5250));

        advance(Duration::from_millis(5249)).await;
        assert!(rx.try_recv().is_err());
        advance(Duration::from_millis(2)).await;
        let (id, epoch) = expired_id(rx.recv().await.unwrap()).unwrap();
        assert_eq!(id, 7);
        assert!(scheduler.is_current(7, epoch));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_pending_fire() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = ExpiryScheduler::new(tx);
        scheduler.start(1, Duration::from_millis(100));
        advance(Duration::from_millis(60)).await;
        scheduler.start(1, Duration::from_millis(100));

        // The original deadline passes without a fire.
        advance(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
        advance(Duration::from_millis(50)).await;
        let (id, epoch) = expired_id(rx.recv().await.unwrap()).unwrap();
        assert_eq!(id, 1);
        assert!(scheduler.is_current(1, epoch));
        // Exactly one fire in total.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = ExpiryScheduler::new(tx);
        scheduler.start(1, Duration::from_millis(100));
        scheduler.cancel(1);
        scheduler.cancel(1);
        scheduler.cancel(99);

        advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_epoch_is_detectable_after_rearm() {
        let (tx, _rx) = mpsc::channel(8);
        let mut scheduler = ExpiryScheduler::new(tx);
        scheduler.start(1, Duration::from_millis(100));
        let first_epoch = scheduler.timers[&1].0;
        scheduler.start(1, Duration::from_millis(100));
        assert!(!scheduler.is_current(1, first_epoch));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_silences_everything() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = ExpiryScheduler::new(tx);
        for id in 1..=5 {
            scheduler.start(id, Duration::from_millis(10));
        }
        scheduler.cancel_all();
        advance(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }
}
