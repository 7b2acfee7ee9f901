//! Poll scheduler: repeating refresh triggers with a debounce gate.
//!
//! Two periodic triggers drive the session: the dashboard snapshot cycle
//! and the unread-feedback count. Dashboard triggers, periodic or forced,
//! pass through a single debounce window; a trigger arriving while one is
//! pending replaces it, so a burst of admin actions produces exactly one
//! refresh. The debounce timer is the only cancellable one. Periodic
//! triggers keep firing regardless of what the debounce gate is doing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep};

/// What the session should refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Dashboard,
    UnreadCount,
}

pub struct PollScheduler {
    trigger_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl PollScheduler {
    /// Start the timer task. Ticks arrive on the returned channel: an
    /// unread tick immediately, then the first dashboard tick one debounce
    /// window after startup.
    pub fn spawn(
        dashboard_interval: Duration,
        unread_interval: Duration,
        debounce_window: Duration,
    ) -> (Self, mpsc::Receiver<Tick>) {
        let (tick_tx, tick_rx) = mpsc::channel(8);
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel::<()>();

        let task = tokio::spawn(async move {
            let mut dashboard = interval(dashboard_interval);
            dashboard.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut unread = interval(unread_interval);
            unread.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let debounce = sleep(Duration::ZERO);
            tokio::pin!(debounce);
            let mut armed = false;

            loop {
                tokio::select! {
                    _ = dashboard.tick() => {
                        debounce.as_mut().reset(Instant::now() + debounce_window);
                        armed = true;
                    }
                    _ = unread.tick() => {
                        if tick_tx.send(Tick::UnreadCount).await.is_err() {
                            break;
                        }
                    }
                    maybe = trigger_rx.recv() => match maybe {
                        Some(()) => {
                            debounce.as_mut().reset(Instant::now() + debounce_window);
                            armed = true;
                        }
                        None => break,
                    },
                    _ = &mut debounce, if armed => {
                        armed = false;
                        if tick_tx.send(Tick::Dashboard).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { trigger_tx, task }, tick_rx)
    }

    /// Force a dashboard refresh. Used by the action dispatcher after every
    /// mutation, successful or not.
    pub fn trigger_dashboard(&self) {
        // Send failure means the timer task is gone and the session is
        // shutting down anyway.
        let _ = self.trigger_tx.send(());
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHBOARD: Duration = Duration::from_secs(15);
    const UNREAD: Duration = Duration::from_secs(30);
    const DEBOUNCE: Duration = Duration::from_millis(1000);

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_emits_unread_then_debounced_dashboard() {
        let start = Instant::now();
        let (_scheduler, mut ticks) = PollScheduler::spawn(DASHBOARD, UNREAD, DEBOUNCE);

        assert_eq!(ticks.recv().await, Some(Tick::UnreadCount));
        assert_eq!(start.elapsed(), Duration::ZERO);

        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));
        assert_eq!(start.elapsed(), DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_dashboard_and_unread_ticks() {
        let start = Instant::now();
        let (_scheduler, mut ticks) = PollScheduler::spawn(DASHBOARD, UNREAD, DEBOUNCE);

        assert_eq!(ticks.recv().await, Some(Tick::UnreadCount));
        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));

        // The 15s periodic trigger, also debounced.
        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));
        assert_eq!(start.elapsed(), DASHBOARD + DEBOUNCE);

        assert_eq!(ticks.recv().await, Some(Tick::UnreadCount));
        assert_eq!(start.elapsed(), UNREAD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_burst_collapses_to_one_tick() {
        let (scheduler, mut ticks) = PollScheduler::spawn(DASHBOARD, UNREAD, DEBOUNCE);
        assert_eq!(ticks.recv().await, Some(Tick::UnreadCount));
        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));

        let burst_start = Instant::now();
        scheduler.trigger_dashboard();
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        scheduler.trigger_dashboard();
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        scheduler.trigger_dashboard();
        settle().await;

        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));
        // One tick, one debounce window after the last trigger.
        assert_eq!(burst_start.elapsed(), Duration::from_millis(200) + DEBOUNCE);

        // Nothing else until the next periodic trigger.
        let before = Instant::now();
        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));
        assert!(before.elapsed() > Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_replaces_pending_interval_tick() {
        let (scheduler, mut ticks) = PollScheduler::spawn(DASHBOARD, UNREAD, DEBOUNCE);
        assert_eq!(ticks.recv().await, Some(Tick::UnreadCount));
        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));

        // Jump to just after the periodic trigger armed the debounce, then
        // force a refresh. The pending invocation is replaced, not queued.
        tokio::time::advance(DASHBOARD - DEBOUNCE + Duration::from_millis(500)).await;
        settle().await;
        let forced_at = Instant::now();
        scheduler.trigger_dashboard();
        settle().await;

        assert_eq!(ticks.recv().await, Some(Tick::Dashboard));
        assert_eq!(forced_at.elapsed(), DEBOUNCE);
    }
}
