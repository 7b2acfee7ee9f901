//! Session coordinator: one object owning the gateway, store, UI state
//! and scheduler for the lifetime of a dashboard run.
//!
//! The run loop selects over scheduler ticks and queued commands. A
//! dashboard tick reads the four snapshot endpoints concurrently, applies
//! the store cycle only after all of them settle, then renders. An
//! expired session is a loop exit value, never a side effect: the caller
//! decides what re-authentication looks like.

use tokio::sync::mpsc;

use crate::config::Config;
use crate::dispatch::{self, AdminAction};
use crate::error::Result;
use crate::gateway::{Fetch, Gateway, WriteOutcome};
use crate::render::map::{RouteLine, RouteService};
use crate::render::{self, View};
use crate::scheduler::{PollScheduler, Tick};
use crate::store::SnapshotStore;
use crate::types::{
    ActiveRide, AdminUser, AnalyticsData, CommissionSettings, DashboardStats, Driver,
    DriverEarnings, FeedbackEntry, Passenger, PendingRide, RideRecord, SupportTicket,
    UnreadCount,
};
use crate::ui::{FeedbackKind, Pane, UiState};

/// Commands the front-end feeds into the run loop.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Action(AdminAction),
    /// Admin picked a driver in a pending-ride dropdown. Remembered until
    /// the ride leaves the pending set.
    SelectDriver { ride_id: u64, driver_id: u64 },
    /// Mark one notification as read.
    DismissNotification(usize),
    ClearNotifications,
    SwitchPane(Pane),
    /// Force a dashboard refresh outside the schedule.
    Refresh,
    /// Refetch the drivers/history/passengers rosters.
    RefreshRoster,
    Shutdown,
}

/// Why the run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The backend rejected our credentials; the caller must
    /// re-authenticate before starting a new session.
    AuthExpired,
    /// Command channel closed or an explicit shutdown arrived.
    Closed,
}

/// Cloneable handle for queueing commands into a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) {
        // A closed channel means the session already ended.
        let _ = self.commands.send(command).await;
    }
}

pub struct Session<V: View> {
    gateway: Gateway,
    routes: RouteService,
    store: SnapshotStore,
    ui: UiState,
    scheduler: PollScheduler,
    ticks: mpsc::Receiver<Tick>,
    commands: mpsc::Receiver<SessionCommand>,
    view: V,
}

impl<V: View> Session<V> {
    pub fn new(config: &Config, view: V) -> Result<(Self, SessionHandle)> {
        let gateway = Gateway::new(config)?;
        let routes = RouteService::new(config)?;
        let (scheduler, ticks) = PollScheduler::spawn(
            config.dashboard_interval(),
            config.unread_interval(),
            config.debounce_window(),
        );
        let (command_tx, command_rx) = mpsc::channel(32);

        let session = Self {
            gateway,
            routes,
            store: SnapshotStore::new(),
            ui: UiState::with_map_view(config.default_map_center, config.default_map_zoom),
            scheduler,
            ticks,
            commands: command_rx,
            view,
        };
        Ok((session, SessionHandle { commands: command_tx }))
    }

    /// Drive the session until shutdown or auth expiry.
    pub async fn run(mut self) -> SessionEnd {
        loop {
            tokio::select! {
                Some(tick) = self.ticks.recv() => {
                    let expired = match tick {
                        Tick::Dashboard => self.dashboard_cycle().await,
                        Tick::UnreadCount => self.refresh_unread().await,
                    };
                    if expired {
                        tracing::warn!("session expired, ending run loop");
                        return SessionEnd::AuthExpired;
                    }
                }
                maybe = self.commands.recv() => {
                    let Some(command) = maybe else {
                        return SessionEnd::Closed;
                    };
                    match self.handle_command(command).await {
                        ControlFlow::Continue => {}
                        ControlFlow::AuthExpired => return SessionEnd::AuthExpired,
                        ControlFlow::Shutdown => return SessionEnd::Closed,
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: SessionCommand) -> ControlFlow {
        // Any explicit command is a user interaction, which is what
        // unlocks the chime.
        self.ui.unlock_audio();

        match command {
            SessionCommand::Action(action) => self.run_action(action).await,
            SessionCommand::SelectDriver { ride_id, driver_id } => {
                self.store.selection_memo.remember(ride_id, driver_id);
                ControlFlow::Continue
            }
            SessionCommand::DismissNotification(index) => {
                self.store.dismiss_notification(index);
                self.redraw_notifications();
                ControlFlow::Continue
            }
            SessionCommand::ClearNotifications => {
                self.store.clear_notifications();
                self.redraw_notifications();
                ControlFlow::Continue
            }
            SessionCommand::SwitchPane(pane) => {
                self.ui.switch_pane(pane);
                // Pane entry follows the full-refetch/full-redraw rule.
                match pane {
                    Pane::Drivers | Pane::Passengers | Pane::RideHistory => {
                        self.refresh_roster().await
                    }
                    Pane::Analytics => self.refresh_analytics().await,
                    Pane::Earnings => self.refresh_earnings().await,
                    Pane::Feedback => self.refresh_feedback().await,
                    Pane::Settings => self.refresh_settings().await,
                    Pane::Dashboard => ControlFlow::Continue,
                }
            }
            SessionCommand::Refresh => {
                self.force_refresh();
                ControlFlow::Continue
            }
            SessionCommand::RefreshRoster => self.refresh_roster().await,
            SessionCommand::Shutdown => ControlFlow::Shutdown,
        }
    }

    async fn run_action(&mut self, action: AdminAction) -> ControlFlow {
        if let Err(e) = action.validate() {
            // Rejected before any network traffic; no refresh either.
            self.ui.show_feedback(e.to_string(), FeedbackKind::Error);
            return ControlFlow::Continue;
        }

        let result = dispatch::execute(&self.gateway, &action).await;

        let flow = match result {
            Ok(WriteOutcome::Ok(_)) => {
                if let AdminAction::AssignRide { ride_id, .. } = &action {
                    self.store.selection_memo.forget(*ride_id);
                }
                self.ui
                    .show_feedback(action.success_message(), FeedbackKind::Success);
                ControlFlow::Continue
            }
            Ok(WriteOutcome::Error(message)) => {
                self.ui.show_feedback(message, FeedbackKind::Error);
                ControlFlow::Continue
            }
            Ok(WriteOutcome::AuthExpired) => ControlFlow::AuthExpired,
            Err(e) => {
                self.ui.show_feedback(e.to_string(), FeedbackKind::Error);
                ControlFlow::Continue
            }
        };

        // The backend is the source of truth either way.
        self.force_refresh();
        flow
    }

    /// A forced cycle must see the action's effect, so cached reads are
    /// dropped before the trigger.
    fn force_refresh(&self) {
        self.gateway.clear_cache();
        self.scheduler.trigger_dashboard();
    }

    fn redraw_notifications(&mut self) {
        let ops = [
            render::DrawOp::NotificationBadge(self.store.notifications.len()),
            render::DrawOp::NotificationList(render::notification_lines(
                self.store.notifications.iter(),
            )),
        ];
        self.view.apply(&ops);
    }

    /// One dashboard cycle. Returns true when the session has expired.
    async fn dashboard_cycle(&mut self) -> bool {
        let (stats, pending, active, available) = tokio::join!(
            self.gateway.read::<DashboardStats>("dashboard-stats", ""),
            self.gateway.read::<Vec<PendingRide>>("pending-rides", ""),
            self.gateway.read::<Vec<ActiveRide>>("active-rides", ""),
            self.gateway.read::<Vec<Driver>>("available-drivers", ""),
        );

        if stats.is_auth_expired()
            || pending.is_auth_expired()
            || active.is_auth_expired()
            || available.is_auth_expired()
        {
            return true;
        }

        let outcome = self.store.apply_dashboard_cycle(
            stats.into_option(),
            pending.into_option(),
            active.into_option(),
            available.into_option(),
        );
        if !outcome.applied {
            tracing::debug!("dashboard cycle discarded, keeping previous snapshot");
            return false;
        }

        let routes = self.fetch_routes().await;
        let ops = render::render_dashboard(
            &self.store,
            &mut self.ui,
            routes,
            outcome.pending_grew,
        );
        self.view.apply(&ops);
        false
    }

    /// Road geometry for every ride on the map, fetched concurrently.
    async fn fetch_routes(&self) -> Vec<RouteLine> {
        let mut wanted: Vec<(u64, _, _)> = Vec::new();
        for ride in &self.store.pending {
            wanted.push((ride.id, ride.pickup(), ride.destination()));
        }
        for ride in &self.store.active {
            wanted.push((ride.id, ride.pickup(), ride.destination()));
        }
        self.routes.routes(&wanted).await
    }

    async fn refresh_unread(&mut self) -> bool {
        match self.gateway.read::<UnreadCount>("unread-feedback-count", "").await {
            Fetch::Data(unread) => {
                self.store.set_unread_feedback(unread.count);
                false
            }
            Fetch::AuthExpired => true,
            // Transient; the badge keeps its last value.
            Fetch::RateLimited | Fetch::Failed => false,
        }
    }

    /// Full refetch and redraw of the roster panes.
    async fn refresh_roster(&mut self) -> ControlFlow {
        let (drivers, history, passengers) = tokio::join!(
            self.gateway.read::<Vec<Driver>>("drivers", ""),
            self.gateway.read::<Vec<RideRecord>>("all-rides-data", ""),
            self.gateway.read::<Vec<Passenger>>("passengers", ""),
        );

        if drivers.is_auth_expired()
            || history.is_auth_expired()
            || passengers.is_auth_expired()
        {
            return ControlFlow::AuthExpired;
        }

        self.store.apply_roster(
            drivers.into_option(),
            history.into_option(),
            passengers.into_option(),
        );

        let ops = match self.ui.pane {
            Pane::Drivers => render::render_drivers(&self.store, &self.ui),
            Pane::Passengers => render::render_passengers(&self.store, &self.ui),
            _ => render::render_history(&self.store, &self.ui),
        };
        self.view.apply(&ops);
        ControlFlow::Continue
    }

    async fn refresh_analytics(&mut self) -> ControlFlow {
        let query = self.ui.analytics.query_string();
        match self
            .gateway
            .read::<AnalyticsData>("analytics-data", &query)
            .await
        {
            Fetch::Data(analytics) => {
                self.view.apply(&render::render_analytics(&analytics));
                ControlFlow::Continue
            }
            Fetch::AuthExpired => ControlFlow::AuthExpired,
            Fetch::RateLimited | Fetch::Failed => ControlFlow::Continue,
        }
    }

    async fn refresh_earnings(&mut self) -> ControlFlow {
        let query = self.ui.earnings.query_string();
        match self
            .gateway
            .read::<Vec<DriverEarnings>>("earnings/drivers", &query)
            .await
        {
            Fetch::Data(earnings) => {
                self.view.apply(&render::render_earnings(&earnings, &self.ui));
                ControlFlow::Continue
            }
            Fetch::AuthExpired => ControlFlow::AuthExpired,
            Fetch::RateLimited | Fetch::Failed => ControlFlow::Continue,
        }
    }

    async fn refresh_feedback(&mut self) -> ControlFlow {
        let (entries, tickets) = tokio::join!(
            self.gateway.read::<Vec<FeedbackEntry>>("all-feedback", ""),
            self.gateway.read::<Vec<SupportTicket>>("support-tickets", ""),
        );

        if entries.is_auth_expired() || tickets.is_auth_expired() {
            return ControlFlow::AuthExpired;
        }

        let ops = render::render_feedback(
            &entries.into_option().unwrap_or_default(),
            &tickets.into_option().unwrap_or_default(),
        );
        self.view.apply(&ops);
        ControlFlow::Continue
    }

    /// Settings pane: current commission rates plus the admin roster, so
    /// an admin sees the values a save would overwrite.
    async fn refresh_settings(&mut self) -> ControlFlow {
        let (commission, admins) = tokio::join!(
            self.gateway.read::<CommissionSettings>("commission-settings", ""),
            self.gateway.read::<Vec<AdminUser>>("admins", ""),
        );

        if commission.is_auth_expired() || admins.is_auth_expired() {
            return ControlFlow::AuthExpired;
        }

        let ops = render::render_settings(
            &commission.into_option().unwrap_or_default(),
            &admins.into_option().unwrap_or_default(),
        );
        self.view.apply(&ops);
        ControlFlow::Continue
    }
}

enum ControlFlow {
    Continue,
    AuthExpired,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingView;

    #[tokio::test]
    async fn test_validation_failure_sets_feedback_without_refresh() {
        let config = Config::default();
        let (mut session, _handle) = Session::new(&config, RecordingView::default()).unwrap();

        let flow = session
            .run_action(AdminAction::AssignRide {
                ride_id: 7,
                driver_id: None,
            })
            .await;
        assert!(matches!(flow, ControlFlow::Continue));

        let message = session.ui.active_feedback().unwrap();
        assert_eq!(message.kind, FeedbackKind::Error);
        assert!(message.text.contains("select a driver"));
    }

    #[tokio::test]
    async fn test_select_driver_updates_memo() {
        let config = Config::default();
        let (mut session, _handle) = Session::new(&config, RecordingView::default()).unwrap();

        let flow = session
            .handle_command(SessionCommand::SelectDriver {
                ride_id: 3,
                driver_id: 11,
            })
            .await;
        assert!(matches!(flow, ControlFlow::Continue));
        assert_eq!(session.store.selection_memo.chosen_for(3), Some(11));
        // A command counts as an interaction, so audio is unlocked.
        assert!(session.ui.audio_unlocked);
    }

    #[tokio::test]
    async fn test_shutdown_command_ends_loop() {
        let config = Config::default();
        let (mut session, _handle) = Session::new(&config, RecordingView::default()).unwrap();
        let flow = session.handle_command(SessionCommand::Shutdown).await;
        assert!(matches!(flow, ControlFlow::Shutdown));
    }
}
