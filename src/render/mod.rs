//! Reconciler: turn the snapshot store and UI state into draw
//! instructions.
//!
//! Rendering is a pure translation step. The functions here never touch
//! the network and never mutate the store; a [`View`] implementation
//! consumes the resulting [`DrawOp`] list and owns everything
//! platform-specific. Swapping the console view for another front-end
//! means implementing one trait.

pub mod badges;
pub mod charts;
pub mod console;
pub mod map;
pub mod tables;

use jiff::Timestamp;

use crate::store::{Notification, SnapshotStore};
use crate::types::{
    AdminUser, AnalyticsData, AnalyticsKpis, CommissionSettings, DriverEarnings, FeedbackEntry,
    SupportTicket,
};
use crate::ui::{FeedbackKind, UiState, time_ago};

use badges::BadgeAnimation;
use charts::ChartSpec;
use map::{MapOp, RouteLine};
use tables::{
    ActiveRow, AdminRow, DriverRow, EarningsRow, FeedbackRow, HistoryPage, PassengerRow,
    PendingCard, TicketStats,
};

/// One platform-neutral draw instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Badge(BadgeAnimation),
    PendingList(Vec<PendingCard>),
    ActiveTable(Vec<ActiveRow>),
    DriversTable(Vec<DriverRow>),
    PassengersTable(Vec<PassengerRow>),
    HistoryTable(HistoryPage),
    EarningsTable(Vec<EarningsRow>),
    FeedbackTable(Vec<FeedbackRow>),
    TicketSummary(TicketStats),
    CommissionRates(CommissionSettings),
    AdminsTable(Vec<AdminRow>),
    AnalyticsKpis(AnalyticsKpis),
    Chart(ChartSpec),
    Map(Vec<MapOp>),
    NotificationBadge(usize),
    NotificationList(Vec<String>),
    UnreadBadge(u64),
    Feedback { text: String, kind: FeedbackKind },
    PlayChime,
}

/// Thin platform layer. Implementations interpret draw instructions;
/// everything above this trait is testable without a terminal.
pub trait View {
    fn apply(&mut self, ops: &[DrawOp]);
}

/// Capture view for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub ops: Vec<DrawOp>,
}

impl View for RecordingView {
    fn apply(&mut self, ops: &[DrawOp]) {
        self.ops.extend_from_slice(ops);
    }
}

/// Full dashboard redraw: stat badges, pending cards with dropdowns,
/// active-rides table, map layers, notification state.
///
/// `pending_grew` comes from the store cycle; the chime instruction is
/// emitted only when audio has been unlocked by a prior interaction and is
/// silently skipped otherwise.
pub fn render_dashboard(
    store: &SnapshotStore,
    ui: &mut UiState,
    routes: Vec<RouteLine>,
    pending_grew: bool,
) -> Vec<DrawOp> {
    let stats = &store.stats;
    let mut ops = Vec::new();

    let badge_values: [(&'static str, f64, bool); 9] = [
        ("total_revenue", stats.total_revenue, true),
        ("today_revenue", stats.today_revenue, true),
        ("total_rides", stats.total_rides as f64, false),
        ("drivers_online", stats.drivers_online as f64, false),
        ("total_passengers", stats.total_passengers as f64, false),
        ("pending_requests", stats.pending_requests as f64, false),
        ("active_rides", stats.active_rides as f64, false),
        ("completed_rides", stats.completed_rides as f64, false),
        ("open_tickets", stats.open_tickets as f64, false),
    ];
    for (badge, value, monetary) in badge_values {
        let from = ui.swap_badge(badge, value);
        ops.push(DrawOp::Badge(BadgeAnimation::new(badge, from, value, monetary)));
    }

    ops.push(DrawOp::PendingList(tables::pending_cards(
        &store.pending,
        &store.available_drivers,
        &store.selection_memo,
    )));
    ops.push(DrawOp::ActiveTable(tables::active_rows(&store.active)));

    ops.push(DrawOp::Map(map::map_ops(
        &store.pending,
        &store.active,
        routes,
        ui.map_center,
        ui.map_zoom,
    )));

    ops.push(DrawOp::NotificationBadge(store.notifications.len()));
    ops.push(DrawOp::NotificationList(notification_lines(
        store.notifications.iter(),
    )));
    ops.push(DrawOp::UnreadBadge(store.unread_feedback));

    if let Some(message) = ui.active_feedback() {
        ops.push(DrawOp::Feedback {
            text: message.text.clone(),
            kind: message.kind,
        });
    }

    if pending_grew && ui.audio_unlocked {
        ops.push(DrawOp::PlayChime);
    }

    ops
}

/// Dropdown lines with an age label per entry.
pub fn notification_lines<'a>(
    notifications: impl Iterator<Item = &'a Notification>,
) -> Vec<String> {
    let now = Timestamp::now();
    notifications
        .map(|n| format!("{} ({})", n.message, time_ago(n.at, now)))
        .collect()
}

/// Driver roster pane.
pub fn render_drivers(store: &SnapshotStore, ui: &UiState) -> Vec<DrawOp> {
    vec![DrawOp::DriversTable(tables::driver_rows(
        &store.drivers,
        &ui.driver_search,
        ui.driver_status_filter,
    ))]
}

/// Passenger roster pane.
pub fn render_passengers(store: &SnapshotStore, ui: &UiState) -> Vec<DrawOp> {
    vec![DrawOp::PassengersTable(tables::passenger_rows(
        &store.passengers,
        &ui.passenger_search,
    ))]
}

/// Ride history pane, searched and paginated.
pub fn render_history(store: &SnapshotStore, ui: &UiState) -> Vec<DrawOp> {
    vec![DrawOp::HistoryTable(tables::history_page(
        &store.ride_history,
        &ui.history_search,
        ui.history_page,
    ))]
}

/// Analytics pane: KPI cards plus a full chart rebuild.
pub fn render_analytics(analytics: &AnalyticsData) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::AnalyticsKpis(analytics.kpis.clone())];
    ops.extend(charts::chart_specs(analytics).into_iter().map(DrawOp::Chart));
    ops
}

/// Earnings pane.
pub fn render_earnings(earnings: &[DriverEarnings], ui: &UiState) -> Vec<DrawOp> {
    vec![DrawOp::EarningsTable(tables::earnings_rows(
        earnings,
        &ui.earnings.search,
    ))]
}

/// Settings pane: the commission rates a save would overwrite, plus the
/// admin roster behind the add/delete admin actions.
pub fn render_settings(commission: &CommissionSettings, admins: &[AdminUser]) -> Vec<DrawOp> {
    vec![
        DrawOp::CommissionRates(commission.clone()),
        DrawOp::AdminsTable(tables::admin_rows(admins)),
    ]
}

/// Feedback inbox plus the support-ticket summary cards.
pub fn render_feedback(entries: &[FeedbackEntry], tickets: &[SupportTicket]) -> Vec<DrawOp> {
    vec![
        DrawOp::TicketSummary(tables::ticket_stats(tickets)),
        DrawOp::FeedbackTable(tables::feedback_rows(entries)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DashboardStats;

    fn primed_store() -> SnapshotStore {
        let mut store = SnapshotStore::new();
        store.apply_dashboard_cycle(
            Some(DashboardStats {
                total_revenue: 120.0,
                pending_requests: 1,
                ..Default::default()
            }),
            None,
            None,
            None,
        );
        store
    }

    #[test]
    fn test_badges_animate_from_last_displayed_value() {
        let store = primed_store();
        let mut ui = UiState::new();

        let ops = render_dashboard(&store, &mut ui, vec![], false);
        let Some(DrawOp::Badge(first)) = ops.first() else {
            panic!("expected a badge op");
        };
        assert_eq!(first.badge, "total_revenue");
        assert!(first.frames[0] < 120.0);
        assert_eq!(first.final_value(), 120.0);

        // Second redraw starts where the first one ended.
        let ops = render_dashboard(&store, &mut ui, vec![], false);
        let Some(DrawOp::Badge(first)) = ops.first() else {
            panic!("expected a badge op");
        };
        assert_eq!(first.frames, vec![120.0]);
    }

    #[test]
    fn test_chime_requires_unlocked_audio() {
        let store = primed_store();
        let mut ui = UiState::new();

        let ops = render_dashboard(&store, &mut ui, vec![], true);
        assert!(!ops.contains(&DrawOp::PlayChime));

        ui.unlock_audio();
        let ops = render_dashboard(&store, &mut ui, vec![], true);
        assert!(ops.contains(&DrawOp::PlayChime));
    }

    #[test]
    fn test_settings_pane_shows_rates_and_admin_roster() {
        let commission = CommissionSettings {
            bajaj_rate: 10.0,
            car_rate: 15.0,
        };
        let admins = vec![AdminUser {
            id: 1,
            username: "kidan".to_string(),
        }];

        let ops = render_settings(&commission, &admins);
        assert!(ops.contains(&DrawOp::CommissionRates(commission)));
        let Some(DrawOp::AdminsTable(rows)) = ops.last() else {
            panic!("expected an admins table");
        };
        assert_eq!(rows[0].username, "kidan");
    }

    #[test]
    fn test_recording_view_captures_ops() {
        let store = primed_store();
        let mut ui = UiState::new();
        let mut view = RecordingView::default();

        view.apply(&render_dashboard(&store, &mut ui, vec![], false));
        assert!(
            view.ops
                .iter()
                .any(|op| matches!(op, DrawOp::NotificationBadge(0)))
        );
    }
}
