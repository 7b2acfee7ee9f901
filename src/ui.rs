//! Transient per-session UI state.
//!
//! Nothing in here comes from the backend. Search strings, filters, the
//! history page cursor and the analytics period are inputs to the pure
//! render functions; changing any of them recomputes tables from the
//! last-fetched arrays without touching the network.

use std::collections::HashMap;
use std::time::Duration;

use jiff::Timestamp;
use tokio::time::Instant;

use crate::types::{DriverStatus, GeoPoint};

/// How long a transient action-feedback message stays visible.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(4000);

/// Rides shown per history page.
pub const HISTORY_PAGE_SIZE: usize = 10;

/// Console panes, mirroring the dashboard sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Dashboard,
    Drivers,
    Passengers,
    RideHistory,
    Analytics,
    Earnings,
    Feedback,
    Settings,
}

/// Analytics query parameters. `period=custom` requires both dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsParams {
    pub period: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            period: "week".to_string(),
            start_date: None,
            end_date: None,
        }
    }
}

impl AnalyticsParams {
    pub fn query_string(&self) -> String {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) if self.period == "custom" => {
                format!("period=custom&start_date={start}&end_date={end}")
            }
            _ => format!("period={}", self.period),
        }
    }
}

/// Earnings pane query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarningsParams {
    /// `YYYY-MM` month selector; empty means current month.
    pub month: Option<String>,
    pub search: String,
}

impl EarningsParams {
    pub fn query_string(&self) -> String {
        match &self.month {
            Some(month) => format!("month={month}"),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// A transient message shown after an admin action.
#[derive(Debug, Clone)]
pub struct FeedbackMessage {
    pub text: String,
    pub kind: FeedbackKind,
    shown_at: Instant,
}

impl FeedbackMessage {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= FEEDBACK_DURATION
    }
}

#[derive(Debug)]
pub struct UiState {
    pub pane: Pane,
    /// Map view used when there are no rides to fit, taken from config.
    pub map_center: GeoPoint,
    pub map_zoom: u8,
    pub driver_search: String,
    pub driver_status_filter: Option<DriverStatus>,
    pub passenger_search: String,
    pub history_search: String,
    /// Zero-based history page; clamped by the renderer.
    pub history_page: usize,
    pub analytics: AnalyticsParams,
    pub earnings: EarningsParams,
    /// Set by the first user interaction; the chime stays silent before
    /// that.
    pub audio_unlocked: bool,
    /// Last value shown per badge, the starting point for the counter
    /// animation.
    displayed_badges: HashMap<&'static str, f64>,
    feedback: Option<FeedbackMessage>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            pane: Pane::Dashboard,
            map_center: GeoPoint::new(13.88, 39.46),
            map_zoom: 10,
            driver_search: String::new(),
            driver_status_filter: None,
            passenger_search: String::new(),
            history_search: String::new(),
            history_page: 0,
            analytics: AnalyticsParams::default(),
            earnings: EarningsParams::default(),
            audio_unlocked: false,
            displayed_badges: HashMap::new(),
            feedback: None,
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the default map view from configuration.
    pub fn with_map_view(center: GeoPoint, zoom: u8) -> Self {
        Self {
            map_center: center,
            map_zoom: zoom,
            ..Self::default()
        }
    }

    pub fn unlock_audio(&mut self) {
        self.audio_unlocked = true;
    }

    /// Record the value a badge ended up displaying so the next animation
    /// starts from it, and return the previous one.
    pub fn swap_badge(&mut self, badge: &'static str, value: f64) -> f64 {
        self.displayed_badges.insert(badge, value).unwrap_or(0.0)
    }

    pub fn show_feedback(&mut self, text: impl Into<String>, kind: FeedbackKind) {
        self.feedback = Some(FeedbackMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// The current feedback message, dropping it once its window elapses.
    pub fn active_feedback(&mut self) -> Option<&FeedbackMessage> {
        if self.feedback.as_ref().is_some_and(FeedbackMessage::is_expired) {
            self.feedback = None;
        }
        self.feedback.as_ref()
    }

    /// Switching panes resets the cursors that only make sense within one.
    pub fn switch_pane(&mut self, pane: Pane) {
        if self.pane != pane {
            self.pane = pane;
            self.history_page = 0;
        }
    }
}

/// Compact "how long ago" label for ride cards.
pub fn time_ago(then: Timestamp, now: Timestamp) -> String {
    let seconds = now.duration_since(then).as_secs();
    if seconds < 60 {
        return "Just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
