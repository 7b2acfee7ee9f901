//! Table view models: pure filter/search/pagination over the last-fetched
//! arrays. Recomputed on every keystroke, no network involved.

use tabled::Tabled;
use unicase::UniCase;

use crate::store::SelectionMemo;
use crate::types::{
    ActiveRide, Driver, DriverEarnings, DriverStatus, Passenger, PendingRide, RideRecord,
    SupportTicket, TicketStatus,
};
use crate::ui::HISTORY_PAGE_SIZE;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A driver the admin can pick for a pending ride.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverChoice {
    pub id: u64,
    pub name: String,
    pub avg_rating: f64,
}

/// One pending ride card with its assignment dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCard {
    pub ride_id: u64,
    pub user_name: String,
    pub user_phone: String,
    pub vehicle_type: String,
    pub pickup_address: String,
    pub dest_address: String,
    pub note: Option<String>,
    pub request_time: String,
    pub fare: f64,
    /// Available drivers matching the requested vehicle type.
    pub choices: Vec<DriverChoice>,
    /// Previously chosen driver, re-applied when still in `choices`.
    pub selected: Option<u64>,
}

/// Build the pending cards, filtering each dropdown to available drivers
/// of the requested vehicle type and re-applying remembered selections.
pub fn pending_cards(
    pending: &[PendingRide],
    available: &[Driver],
    memo: &SelectionMemo,
) -> Vec<PendingCard> {
    pending
        .iter()
        .map(|ride| {
            let choices: Vec<DriverChoice> = available
                .iter()
                .filter(|d| {
                    d.status == DriverStatus::Available
                        && !d.is_blocked
                        && d.vehicle_type == ride.vehicle_type
                })
                .map(|d| DriverChoice {
                    id: d.id,
                    name: d.name.clone(),
                    avg_rating: d.avg_rating,
                })
                .collect();

            let selected = memo
                .chosen_for(ride.id)
                .filter(|id| choices.iter().any(|c| c.id == *id));

            PendingCard {
                ride_id: ride.id,
                user_name: ride.user_name.clone(),
                user_phone: ride.user_phone.clone(),
                vehicle_type: ride.vehicle_type.to_string(),
                pickup_address: ride
                    .pickup_address
                    .clone()
                    .unwrap_or_else(|| "Pinned location".to_string()),
                dest_address: ride.dest_address.clone(),
                note: ride.note.clone(),
                request_time: ride.request_time.clone(),
                fare: ride.fare,
                choices,
                selected,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ActiveRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Passenger")]
    pub user_name: String,
    #[tabled(rename = "Driver")]
    pub driver_name: String,
    #[tabled(rename = "Destination")]
    pub dest_address: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Requested")]
    pub request_time: String,
}

pub fn active_rows(active: &[ActiveRide]) -> Vec<ActiveRow> {
    active
        .iter()
        .map(|r| ActiveRow {
            id: r.id,
            user_name: r.user_name.clone(),
            driver_name: r.driver_name.clone(),
            dest_address: r.dest_address.clone(),
            status: r.status.to_string(),
            request_time: r.request_time.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct DriverRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Phone")]
    pub phone_number: String,
    #[tabled(rename = "Vehicle")]
    pub vehicle_type: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Blocked")]
    pub blocked: String,
}

/// Filter the driver roster by a name/phone search and an optional exact
/// status. Status comparison is case-insensitive.
pub fn driver_rows(
    drivers: &[Driver],
    search: &str,
    status_filter: Option<DriverStatus>,
) -> Vec<DriverRow> {
    drivers
        .iter()
        .filter(|d| contains_ci(&d.name, search) || contains_ci(&d.phone_number, search))
        .filter(|d| match status_filter {
            Some(status) => {
                UniCase::new(d.status.to_string()) == UniCase::new(status.to_string())
            }
            None => true,
        })
        .map(|d| DriverRow {
            id: d.id,
            name: d.name.clone(),
            phone_number: d.phone_number.clone(),
            vehicle_type: d.vehicle_type.to_string(),
            status: d.status.to_string(),
            rating: format!("{:.1}", d.avg_rating),
            blocked: if d.is_blocked { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct PassengerRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Username")]
    pub username: String,
    #[tabled(rename = "Phone")]
    pub phone_number: String,
    #[tabled(rename = "Rides")]
    pub rides_taken: u64,
    #[tabled(rename = "Joined")]
    pub join_date: String,
    #[tabled(rename = "Blocked")]
    pub blocked: String,
}

pub fn passenger_rows(passengers: &[Passenger], search: &str) -> Vec<PassengerRow> {
    passengers
        .iter()
        .filter(|p| contains_ci(&p.username, search) || contains_ci(&p.phone_number, search))
        .map(|p| PassengerRow {
            id: p.id,
            username: p.username.clone(),
            phone_number: p.phone_number.clone(),
            rides_taken: p.rides_taken,
            join_date: p.join_date.clone().unwrap_or_else(|| "-".to_string()),
            blocked: if p.is_blocked { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Passenger")]
    pub user_name: String,
    #[tabled(rename = "Driver")]
    pub driver_name: String,
    #[tabled(rename = "Fare")]
    pub fare: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Requested")]
    pub request_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub rows: Vec<HistoryRow>,
    /// Zero-based, clamped to the last page.
    pub page: usize,
    pub total_pages: usize,
    pub total_rides: usize,
}

/// Search then paginate the ride history, ten rides a page. A page index
/// past the end is clamped rather than rejected.
pub fn history_page(rides: &[RideRecord], search: &str, page: usize) -> HistoryPage {
    let filtered: Vec<&RideRecord> = rides
        .iter()
        .filter(|r| {
            contains_ci(&r.user_name, search)
                || r.driver_name
                    .as_deref()
                    .is_some_and(|d| contains_ci(d, search))
                || contains_ci(&r.id.to_string(), search)
        })
        .collect();

    let total_rides = filtered.len();
    let total_pages = total_rides.div_ceil(HISTORY_PAGE_SIZE).max(1);
    let page = page.min(total_pages - 1);

    let rows = filtered
        .iter()
        .skip(page * HISTORY_PAGE_SIZE)
        .take(HISTORY_PAGE_SIZE)
        .map(|r| HistoryRow {
            id: r.id,
            user_name: r.user_name.clone(),
            driver_name: r.driver_name.clone().unwrap_or_else(|| "-".to_string()),
            fare: format!("{:.2}", r.fare),
            status: r.status.to_string(),
            rating: r
                .rating
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            request_time: r.request_time.clone(),
        })
        .collect();

    HistoryPage {
        rows,
        page,
        total_pages,
        total_rides,
    }
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct EarningsRow {
    #[tabled(rename = "Driver")]
    pub driver_name: String,
    #[tabled(rename = "Phone")]
    pub phone_number: String,
    #[tabled(rename = "Vehicle")]
    pub vehicle_type: String,
    #[tabled(rename = "Rides")]
    pub total_rides: u64,
    #[tabled(rename = "Fares")]
    pub total_fare: String,
    #[tabled(rename = "Commission")]
    pub total_commission: String,
    #[tabled(rename = "Earnings")]
    pub total_earnings: String,
    #[tabled(rename = "Avg/Ride")]
    pub avg_per_ride: String,
}

pub fn earnings_rows(earnings: &[DriverEarnings], search: &str) -> Vec<EarningsRow> {
    earnings
        .iter()
        .filter(|e| contains_ci(&e.driver_name, search) || contains_ci(&e.phone_number, search))
        .map(|e| EarningsRow {
            driver_name: e.driver_name.clone(),
            phone_number: e.phone_number.clone(),
            vehicle_type: e.vehicle_type.to_string(),
            total_rides: e.total_rides,
            total_fare: format!("{:.2}", e.total_fare),
            total_commission: format!("{:.2}", e.total_commission),
            total_earnings: format!("{:.2}", e.total_earnings),
            avg_per_ride: format!("{:.2}", e.avg_earnings_per_ride),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct FeedbackRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Ride")]
    pub ride_id: u64,
    #[tabled(rename = "Passenger")]
    pub passenger_name: String,
    #[tabled(rename = "Driver")]
    pub driver_name: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Comment")]
    pub comment: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Resolved")]
    pub resolved: String,
}

pub fn feedback_rows(entries: &[crate::types::FeedbackEntry]) -> Vec<FeedbackRow> {
    entries
        .iter()
        .map(|f| FeedbackRow {
            id: f.id,
            ride_id: f.ride_id,
            passenger_name: f.passenger_name.clone(),
            driver_name: f.driver_name.clone(),
            rating: f
                .rating
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            comment: f.comment.clone().unwrap_or_default(),
            date: f.date.clone(),
            resolved: if f.is_resolved { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct AdminRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Username")]
    pub username: String,
}

pub fn admin_rows(admins: &[crate::types::AdminUser]) -> Vec<AdminRow> {
    admins
        .iter()
        .map(|a| AdminRow {
            id: a.id,
            username: a.username.clone(),
        })
        .collect()
}

/// Counts for the support-ticket summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketStats {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

pub fn ticket_stats(tickets: &[SupportTicket]) -> TicketStats {
    let mut stats = TicketStats::default();
    for ticket in tickets {
        match ticket.status {
            TicketStatus::Open => stats.open += 1,
            TicketStatus::InProgress => stats.in_progress += 1,
            TicketStatus::Resolved | TicketStatus::Closed => stats.resolved += 1,
        }
    }
    stats
}
