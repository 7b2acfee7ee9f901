//! Domain types for the dispatch console.
//!
//! These records mirror the JSON the dispatch backend returns. Field names
//! match the wire format so the structs deserialize without rename noise,
//! except the multi-word status strings which carry explicit renames.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RideopsError;
use crate::{enum_display, enum_display_fromstr};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Vehicle categories the operation dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Bajaj,
    Car,
}

enum_display_fromstr!(
    VehicleType,
    RideopsError::InvalidVehicleType,
    {
        Bajaj => "Bajaj",
        Car => "Car",
    }
);

/// Driver availability as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverStatus {
    Available,
    #[serde(rename = "On Trip")]
    OnTrip,
    Offline,
}

enum_display_fromstr!(
    DriverStatus,
    RideopsError::InvalidStatus,
    {
        Available => "Available",
        OnTrip => "On Trip",
        Offline => "Offline",
    }
);

/// Ride lifecycle states. The coordinator only observes transitions; it
/// never drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    Requested,
    Assigned,
    #[serde(rename = "On Trip")]
    OnTrip,
    Completed,
    Canceled,
}

enum_display_fromstr!(
    RideStatus,
    RideopsError::InvalidStatus,
    {
        Requested => "Requested",
        Assigned => "Assigned",
        OnTrip => "On Trip",
        Completed => "Completed",
        Canceled => "Canceled",
    }
);

/// Support ticket workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

enum_display!(TicketStatus, {
    Open => "Open",
    InProgress => "In Progress",
    Resolved => "Resolved",
    Closed => "Closed",
});

/// An unassigned ride request. Identity is `id`; the record disappears from
/// the pending set the moment the backend assigns or cancels it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRide {
    pub id: u64,
    pub user_name: String,
    pub user_phone: String,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub pickup_address: Option<String>,
    pub dest_address: String,
    #[serde(default)]
    pub note: Option<String>,
    pub request_time: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub dest_lat: f64,
    pub dest_lon: f64,
    #[serde(default)]
    pub fare: f64,
}

impl PendingRide {
    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lon)
    }

    pub fn destination(&self) -> GeoPoint {
        GeoPoint::new(self.dest_lat, self.dest_lon)
    }
}

/// A ride with a driver attached (Assigned or On Trip).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRide {
    pub id: u64,
    pub user_name: String,
    pub driver_name: String,
    pub dest_address: String,
    pub status: RideStatus,
    pub request_time: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub dest_lat: f64,
    pub dest_lon: f64,
}

impl ActiveRide {
    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lon)
    }

    pub fn destination(&self) -> GeoPoint {
        GeoPoint::new(self.dest_lat, self.dest_lon)
    }
}

/// Driver roster entry. Mutated only via explicit admin actions sent to the
/// backend; the local copy is always overwritten by the next poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: u64,
    #[serde(default)]
    pub driver_uid: Option<String>,
    pub name: String,
    pub phone_number: String,
    pub vehicle_type: VehicleType,
    pub status: DriverStatus,
    #[serde(default)]
    pub avg_rating: f64,
    #[serde(default)]
    pub is_blocked: bool,
}

/// Passenger roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: u64,
    #[serde(default)]
    pub passenger_uid: Option<String>,
    pub username: String,
    pub phone_number: String,
    #[serde(default)]
    pub rides_taken: u64,
    #[serde(default)]
    pub join_date: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
}

/// A completed/cancelled/ongoing ride in the history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRecord {
    pub id: u64,
    pub user_name: String,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub fare: f64,
    pub status: RideStatus,
    #[serde(default)]
    pub rating: Option<u8>,
    pub request_time: String,
}

/// Aggregate counters for the dashboard header cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub total_rides: u64,
    pub drivers_online: u64,
    pub total_drivers: u64,
    pub total_passengers: u64,
    pub pending_requests: u64,
    pub active_rides: u64,
    pub completed_rides: u64,
    pub today_revenue: f64,
    #[serde(default)]
    pub open_tickets: u64,
}

/// Passenger feedback entry for the inbox pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: u64,
    pub ride_id: u64,
    pub passenger_name: String,
    pub driver_name: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    pub date: String,
    #[serde(default)]
    pub is_resolved: bool,
}

/// Support ticket raised by a passenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: u64,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub feedback_type: String,
    pub details: String,
    pub status: TicketStatus,
    pub created_at: String,
    #[serde(default)]
    pub ride_id: Option<u64>,
    #[serde(default)]
    pub admin_response: Option<String>,
}

/// Admin account row in the settings pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: u64,
    pub username: String,
}

/// Analytics payload: KPIs, chart series, and driver performance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub kpis: AnalyticsKpis,
    pub charts: AnalyticsCharts,
    pub performance: AnalyticsPerformance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsKpis {
    pub rides_completed: u64,
    pub active_rides_now: u64,
    pub rides_canceled: u64,
    pub total_revenue: f64,
    pub avg_fare: f64,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub avg_rating: f64,
    pub trends: AnalyticsTrends,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTrends {
    pub rides: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsCharts {
    #[serde(default)]
    pub revenue_over_time: TimeSeries,
    /// Vehicle type -> ride count. BTreeMap keeps label order stable.
    #[serde(default)]
    pub vehicle_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub payment_method_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsPerformance {
    #[serde(default)]
    pub top_drivers: Vec<TopDriver>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopDriver {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub avg_rating: f64,
    pub completed_rides: u64,
}

/// Per-driver earnings aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverEarnings {
    pub driver_id: u64,
    pub driver_name: String,
    pub phone_number: String,
    pub vehicle_type: VehicleType,
    pub total_rides: u64,
    pub total_fare: f64,
    pub total_commission: f64,
    pub total_earnings: f64,
    pub avg_earnings_per_ride: f64,
    #[serde(default)]
    pub payment_status: Option<String>,
}

/// Commission rates by vehicle type, editable from the settings pane.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommissionSettings {
    pub bajaj_rate: f64,
    pub car_rate: f64,
}

/// Response envelope for `unread-feedback-count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_status_roundtrip() {
        let s: DriverStatus = "On Trip".parse().unwrap();
        assert_eq!(s, DriverStatus::OnTrip);
        assert_eq!(s.to_string(), "On Trip");
        assert!("on trip".parse::<DriverStatus>().is_err());
    }

    #[test]
    fn test_ride_status_serde_rename() {
        let json = r#""On Trip""#;
        let s: RideStatus = serde_json::from_str(json).unwrap();
        assert_eq!(s, RideStatus::OnTrip);
        assert_eq!(serde_json::to_string(&s).unwrap(), json);
    }

    #[test]
    fn test_pending_ride_deserializes_backend_shape() {
        let json = r#"{
            "id": 7,
            "user_name": "Selam",
            "user_phone": "+251911000000",
            "pickup_address": "Ayder",
            "pickup_lat": 13.497,
            "pickup_lon": 39.466,
            "dest_address": "Quiha",
            "dest_lat": 13.41,
            "dest_lon": 39.52,
            "fare": 150.0,
            "vehicle_type": "Bajaj",
            "note": null,
            "request_time": "09:14 AM"
        }"#;
        let ride: PendingRide = serde_json::from_str(json).unwrap();
        assert_eq!(ride.id, 7);
        assert_eq!(ride.vehicle_type, VehicleType::Bajaj);
        assert!(ride.note.is_none());
        assert_eq!(ride.pickup(), GeoPoint::new(13.497, 39.466));
    }

    #[test]
    fn test_stats_defaults_missing_open_tickets() {
        let json = r#"{
            "total_revenue": 10.5, "total_rides": 3, "drivers_online": 1,
            "total_drivers": 2, "total_passengers": 4, "pending_requests": 1,
            "active_rides": 1, "completed_rides": 1, "today_revenue": 5.0
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.open_tickets, 0);
    }
}
