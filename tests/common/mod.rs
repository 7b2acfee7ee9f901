//! Shared fixtures for integration tests.

use rideops::types::{
    ActiveRide, DashboardStats, Driver, DriverStatus, PendingRide, RideStatus, VehicleType,
};

#[allow(dead_code)]
pub fn pending_ride(id: u64, name: &str, vehicle: VehicleType) -> PendingRide {
    PendingRide {
        id,
        user_name: name.to_string(),
        user_phone: "+251911000000".to_string(),
        vehicle_type: vehicle,
        pickup_address: Some("Ayder".to_string()),
        dest_address: "Quiha".to_string(),
        note: None,
        request_time: "09:14 AM".to_string(),
        pickup_lat: 13.497,
        pickup_lon: 39.466,
        dest_lat: 13.41,
        dest_lon: 39.52,
        fare: 150.0,
    }
}

#[allow(dead_code)]
pub fn active_ride(id: u64, name: &str, driver: &str) -> ActiveRide {
    ActiveRide {
        id,
        user_name: name.to_string(),
        driver_name: driver.to_string(),
        dest_address: "Quiha".to_string(),
        status: RideStatus::Assigned,
        request_time: "09:14 AM".to_string(),
        pickup_lat: 13.497,
        pickup_lon: 39.466,
        dest_lat: 13.41,
        dest_lon: 39.52,
    }
}

#[allow(dead_code)]
pub fn available_driver(id: u64, name: &str, vehicle: VehicleType) -> Driver {
    Driver {
        id,
        driver_uid: None,
        name: name.to_string(),
        phone_number: format!("+2519{id:08}"),
        vehicle_type: vehicle,
        status: DriverStatus::Available,
        avg_rating: 4.5,
        is_blocked: false,
    }
}

#[allow(dead_code)]
pub fn stats(pending_requests: u64, active_rides: u64) -> DashboardStats {
    DashboardStats {
        pending_requests,
        active_rides,
        total_revenue: 1000.0,
        total_rides: 40,
        drivers_online: 5,
        total_drivers: 9,
        total_passengers: 70,
        completed_rides: 35,
        today_revenue: 120.0,
        open_tickets: 0,
    }
}
