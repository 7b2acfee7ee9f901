//! Live-map draw instructions and road-geometry lookups.
//!
//! Every dashboard cycle rebuilds the ride layers from scratch: remove
//! everything, add a pickup/destination marker pair and a route line per
//! ride, then fit the viewport to the union of the points. With nothing to
//! show, the map recenters on the fixed default view instead.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;
use crate::types::{ActiveRide, GeoPoint, PendingRide};

/// One polyline to draw. `dashed` marks the straight-line fallback used
/// when no road geometry could be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLine {
    pub ride_id: u64,
    pub points: Vec<GeoPoint>,
    pub dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.min_lat = self.min_lat.min(p.lat);
        self.min_lon = self.min_lon.min(p.lon);
        self.max_lat = self.max_lat.max(p.lat);
        self.max_lon = self.max_lon.max(p.lon);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    /// Drop every ride marker and route line from the previous cycle.
    ClearRideLayers,
    AddPickupMarker {
        ride_id: u64,
        point: GeoPoint,
        label: String,
    },
    AddDestinationMarker {
        ride_id: u64,
        point: GeoPoint,
        label: String,
    },
    AddRouteLine(RouteLine),
    FitBounds(Bounds),
    SetView { center: GeoPoint, zoom: u8 },
}

/// Build the map instruction list for one cycle. `routes` must already be
/// settled; bounds are computed from the marker points only after every
/// lookup has finished, so a slow route never moves the viewport twice.
pub fn map_ops(
    pending: &[PendingRide],
    active: &[ActiveRide],
    routes: Vec<RouteLine>,
    default_center: GeoPoint,
    default_zoom: u8,
) -> Vec<MapOp> {
    let mut ops = vec![MapOp::ClearRideLayers];
    let mut points = Vec::new();

    for ride in pending {
        ops.push(MapOp::AddPickupMarker {
            ride_id: ride.id,
            point: ride.pickup(),
            label: format!("Pickup: {}", ride.user_name),
        });
        ops.push(MapOp::AddDestinationMarker {
            ride_id: ride.id,
            point: ride.destination(),
            label: ride.dest_address.clone(),
        });
        points.push(ride.pickup());
        points.push(ride.destination());
    }

    for ride in active {
        ops.push(MapOp::AddPickupMarker {
            ride_id: ride.id,
            point: ride.pickup(),
            label: format!("Pickup: {}", ride.user_name),
        });
        ops.push(MapOp::AddDestinationMarker {
            ride_id: ride.id,
            point: ride.destination(),
            label: ride.dest_address.clone(),
        });
        points.push(ride.pickup());
        points.push(ride.destination());
    }

    for route in routes {
        ops.push(MapOp::AddRouteLine(route));
    }

    match Bounds::from_points(points) {
        Some(bounds) => ops.push(MapOp::FitBounds(bounds)),
        None => ops.push(MapOp::SetView {
            center: default_center,
            zoom: default_zoom,
        }),
    }

    ops
}

#[derive(Deserialize)]
struct OsrmResponse {
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[lon, lat]`.
    coordinates: Vec<[f64; 2]>,
}

/// Road geometry lookups against an OSRM-compatible router.
pub struct RouteService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RouteService {
    pub fn new(config: &Config) -> Result<Self> {
        url::Url::parse(&config.routing_url)?;
        Ok(Self {
            client: Client::new(),
            base_url: config.routing_url.trim_end_matches('/').to_string(),
            timeout: config.route_timeout(),
        })
    }

    /// Fetch the road route for one ride. Any failure, including the hard
    /// timeout, degrades to a dashed straight segment; the map never
    /// surfaces a routing error.
    pub async fn route(&self, ride_id: u64, pickup: GeoPoint, dest: GeoPoint) -> RouteLine {
        match self.fetch_geometry(pickup, dest).await {
            Some(points) if points.len() >= 2 => RouteLine {
                ride_id,
                points,
                dashed: false,
            },
            _ => RouteLine {
                ride_id,
                points: vec![pickup, dest],
                dashed: true,
            },
        }
    }

    /// Look up routes for every ride concurrently.
    pub async fn routes(&self, rides: &[(u64, GeoPoint, GeoPoint)]) -> Vec<RouteLine> {
        join_all(
            rides
                .iter()
                .map(|&(id, pickup, dest)| self.route(id, pickup, dest)),
        )
        .await
    }

    async fn fetch_geometry(&self, pickup: GeoPoint, dest: GeoPoint) -> Option<Vec<GeoPoint>> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, pickup.lon, pickup.lat, dest.lon, dest.lat
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| tracing::debug!(%e, "route lookup failed"))
            .ok()?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "route lookup rejected");
            return None;
        }

        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| tracing::debug!(%e, "route body was not valid GeoJSON"))
            .ok()?;
        let route = body.routes.into_iter().next()?;
        Some(
            route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| GeoPoint::new(lat, lon))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VehicleType;

    fn pending(id: u64) -> PendingRide {
        PendingRide {
            id,
            user_name: "Selam".to_string(),
            user_phone: "+251911000000".to_string(),
            vehicle_type: VehicleType::Bajaj,
            pickup_address: None,
            dest_address: "Quiha".to_string(),
            note: None,
            request_time: "09:14 AM".to_string(),
            pickup_lat: 13.49,
            pickup_lon: 39.46,
            dest_lat: 13.41,
            dest_lon: 39.52,
            fare: 100.0,
        }
    }

    #[test]
    fn test_empty_map_recenters_to_default_view() {
        let ops = map_ops(&[], &[], vec![], GeoPoint::new(13.88, 39.46), 10);
        assert_eq!(ops[0], MapOp::ClearRideLayers);
        assert_eq!(
            ops[1],
            MapOp::SetView {
                center: GeoPoint::new(13.88, 39.46),
                zoom: 10
            }
        );
    }

    #[test]
    fn test_bounds_cover_all_marker_points() {
        let ops = map_ops(&[pending(1)], &[], vec![], GeoPoint::new(13.88, 39.46), 10);
        let Some(MapOp::FitBounds(bounds)) = ops.last() else {
            panic!("expected FitBounds, got {:?}", ops.last());
        };
        assert_eq!(bounds.min_lat, 13.41);
        assert_eq!(bounds.max_lat, 13.49);
        assert_eq!(bounds.min_lon, 39.46);
        assert_eq!(bounds.max_lon, 39.52);
    }

    #[test]
    fn test_layers_cleared_before_anything_is_added() {
        let routes = vec![RouteLine {
            ride_id: 1,
            points: vec![GeoPoint::new(13.49, 39.46), GeoPoint::new(13.41, 39.52)],
            dashed: true,
        }];
        let ops = map_ops(&[pending(1)], &[], routes, GeoPoint::new(13.88, 39.46), 10);
        assert_eq!(ops[0], MapOp::ClearRideLayers);
        assert!(
            ops.iter()
                .any(|op| matches!(op, MapOp::AddRouteLine(line) if line.dashed))
        );
    }

    #[test]
    fn test_bounds_extend() {
        let mut bounds =
            Bounds::from_points([GeoPoint::new(13.49, 39.46)]).unwrap();
        bounds.extend(GeoPoint::new(14.12, 38.28));
        assert_eq!(bounds.max_lat, 14.12);
        assert_eq!(bounds.min_lon, 38.28);
    }
}
