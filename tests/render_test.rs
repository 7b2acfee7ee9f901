#[path = "common/mod.rs"]
mod common;

use common::{available_driver, pending_ride, stats};
use rideops::SnapshotStore;
use rideops::render::map::MapOp;
use rideops::render::{self, DrawOp};
use rideops::types::{GeoPoint, VehicleType};
use rideops::ui::UiState;

// ============================================================================
// Dashboard rendering
// ============================================================================

fn store_with_one_pending() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.apply_dashboard_cycle(
        Some(stats(1, 0)),
        Some(vec![pending_ride(7, "Selam", VehicleType::Bajaj)]),
        Some(vec![]),
        Some(vec![
            available_driver(3, "Abel", VehicleType::Bajaj),
            available_driver(4, "Berhe", VehicleType::Car),
        ]),
    );
    store
}

fn pending_cards(ops: &[DrawOp]) -> &[rideops::render::tables::PendingCard] {
    ops.iter()
        .find_map(|op| match op {
            DrawOp::PendingList(cards) => Some(cards.as_slice()),
            _ => None,
        })
        .expect("no pending list rendered")
}

#[test]
fn test_dropdown_selection_survives_redraw() {
    let mut store = store_with_one_pending();
    let mut ui = UiState::new();

    store.selection_memo.remember(7, 3);

    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    assert_eq!(pending_cards(&ops)[0].selected, Some(3));

    // A second redraw from the same snapshot keeps the selection.
    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    assert_eq!(pending_cards(&ops)[0].selected, Some(3));
}

#[test]
fn test_dropdown_only_offers_matching_vehicle_type() {
    let store = store_with_one_pending();
    let mut ui = UiState::new();

    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    let cards = pending_cards(&ops);
    // The Car driver is not offered for a Bajaj request.
    assert_eq!(cards[0].choices.len(), 1);
    assert_eq!(cards[0].choices[0].name, "Abel");
}

#[test]
fn test_map_falls_back_to_default_view_when_empty() {
    let mut store = SnapshotStore::new();
    store.apply_dashboard_cycle(Some(stats(0, 0)), Some(vec![]), Some(vec![]), Some(vec![]));
    let mut ui = UiState::with_map_view(GeoPoint::new(13.88, 39.46), 10);

    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    let map_ops = ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Map(ops) => Some(ops),
            _ => None,
        })
        .expect("no map ops rendered");

    assert_eq!(map_ops[0], MapOp::ClearRideLayers);
    assert!(matches!(
        map_ops.last(),
        Some(MapOp::SetView { center, zoom: 10 }) if center.lat == 13.88 && center.lon == 39.46
    ));
}

#[test]
fn test_map_fits_bounds_when_rides_exist() {
    let store = store_with_one_pending();
    let mut ui = UiState::new();

    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    let map_ops = ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Map(ops) => Some(ops),
            _ => None,
        })
        .unwrap();

    let Some(MapOp::FitBounds(bounds)) = map_ops.last() else {
        panic!("expected FitBounds, got {:?}", map_ops.last());
    };
    // Union of the pickup and destination coordinates.
    assert_eq!(bounds.min_lat, 13.41);
    assert_eq!(bounds.max_lat, 13.497);
}

#[test]
fn test_notification_badge_reflects_queue() {
    let store = store_with_one_pending();
    let mut ui = UiState::new();

    let ops = render::render_dashboard(&store, &mut ui, vec![], false);
    assert!(ops.contains(&DrawOp::NotificationBadge(1)));
    let list = ops.iter().find_map(|op| match op {
        DrawOp::NotificationList(items) => Some(items),
        _ => None,
    });
    assert!(list.unwrap()[0].contains("Selam"));
}

#[test]
fn test_chime_gated_on_audio_unlock() {
    let store = store_with_one_pending();

    let mut ui = UiState::new();
    let ops = render::render_dashboard(&store, &mut ui, vec![], true);
    assert!(!ops.contains(&DrawOp::PlayChime));

    ui.unlock_audio();
    let ops = render::render_dashboard(&store, &mut ui, vec![], true);
    assert!(ops.contains(&DrawOp::PlayChime));
}
