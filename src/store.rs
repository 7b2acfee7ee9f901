//! Snapshot store: the single owner of everything fetched from the backend.
//!
//! Collections are replaced wholesale once per successful poll cycle, never
//! merged. The store is only mutated after all reads for a cycle have
//! settled, so interleaved cycles can never observe a half-applied
//! snapshot.

use std::collections::{HashMap, HashSet, VecDeque};

use jiff::Timestamp;

use crate::types::{
    ActiveRide, DashboardStats, Driver, Passenger, PendingRide, RideRecord,
};

/// Maximum number of notifications retained, newest first.
pub const NOTIFICATION_LIMIT: usize = 10;

/// One entry in the notification dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    /// When the entry was created locally, for "time ago" labels.
    pub at: Timestamp,
}

/// What a dashboard cycle did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    /// False when the stats read failed and the whole cycle was discarded.
    pub applied: bool,
    /// Notification strings added for newly appeared pending rides.
    pub new_notifications: usize,
    /// The pending-request count grew; the view may chime if audio is
    /// unlocked.
    pub pending_grew: bool,
}

/// Transient driver selections per pending ride, preserved across redraws.
///
/// Entries are purged the moment the ride leaves the pending set.
#[derive(Debug, Clone, Default)]
pub struct SelectionMemo {
    chosen: HashMap<u64, u64>,
}

impl SelectionMemo {
    pub fn remember(&mut self, ride_id: u64, driver_id: u64) {
        self.chosen.insert(ride_id, driver_id);
    }

    pub fn chosen_for(&self, ride_id: u64) -> Option<u64> {
        self.chosen.get(&ride_id).copied()
    }

    pub fn forget(&mut self, ride_id: u64) {
        self.chosen.remove(&ride_id);
    }

    /// Keep only entries whose ride is still pending.
    pub fn retain_pending(&mut self, pending_ids: &HashSet<u64>) {
        self.chosen.retain(|ride_id, _| pending_ids.contains(ride_id));
    }
}

/// Latest fetched collections plus the cursors that survive refreshes.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    pub stats: DashboardStats,
    pub pending: Vec<PendingRide>,
    pub active: Vec<ActiveRide>,
    /// Drivers currently available for assignment (dashboard read).
    pub available_drivers: Vec<Driver>,
    /// Full roster (drivers pane read).
    pub drivers: Vec<Driver>,
    pub passengers: Vec<Passenger>,
    pub ride_history: Vec<RideRecord>,
    pub notifications: VecDeque<Notification>,
    pub selection_memo: SelectionMemo,
    pub unread_feedback: u64,
    last_pending_count: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one dashboard cycle: stats, pending rides, active rides and
    /// available drivers, all read concurrently by the caller.
    ///
    /// A missing stats payload is the gateway's signal of a transient
    /// failure; the entire cycle is discarded and the store left unchanged.
    /// The other three reads degrade to empty collections individually.
    pub fn apply_dashboard_cycle(
        &mut self,
        stats: Option<DashboardStats>,
        pending: Option<Vec<PendingRide>>,
        active: Option<Vec<ActiveRide>>,
        available: Option<Vec<Driver>>,
    ) -> CycleOutcome {
        let Some(stats) = stats else {
            return CycleOutcome::default();
        };

        let old_ids: HashSet<u64> = self.pending.iter().map(|r| r.id).collect();
        let pending = pending.unwrap_or_default();

        let mut new_notifications = 0;
        for ride in &pending {
            if !old_ids.contains(&ride.id) {
                self.notifications.push_front(Notification {
                    message: format!(
                        "New ride from {} at {}",
                        ride.user_name, ride.request_time
                    ),
                    at: Timestamp::now(),
                });
                new_notifications += 1;
            }
        }
        self.notifications.truncate(NOTIFICATION_LIMIT);

        let pending_grew = stats.pending_requests > self.last_pending_count;
        self.last_pending_count = stats.pending_requests;

        self.pending = pending;
        self.active = active.unwrap_or_default();
        self.available_drivers = available.unwrap_or_default();
        self.stats = stats;

        let pending_ids: HashSet<u64> = self.pending.iter().map(|r| r.id).collect();
        self.selection_memo.retain_pending(&pending_ids);

        CycleOutcome {
            applied: true,
            new_notifications,
            pending_grew,
        }
    }

    /// Full-refetch path for the roster panes: drivers, ride history and
    /// passengers are each replaced with whatever the read returned.
    pub fn apply_roster(
        &mut self,
        drivers: Option<Vec<Driver>>,
        ride_history: Option<Vec<RideRecord>>,
        passengers: Option<Vec<Passenger>>,
    ) {
        self.drivers = drivers.unwrap_or_default();
        self.ride_history = ride_history.unwrap_or_default();
        self.passengers = passengers.unwrap_or_default();
    }

    pub fn set_unread_feedback(&mut self, count: u64) {
        self.unread_feedback = count;
    }

    /// Remove one notification (mark as read).
    pub fn dismiss_notification(&mut self, index: usize) {
        if index < self.notifications.len() {
            self.notifications.remove(index);
        }
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }
}
