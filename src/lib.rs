//! rideops: terminal admin console for a ride-dispatch operation.
//!
//! The library is the coordination layer between a rate-limited dispatch
//! backend and a live console dashboard: a TTL read cache and per-endpoint
//! throttle in the [`gateway`], a debounced poll [`scheduler`], a
//! [`store`] that reconciles each snapshot cycle, pure [`render`]
//! functions producing platform-neutral draw instructions, and a
//! [`dispatch`] table for every admin mutation. A [`session::Session`]
//! ties them together for the lifetime of one dashboard run.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod macros;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;
pub mod ui;

pub use error::{Result, RideopsError};
pub use gateway::{Fetch, Gateway, WriteOutcome};
pub use session::{Session, SessionCommand, SessionEnd, SessionHandle};
pub use store::{CycleOutcome, SelectionMemo, SnapshotStore};
