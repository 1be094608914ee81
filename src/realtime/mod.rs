//! Realtime change feed
//!
//! The database publishes row changes, [`listener`] receives them, the
//! [`RealtimeHub`] fans them out per table and [`sync`] turns them into
//! callbacks for mounted components.

pub mod change;
pub mod hub;
pub mod listener;
pub mod sync;

pub use change::{Change, ChangeKind, RawChange};
pub use hub::{HubStatus, RealtimeHub};
pub use listener::spawn_listener;
pub use sync::{SyncCallbacks, SyncHandle, SyncHook, SyncOptions, SyncStatus};
