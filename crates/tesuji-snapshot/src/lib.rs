//! Durable session snapshots for Tesuji.
//!
//! When a player disappears mid-game, the coordinator flattens the
//! session into a [`SnapshotRecord`] (canonical move list plus a
//! display-only board) and hands it to the [`SnapshotStore`], which keeps
//! exactly one JSON file per session key. Loading validates the schema
//! version; the policy questions (is this resumable? is it stale?) belong
//! to the coordinator, not this crate.

mod error;
mod record;
mod store;

pub use error::SnapshotError;
pub use record::{SnapshotRecord, SCHEMA_VERSION};
pub use store::SnapshotStore;
