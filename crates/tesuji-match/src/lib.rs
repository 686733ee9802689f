//! The Tesuji coordinator.
//!
//! This crate turns an asynchronous two-player game into a deterministic,
//! replayable sequence for two uncoordinated polling clients:
//!
//! - [`RulesEngine`]: the seam to the external game-rules oracle
//! - [`Coordinator`]: move gate, poll synchronizer, reset negotiation,
//!   undo, resignation, and snapshot suspend/resume
//! - [`CoordinatorConfig`]: tunables
//! - [`testing`]: a deterministic reduced rules engine for tests and
//!   demos
//!
//! # Shape of the system
//!
//! ```text
//! client A ──poll/submit──▶ ┌─────────────┐      ┌──────────────┐
//!                           │ Coordinator │─────▶│ RulesEngine  │
//! client B ──poll/submit──▶ │  (per-key   │      │  (oracle)    │
//!                           │   mutex)    │      └──────────────┘
//!                           └─────┬───────┘
//!                                 ▼
//!                        session / snapshot stores
//! ```
//!
//! There is no push channel and no background task: every contract is a
//! synchronous request/reply, and "waiting for the opponent" is simply
//! the client polling again.

mod config;
mod coordinator;
mod error;
mod rules;
pub mod testing;

pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::MatchError;
pub use rules::RulesEngine;
