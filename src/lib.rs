//! Tabletop Tools State Library
//!
//! This crate provides state management for tabletop role-playing session
//! tools: a catalog of utilities and a combat initiative tracker.
//!
//! # Overview
//!
//! - **Roster** - Ordered combatant rows with initiative, name, hit points and
//!   armor class, plus the turn pointer and round counter.
//!
//! - **Tracker** - View-model owning the roster, a seedable dice source,
//!   confirmation for destructive actions and change notifications.
//!
//! - **Catalog** - The tools offered on the landing page and which of them
//!   can be opened.
//!
//! # Design Principles
//!
//! 1. **Transitions are total** - Bad input and unknown ids are absorbed as
//!    no-ops, never surfaced as errors.
//!
//! 2. **No rendering** - This crate is pure state. A presentation layer polls
//!    `revision()` or drains `take_changes()` to know when to redraw.
//!
//! 3. **Deterministic when asked** - Dice come from an injected RNG, so a seed
//!    reproduces every roll.
//!
//! 4. **Serialization-ready** - State can be snapshotted as JSON for clients.
//!
//! Transitions emit `tracing` events; install a subscriber to see them.
//!
//! # Example
//!
//! ```rust
//! use tabletop_tools::{AppState, Field, Tracker, TrackerConfig, COMBAT_TRACKER_KEY};
//!
//! let mut app = AppState::with_tracker(Tracker::with_seed(TrackerConfig::default(), 7).unwrap());
//! let tracker = app.open_tool(COMBAT_TRACKER_KEY).unwrap();
//!
//! let ids: Vec<_> = tracker.rows().iter().map(|r| r.id).collect();
//! tracker.edit_cell(ids[0], Field::Name, "Goblin");
//! tracker.edit_cell(ids[0], Field::Initiative, "12");
//! tracker.edit_cell(ids[1], Field::Name, "Paladin");
//! tracker.roll_initiative(ids[1]);
//!
//! tracker.sort_by_initiative_descending();
//! let step = tracker.advance_turn();
//! assert_eq!(step.index, 1);
//! assert_eq!(tracker.round_number(), 1);
//! ```

pub mod config;
pub mod state;

pub use config::{ConfigError, TrackerConfig};
pub use state::*;
