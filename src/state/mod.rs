//! State management for the session tools.
//!
//! - `catalog` - Landing-page list of tools and their availability
//! - `combatant` - Combatant rows and cell editing
//! - `roster` - Ordered roster, turn pointer and round counter
//! - `tracker` - View-model around the roster (dice, confirmations, notifications)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          AppState                             │
//! │                                                               │
//! │  ┌──────────────┐   ┌──────────────────────────────────────┐ │
//! │  │ ToolCatalog  │   │               Tracker                │ │
//! │  │              │   │                                      │ │
//! │  │ key →        │   │  RosterState   rng   pending confirm │ │
//! │  │   ToolEntry  │   │  ┌─────────────────────────────────┐ │ │
//! │  │              │   │  │ rows[]  turn index  round       │ │ │
//! │  └──────────────┘   │  └─────────────────────────────────┘ │ │
//! │                     │  revision + StateChange queue        │ │
//! │                     └──────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod combatant;
pub mod roster;
pub mod tracker;

use thiserror::Error;

pub use catalog::{ToolCatalog, ToolEntry, ToolStatus, COMBAT_TRACKER_KEY};
pub use combatant::{parse_numeric, CellEdit, CombatantId, CombatantRow, EditError, Field};
pub use roster::{RosterError, RosterState, TurnAdvance, DEFAULT_DIE_SIDES, DEFAULT_TEMPLATE_SIZE};
pub use tracker::{PendingConfirmation, StateChange, Tracker, MAX_QUEUED_CHANGES};

use crate::config::{ConfigError, TrackerConfig};

/// Error opening a tool from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    Unknown(String),

    #[error("tool is under construction: {0}")]
    UnderConstruction(String),
}

/// Combined application state: the catalog plus the one working tool.
#[derive(Debug)]
pub struct AppState {
    pub catalog: ToolCatalog,
    pub tracker: Tracker,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_tracker(Tracker::default())
    }
}

impl AppState {
    /// Build the app around a tracker for `config`, rejecting invalid settings.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_tracker(Tracker::new(config)?))
    }

    pub fn with_tracker(tracker: Tracker) -> Self {
        Self {
            catalog: ToolCatalog::new(),
            tracker,
        }
    }

    /// Resolve a catalog key to its tool.
    pub fn open_tool(&mut self, key: &str) -> Result<&mut Tracker, ToolError> {
        let entry = self
            .catalog
            .get(key)
            .ok_or_else(|| ToolError::Unknown(key.to_string()))?;

        if !entry.status.is_available() {
            return Err(ToolError::UnderConstruction(key.to_string()));
        }

        match entry.key {
            COMBAT_TRACKER_KEY => Ok(&mut self.tracker),
            _ => Err(ToolError::Unknown(key.to_string())),
        }
    }
}
