//! Initiative tracker view-model.
//!
//! Owns one [`RosterState`] and everything around it that a presentation
//! layer needs: the dice source, a yes/no gate for destructive actions, the
//! round-reset highlight, and a queue of change notifications.
//!
//! # Change notifications
//!
//! Every call that actually changed state bumps [`Tracker::revision`] and
//! queues a [`StateChange`]. A renderer either compares revisions between
//! frames or drains [`Tracker::take_changes`]. The queue holds at most
//! [`MAX_QUEUED_CHANGES`] entries; older ones are dropped first.
//!
//! # Confirmation
//!
//! ```text
//! ┌──────┐ request_delete / request_clear ┌─────────┐
//! │ Idle │───────────────────────────────▶│ Pending │
//! └──────┘◀───────────────────────────────└─────────┘
//!             confirm (applies) / cancel
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

use super::combatant::{CellEdit, CombatantId, CombatantRow, Field};
use super::roster::{RosterState, TurnAdvance};
use crate::config::{ConfigError, TrackerConfig};

/// Notifications kept for a renderer that never drains them.
pub const MAX_QUEUED_CHANGES: usize = 256;

/// Notification that tracker state changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    RowAdded { id: CombatantId },
    RowDeleted { id: CombatantId },
    CellEdited { id: CombatantId, field: Field },
    InitiativeRolled { id: CombatantId, value: i32 },
    Sorted,
    TurnAdvanced { index: usize, round: u32 },
    RoundsReset,
    Cleared,
}

/// Destructive action awaiting a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingConfirmation {
    DeleteRow { id: CombatantId },
    ClearAll,
}

impl PendingConfirmation {
    /// Prompt text for the confirmation popup.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::DeleteRow { .. } => "Do you really want to delete this row?",
            Self::ClearAll => "Do you really want to clear everything?",
        }
    }
}

/// Combat tracker view-model.
#[derive(Debug)]
pub struct Tracker<R = ChaCha8Rng> {
    roster: RosterState,
    rng: R,
    config: TrackerConfig,
    pending: Option<PendingConfirmation>,
    pulse_started_at: Option<DateTime<Utc>>,
    revision: u64,
    changes: VecDeque<StateChange>,
}

impl Tracker<ChaCha8Rng> {
    /// Create a tracker whose dice are seeded from the OS.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::from_os_rng())
    }

    /// Create a tracker with reproducible dice.
    pub fn with_seed(config: TrackerConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for Tracker<ChaCha8Rng> {
    fn default() -> Self {
        Self::build(TrackerConfig::default(), ChaCha8Rng::from_os_rng())
    }
}

impl<R: rand::Rng> Tracker<R> {
    /// Create a tracker with a caller-supplied dice source.
    pub fn with_rng(config: TrackerConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: TrackerConfig, rng: R) -> Self {
        Self {
            roster: RosterState::new(config.template_size),
            rng,
            config,
            pending: None,
            pulse_started_at: None,
            revision: 0,
            changes: VecDeque::new(),
        }
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    pub fn rows(&self) -> &[CombatantRow] {
        self.roster.rows()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn current_turn_index(&self) -> usize {
        self.roster.current_turn_index()
    }

    pub fn round_number(&self) -> u32 {
        self.roster.round_number()
    }

    /// Monotonic counter, bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain queued change notifications, oldest first.
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        self.changes.drain(..).collect()
    }

    fn notify(&mut self, change: StateChange) {
        self.revision += 1;
        if self.changes.len() == MAX_QUEUED_CHANGES {
            self.changes.pop_front();
        }
        self.changes.push_back(change);
    }

    // Roster operations

    pub fn add_row(&mut self) -> CombatantId {
        let id = self.roster.add_row();
        self.notify(StateChange::RowAdded { id });
        id
    }

    pub fn delete_row(&mut self, id: CombatantId) -> Option<CombatantRow> {
        let removed = self.roster.delete_row(id)?;
        if self.pending == Some(PendingConfirmation::DeleteRow { id }) {
            self.pending = None;
        }
        self.notify(StateChange::RowDeleted { id });
        Some(removed)
    }

    pub fn edit_cell(&mut self, id: CombatantId, field: Field, raw: &str) -> bool {
        let changed = self.roster.edit_cell(id, field, raw);
        if changed {
            self.notify(StateChange::CellEdited { id, field });
        }
        changed
    }

    pub fn apply_edit(&mut self, id: CombatantId, edit: CellEdit) -> bool {
        let field = edit.field();
        let changed = self.roster.apply_edit(id, edit);
        if changed {
            self.notify(StateChange::CellEdited { id, field });
        }
        changed
    }

    pub fn roll_initiative(&mut self, id: CombatantId) -> Option<i32> {
        let value = self
            .roster
            .roll_initiative(id, self.config.die_sides, &mut self.rng)?;
        self.notify(StateChange::InitiativeRolled { id, value });
        Some(value)
    }

    pub fn sort_by_initiative_descending(&mut self) {
        self.roster.sort_by_initiative_descending();
        self.notify(StateChange::Sorted);
    }

    pub fn advance_turn(&mut self) -> TurnAdvance {
        let step = self.roster.advance_turn();
        self.notify(StateChange::TurnAdvanced {
            index: step.index,
            round: step.round,
        });
        step
    }

    /// Reset the round counter and start the highlight pulse.
    pub fn reset_rounds(&mut self) {
        self.reset_rounds_at(Utc::now());
    }

    pub fn reset_rounds_at(&mut self, now: DateTime<Utc>) {
        self.roster.reset_rounds();
        self.pulse_started_at = Some(now);
        self.notify(StateChange::RoundsReset);
    }

    pub fn clear_all(&mut self) {
        self.roster.clear_all();
        self.pending = None;
        self.notify(StateChange::Cleared);
    }

    // Round-reset pulse

    pub fn is_pulse_active(&self) -> bool {
        self.is_pulse_active_at(Utc::now())
    }

    /// Whether the reset highlight should still be shown at `now`.
    pub fn is_pulse_active_at(&self, now: DateTime<Utc>) -> bool {
        self.pulse_started_at
            .is_some_and(|start| now >= start && now - start < self.config.pulse_duration())
    }

    // Confirmation gate

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.pending
    }

    /// Ask before deleting a row. Unknown ids are ignored.
    pub fn request_delete(&mut self, id: CombatantId) -> bool {
        if self.roster.get(id).is_none() {
            return false;
        }
        self.pending = Some(PendingConfirmation::DeleteRow { id });
        true
    }

    pub fn request_clear(&mut self) {
        self.pending = Some(PendingConfirmation::ClearAll);
    }

    /// Carry out the pending action. Returns what was confirmed, if anything.
    pub fn confirm(&mut self) -> Option<PendingConfirmation> {
        let pending = self.pending.take()?;
        debug!(?pending, "confirmed");
        match pending {
            PendingConfirmation::DeleteRow { id } => {
                self.delete_row(id);
            }
            PendingConfirmation::ClearAll => self.clear_all(),
        }
        Some(pending)
    }

    pub fn cancel(&mut self) -> Option<PendingConfirmation> {
        self.pending.take()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "rows": self.roster.rows(),
            "current_turn_index": self.roster.current_turn_index(),
            "round": self.roster.round_number(),
            "pending_confirmation": self.pending,
            "revision": self.revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn tracker() -> Tracker {
        init_tracing();
        Tracker::with_seed(TrackerConfig::default(), 42).unwrap()
    }

    fn first_id(t: &Tracker) -> CombatantId {
        t.rows()[0].id
    }

    #[test]
    fn test_new_tracker() {
        let t = tracker();
        assert_eq!(t.rows().len(), 5);
        assert_eq!(t.current_turn_index(), 0);
        assert_eq!(t.round_number(), 1);
        assert_eq!(t.revision(), 0);
        assert!(t.pending_confirmation().is_none());
    }

    #[test]
    fn test_changes_are_queued() {
        let mut t = tracker();
        let id = t.add_row();
        t.edit_cell(id, Field::Name, "Ogre");
        t.edit_cell(id, Field::HitPoints, "abc");
        t.advance_turn();

        assert_eq!(t.revision(), 3);
        assert_eq!(
            t.take_changes(),
            vec![
                StateChange::RowAdded { id },
                StateChange::CellEdited {
                    id,
                    field: Field::Name
                },
                StateChange::TurnAdvanced { index: 1, round: 1 },
            ]
        );
        assert!(t.take_changes().is_empty());
    }

    #[test]
    fn test_noop_does_not_notify() {
        let mut t = tracker();
        let ghost = CombatantId::new(1_000);
        assert!(t.delete_row(ghost).is_none());
        assert!(!t.edit_cell(ghost, Field::Name, "x"));
        assert!(t.roll_initiative(ghost).is_none());
        assert_eq!(t.revision(), 0);
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let mut a = tracker();
        let mut b = tracker();
        let ra: Vec<_> = (0..5).map(|_| a.roll_initiative(first_id(&a))).collect();
        let rb: Vec<_> = (0..5).map(|_| b.roll_initiative(first_id(&b))).collect();
        assert_eq!(ra, rb);
        assert!(ra.iter().flatten().all(|v| (1..=20).contains(v)));
    }

    #[test]
    fn test_custom_die() {
        let config = TrackerConfig {
            die_sides: 6,
            ..TrackerConfig::default()
        };
        let mut t = Tracker::with_seed(config, 3).unwrap();
        let id = first_id(&t);
        for _ in 0..100 {
            let v = t.roll_initiative(id).unwrap();
            assert!((1..=6).contains(&v));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            die_sides: 0,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            Tracker::with_seed(config, 9),
            Err(ConfigError::Invalid(_))
        ));

        let config = TrackerConfig {
            template_size: 1_000_000,
            ..TrackerConfig::default()
        };
        assert!(Tracker::with_rng(config, ChaCha8Rng::seed_from_u64(9)).is_err());
    }

    #[test]
    fn test_change_queue_is_bounded() {
        let mut t = tracker();
        for _ in 0..(MAX_QUEUED_CHANGES * 4) {
            t.advance_turn();
        }
        assert_eq!(t.revision(), (MAX_QUEUED_CHANGES * 4) as u64);

        let changes = t.take_changes();
        assert_eq!(changes.len(), MAX_QUEUED_CHANGES);
        // Newest entries are kept: 1024 advances over 5 rows end on index 4
        assert_eq!(
            changes.last(),
            Some(&StateChange::TurnAdvanced {
                index: 4,
                round: 205
            })
        );
        assert!(t.take_changes().is_empty());
    }

    #[test]
    fn test_confirm_delete() {
        let mut t = tracker();
        let id = first_id(&t);

        assert!(t.request_delete(id));
        assert_eq!(
            t.pending_confirmation(),
            Some(PendingConfirmation::DeleteRow { id })
        );
        assert_eq!(t.rows().len(), 5);

        assert_eq!(t.confirm(), Some(PendingConfirmation::DeleteRow { id }));
        assert_eq!(t.rows().len(), 4);
        assert!(t.roster().get(id).is_none());
        assert!(t.pending_confirmation().is_none());
    }

    #[test]
    fn test_cancel_keeps_state() {
        let mut t = tracker();
        t.request_clear();
        assert_eq!(t.cancel(), Some(PendingConfirmation::ClearAll));
        assert!(t.confirm().is_none());
        assert_eq!(t.revision(), 0);
    }

    #[test]
    fn test_request_delete_unknown() {
        let mut t = tracker();
        assert!(!t.request_delete(CombatantId::new(500)));
        assert!(t.pending_confirmation().is_none());
    }

    #[test]
    fn test_new_request_replaces_old() {
        let mut t = tracker();
        let id = first_id(&t);
        t.request_delete(id);
        t.request_clear();
        assert_eq!(t.pending_confirmation(), Some(PendingConfirmation::ClearAll));
        assert_eq!(
            t.pending_confirmation().map(|p| p.prompt()),
            Some("Do you really want to clear everything?")
        );
    }

    #[test]
    fn test_confirm_clear() {
        let mut t = tracker();
        let id = t.add_row();
        t.edit_cell(id, Field::Initiative, "9");
        t.advance_turn();
        t.advance_turn();

        t.request_clear();
        t.confirm();

        assert_eq!(t.rows().len(), 5);
        assert!(t.rows().iter().all(|r| r.is_blank()));
        assert_eq!(t.current_turn_index(), 0);
        assert_eq!(t.round_number(), 1);
        assert_eq!(t.take_changes().last(), Some(&StateChange::Cleared));
    }

    #[test]
    fn test_reset_pulse_window() {
        let mut t = tracker();
        let now = Utc::now();
        assert!(!t.is_pulse_active_at(now));

        for _ in 0..6 {
            t.advance_turn();
        }
        assert_eq!(t.round_number(), 2);

        t.reset_rounds_at(now);
        assert_eq!(t.round_number(), 1);
        assert!(t.is_pulse_active_at(now));
        assert!(t.is_pulse_active_at(now + chrono::Duration::milliseconds(499)));
        assert!(!t.is_pulse_active_at(now + chrono::Duration::milliseconds(500)));
        // Pulse is cosmetic only
        assert_eq!(t.current_turn_index(), 1);
    }

    #[test]
    fn test_to_json() {
        let mut t = tracker();
        t.request_clear();
        let json = t.to_json();
        assert_eq!(json["round"], 1);
        assert_eq!(json["rows"].as_array().map(|r| r.len()), Some(5));
        assert_eq!(json["pending_confirmation"]["action"], "clear_all");
    }

    #[test]
    fn test_change_serialization() {
        let change = StateChange::TurnAdvanced { index: 2, round: 3 };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "turn_advanced", "index": 2, "round": 3})
        );
    }
}
