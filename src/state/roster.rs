//! Combatant roster and turn tracking.
//!
//! The roster is an ordered list of rows plus two counters: the index of the
//! combatant whose turn it is and the current round.
//!
//! # Turn cycle
//!
//! ```text
//!   index 0 ──▶ index 1 ──▶ ... ──▶ index len-1
//!      ▲                                │
//!      └──────── wrap, round += 1 ──────┘
//! ```
//!
//! The turn pointer is a plain index. Sorting or deleting rows does not
//! re-target it to the same combatant.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::combatant::{CellEdit, CombatantId, CombatantRow, Field};

/// Number of blank rows a fresh roster starts with.
pub const DEFAULT_TEMPLATE_SIZE: usize = 5;

/// Sides of the die used for initiative rolls.
pub const DEFAULT_DIE_SIDES: u32 = 20;

/// Outcome of [`RosterState::advance_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnAdvance {
    pub index: usize,
    pub round: u32,
    /// True when the pointer wrapped and a new round began
    pub wrapped: bool,
}

/// Why a stored roster was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("duplicate row id {0}")]
    DuplicateId(CombatantId),

    #[error("next id {next_id} would reuse an existing row id")]
    StaleNextId { next_id: u64 },

    #[error("turn index {index} out of range for {len} rows")]
    TurnIndexOutOfRange { index: usize, len: usize },

    #[error("round number must start at 1")]
    ZeroRound,
}

/// Serialized form of [`RosterState`], checked before it becomes one.
#[derive(Deserialize)]
struct StoredRoster {
    rows: Vec<CombatantRow>,
    current_turn_index: usize,
    round_number: u32,
    template_size: usize,
    next_id: u64,
}

impl TryFrom<StoredRoster> for RosterState {
    type Error = RosterError;

    fn try_from(stored: StoredRoster) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(stored.rows.len());
        for row in &stored.rows {
            if !seen.insert(row.id) {
                return Err(RosterError::DuplicateId(row.id));
            }
            if row.id.get() >= stored.next_id {
                return Err(RosterError::StaleNextId {
                    next_id: stored.next_id,
                });
            }
        }

        let len = stored.rows.len();
        let index_ok = if len == 0 {
            stored.current_turn_index == 0
        } else {
            stored.current_turn_index < len
        };
        if !index_ok {
            return Err(RosterError::TurnIndexOutOfRange {
                index: stored.current_turn_index,
                len,
            });
        }
        if stored.round_number == 0 {
            return Err(RosterError::ZeroRound);
        }

        Ok(Self {
            rows: stored.rows,
            current_turn_index: stored.current_turn_index,
            round_number: stored.round_number,
            template_size: stored.template_size,
            next_id: stored.next_id,
        })
    }
}

/// Roster rows plus the turn pointer and round counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRoster")]
pub struct RosterState {
    rows: Vec<CombatantRow>,
    current_turn_index: usize,
    round_number: u32,
    template_size: usize,
    next_id: u64,
}

impl Default for RosterState {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_SIZE)
    }
}

impl RosterState {
    /// Create a roster holding `template_size` blank rows.
    pub fn new(template_size: usize) -> Self {
        let mut roster = Self {
            rows: Vec::with_capacity(template_size),
            current_turn_index: 0,
            round_number: 1,
            template_size,
            next_id: 1,
        };
        roster.fill_template();
        roster
    }

    fn mint_id(&mut self) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn fill_template(&mut self) {
        self.rows.clear();
        for _ in 0..self.template_size {
            let id = self.mint_id();
            self.rows.push(CombatantRow::blank(id));
        }
    }

    // Queries

    pub fn rows(&self) -> &[CombatantRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn template_size(&self) -> usize {
        self.template_size
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn get(&self, id: CombatantId) -> Option<&CombatantRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Display position of a row.
    pub fn position(&self, id: CombatantId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Row whose turn it is, if any.
    pub fn current_row(&self) -> Option<&CombatantRow> {
        self.rows.get(self.current_turn_index)
    }

    pub fn is_current(&self, id: CombatantId) -> bool {
        self.current_row().is_some_and(|r| r.id == id)
    }

    // Transitions

    /// Append a blank row and return its id.
    pub fn add_row(&mut self) -> CombatantId {
        let id = self.mint_id();
        self.rows.push(CombatantRow::blank(id));
        debug!(%id, len = self.rows.len(), "row added");
        id
    }

    /// Remove a row. The turn index keeps its numeric value, clamped into range.
    ///
    /// Deleting the current row when it is last moves the pointer back onto
    /// the previous combatant, so the next advance starts a new round.
    pub fn delete_row(&mut self, id: CombatantId) -> Option<CombatantRow> {
        let Some(pos) = self.position(id) else {
            trace!(%id, "delete of unknown row ignored");
            return None;
        };
        let removed = self.rows.remove(pos);
        if self.current_turn_index >= self.rows.len() {
            self.current_turn_index = self.rows.len().saturating_sub(1);
        }
        debug!(%id, len = self.rows.len(), index = self.current_turn_index, "row deleted");
        Some(removed)
    }

    /// Parse raw text into `field` of row `id`. Returns false when nothing
    /// changed: unknown id, rejected input, or same value.
    pub fn edit_cell(&mut self, id: CombatantId, field: Field, raw: &str) -> bool {
        match field.parse(raw) {
            Ok(edit) => self.apply_edit(id, edit),
            Err(err) => {
                trace!(%id, %field, %err, "cell input rejected");
                false
            }
        }
    }

    /// Apply an already typed edit to row `id`.
    pub fn apply_edit(&mut self, id: CombatantId, edit: CellEdit) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            trace!(%id, "edit of unknown row ignored");
            return false;
        };
        let field = edit.field();
        let changed = row.apply(edit);
        if changed {
            debug!(%id, %field, "cell edited");
        }
        changed
    }

    /// Roll `1..=sides` into the row's initiative, overwriting it. A die
    /// with no sides, or more than `i32::MAX`, rolls nothing.
    pub fn roll_initiative<R: Rng>(
        &mut self,
        id: CombatantId,
        sides: u32,
        rng: &mut R,
    ) -> Option<i32> {
        let Some(sides) = i32::try_from(sides).ok().filter(|s| *s >= 1) else {
            trace!(sides, "roll with unusable die ignored");
            return None;
        };
        let row = self.rows.iter_mut().find(|r| r.id == id)?;
        let value = rng.random_range(1..=sides);
        row.initiative = Some(value);
        debug!(%id, value, "initiative rolled");
        Some(value)
    }

    /// Stable sort, highest initiative first, unset initiative last.
    pub fn sort_by_initiative_descending(&mut self) {
        // Option orders None below Some, so reversing puts None last.
        self.rows.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        debug!(len = self.rows.len(), "roster sorted by initiative");
    }

    /// Move the turn pointer forward, starting a new round on wraparound.
    pub fn advance_turn(&mut self) -> TurnAdvance {
        if self.rows.is_empty() {
            self.current_turn_index = 0;
            return TurnAdvance {
                index: 0,
                round: self.round_number,
                wrapped: false,
            };
        }

        let next = (self.current_turn_index + 1) % self.rows.len();
        let wrapped = next == 0;
        if wrapped {
            self.round_number = self.round_number.saturating_add(1);
        }
        self.current_turn_index = next;
        debug!(index = next, round = self.round_number, "turn advanced");

        TurnAdvance {
            index: next,
            round: self.round_number,
            wrapped,
        }
    }

    pub fn reset_rounds(&mut self) {
        self.round_number = 1;
        debug!("rounds reset");
    }

    /// Restore the blank template with fresh ids and reset both counters.
    pub fn clear_all(&mut self) {
        self.fill_template();
        self.current_turn_index = 0;
        self.round_number = 1;
        debug!(len = self.rows.len(), "roster cleared");
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "rows": self.rows,
            "current_turn_index": self.current_turn_index,
            "round": self.round_number,
        })
    }
}
