//! Combatant rows and cell editing.
//!
//! A row is one line of the initiative table. Numeric cells only ever hold
//! integers or nothing; raw input is parsed at the edit boundary and rejected
//! silently when it isn't an integer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque row identifier, unique within a roster and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(u64);

impl CombatantId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One combatant in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantRow {
    pub id: CombatantId,

    /// Turn order value, higher acts first
    pub initiative: Option<i32>,

    /// Free text, may be empty
    pub name: String,

    pub hit_points: Option<i32>,

    pub armor_class: Option<i32>,
}

impl CombatantRow {
    /// Create a row with every cell empty.
    pub fn blank(id: CombatantId) -> Self {
        Self {
            id,
            initiative: None,
            name: String::new(),
            hit_points: None,
            armor_class: None,
        }
    }

    /// Check that no cell has been filled in.
    pub fn is_blank(&self) -> bool {
        self.initiative.is_none()
            && self.name.is_empty()
            && self.hit_points.is_none()
            && self.armor_class.is_none()
    }

    /// Apply a typed edit. Returns true if the cell value changed.
    pub fn apply(&mut self, edit: CellEdit) -> bool {
        match edit {
            CellEdit::Initiative(v) => replace(&mut self.initiative, v),
            CellEdit::Name(v) => replace(&mut self.name, v),
            CellEdit::HitPoints(v) => replace(&mut self.hit_points, v),
            CellEdit::ArmorClass(v) => replace(&mut self.armor_class, v),
        }
    }

    /// Read a cell back as display text (empty for unset numbers).
    pub fn cell_text(&self, field: Field) -> String {
        let number = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_default();
        match field {
            Field::Initiative => number(self.initiative),
            Field::Name => self.name.clone(),
            Field::HitPoints => number(self.hit_points),
            Field::ArmorClass => number(self.armor_class),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Editable columns of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Initiative,
    Name,
    HitPoints,
    ArmorClass,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Initiative,
        Field::Name,
        Field::HitPoints,
        Field::ArmorClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initiative => "initiative",
            Self::Name => "name",
            Self::HitPoints => "hit_points",
            Self::ArmorClass => "armor_class",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Name)
    }

    /// Keystroke filter for an open editor: numeric cells only take digits.
    pub fn admits_keystroke(&self, ch: char) -> bool {
        !self.is_numeric() || ch.is_ascii_digit()
    }

    /// Parse raw editor text into a typed edit for this field.
    pub fn parse(&self, raw: &str) -> Result<CellEdit, EditError> {
        match self {
            Self::Name => Ok(CellEdit::Name(raw.to_string())),
            Self::Initiative => parse_numeric(raw).map(CellEdit::Initiative),
            Self::HitPoints => parse_numeric(raw).map(CellEdit::HitPoints),
            Self::ArmorClass => parse_numeric(raw).map(CellEdit::ArmorClass),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, typed value for a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEdit {
    Initiative(Option<i32>),
    Name(String),
    HitPoints(Option<i32>),
    ArmorClass(Option<i32>),
}

impl CellEdit {
    pub fn field(&self) -> Field {
        match self {
            Self::Initiative(_) => Field::Initiative,
            Self::Name(_) => Field::Name,
            Self::HitPoints(_) => Field::HitPoints,
            Self::ArmorClass(_) => Field::ArmorClass,
        }
    }
}

/// Why raw input was not admitted into a cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{0:?} is not an integer")]
    NotAnInteger(String),
}

/// Parse numeric cell input. Blank clears the cell.
pub fn parse_numeric(raw: &str) -> Result<Option<i32>, EditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| EditError::NotAnInteger(raw.to_string()))
}
