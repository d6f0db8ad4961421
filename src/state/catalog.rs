//! Landing-page catalog of session tools.
//!
//! Only the combat tracker is built; the rest are listed as upcoming.

use serde::Serialize;

/// Key of the one tool that can be opened.
pub const COMBAT_TRACKER_KEY: &str = "combat-tracker";

/// Availability of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolStatus {
    Available { route: &'static str },
    UnderConstruction,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Label for the card's action button.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Available { .. } => "Open",
            Self::UnderConstruction => "Under construction",
        }
    }
}

/// One card on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolEntry {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub status: ToolStatus,
}

#[derive(Debug, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                ToolEntry {
                    key: COMBAT_TRACKER_KEY,
                    title: "Combat Oracle",
                    description: "Run initiative, track hit points and armor class, \
                                  and keep the flow of battle moving round after round.",
                    status: ToolStatus::Available { route: "/tracker" },
                },
                ToolEntry {
                    key: "npc-generator",
                    title: "Destiny Forge",
                    description: "Create unique characters in seconds, with personalities, \
                                  motivations and secrets ready to surprise your players.",
                    status: ToolStatus::UnderConstruction,
                },
                ToolEntry {
                    key: "dice-roller",
                    title: "Dice of Fate",
                    description: "Roll any combination of dice. Luck or destiny?",
                    status: ToolStatus::UnderConstruction,
                },
                ToolEntry {
                    key: "campaign-manager",
                    title: "Campaign Grimoire",
                    description: "Organize sessions, record legends and keep your \
                                  campaign's grimoire close at hand.",
                    status: ToolStatus::UnderConstruction,
                },
                ToolEntry {
                    key: "map-generator",
                    title: "Map Maker",
                    description: "Build tactical maps and adventure scenes with custom \
                                  terrain and markers.",
                    status: ToolStatus::UnderConstruction,
                },
                ToolEntry {
                    key: "loot-randomizer",
                    title: "Treasures of the Unexpected",
                    description: "Generate rewards, magic items and legendary treasure \
                                  for your sessions.",
                    status: ToolStatus::UnderConstruction,
                },
            ],
        }
    }
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn available(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.iter().filter(|e| e.status.is_available())
    }

    pub fn is_available(&self, key: &str) -> bool {
        self.get(key).is_some_and(|e| e.status.is_available())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_order() {
        let catalog = ToolCatalog::new();
        let keys: Vec<_> = catalog.entries().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                "combat-tracker",
                "npc-generator",
                "dice-roller",
                "campaign-manager",
                "map-generator",
                "loot-randomizer",
            ]
        );
    }

    #[test]
    fn test_only_tracker_available() {
        let catalog = ToolCatalog::new();
        let available: Vec<_> = catalog.available().map(|e| e.key).collect();
        assert_eq!(available, vec![COMBAT_TRACKER_KEY]);
        assert!(catalog.is_available(COMBAT_TRACKER_KEY));
        assert!(!catalog.is_available("dice-roller"));
        assert!(!catalog.is_available("missing"));
        assert_eq!(catalog.entries()[0].status.action_label(), "Open");
        assert_eq!(
            catalog.get("map-generator").map(|e| e.status.action_label()),
            Some("Under construction")
        );
    }

    #[test]
    fn test_to_json() {
        let json = ToolCatalog::new().to_json();
        assert_eq!(json[0]["status"], "available");
        assert_eq!(json[0]["route"], "/tracker");
        assert_eq!(json[1]["status"], "under_construction");
        assert_eq!(json[1]["key"], "npc-generator");
    }
}
