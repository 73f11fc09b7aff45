use regex::Regex;
use tracing::info;

use crate::model::event_result::{ExtractionReport, StateChange};
use crate::model::game_state::GameState;

pub const LOCATIONS: [&str; 5] = ["forest", "castle", "dungeon", "village", "cave"];
pub const ITEMS: [&str; 5] = ["sword", "potion", "key", "gold", "map"];
pub const ACQUISITION_TRIGGERS: [&str; 2] = ["find", "obtain"];

lazy_static::lazy_static! {
    static ref DAMAGE_PATTERN: Regex =
        Regex::new(r"(?i)lose ([0-9]+) health").expect("damage pattern is valid");
}

/// One row of the extraction table: a pattern over the narrative and the
/// mutation it triggers.
#[derive(Debug, Clone)]
pub enum ExtractionRule {
    /// First "lose N health" only; later occurrences are not summed.
    Damage { pattern: Regex },

    /// Every vocabulary word found overwrites the location, so the last
    /// match in vocabulary order wins regardless of where it sits in the text.
    Location { vocabulary: Vec<String> },

    /// Gated on a case-sensitive trigger substring; each vocabulary word
    /// present is appended, even if already carried.
    ItemAcquisition {
        triggers: Vec<String>,
        vocabulary: Vec<String>,
    },
}

impl ExtractionRule {
    fn apply(&self, narrative: &str, lowered: &str, state: &mut GameState) -> Vec<StateChange> {
        match self {
            ExtractionRule::Damage { pattern } => {
                let Some(caps) = pattern.captures(narrative) else {
                    return Vec::new();
                };
                // digits too large for u32 are lethal anyway
                let amount = caps[1].parse::<u32>().unwrap_or(u32::MAX);
                let health_after = state.take_damage(amount);

                vec![StateChange::Damage {
                    amount,
                    health_after,
                }]
            }

            ExtractionRule::Location { vocabulary } => {
                let mut found = None;
                for location in vocabulary {
                    if lowered.contains(location.as_str()) {
                        state.location = location.clone();
                        found = Some(location.clone());
                    }
                }

                found
                    .map(|location| vec![StateChange::Relocated { location }])
                    .unwrap_or_default()
            }

            ExtractionRule::ItemAcquisition {
                triggers,
                vocabulary,
            } => {
                if !triggers.iter().any(|t| narrative.contains(t.as_str())) {
                    return Vec::new();
                }

                let mut changes = Vec::new();
                for item in vocabulary {
                    if lowered.contains(item.as_str()) {
                        state.inventory.push(item.clone());
                        changes.push(StateChange::ItemAcquired { item: item.clone() });
                    }
                }
                changes
            }
        }
    }
}

/// Derives state mutations from free narrative text.
///
/// Rules run independently, in table order, against the whole narrative.
/// Text that matches nothing is a no-op; extraction never fails.
#[derive(Debug, Clone)]
pub struct StateExtractor {
    rules: Vec<ExtractionRule>,
}

impl Default for StateExtractor {
    fn default() -> Self {
        Self::with_rules(vec![
            ExtractionRule::Damage {
                pattern: DAMAGE_PATTERN.clone(),
            },
            ExtractionRule::Location {
                vocabulary: LOCATIONS.iter().map(|s| s.to_string()).collect(),
            },
            ExtractionRule::ItemAcquisition {
                triggers: ACQUISITION_TRIGGERS.iter().map(|s| s.to_string()).collect(),
                vocabulary: ITEMS.iter().map(|s| s.to_string()).collect(),
            },
        ])
    }
}

impl StateExtractor {
    pub fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    pub fn apply(&self, narrative: &str, state: &mut GameState) -> ExtractionReport {
        let lowered = narrative.to_lowercase();
        let mut report = ExtractionReport::default();

        for rule in &self.rules {
            for change in rule.apply(narrative, &lowered, state) {
                info!(?change, "state change extracted from narrative");
                report.changes.push(change);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fresh_state() -> GameState {
        GameState::new("Brom", "Warrior")
    }

    #[test]
    fn damage_is_subtracted() {
        let mut state = fresh_state();
        let report = StateExtractor::default().apply("The troll hits you. You lose 15 health.", &mut state);

        assert_eq!(state.health, 85);
        assert_eq!(
            report.changes,
            vec![StateChange::Damage {
                amount: 15,
                health_after: 85
            }]
        );
    }

    #[test]
    fn damage_match_is_case_insensitive() {
        let mut state = fresh_state();
        StateExtractor::default().apply("You LOSE 7 HEALTH.", &mut state);
        assert_eq!(state.health, 93);
    }

    #[test]
    fn only_first_damage_is_honored() {
        let mut state = fresh_state();
        StateExtractor::default().apply("You lose 10 health, then you lose 20 health.", &mut state);
        assert_eq!(state.health, 90);
    }

    #[test]
    fn huge_damage_floors_at_zero() {
        let mut state = fresh_state();
        StateExtractor::default().apply("You lose 99999999999999999999 health.", &mut state);
        assert_eq!(state.health, 0);
    }

    #[test]
    fn non_ascii_digits_are_not_damage() {
        for text in ["you lose \u{0663} health", "You lose \u{FF15} health."] {
            let mut state = fresh_state();
            let report = StateExtractor::default().apply(text, &mut state);

            assert_eq!(state.health, 100, "{text:?} should not hurt");
            assert!(report.is_empty());
        }
    }

    #[test]
    fn last_location_in_vocabulary_order_wins() {
        let mut state = fresh_state();
        StateExtractor::default().apply(
            "You arrive at the ancient Castle and also pass a Forest",
            &mut state,
        );
        // forest is checked before castle, so castle overwrites it
        assert_eq!(state.location, "castle");

        let mut state = fresh_state();
        StateExtractor::default().apply("A cave mouth opens near the village.", &mut state);
        assert_eq!(state.location, "cave");
    }

    #[test]
    fn found_items_are_appended_in_vocabulary_order() {
        let mut state = fresh_state();
        let extractor = StateExtractor::default();

        extractor.apply("You find a Sword and a Potion", &mut state);
        assert_eq!(state.inventory, vec!["sword", "potion"]);

        extractor.apply("You find a Sword and a Potion", &mut state);
        assert_eq!(state.inventory, vec!["sword", "potion", "sword", "potion"]);
    }

    #[test]
    fn vocabulary_order_not_text_order() {
        let mut state = fresh_state();
        StateExtractor::default().apply("You obtain a map, some gold and a key.", &mut state);
        assert_eq!(state.inventory, vec!["key", "gold", "map"]);
    }

    #[test]
    fn items_need_a_lowercase_trigger() {
        let mut state = fresh_state();
        StateExtractor::default().apply("Find the sword! There is a potion here.", &mut state);
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn unmatched_text_is_a_noop() {
        let mut state = fresh_state();
        let before = state.clone();
        let report = StateExtractor::default().apply("You wander aimlessly", &mut state);

        assert!(report.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn mana_and_identity_are_never_touched() {
        let mut state = fresh_state();
        StateExtractor::default().apply(
            "You lose 5 health and find a potion in the dungeon. Your mana surges.",
            &mut state,
        );

        assert_eq!(state.mana, 50);
        assert_eq!(state.name(), "Brom");
        assert_eq!(state.character_class(), "Warrior");
        assert_eq!(state.health, 95);
        assert_eq!(state.location, "dungeon");
        assert_eq!(state.inventory, vec!["potion"]);
    }

    #[test]
    fn custom_table_runs_only_its_rules() {
        let extractor = StateExtractor::with_rules(vec![ExtractionRule::Location {
            vocabulary: vec!["tower".into()],
        }]);
        let mut state = fresh_state();
        extractor.apply("You lose 5 health climbing the tower.", &mut state);

        assert_eq!(state.location, "tower");
        assert_eq!(state.health, 100);
    }

    proptest! {
        #[test]
        fn damage_never_drives_health_negative(start in 0u32..=100, n in 1u32..=500) {
            let mut state = fresh_state();
            state.health = start;
            StateExtractor::default().apply(&format!("You lose {n} health."), &mut state);
            prop_assert_eq!(state.health, start.saturating_sub(n));
        }
    }
}
