//! Pre-bet checklist
//!
//! Four informational checks reported alongside a selection. None of them
//! change which runners are picked.

use serde::{Deserialize, Serialize};

use super::classifier::{Role, Selection};
use super::odds::{odds_shortening, DEFAULT_FIRMER_RATIO};
use crate::models::{RaceContext, TrackCondition};

/// Checklist tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    pub field_size_min: usize,
    pub field_size_max: usize,
    /// Highest barrier A and B may draw
    pub barrier_max: u32,
    pub firmer_ratio: f64,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            field_size_min: 8,
            field_size_max: 12,
            barrier_max: 8,
            firmer_ratio: DEFAULT_FIRMER_RATIO,
        }
    }
}

/// Checklist outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub field_size: usize,
    pub field_size_ok: bool,
    pub barriers_ok: bool,
    pub track_condition: TrackCondition,
    pub track_ok: bool,
    pub market_firmer: bool,
    /// Roles whose odds have firmed
    pub firmers: Vec<Role>,
    pub notes: Vec<String>,
}

impl Checklist {
    /// Number of checks passed, out of four
    pub fn passed(&self) -> usize {
        [
            self.field_size_ok,
            self.barriers_ok,
            self.track_ok,
            self.market_firmer,
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }
}

/// Run the checklist against a selection
///
/// `runner_count` is used as the field size unless the race declares one.
pub fn evaluate_checklist(
    selection: &Selection,
    runner_count: usize,
    race: &RaceContext,
    config: &ChecklistConfig,
) -> Checklist {
    let mut notes = Vec::new();
    let front = [&selection.anchor, &selection.pace];

    // Field size
    let field_size = race.declared_runners.unwrap_or(runner_count);
    let field_size_ok = if field_size < config.field_size_min {
        notes.push(format!("Small field ({} runners) - higher risk", field_size));
        false
    } else if field_size > config.field_size_max {
        notes.push(format!("Large field ({} runners) - harder to pick", field_size));
        false
    } else {
        notes.push(format!("Ideal field size ({} runners)", field_size));
        true
    };

    // Barriers
    let mut barriers_ok = true;
    for slot in front {
        if let Some(runner) = slot.runner() {
            if runner.barrier > config.barrier_max {
                barriers_ok = false;
                notes.push(format!(
                    "{} barrier {} > {}",
                    slot.role.letter(),
                    runner.barrier,
                    config.barrier_max
                ));
            }
        }
    }
    if barriers_ok {
        notes.push("A and B have good barriers".to_string());
    }

    // Track condition
    let track_condition = race.track_condition;
    let track_ok = if track_condition.is_wet() {
        let picks: Vec<_> = front.iter().filter_map(|s| s.runner().map(|r| (s.role, r))).collect();
        let missing: Vec<&str> = picks
            .iter()
            .filter(|(_, r)| !r.cues().wet_form)
            .map(|(role, _)| role.letter())
            .collect();
        if picks.is_empty() {
            notes.push(format!("{} track and no A/B picks to check", track_condition.as_str()));
            false
        } else if missing.is_empty() {
            notes.push(format!("{} track: A/B have wet form", track_condition.as_str()));
            true
        } else {
            notes.push(format!(
                "{} track: no wet form for {}",
                track_condition.as_str(),
                missing.join(", ")
            ));
            false
        }
    } else {
        notes.push(format!("Dry track ({})", track_condition.as_str()));
        true
    };

    // Market movers
    let mut firmers = Vec::new();
    let mut any_open_odds = false;
    for slot in front {
        if let Some(runner) = slot.runner() {
            any_open_odds |= runner.open_odds.is_some();
            if odds_shortening(runner.open_odds, runner.odds, config.firmer_ratio) {
                firmers.push(slot.role);
            }
        }
    }
    let market_firmer = !firmers.is_empty();
    if !any_open_odds {
        notes.push("No opening odds supplied".to_string());
    } else if market_firmer {
        let letters: Vec<&str> = firmers.iter().map(|r| r.letter()).collect();
        notes.push(format!("Market firmer: {}", letters.join(", ")));
    } else {
        notes.push("No market support for A/B".to_string());
    }

    Checklist {
        field_size,
        field_size_ok,
        barriers_ok,
        track_condition,
        track_ok,
        market_firmer,
        firmers,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{Candidate, RoleSlot};
    use crate::core::form::FormHistory;
    use crate::models::Runner;

    fn runner(name: &str, barrier: u32, odds: f64) -> Runner {
        Runner {
            name: name.to_string(),
            barrier,
            odds,
            form: FormHistory::default(),
            note: None,
            speed_map: None,
            jockey: None,
            trainer: None,
            track_pref: None,
            distance_pref: None,
            open_odds: None,
        }
    }

    fn selection(a: Option<Runner>, b: Option<Runner>) -> Selection {
        let slot = |role: Role, r: Option<Runner>| match r {
            Some(runner) => RoleSlot::filled(
                role,
                Candidate {
                    runner,
                    score: 10,
                    rationale: vec![],
                },
            ),
            None => RoleSlot::unfilled(role, "test"),
        };
        Selection {
            anchor: slot(Role::Anchor, a),
            pace: slot(Role::Pace, b),
            value: RoleSlot::unfilled(Role::Value, "test"),
        }
    }

    #[test]
    fn test_field_size_range() {
        let sel = selection(None, None);
        let cfg = ChecklistConfig::default();
        let race = RaceContext::default();

        assert!(!evaluate_checklist(&sel, 7, &race, &cfg).field_size_ok);
        assert!(evaluate_checklist(&sel, 8, &race, &cfg).field_size_ok);
        assert!(evaluate_checklist(&sel, 12, &race, &cfg).field_size_ok);
        assert!(!evaluate_checklist(&sel, 13, &race, &cfg).field_size_ok);

        let declared = RaceContext {
            declared_runners: Some(10),
            ..Default::default()
        };
        let checklist = evaluate_checklist(&sel, 3, &declared, &cfg);
        assert!(checklist.field_size_ok);
        assert_eq!(checklist.field_size, 10);
    }

    #[test]
    fn test_barrier_check() {
        let cfg = ChecklistConfig::default();
        let race = RaceContext::default();

        let sel = selection(Some(runner("A", 3, 3.5)), Some(runner("B", 8, 6.0)));
        assert!(evaluate_checklist(&sel, 10, &race, &cfg).barriers_ok);

        let sel = selection(Some(runner("A", 3, 3.5)), Some(runner("B", 11, 6.0)));
        let checklist = evaluate_checklist(&sel, 10, &race, &cfg);
        assert!(!checklist.barriers_ok);
        assert!(checklist.notes.iter().any(|n| n == "B barrier 11 > 8"));
    }

    #[test]
    fn test_track_condition_wet() {
        let cfg = ChecklistConfig::default();
        let wet = RaceContext {
            track_condition: TrackCondition::Heavy,
            ..Default::default()
        };

        let mut a = runner("A", 1, 3.5);
        a.note = Some("Won on a soft track".to_string());
        let mut b = runner("B", 2, 6.0);

        let sel = selection(Some(a.clone()), Some(b.clone()));
        assert!(!evaluate_checklist(&sel, 10, &wet, &cfg).track_ok);

        b.form = FormHistory::parse("213 handles the wet");
        let sel = selection(Some(a), Some(b));
        assert!(evaluate_checklist(&sel, 10, &wet, &cfg).track_ok);

        // Dry tracks always pass
        let sel = selection(Some(runner("A", 1, 3.5)), None);
        assert!(evaluate_checklist(&sel, 10, &RaceContext::default(), &cfg).track_ok);
    }

    #[test]
    fn test_market_firmer() {
        let cfg = ChecklistConfig::default();
        let race = RaceContext::default();

        let sel = selection(Some(runner("A", 1, 3.5)), Some(runner("B", 2, 6.0)));
        let checklist = evaluate_checklist(&sel, 10, &race, &cfg);
        assert!(!checklist.market_firmer);
        assert!(checklist.notes.iter().any(|n| n == "No opening odds supplied"));

        let mut b = runner("B", 2, 6.0);
        b.open_odds = Some(8.0);
        let sel = selection(Some(runner("A", 1, 3.5)), Some(b));
        let checklist = evaluate_checklist(&sel, 10, &race, &cfg);
        assert!(checklist.market_firmer);
        assert_eq!(checklist.firmers, vec![Role::Pace]);
        assert_eq!(checklist.passed(), 4);
    }
}
