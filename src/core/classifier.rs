//! A/B/C role classification
//!
//! Three roles are filled in priority order:
//! - A (Anchor): best credentialed runner, $2.80-$4.50
//! - B (Pace): on-speed runner, $5.00-$10.00
//! - C (Value): runner ready to spike, $8.00-$18.00
//!
//! Each runner inside a role's odds band gets a heuristic score from barrier,
//! recent form, market movement and note keywords. Highest score wins; ties
//! go to the lower barrier, then the shorter price. A runner that already
//! holds a role is not considered for later ones.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use super::checklist::{evaluate_checklist, Checklist, ChecklistConfig};
use super::odds::{format_odds, odds_shortening, OddsBand, DEFAULT_FIRMER_RATIO};
use super::runner::{validate_field, ExcludedRunner};
use crate::models::{RaceContext, Runner, RunnerEntry, SpeedMapHint};

/// Smallest field the classifier accepts
pub const MIN_RUNNERS: usize = 2;

/// Analysis failures that reject the whole race
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("at least 2 runners required, got {0}")]
    TooFewRunners(usize),
}

/// Selection role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Anchor,
    Pace,
    Value,
}

impl Role {
    /// Roles in priority order
    pub const ALL: [Role; 3] = [Role::Anchor, Role::Pace, Role::Value];

    /// Short label: A, B or C
    pub fn letter(&self) -> &'static str {
        match self {
            Role::Anchor => "A",
            Role::Pace => "B",
            Role::Value => "C",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Anchor => "anchor",
            Role::Pace => "pace",
            Role::Value => "value",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifier tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub anchor_band: OddsBand,
    pub pace_band: OddsBand,
    pub value_band: OddsBand,
    pub anchor_barrier_max: u32,
    pub pace_barrier_max: u32,
    pub value_barrier_max: u32,
    /// Candidates scoring below this are ignored
    pub min_score: i32,
    /// Current/opening odds ratio that counts as "market firmer"
    pub firmer_ratio: f64,
    /// Ranked runners-up reported per role
    pub max_alternates: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            anchor_band: OddsBand::new(2.80, 4.50),
            pace_band: OddsBand::new(5.00, 10.00),
            value_band: OddsBand::new(8.00, 18.00),
            anchor_barrier_max: 10,
            pace_barrier_max: 8,
            value_barrier_max: 10,
            min_score: 5,
            firmer_ratio: DEFAULT_FIRMER_RATIO,
            max_alternates: 3,
        }
    }
}

impl ClassifierConfig {
    pub fn band(&self, role: Role) -> OddsBand {
        match role {
            Role::Anchor => self.anchor_band,
            Role::Pace => self.pace_band,
            Role::Value => self.value_band,
        }
    }
}

/// A scored runner for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub runner: Runner,
    pub score: i32,
    pub rationale: Vec<String>,
}

impl Candidate {
    /// Human-readable justification
    pub fn justification(&self) -> String {
        self.rationale.join("; ")
    }
}

/// One role's outcome: a pick, or the reason it stayed empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSlot {
    pub role: Role,
    pub pick: Option<Candidate>,
    pub unfilled_reason: Option<String>,
}

impl RoleSlot {
    pub fn filled(role: Role, pick: Candidate) -> Self {
        Self {
            role,
            pick: Some(pick),
            unfilled_reason: None,
        }
    }

    pub fn unfilled(role: Role, reason: impl Into<String>) -> Self {
        Self {
            role,
            pick: None,
            unfilled_reason: Some(reason.into()),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.pick.is_some()
    }

    pub fn runner(&self) -> Option<&Runner> {
        self.pick.as_ref().map(|c| &c.runner)
    }
}

/// Outcome of classification: one slot per role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: RoleSlot,
    pub pace: RoleSlot,
    pub value: RoleSlot,
}

impl Selection {
    pub fn slot(&self, role: Role) -> &RoleSlot {
        match role {
            Role::Anchor => &self.anchor,
            Role::Pace => &self.pace,
            Role::Value => &self.value,
        }
    }

    /// Slots in priority order
    pub fn slots(&self) -> [&RoleSlot; 3] {
        [&self.anchor, &self.pace, &self.value]
    }

    /// Filled runners in priority order
    pub fn runners(&self) -> Vec<&Runner> {
        self.slots().iter().filter_map(|s| s.runner()).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.slots().iter().filter(|s| s.is_filled()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled_count() == Role::ALL.len()
    }

    /// One warning per unfilled role
    pub fn warnings(&self) -> Vec<String> {
        self.slots()
            .iter()
            .filter(|s| !s.is_filled())
            .map(|s| {
                format!(
                    "Selection incomplete: {} ({}) unfilled - {}",
                    s.role,
                    s.role.letter(),
                    s.unfilled_reason.as_deref().unwrap_or("no candidate")
                )
            })
            .collect()
    }
}

/// Ranked runners-up per role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alternates {
    pub anchor: Vec<Candidate>,
    pub pace: Vec<Candidate>,
    pub value: Vec<Candidate>,
}

/// Full analysis of a race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceAnalysis {
    pub race: RaceContext,
    pub selection: Selection,
    pub alternates: Alternates,
    pub checklist: Checklist,
    pub excluded: Vec<ExcludedRunner>,
    pub warnings: Vec<String>,
}

/// Rule-based A/B/C classifier
#[derive(Debug, Clone, Default)]
pub struct RoleClassifier {
    pub config: ClassifierConfig,
    pub checklist: ChecklistConfig,
}

impl RoleClassifier {
    pub fn new(config: ClassifierConfig, checklist: ChecklistConfig) -> Self {
        Self { config, checklist }
    }

    /// Validate entries, classify, and run the checklist
    ///
    /// Fewer than two entries is an error. Invalid or scratched runners are
    /// excluded and reported; the analysis continues with the rest.
    pub fn analyze(
        &self,
        race: &RaceContext,
        entries: &[RunnerEntry],
    ) -> Result<RaceAnalysis, AnalysisError> {
        if entries.len() < MIN_RUNNERS {
            return Err(AnalysisError::TooFewRunners(entries.len()));
        }

        let (runners, excluded) = validate_field(entries);
        let (selection, alternates) = self.classify(race, &runners);
        let checklist = evaluate_checklist(&selection, runners.len(), race, &self.checklist);

        let mut warnings: Vec<String> = excluded
            .iter()
            .map(|e| format!("Excluded {}: {}", e.name, e.reason))
            .collect();
        warnings.extend(selection.warnings());

        Ok(RaceAnalysis {
            race: race.clone(),
            selection,
            alternates,
            checklist,
            excluded,
            warnings,
        })
    }

    /// Assign roles over already-validated runners
    pub fn classify(&self, race: &RaceContext, runners: &[Runner]) -> (Selection, Alternates) {
        let mut taken: Vec<usize> = Vec::with_capacity(Role::ALL.len());
        let mut slots: Vec<RoleSlot> = Vec::with_capacity(Role::ALL.len());
        let mut alternates = Alternates::default();

        for role in Role::ALL {
            let scored: Vec<(usize, Candidate)> = runners
                .iter()
                .enumerate()
                .filter_map(|(idx, r)| self.score(role, r, race).map(|c| (idx, c)))
                .collect();
            let in_band = scored.len();

            let mut pool: Vec<(usize, Candidate)> = scored
                .into_iter()
                .filter(|(idx, _)| !taken.contains(idx))
                .collect();
            let available = pool.len();

            pool.retain(|(_, c)| c.score >= self.config.min_score);
            pool.sort_by(|(_, a), (_, b)| rank(a, b));

            let slot = match pool.first() {
                Some((idx, best)) => {
                    taken.push(*idx);
                    debug!(
                        "{} ({}): {} scored {} - {}",
                        role,
                        role.letter(),
                        best.runner.name,
                        best.score,
                        best.justification()
                    );
                    RoleSlot::filled(role, best.clone())
                }
                None => {
                    let band = self.config.band(role).label();
                    let reason = if in_band == 0 {
                        format!("no runner in the {} {} band", band, role)
                    } else if available == 0 {
                        format!("every {} {} runner already holds a higher role", band, role)
                    } else {
                        format!(
                            "no {} candidate reached the minimum score of {}",
                            role, self.config.min_score
                        )
                    };
                    warn!("{} role unfilled: {}", role, reason);
                    RoleSlot::unfilled(role, reason)
                }
            };
            slots.push(slot);

            let runners_up: Vec<Candidate> = pool
                .into_iter()
                .skip(1)
                .take(self.config.max_alternates)
                .map(|(_, c)| c)
                .collect();
            match role {
                Role::Anchor => alternates.anchor = runners_up,
                Role::Pace => alternates.pace = runners_up,
                Role::Value => alternates.value = runners_up,
            }
        }

        let mut slots = slots.into_iter();
        let mut next = |role: Role| {
            slots
                .next()
                .unwrap_or_else(|| RoleSlot::unfilled(role, "not evaluated"))
        };
        let selection = Selection {
            anchor: next(Role::Anchor),
            pace: next(Role::Pace),
            value: next(Role::Value),
        };

        (selection, alternates)
    }

    /// Score a runner for a role; `None` when its odds are outside the band
    pub fn score(&self, role: Role, runner: &Runner, race: &RaceContext) -> Option<Candidate> {
        if !self.config.band(role).contains(runner.odds) {
            return None;
        }

        let (score, rationale) = match role {
            Role::Anchor => self.score_anchor(runner, race),
            Role::Pace => self.score_pace(runner, race),
            Role::Value => self.score_value(runner),
        };

        Some(Candidate {
            runner: runner.clone(),
            score,
            rationale,
        })
    }

    fn score_anchor(&self, runner: &Runner, race: &RaceContext) -> (i32, Vec<String>) {
        let mut score = 10;
        let mut rationale = vec![format!("Anchor odds ({})", format_odds(runner.odds))];

        if runner.barrier <= self.config.anchor_barrier_max {
            score += 3;
            rationale.push(format!("Good barrier ({})", runner.barrier));
        } else {
            score -= 2;
            rationale.push(format!("Wide barrier ({})", runner.barrier));
        }

        let top4 = runner.form.top4_in_last3();
        if top4 >= 2 {
            score += 5;
            rationale.push(format!("Consistent form ({}/3 top-4)", top4));
        } else {
            score -= 2;
            rationale.push(format!("Inconsistent recent form ({}/3 top-4)", top4));
        }

        if self.is_firmer(runner) {
            score += 3;
            rationale.push("Market firmer".to_string());
        }

        if let (Some(track), Some(pref)) = (&race.track, &runner.track_pref) {
            if !track.trim().is_empty() && pref.to_lowercase().contains(&track.to_lowercase()) {
                score += 2;
                rationale.push("Track specialist".to_string());
            }
        }

        (score, rationale)
    }

    fn score_pace(&self, runner: &Runner, race: &RaceContext) -> (i32, Vec<String>) {
        let mut score = 10;
        let mut rationale = vec![format!("Pace odds ({})", format_odds(runner.odds))];

        match runner.speed_position() {
            Some(pos @ (SpeedMapHint::Leader | SpeedMapHint::OnPace)) => {
                score += 5;
                rationale.push(format!("Good speed position ({})", pos));
            }
            Some(SpeedMapHint::Midfield) => {
                score += 1;
                rationale.push("Midfield runner".to_string());
            }
            Some(SpeedMapHint::Back) => {
                score -= 2;
                rationale.push("Back marker".to_string());
            }
            None => rationale.push("No speed map information".to_string()),
        }

        if runner.barrier <= self.config.pace_barrier_max {
            score += 4;
            rationale.push(format!("Excellent barrier ({})", runner.barrier));
        } else {
            score -= 1;
            rationale.push(format!("Wide barrier ({})", runner.barrier));
        }

        let top4 = runner.form.top4_in_last3();
        if top4 >= 2 {
            score += 2;
            rationale.push(format!("Solid recent form ({}/3 top-4)", top4));
        }

        if let Some(distance) = race.distance_m {
            if runner.suits_distance(distance) {
                score += 2;
                rationale.push("Proven at trip".to_string());
            }
        }

        if self.is_firmer(runner) {
            score += 2;
            rationale.push("Market firmer".to_string());
        }

        (score, rationale)
    }

    fn score_value(&self, runner: &Runner) -> (i32, Vec<String>) {
        let mut score = 10;
        let mut rationale = vec![format!("Value odds ({})", format_odds(runner.odds))];

        let cues = runner.cues();
        if cues.up_in_trip {
            score += 4;
            rationale.push("Up in trip".to_string());
        }
        if cues.down_in_class {
            score += 4;
            rationale.push("Down in class".to_string());
        }
        if cues.forgive {
            score += 3;
            rationale.push("Forgive last run".to_string());
        }

        if runner.barrier <= self.config.value_barrier_max {
            score += 2;
            rationale.push(format!("Decent barrier ({})", runner.barrier));
        }

        let top4 = runner.form.top4_in_last3();
        if top4 >= 1 {
            score += 3;
            rationale.push(format!("Has recent form ({}/3 top-4)", top4));
        }

        (score, rationale)
    }

    fn is_firmer(&self, runner: &Runner) -> bool {
        odds_shortening(runner.open_odds, runner.odds, self.config.firmer_ratio)
    }
}

/// Higher score first, then lower barrier, then shorter odds
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.runner.barrier.cmp(&b.runner.barrier))
        .then(a.runner.odds.total_cmp(&b.runner.odds))
}
