//! Runner validation
//!
//! Turns raw entries into validated runners. A bad runner is excluded with a
//! reason instead of failing the whole race.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::form::{FormCues, FormHistory};
use super::odds::{parse_odds, MIN_DECIMAL_ODDS};
use crate::models::{OddsValue, Runner, RunnerEntry, SpeedMapHint};

/// Reasons a single runner cannot be analysed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunnerError {
    #[error("runner name is empty")]
    EmptyName,

    #[error("no odds supplied")]
    MissingOdds,

    #[error("invalid odds '{0}'")]
    InvalidOdds(String),

    #[error("odds {0} below minimum of 1.01")]
    OddsTooShort(f64),

    #[error("no barrier supplied")]
    MissingBarrier,

    #[error("barrier must be a positive number, got {0}")]
    InvalidBarrier(u32),

    #[error("scratched")]
    Scratched,
}

/// A runner left out of the analysis and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedRunner {
    pub name: String,
    pub reason: String,
}

impl Runner {
    /// Validate a raw entry
    pub fn from_entry(entry: &RunnerEntry) -> Result<Self, RunnerError> {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(RunnerError::EmptyName);
        }
        if entry.scratched {
            return Err(RunnerError::Scratched);
        }

        let odds = match &entry.odds {
            None => return Err(RunnerError::MissingOdds),
            Some(OddsValue::Decimal(v)) if v.is_finite() && *v > 0.0 => *v,
            Some(OddsValue::Decimal(v)) => return Err(RunnerError::InvalidOdds(v.to_string())),
            Some(OddsValue::Text(text)) => {
                parse_odds(text).ok_or_else(|| RunnerError::InvalidOdds(text.clone()))?
            }
        };
        if odds < MIN_DECIMAL_ODDS {
            return Err(RunnerError::OddsTooShort(odds));
        }

        let barrier = entry.barrier.ok_or(RunnerError::MissingBarrier)?;
        if barrier == 0 {
            return Err(RunnerError::InvalidBarrier(barrier));
        }

        // An unrecognised hint is dropped rather than rejecting the runner
        let speed_map = entry
            .speed_map
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse::<SpeedMapHint>().ok());

        Ok(Runner {
            name: name.to_string(),
            barrier,
            odds,
            form: FormHistory::parse(&entry.form),
            note: non_empty(&entry.note),
            speed_map,
            jockey: non_empty(&entry.jockey),
            trainer: non_empty(&entry.trainer),
            track_pref: non_empty(&entry.track_pref),
            distance_pref: non_empty(&entry.distance_pref),
            open_odds: entry.open_odds.filter(|o| *o > 0.0),
        })
    }

    /// Keyword cues from the note, form remark and track preference
    pub fn cues(&self) -> FormCues {
        let texts = [
            self.note.as_deref(),
            self.form.remark.as_deref(),
            self.track_pref.as_deref(),
        ];
        FormCues::scan(texts.into_iter().flatten())
    }

    /// Speed map position: the explicit hint wins over note keywords
    pub fn speed_position(&self) -> Option<SpeedMapHint> {
        self.speed_map.or_else(|| self.cues().speed)
    }

    /// Distance preference such as "1000-1400m" contains the given trip
    pub fn suits_distance(&self, distance_m: u32) -> bool {
        self.distance_pref
            .as_deref()
            .and_then(parse_distance_range)
            .is_some_and(|(lo, hi)| lo <= distance_m && distance_m <= hi)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse "1000-1400m", "1200m" or "1600" into an inclusive metre range
fn parse_distance_range(text: &str) -> Option<(u32, u32)> {
    let cleaned = text.trim().trim_end_matches(['m', 'M']).trim();
    match cleaned.split_once('-') {
        Some((lo, hi)) => {
            let lo: u32 = lo.trim().trim_end_matches(['m', 'M']).parse().ok()?;
            let hi: u32 = hi.trim().parse().ok()?;
            (lo <= hi).then_some((lo, hi))
        }
        None => {
            let exact: u32 = cleaned.parse().ok()?;
            Some((exact, exact))
        }
    }
}

/// Validate every entry, splitting the field into usable and excluded runners
pub fn validate_field(entries: &[RunnerEntry]) -> (Vec<Runner>, Vec<ExcludedRunner>) {
    let mut runners = Vec::with_capacity(entries.len());
    let mut excluded = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        match Runner::from_entry(entry) {
            Ok(runner) => runners.push(runner),
            Err(e) => {
                let name = if entry.name.trim().is_empty() {
                    format!("#{}", idx + 1)
                } else {
                    entry.name.trim().to_string()
                };
                warn!("Excluding runner {}: {}", name, e);
                excluded.push(ExcludedRunner {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    (runners, excluded)
}
