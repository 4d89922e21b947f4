use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::classifier::{RaceAnalysis, Selection};
use crate::core::form::FormHistory;
use crate::core::stake::{StakeBreakdown, StrategyKind};
use crate::history::RaceResult;

/// Where a runner is expected to settle in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedMapHint {
    Leader,
    OnPace,
    Midfield,
    Back,
}

impl SpeedMapHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedMapHint::Leader => "leader",
            SpeedMapHint::OnPace => "on-pace",
            SpeedMapHint::Midfield => "midfield",
            SpeedMapHint::Back => "back",
        }
    }
}

impl FromStr for SpeedMapHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "leader" | "leaders" | "lead" => Ok(SpeedMapHint::Leader),
            "on-pace" | "onpace" | "on-speed" => Ok(SpeedMapHint::OnPace),
            "midfield" | "mid" => Ok(SpeedMapHint::Midfield),
            "back" | "backmarker" | "back-marker" => Ok(SpeedMapHint::Back),
            other => Err(format!("unknown speed map hint '{}'", other)),
        }
    }
}

impl fmt::Display for SpeedMapHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Official track rating, collapsed to the bands the checklist cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackCondition {
    Good,
    Soft,
    Heavy,
    Synth,
    #[default]
    Unknown,
}

impl TrackCondition {
    /// Parse a free-form rating such as "Good 4", "Soft (7)" or "Polytrack"
    pub fn parse(text: &str) -> Self {
        let upper = text.trim().to_uppercase();
        if upper.contains("GOOD") || upper.contains("FIRM") {
            TrackCondition::Good
        } else if upper.contains("SOFT") || upper.contains("YIELDING") {
            TrackCondition::Soft
        } else if upper.contains("HEAVY") || upper.contains("SLOW") {
            TrackCondition::Heavy
        } else if upper.contains("SYNTH") || upper.contains("POLY") {
            TrackCondition::Synth
        } else {
            TrackCondition::Unknown
        }
    }

    pub fn is_wet(&self) -> bool {
        matches!(self, TrackCondition::Soft | TrackCondition::Heavy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackCondition::Good => "GOOD",
            TrackCondition::Soft => "SOFT",
            TrackCondition::Heavy => "HEAVY",
            TrackCondition::Synth => "SYNTH",
            TrackCondition::Unknown => "UNKNOWN",
        }
    }
}

/// Race-level context for an analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceContext {
    #[serde(default)]
    pub meeting: Option<String>,
    #[serde(default)]
    pub race_number: Option<u32>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub distance_m: Option<u32>,
    #[serde(default)]
    pub track_condition: TrackCondition,
    /// Declared field size; when absent the count of valid runners is used
    #[serde(default)]
    pub declared_runners: Option<usize>,
}

impl RaceContext {
    pub fn label(&self) -> String {
        match (&self.meeting, self.race_number) {
            (Some(meeting), Some(no)) => format!("{} R{}", meeting, no),
            (Some(meeting), None) => meeting.clone(),
            (None, Some(no)) => format!("Race {}", no),
            (None, None) => "Unnamed race".to_string(),
        }
    }
}

/// Odds as supplied: already a number, or text still to be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Decimal(f64),
    Text(String),
}

impl fmt::Display for OddsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsValue::Decimal(v) => write!(f, "{}", v),
            OddsValue::Text(s) => f.write_str(s),
        }
    }
}

/// Runner as entered by hand, pasted, or loaded from a file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerEntry {
    pub name: String,
    #[serde(default)]
    pub barrier: Option<u32>,
    #[serde(default)]
    pub odds: Option<OddsValue>,
    #[serde(default, alias = "last3_form")]
    pub form: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "speed_map_hint")]
    pub speed_map: Option<String>,
    #[serde(default)]
    pub jockey: Option<String>,
    #[serde(default)]
    pub trainer: Option<String>,
    #[serde(default)]
    pub track_pref: Option<String>,
    #[serde(default)]
    pub distance_pref: Option<String>,
    #[serde(default, alias = "market_open_odds")]
    pub open_odds: Option<f64>,
    #[serde(default, alias = "is_scratched")]
    pub scratched: bool,
}

/// Validated runner ready for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub name: String,
    pub barrier: u32,
    pub odds: f64,
    pub form: FormHistory,
    pub note: Option<String>,
    pub speed_map: Option<SpeedMapHint>,
    pub jockey: Option<String>,
    pub trainer: Option<String>,
    pub track_pref: Option<String>,
    pub distance_pref: Option<String>,
    pub open_odds: Option<f64>,
}

/// Analyze request
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub race: RaceContext,
    pub runners: Vec<RunnerEntry>,
    /// Also calculate stakes when given
    #[serde(default)]
    pub strategy: Option<StrategyRequest>,
}

/// Analyze response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: RaceAnalysis,
    pub breakdown: Option<StakeBreakdown>,
}

/// Strategy choice: a preset key, or `custom` with a budget and split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRequest {
    #[serde(alias = "strategy")]
    pub kind: StrategyKind,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub trifecta_share: Option<f64>,
    #[serde(default)]
    pub quinella_share: Option<f64>,
}

/// Stake calculation request
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub selection: Selection,
    pub strategy: StrategyRequest,
}

/// Save a calculated bet to history
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveBetRequest {
    #[serde(default)]
    pub race: RaceContext,
    pub selection: Selection,
    pub breakdown: StakeBreakdown,
}

/// Record the result of a saved bet
pub type SettleRequest = RaceResult;

/// Preset listing entry
#[derive(Debug, Serialize, Deserialize)]
pub struct StrategySummary {
    pub kind: StrategyKind,
    pub budget: f64,
    pub description: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub saved_bets: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
