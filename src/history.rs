//! Bet history
//!
//! Records placed bets, settles them once against the race result, and
//! summarises performance (hit rate, ROI, drawdown). Persisted as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::classifier::Selection;
use crate::core::combinations::BetType;
use crate::core::stake::{BetLine, StakeBreakdown};
use crate::models::RaceContext;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("bet {0} not found")]
    NotFound(u64),

    #[error("bet {0} has already been settled")]
    AlreadySettled(u64),

    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("breakdown has no bet lines")]
    EmptyBreakdown,

    #[error("bet {id}: {bet_type} hit but no dividend was supplied")]
    MissingDividend { id: u64, bet_type: BetType },

    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Official placings and $1 dividends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub first: String,
    pub second: String,
    #[serde(default)]
    pub third: Option<String>,
    #[serde(default)]
    pub trifecta_dividend: Option<f64>,
    #[serde(default)]
    pub quinella_dividend: Option<f64>,
}

impl RaceResult {
    fn validate(&self) -> Result<(), HistoryError> {
        let placings = self.placings();
        if placings.iter().any(|p| p.trim().is_empty()) {
            return Err(HistoryError::InvalidResult("placing name is empty".into()));
        }
        for (i, name) in placings.iter().enumerate() {
            if placings[..i].iter().any(|other| same_runner(other, name)) {
                return Err(HistoryError::InvalidResult(format!(
                    "{} placed more than once",
                    name.trim()
                )));
            }
        }
        for dividend in [self.trifecta_dividend, self.quinella_dividend]
            .into_iter()
            .flatten()
        {
            if !dividend.is_finite() || dividend < 0.0 {
                return Err(HistoryError::InvalidResult(format!(
                    "dividend must be non-negative, got {}",
                    dividend
                )));
            }
        }
        Ok(())
    }

    /// Finishers in order
    pub fn placings(&self) -> Vec<&str> {
        let mut out = vec![self.first.as_str(), self.second.as_str()];
        if let Some(third) = &self.third {
            out.push(third.as_str());
        }
        out
    }

    fn dividend(&self, bet_type: BetType) -> Option<f64> {
        match bet_type {
            BetType::Trifecta => self.trifecta_dividend,
            BetType::Quinella => self.quinella_dividend,
        }
    }

    /// A box hits when the first `places` finishers are all in it
    pub fn box_hits(&self, bet_type: BetType, runners: &[String]) -> bool {
        let placings = self.placings();
        let needed = bet_type.places();
        placings.len() >= needed
            && placings[..needed]
                .iter()
                .all(|p| runners.iter().any(|r| same_runner(r, p)))
    }
}

fn same_runner(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Settlement state of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pending,
    Won,
    Partial,
    Lost,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pending => "pending",
            ResultStatus::Won => "won",
            ResultStatus::Partial => "partial",
            ResultStatus::Lost => "lost",
        }
    }
}

/// Outcome of one bet line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOutcome {
    pub bet_type: BetType,
    pub hit: bool,
    pub stake_cents: i64,
    pub return_cents: i64,
}

/// Settlement applied to a bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub result: RaceResult,
    pub lines: Vec<LineOutcome>,
    pub return_cents: i64,
    pub settled_at: DateTime<Utc>,
}

/// A placed bet: selection and stakes as they were at the time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: u64,
    pub placed_at: DateTime<Utc>,
    pub race: RaceContext,
    pub selection: Selection,
    pub breakdown: StakeBreakdown,
    pub status: ResultStatus,
    #[serde(default)]
    pub settlement: Option<Settlement>,
}

impl BetRecord {
    pub fn stake_cents(&self) -> i64 {
        self.breakdown.total_stake_cents
    }

    pub fn return_cents(&self) -> i64 {
        self.settlement.as_ref().map_or(0, |s| s.return_cents)
    }

    pub fn profit_cents(&self) -> i64 {
        self.return_cents() - self.stake_cents()
    }

    pub fn is_settled(&self) -> bool {
        self.status != ResultStatus::Pending
    }
}

fn settle_line(
    id: u64,
    line: &BetLine,
    result: &RaceResult,
) -> Result<LineOutcome, HistoryError> {
    let hit = result.box_hits(line.bet_type, &line.runners);
    let return_cents = if hit {
        let dividend = result
            .dividend(line.bet_type)
            .ok_or(HistoryError::MissingDividend {
                id,
                bet_type: line.bet_type,
            })?;
        (dividend * line.return_fraction() * 100.0).round() as i64
    } else {
        0
    };

    Ok(LineOutcome {
        bet_type: line.bet_type,
        hit,
        stake_cents: line.stake_cents,
        return_cents,
    })
}

/// Aggregate performance over the history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_bets: usize,
    pub settled_bets: usize,
    pub pending_bets: usize,
    /// Settled bets with at least one winning line
    pub winning_bets: usize,
    pub hit_rate: f64,
    /// Over settled bets
    pub total_staked_cents: i64,
    pub total_returned_cents: i64,
    pub net_profit_cents: i64,
    pub roi: f64,
    /// Largest peak-to-trough fall in cumulative profit
    pub max_drawdown_cents: i64,
}

/// Append-only bet log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetHistory {
    bets: Vec<BetRecord>,
    next_id: u64,
}

impl BetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; a missing file is an empty history
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            debug!("No history at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let mut history: BetHistory = serde_json::from_str(&text)?;
        let max_id = history.bets.iter().map(|b| b.id).max().unwrap_or(0);
        history.next_id = history.next_id.max(max_id);
        Ok(history)
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved {} bets to {}", self.bets.len(), path.display());
        Ok(())
    }

    /// Record a pending bet and return it
    pub fn record(
        &mut self,
        race: RaceContext,
        selection: Selection,
        breakdown: StakeBreakdown,
    ) -> Result<&BetRecord, HistoryError> {
        if breakdown.lines.is_empty() {
            return Err(HistoryError::EmptyBreakdown);
        }
        self.next_id += 1;
        let record = BetRecord {
            id: self.next_id,
            placed_at: Utc::now(),
            race,
            selection,
            breakdown,
            status: ResultStatus::Pending,
            settlement: None,
        };
        info!(
            "Recorded bet {} ({}, stake {})",
            record.id,
            record.race.label(),
            crate::core::odds::format_currency(record.stake_cents())
        );
        self.bets.push(record);
        Ok(&self.bets[self.bets.len() - 1])
    }

    /// Apply a race result to a pending bet
    pub fn settle(&mut self, id: u64, result: RaceResult) -> Result<&BetRecord, HistoryError> {
        result.validate()?;

        let record = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(HistoryError::NotFound(id))?;
        if record.is_settled() {
            return Err(HistoryError::AlreadySettled(id));
        }
        let has_trifecta = record
            .breakdown
            .lines
            .iter()
            .any(|line| line.bet_type == BetType::Trifecta);
        if has_trifecta && result.third.is_none() {
            return Err(HistoryError::InvalidResult(
                "third placing required to settle a trifecta".to_string(),
            ));
        }

        let lines = record
            .breakdown
            .lines
            .iter()
            .map(|line| settle_line(id, line, &result))
            .collect::<Result<Vec<_>, _>>()?;

        let hits = lines.iter().filter(|l| l.hit).count();
        let status = if hits == 0 {
            ResultStatus::Lost
        } else if hits == lines.len() {
            ResultStatus::Won
        } else {
            ResultStatus::Partial
        };
        let return_cents = lines.iter().map(|l| l.return_cents).sum();

        record.status = status;
        record.settlement = Some(Settlement {
            result,
            lines,
            return_cents,
            settled_at: Utc::now(),
        });
        info!(
            "Settled bet {}: {} (return {})",
            id,
            status.as_str(),
            crate::core::odds::format_currency(return_cents)
        );

        Ok(&*record)
    }

    pub fn get(&self, id: u64) -> Option<&BetRecord> {
        self.bets.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BetRecord> {
        self.bets.iter()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Performance over settled bets
    pub fn summary(&self) -> HistorySummary {
        let mut settled: Vec<&BetRecord> = self.bets.iter().filter(|b| b.is_settled()).collect();
        settled.sort_by_key(|b| b.settlement.as_ref().map(|s| s.settled_at));
        let total_bets = self.bets.len();
        let settled_bets = settled.len();
        let winning_bets = settled.iter().filter(|b| b.return_cents() > 0).count();

        let total_staked_cents: i64 = settled.iter().map(|b| b.stake_cents()).sum();
        let total_returned_cents: i64 = settled.iter().map(|b| b.return_cents()).sum();
        let net_profit_cents = total_returned_cents - total_staked_cents;

        let hit_rate = if settled_bets > 0 {
            winning_bets as f64 / settled_bets as f64
        } else {
            0.0
        };
        let roi = if total_staked_cents > 0 {
            net_profit_cents as f64 / total_staked_cents as f64
        } else {
            0.0
        };

        // Drawdown over cumulative profit in settlement order
        let mut cumulative = 0i64;
        let mut peak = 0i64;
        let mut max_drawdown_cents = 0i64;
        for bet in &settled {
            cumulative += bet.profit_cents();
            peak = peak.max(cumulative);
            max_drawdown_cents = max_drawdown_cents.max(peak - cumulative);
        }

        HistorySummary {
            total_bets,
            settled_bets,
            pending_bets: total_bets - settled_bets,
            winning_bets,
            hit_rate,
            total_staked_cents,
            total_returned_cents,
            net_profit_cents,
            roi,
            max_drawdown_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{Candidate, Role, RoleSlot};
    use crate::core::form::FormHistory;
    use crate::core::stake::{StakeCalculator, Strategy, StrategyKind};
    use crate::models::Runner;

    fn runner(name: &str, odds: f64) -> Runner {
        Runner {
            name: name.to_string(),
            barrier: 1,
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

    fn selection() -> Selection {
        let slot = |role: Role, name: &str, odds: f64| {
            RoleSlot::filled(
                role,
                Candidate {
                    runner: runner(name, odds),
                    score: 10,
                    rationale: vec![],
                },
            )
        };
        Selection {
            anchor: slot(Role::Anchor, "Alpha", 3.5),
            pace: slot(Role::Pace, "Bravo", 6.0),
            value: slot(Role::Value, "Charlie", 12.0),
        }
    }

    fn history_with(kind: StrategyKind) -> BetHistory {
        let sel = selection();
        let strategy = Strategy::preset(kind).unwrap();
        let breakdown = StakeCalculator::default()
            .calculate(&sel, &strategy)
            .unwrap();
        let mut history = BetHistory::new();
        history
            .record(RaceContext::default(), sel, breakdown)
            .unwrap();
        history
    }

    fn result(first: &str, second: &str, third: &str) -> RaceResult {
        RaceResult {
            first: first.to_string(),
            second: second.to_string(),
            third: Some(third.to_string()),
            trifecta_dividend: Some(250.0),
            quinella_dividend: Some(20.0),
        }
    }

    #[test]
    fn test_record_assigns_sequential_ids() {
        let mut history = history_with(StrategyKind::Budget6);
        let sel = selection();
        let breakdown = history.get(1).unwrap().breakdown.clone();
        let second = history
            .record(RaceContext::default(), sel, breakdown)
            .unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.status, ResultStatus::Pending);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_record_rejects_empty_breakdown() {
        let mut history = history_with(StrategyKind::Budget6);
        let mut breakdown = history.get(1).unwrap().breakdown.clone();
        breakdown.lines.clear();
        assert!(matches!(
            history.record(RaceContext::default(), selection(), breakdown),
            Err(HistoryError::EmptyBreakdown)
        ));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_settle_both_lines_win() {
        let mut history = history_with(StrategyKind::Budget6);
        let record = history
            .settle(1, result("Charlie", "alpha", "Bravo"))
            .unwrap();

        assert_eq!(record.status, ResultStatus::Won);
        // trifecta $250 x $0.50 + quinella $20 x $1.00
        assert_eq!(record.return_cents(), 12_500 + 2_000);
        assert_eq!(record.profit_cents(), 14_500 - 600);
    }

    #[test]
    fn test_settle_partial_and_lost() {
        let mut history = history_with(StrategyKind::Budget6);
        let record = history
            .settle(1, result("Alpha", "Bravo", "Outsider"))
            .unwrap();
        assert_eq!(record.status, ResultStatus::Partial);
        assert_eq!(record.return_cents(), 2_000);

        let mut history = history_with(StrategyKind::Budget6);
        let record = history
            .settle(1, result("Outsider", "Alpha", "Bravo"))
            .unwrap();
        assert_eq!(record.status, ResultStatus::Lost);
        assert_eq!(record.return_cents(), 0);
    }

    #[test]
    fn test_flexi_return_scaled() {
        let mut history = history_with(StrategyKind::Budget5);
        let record = history
            .settle(1, result("Alpha", "Bravo", "Charlie"))
            .unwrap();
        // 33% of $250 + $20 x $1.00
        assert_eq!(record.return_cents(), 8_250 + 2_000);
    }

    #[test]
    fn test_settle_errors() {
        let mut history = history_with(StrategyKind::Budget6);
        assert!(matches!(
            history.settle(9, result("Alpha", "Bravo", "Charlie")),
            Err(HistoryError::NotFound(9))
        ));

        assert!(matches!(
            history.settle(1, result("Alpha", "Alpha", "Charlie")),
            Err(HistoryError::InvalidResult(_))
        ));

        let mut no_dividend = result("Alpha", "Bravo", "Charlie");
        no_dividend.trifecta_dividend = None;
        assert!(matches!(
            history.settle(1, no_dividend),
            Err(HistoryError::MissingDividend { id: 1, .. })
        ));

        history.settle(1, result("Alpha", "Bravo", "Charlie")).unwrap();
        assert!(matches!(
            history.settle(1, result("Alpha", "Bravo", "Charlie")),
            Err(HistoryError::AlreadySettled(1))
        ));
    }

    #[test]
    fn test_settle_trifecta_needs_third() {
        let mut history = history_with(StrategyKind::Budget6);
        let mut two_placings = result("Alpha", "Bravo", "Charlie");
        two_placings.third = None;
        assert!(matches!(
            history.settle(1, two_placings),
            Err(HistoryError::InvalidResult(_))
        ));
        assert_eq!(history.get(1).unwrap().status, ResultStatus::Pending);

        let record = history.settle(1, result("Alpha", "Bravo", "Charlie")).unwrap();
        assert_eq!(record.status, ResultStatus::Won);
    }

    #[test]
    fn test_summary() {
        let mut history = history_with(StrategyKind::Budget6);
        let sel = selection();
        let breakdown = history.get(1).unwrap().breakdown.clone();
        history
            .record(RaceContext::default(), sel.clone(), breakdown.clone())
            .unwrap();
        history
            .record(RaceContext::default(), sel, breakdown)
            .unwrap();

        history.settle(1, result("Outsider", "Other", "Third")).unwrap();
        history.settle(2, result("Alpha", "Bravo", "Outsider")).unwrap();

        let summary = history.summary();
        assert_eq!(summary.total_bets, 3);
        assert_eq!(summary.settled_bets, 2);
        assert_eq!(summary.pending_bets, 1);
        assert_eq!(summary.winning_bets, 1);
        assert!((summary.hit_rate - 0.5).abs() < 1e-9);
        assert_eq!(summary.total_staked_cents, 1_200);
        assert_eq!(summary.total_returned_cents, 2_000);
        assert_eq!(summary.net_profit_cents, 800);
        assert!((summary.roi - 800.0 / 1_200.0).abs() < 1e-9);
        assert_eq!(summary.max_drawdown_cents, 600);
    }

    #[test]
    fn test_drawdown_follows_settlement_order() {
        let mut history = history_with(StrategyKind::Budget6);
        let sel = selection();
        let breakdown = history.get(1).unwrap().breakdown.clone();
        history
            .record(RaceContext::default(), sel.clone(), breakdown.clone())
            .unwrap();
        history
            .record(RaceContext::default(), sel, breakdown)
            .unwrap();

        history.settle(1, result("Outsider", "Other", "Third")).unwrap();
        history.settle(2, result("Alpha", "Bravo", "Outsider")).unwrap();
        history.settle(3, result("Outsider", "Other", "Third")).unwrap();

        // Bet 2 (+$14) settled first, then the two $6 losses
        let base = Utc::now();
        for (bet, offset) in history.bets.iter_mut().zip([10, 0, 20]) {
            if let Some(settlement) = bet.settlement.as_mut() {
                settlement.settled_at = base + chrono::Duration::seconds(offset);
            }
        }

        let summary = history.summary();
        assert_eq!(summary.net_profit_cents, 200);
        assert_eq!(summary.max_drawdown_cents, 1_200);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BetHistory::new().summary();
        assert_eq!(summary, HistorySummary::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "clickpunter-history-{}.json",
            std::process::id()
        ));
        let mut history = history_with(StrategyKind::Budget10);
        history.settle(1, result("Alpha", "Bravo", "Charlie")).unwrap();
        history.save(&path).unwrap();

        let mut loaded = BetHistory::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(1).unwrap().status, ResultStatus::Won);
        let sel = selection();
        let breakdown = loaded.get(1).unwrap().breakdown.clone();
        assert_eq!(loaded.record(RaceContext::default(), sel, breakdown).unwrap().id, 2);

        std::fs::remove_file(&path).unwrap();
        assert!(BetHistory::load(&path).unwrap().is_empty());
    }
}
