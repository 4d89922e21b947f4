//! Strategy presets and stake calculation
//!
//! A strategy splits a budget between a trifecta box and a quinella box.
//! Each allocation is bet either as a full box (per-combination stake rounded
//! down to the minimum unit) or as a flexi (fixed spend, paying a percentage
//! of the dividend).
//!
//! All money is in cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use super::classifier::Selection;
use super::combinations::BetType;
use super::odds::{
    cents_to_dollars, dollars_to_cents, flexi_basis_points, format_currency, round_down_to_unit,
};
use super::payout::{PayoutConfig, PayoutEstimate};
use crate::models::StrategyRequest;

/// Default split for custom strategies
pub const DEFAULT_TRIFECTA_SHARE: f64 = 0.4;
pub const DEFAULT_QUINELLA_SHARE: f64 = 0.6;

/// Stake calculation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StakeError {
    #[error("selection has no filled roles, nothing to calculate")]
    EmptySelection,

    #[error("{0} appears in more than one role")]
    DuplicateRunner(String),

    #[error("budget must be positive, got {0}")]
    NonPositiveBudget(f64),

    #[error("custom strategy requires a budget")]
    MissingBudget,

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("allocations total {allocated} cents, over the {budget} cent budget")]
    OverBudget { allocated: i64, budget: i64 },

    #[error("{bet_type} allocation of {amount_cents} cents is below one betting unit")]
    StakeBelowMinimum { bet_type: BetType, amount_cents: i64 },
}

/// Strategy keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[serde(rename = "budget_5")]
    Budget5,
    #[serde(rename = "budget_6")]
    Budget6,
    #[serde(rename = "budget_10")]
    Budget10,
    #[serde(rename = "budget_15")]
    Budget15,
    TrifectaOnly,
    QuinellaOnly,
    Custom,
}

impl StrategyKind {
    /// Fixed-configuration strategies
    pub const PRESETS: [StrategyKind; 6] = [
        StrategyKind::Budget5,
        StrategyKind::Budget6,
        StrategyKind::Budget10,
        StrategyKind::Budget15,
        StrategyKind::TrifectaOnly,
        StrategyKind::QuinellaOnly,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::Budget5 => "budget_5",
            StrategyKind::Budget6 => "budget_6",
            StrategyKind::Budget10 => "budget_10",
            StrategyKind::Budget15 => "budget_15",
            StrategyKind::TrifectaOnly => "trifecta_only",
            StrategyKind::QuinellaOnly => "quinella_only",
            StrategyKind::Custom => "custom",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        StrategyKind::PRESETS
            .iter()
            .chain(std::iter::once(&StrategyKind::Custom))
            .find(|k| k.key() == key)
            .copied()
            .ok_or_else(|| StakeError::UnknownStrategy(s.trim().to_string()))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How an allocation is turned into a box bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoxMode {
    /// Per-combination stake = allocation / combinations, rounded down to the unit
    Full { min_unit_cents: i64 },
    /// Spend the allocation; flexi % measured against a box at `base_unit_cents`
    Flexi { base_unit_cents: i64 },
}

/// Money set aside for one bet type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub bet_type: BetType,
    pub amount_cents: i64,
    pub mode: BoxMode,
}

impl Allocation {
    const fn full(bet_type: BetType, amount_cents: i64, min_unit_cents: i64) -> Self {
        Self {
            bet_type,
            amount_cents,
            mode: BoxMode::Full { min_unit_cents },
        }
    }

    const fn flexi(bet_type: BetType, amount_cents: i64) -> Self {
        Self {
            bet_type,
            amount_cents,
            mode: BoxMode::Flexi {
                base_unit_cents: 100,
            },
        }
    }
}

/// A named budget split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub budget_cents: i64,
    pub allocations: Vec<Allocation>,
}

impl Strategy {
    /// Look up a preset; `custom` needs [`Strategy::custom`] instead
    pub fn preset(kind: StrategyKind) -> Result<Self, StakeError> {
        use BetType::{Quinella, Trifecta};

        let (budget_cents, allocations) = match kind {
            StrategyKind::Budget5 => (
                500,
                vec![
                    Allocation::flexi(Trifecta, 200),
                    Allocation::full(Quinella, 300, 100),
                ],
            ),
            StrategyKind::Budget6 => (
                600,
                vec![
                    Allocation::full(Trifecta, 300, 50),
                    Allocation::full(Quinella, 300, 100),
                ],
            ),
            StrategyKind::Budget10 => (
                1_000,
                vec![
                    Allocation::full(Trifecta, 600, 100),
                    Allocation::full(Quinella, 400, 10),
                ],
            ),
            StrategyKind::Budget15 => (
                1_500,
                vec![
                    Allocation::full(Trifecta, 900, 50),
                    Allocation::full(Quinella, 600, 50),
                ],
            ),
            StrategyKind::TrifectaOnly => (600, vec![Allocation::full(Trifecta, 600, 100)]),
            StrategyKind::QuinellaOnly => (600, vec![Allocation::full(Quinella, 600, 100)]),
            StrategyKind::Custom => return Err(StakeError::MissingBudget),
        };

        Ok(Self {
            kind,
            budget_cents,
            allocations,
        })
    }

    /// Look up a preset by key
    pub fn from_key(key: &str) -> Result<Self, StakeError> {
        Self::preset(key.parse()?)
    }

    /// Custom budget split between trifecta and quinella flexi boxes
    ///
    /// Shares must be non-negative and sum to 1.
    pub fn custom(
        budget_dollars: f64,
        trifecta_share: f64,
        quinella_share: f64,
    ) -> Result<Self, StakeError> {
        if !budget_dollars.is_finite() || budget_dollars <= 0.0 {
            return Err(StakeError::NonPositiveBudget(budget_dollars));
        }
        for (name, share) in [("trifecta", trifecta_share), ("quinella", quinella_share)] {
            if !share.is_finite() || share < 0.0 {
                return Err(StakeError::InvalidSplit(format!(
                    "{} share must be non-negative, got {}",
                    name, share
                )));
            }
        }
        if (trifecta_share + quinella_share - 1.0).abs() > 1e-6 {
            return Err(StakeError::InvalidSplit(format!(
                "shares must sum to 1, got {}",
                trifecta_share + quinella_share
            )));
        }

        let budget_cents = dollars_to_cents(budget_dollars);
        if budget_cents <= 0 {
            return Err(StakeError::NonPositiveBudget(budget_dollars));
        }
        let trifecta_cents = (budget_cents as f64 * trifecta_share).round() as i64;
        let quinella_cents = budget_cents - trifecta_cents;

        let allocations = [
            Allocation::flexi(BetType::Trifecta, trifecta_cents),
            Allocation::flexi(BetType::Quinella, quinella_cents),
        ]
        .into_iter()
        .filter(|a| a.amount_cents > 0)
        .collect();

        Ok(Self {
            kind: StrategyKind::Custom,
            budget_cents,
            allocations,
        })
    }

    /// Build from an API/CLI request
    pub fn from_request(req: &StrategyRequest) -> Result<Self, StakeError> {
        match req.kind {
            StrategyKind::Custom => {
                let budget = req.budget.ok_or(StakeError::MissingBudget)?;
                let (tri, quin) = match (req.trifecta_share, req.quinella_share) {
                    (Some(t), Some(q)) => (t, q),
                    (Some(t), None) => (t, 1.0 - t),
                    (None, Some(q)) => (1.0 - q, q),
                    (None, None) => (DEFAULT_TRIFECTA_SHARE, DEFAULT_QUINELLA_SHARE),
                };
                Self::custom(budget, tri, quin)
            }
            kind => Self::preset(kind),
        }
    }

    pub fn allocated_cents(&self) -> i64 {
        self.allocations.iter().map(|a| a.amount_cents).sum()
    }

    /// Check the allocations fit the budget
    pub fn validate(&self) -> Result<(), StakeError> {
        if self.budget_cents <= 0 {
            return Err(StakeError::NonPositiveBudget(cents_to_dollars(
                self.budget_cents,
            )));
        }
        let allocated = self.allocated_cents();
        if allocated > self.budget_cents {
            return Err(StakeError::OverBudget {
                allocated,
                budget: self.budget_cents,
            });
        }
        Ok(())
    }

    /// One-line description, e.g. "Trifecta $3.00 box ($0.50 units) + Quinella $3.00 box ($1.00 units)"
    pub fn description(&self) -> String {
        self.allocations
            .iter()
            .map(|a| match a.mode {
                BoxMode::Full { min_unit_cents } => format!(
                    "{} {} box ({} units)",
                    a.bet_type,
                    format_currency(a.amount_cents),
                    format_currency(min_unit_cents)
                ),
                BoxMode::Flexi { .. } => {
                    format!("{} {} flexi", a.bet_type, format_currency(a.amount_cents))
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// One boxed bet in a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetLine {
    pub bet_type: BetType,
    pub label: String,
    pub runners: Vec<String>,
    pub combinations: Vec<Vec<String>>,
    pub combination_count: usize,
    /// Stake per combination (full box) or base unit (flexi)
    pub unit_cents: i64,
    pub stake_cents: i64,
    pub flexi: bool,
    /// Share of the full dividend paid, in basis points (10_000 = 100%)
    pub flexi_bps: i64,
}

impl BetLine {
    pub fn flexi_percent(&self) -> f64 {
        self.flexi_bps as f64 / 100.0
    }

    /// Multiple of a $1 dividend this line collects if it hits
    pub fn return_fraction(&self) -> f64 {
        if self.flexi {
            self.flexi_bps as f64 / 10_000.0 * cents_to_dollars(self.unit_cents)
        } else {
            cents_to_dollars(self.unit_cents)
        }
    }

    /// TAB-ready instruction
    pub fn instruction(&self) -> String {
        let runners = self.runners.join(", ");
        if self.flexi {
            format!(
                "{} Box: {} - {} Flexi {} (Total: {})",
                self.bet_type,
                runners,
                format_currency(self.stake_cents),
                format_percent(self.flexi_bps),
                format_currency(self.stake_cents)
            )
        } else {
            format!(
                "{} Box: {} - {} unit (Total: {})",
                self.bet_type,
                runners,
                format_currency(self.unit_cents),
                format_currency(self.stake_cents)
            )
        }
    }
}

fn format_percent(bps: i64) -> String {
    if bps % 100 == 0 {
        format!("{}%", bps / 100)
    } else {
        format!("{:.2}%", bps as f64 / 100.0)
    }
}

/// Stake breakdown for a selection under a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeBreakdown {
    pub strategy: StrategyKind,
    pub budget_cents: i64,
    /// Boxed runners in role order
    pub runners: Vec<String>,
    pub lines: Vec<BetLine>,
    pub total_stake_cents: i64,
    pub warnings: Vec<String>,
    pub estimate: PayoutEstimate,
}

impl StakeBreakdown {
    pub fn line(&self, bet_type: BetType) -> Option<&BetLine> {
        self.lines.iter().find(|l| l.bet_type == bet_type)
    }

    /// TAB-ready instructions joined with " | "
    pub fn instructions(&self) -> String {
        self.lines
            .iter()
            .map(BetLine::instruction)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Stake calculator tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    /// Flexi percentages are rounded down to this step (100 = 1%)
    pub flexi_granularity_bps: i64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            flexi_granularity_bps: 100,
        }
    }
}

/// Turns a selection and a strategy into boxed bets
#[derive(Debug, Clone, Default)]
pub struct StakeCalculator {
    pub config: StakeConfig,
    pub payout: PayoutConfig,
}

impl StakeCalculator {
    pub fn new(config: StakeConfig, payout: PayoutConfig) -> Self {
        Self { config, payout }
    }

    /// Calculate stakes for every allocation in the strategy
    ///
    /// A partial selection boxes only its filled runners; bet types that need
    /// more runners than are available are skipped with a warning.
    pub fn calculate(
        &self,
        selection: &Selection,
        strategy: &Strategy,
    ) -> Result<StakeBreakdown, StakeError> {
        strategy.validate()?;

        let picks = selection.runners();
        if picks.is_empty() {
            return Err(StakeError::EmptySelection);
        }
        for (i, runner) in picks.iter().enumerate() {
            if picks[..i].iter().any(|other| other.name == runner.name) {
                return Err(StakeError::DuplicateRunner(runner.name.clone()));
            }
        }

        let names: Vec<String> = picks.iter().map(|r| r.name.clone()).collect();
        let odds: Vec<f64> = picks.iter().map(|r| r.odds).collect();
        let mut warnings = selection.warnings();
        let mut lines = Vec::with_capacity(strategy.allocations.len());

        for allocation in &strategy.allocations {
            let count = allocation.bet_type.box_count(names.len());
            if count == 0 {
                let msg = format!(
                    "{} box needs at least {} runners, only {} selected - skipped",
                    allocation.bet_type,
                    allocation.bet_type.places(),
                    names.len()
                );
                warn!("{}", msg);
                warnings.push(msg);
                continue;
            }

            let line = self.build_line(allocation, &names, count, &mut warnings)?;
            debug!(
                "{}: {} combos, unit {}, stake {}",
                line.label,
                line.combination_count,
                format_currency(line.unit_cents),
                format_currency(line.stake_cents)
            );
            lines.push(line);
        }

        let total_stake_cents = lines.iter().map(|l| l.stake_cents).sum();
        let estimate = self.payout.estimate(&odds, &lines);

        Ok(StakeBreakdown {
            strategy: strategy.kind,
            budget_cents: strategy.budget_cents,
            runners: names,
            lines,
            total_stake_cents,
            warnings,
            estimate,
        })
    }

    fn build_line(
        &self,
        allocation: &Allocation,
        names: &[String],
        count: usize,
        warnings: &mut Vec<String>,
    ) -> Result<BetLine, StakeError> {
        let bet_type = allocation.bet_type;
        let combos = count as i64;
        let below_minimum = StakeError::StakeBelowMinimum {
            bet_type,
            amount_cents: allocation.amount_cents,
        };

        let (unit_cents, stake_cents, flexi, flexi_bps) = match allocation.mode {
            BoxMode::Full { min_unit_cents } => {
                let unit = round_down_to_unit(allocation.amount_cents / combos, min_unit_cents);
                if unit <= 0 {
                    return Err(below_minimum);
                }
                (unit, unit * combos, false, 10_000)
            }
            BoxMode::Flexi { base_unit_cents } => {
                let full_cost = base_unit_cents * combos;
                let bps = flexi_basis_points(
                    allocation.amount_cents,
                    full_cost,
                    self.config.flexi_granularity_bps,
                );
                if bps <= 0 {
                    return Err(below_minimum);
                }
                let stake = allocation.amount_cents.min(full_cost);
                if stake < allocation.amount_cents {
                    warnings.push(format!(
                        "{} flexi capped at 100% - {} of the allocation left unspent",
                        bet_type,
                        format_currency(allocation.amount_cents - stake)
                    ));
                }
                (base_unit_cents, stake, true, bps)
            }
        };

        let label = if flexi {
            format!("{} Boxed (Flexi)", bet_type)
        } else {
            format!("{} Boxed", bet_type)
        };

        Ok(BetLine {
            bet_type,
            label,
            runners: names.to_vec(),
            combinations: bet_type.box_combinations(names),
            combination_count: count,
            unit_cents,
            stake_cents,
            flexi,
            flexi_bps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{Candidate, Role, RoleSlot};
    use crate::core::form::FormHistory;
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

    fn slot(role: Role, r: Option<Runner>) -> RoleSlot {
        match r {
            Some(runner) => RoleSlot::filled(
                role,
                Candidate {
                    runner,
                    score: 10,
                    rationale: vec![],
                },
            ),
            None => RoleSlot::unfilled(role, "no candidate"),
        }
    }

    fn full_selection() -> Selection {
        Selection {
            anchor: slot(Role::Anchor, Some(runner("A", 3.5))),
            pace: slot(Role::Pace, Some(runner("B", 6.0))),
            value: slot(Role::Value, Some(runner("C", 12.0))),
        }
    }

    #[test]
    fn test_budget_6_breakdown() {
        let calc = StakeCalculator::default();
        let strategy = Strategy::preset(StrategyKind::Budget6).unwrap();
        let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();

        let tri = breakdown.line(BetType::Trifecta).unwrap();
        assert_eq!(tri.combination_count, 6);
        assert_eq!(tri.unit_cents, 50);
        assert_eq!(tri.stake_cents, 300);

        let quin = breakdown.line(BetType::Quinella).unwrap();
        assert_eq!(quin.combination_count, 3);
        assert_eq!(quin.unit_cents, 100);
        assert_eq!(quin.stake_cents, 300);

        assert_eq!(breakdown.total_stake_cents, 600);
        assert!(breakdown.warnings.is_empty());
        assert_eq!(
            tri.instruction(),
            "Trifecta Box: A, B, C - $0.50 unit (Total: $3.00)"
        );
    }

    #[test]
    fn test_budget_5_flexi() {
        let calc = StakeCalculator::default();
        let strategy = Strategy::from_key("budget_5").unwrap();
        let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();

        let tri = breakdown.line(BetType::Trifecta).unwrap();
        assert!(tri.flexi);
        assert_eq!(tri.stake_cents, 200);
        assert_eq!(tri.flexi_bps, 3_300);
        assert_eq!(
            tri.instruction(),
            "Trifecta Box: A, B, C - $2.00 Flexi 33% (Total: $2.00)"
        );
        assert_eq!(breakdown.total_stake_cents, 500);
    }

    #[test]
    fn test_budget_10_quinella_rounds_down() {
        let calc = StakeCalculator::default();
        let strategy = Strategy::preset(StrategyKind::Budget10).unwrap();
        let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();

        let quin = breakdown.line(BetType::Quinella).unwrap();
        // $4.00 / 3 = $1.333 -> $1.30
        assert_eq!(quin.unit_cents, 130);
        assert_eq!(quin.stake_cents, 390);
        assert_eq!(breakdown.total_stake_cents, 990);
    }

    #[test]
    fn test_full_box_presets_stay_within_allocation() {
        let calc = StakeCalculator::default();
        for kind in StrategyKind::PRESETS {
            let strategy = Strategy::preset(kind).unwrap();
            let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();
            assert!(breakdown.total_stake_cents <= strategy.budget_cents);

            for (line, allocation) in breakdown.lines.iter().zip(&strategy.allocations) {
                if let BoxMode::Full { min_unit_cents } = allocation.mode {
                    let gap = allocation.amount_cents - line.unit_cents * line.combination_count as i64;
                    assert!(gap >= 0, "{} over allocation", kind);
                    assert!(gap < min_unit_cents * line.combination_count as i64);
                }
            }
        }
    }

    #[test]
    fn test_flexi_percentage_bounds() {
        let calc = StakeCalculator::default();
        for budget in [1.0, 2.5, 7.0, 20.0, 100.0] {
            let strategy = Strategy::custom(budget, 0.4, 0.6).unwrap();
            let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();
            for line in &breakdown.lines {
                assert!(line.flexi_bps > 0 && line.flexi_bps <= 10_000);
                let full_cost = line.unit_cents * line.combination_count as i64;
                let expected = (line.stake_cents * 10_000 / full_cost) / 100 * 100;
                assert_eq!(line.flexi_bps, expected.min(10_000));
            }
            assert!(breakdown.total_stake_cents <= strategy.budget_cents);
        }
    }

    #[test]
    fn test_custom_split_validation() {
        assert!(matches!(
            Strategy::custom(0.0, 0.4, 0.6),
            Err(StakeError::NonPositiveBudget(_))
        ));
        assert!(matches!(
            Strategy::custom(-5.0, 0.4, 0.6),
            Err(StakeError::NonPositiveBudget(_))
        ));
        assert!(matches!(
            Strategy::custom(10.0, 0.5, 0.6),
            Err(StakeError::InvalidSplit(_))
        ));
        assert!(matches!(
            Strategy::custom(10.0, -0.5, 1.5),
            Err(StakeError::InvalidSplit(_))
        ));

        let strategy = Strategy::custom(10.0, 1.0, 0.0).unwrap();
        assert_eq!(strategy.allocations.len(), 1);
        assert_eq!(strategy.allocations[0].bet_type, BetType::Trifecta);
    }

    #[test]
    fn test_custom_flexi_capped() {
        let calc = StakeCalculator::default();
        // $20 x 40% = $8 on a $6 trifecta box -> capped at 100%
        let strategy = Strategy::custom(20.0, 0.4, 0.6).unwrap();
        let breakdown = calc.calculate(&full_selection(), &strategy).unwrap();
        let tri = breakdown.line(BetType::Trifecta).unwrap();
        assert_eq!(tri.flexi_bps, 10_000);
        assert_eq!(tri.stake_cents, 600);
        assert!(breakdown.warnings.iter().any(|w| w.contains("capped")));
    }

    #[test]
    fn test_unknown_strategy() {
        assert_eq!(
            Strategy::from_key("budget_99"),
            Err(StakeError::UnknownStrategy("budget_99".to_string()))
        );
        assert_eq!(
            Strategy::from_key("custom"),
            Err(StakeError::MissingBudget)
        );
    }

    #[test]
    fn test_empty_selection_rejected() {
        let selection = Selection {
            anchor: slot(Role::Anchor, None),
            pace: slot(Role::Pace, None),
            value: slot(Role::Value, None),
        };
        let strategy = Strategy::preset(StrategyKind::Budget6).unwrap();
        assert_eq!(
            StakeCalculator::default().calculate(&selection, &strategy),
            Err(StakeError::EmptySelection)
        );
    }

    #[test]
    fn test_partial_selection_skips_trifecta() {
        let selection = Selection {
            anchor: slot(Role::Anchor, Some(runner("A", 3.5))),
            pace: slot(Role::Pace, None),
            value: slot(Role::Value, Some(runner("C", 12.0))),
        };
        let strategy = Strategy::preset(StrategyKind::Budget6).unwrap();
        let breakdown = StakeCalculator::default()
            .calculate(&selection, &strategy)
            .unwrap();

        assert!(breakdown.line(BetType::Trifecta).is_none());
        let quin = breakdown.line(BetType::Quinella).unwrap();
        assert_eq!(quin.combination_count, 1);
        assert_eq!(quin.stake_cents, 300);
        // one for the unfilled role, one for the skipped trifecta
        assert_eq!(breakdown.warnings.len(), 2);
    }

    #[test]
    fn test_duplicate_runner_rejected() {
        let selection = Selection {
            anchor: slot(Role::Anchor, Some(runner("A", 3.5))),
            pace: slot(Role::Pace, Some(runner("A", 3.5))),
            value: slot(Role::Value, None),
        };
        let strategy = Strategy::preset(StrategyKind::QuinellaOnly).unwrap();
        assert_eq!(
            StakeCalculator::default().calculate(&selection, &strategy),
            Err(StakeError::DuplicateRunner("A".to_string()))
        );
    }

    #[test]
    fn test_strategy_kind_keys() {
        for kind in StrategyKind::PRESETS {
            assert_eq!(kind.key().parse::<StrategyKind>(), Ok(kind));
        }
        assert_eq!(" Custom ".parse::<StrategyKind>(), Ok(StrategyKind::Custom));
        let json = serde_json::to_string(&StrategyKind::Budget15).unwrap();
        assert_eq!(json, "\"budget_15\"");
    }

    #[test]
    fn test_from_request_fills_missing_share() {
        let req = StrategyRequest {
            kind: StrategyKind::Custom,
            budget: Some(10.0),
            trifecta_share: Some(0.25),
            quinella_share: None,
        };
        let strategy = Strategy::from_request(&req).unwrap();
        assert_eq!(strategy.allocations[0].amount_cents, 250);
        assert_eq!(strategy.allocations[1].amount_cents, 750);

        let req = StrategyRequest {
            kind: StrategyKind::Custom,
            budget: None,
            trifecta_share: None,
            quinella_share: None,
        };
        assert_eq!(Strategy::from_request(&req), Err(StakeError::MissingBudget));
    }
}
