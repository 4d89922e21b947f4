//! Rough dividend estimates
//!
//! Tote dividends depend on the pool, so these are only a guide built from
//! the fixed odds of the boxed runners less the takeout.

use serde::{Deserialize, Serialize};

use super::combinations::BetType;
use super::stake::BetLine;

pub const PAYOUT_DISCLAIMER: &str = "Estimated dividends are approximations from fixed odds, \
not a guarantee of any return. Actual tote dividends depend on the pool.";

/// Payout estimate tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    /// Share of the pool kept by the operator
    pub takeout_rate: f64,
    /// Quinella dividends run well below the odds product
    pub quinella_discount: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            takeout_rate: 0.20,
            quinella_discount: 0.5,
        }
    }
}

/// Estimated dividends and returns for a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutEstimate {
    /// Estimated $1 trifecta dividend
    pub trifecta_dividend: Option<f64>,
    /// Estimated $1 quinella dividend
    pub quinella_dividend: Option<f64>,
    pub trifecta_return: f64,
    pub quinella_return: f64,
    /// Return if both bets hit
    pub total_return: f64,
    pub disclaimer: String,
}

impl PayoutConfig {
    fn retained(&self) -> f64 {
        (1.0 - self.takeout_rate).clamp(0.0, 1.0)
    }

    /// Product of the three shortest prices less takeout
    pub fn trifecta_dividend(&self, odds: &[f64]) -> Option<f64> {
        if odds.len() < 3 {
            return None;
        }
        let mut sorted = odds.to_vec();
        sorted.sort_by(f64::total_cmp);
        let product: f64 = sorted.iter().take(3).product();
        Some(round2(product * self.retained()))
    }

    /// Mean pairwise odds product less takeout, then discounted
    pub fn quinella_dividend(&self, odds: &[f64]) -> Option<f64> {
        if odds.len() < 2 {
            return None;
        }
        let mut total = 0.0;
        let mut pairs = 0usize;
        for (i, a) in odds.iter().enumerate() {
            for b in &odds[i + 1..] {
                total += a * b;
                pairs += 1;
            }
        }
        let mean = total / pairs as f64;
        Some(round2(mean * self.retained() * self.quinella_discount))
    }

    /// Estimate returns for the given bet lines
    pub fn estimate(&self, odds: &[f64], lines: &[BetLine]) -> PayoutEstimate {
        let trifecta_dividend = self.trifecta_dividend(odds);
        let quinella_dividend = self.quinella_dividend(odds);

        let line_return = |bet_type: BetType, dividend: Option<f64>| {
            let fraction: f64 = lines
                .iter()
                .filter(|l| l.bet_type == bet_type)
                .map(BetLine::return_fraction)
                .sum();
            round2(dividend.unwrap_or(0.0) * fraction)
        };

        let trifecta_return = line_return(BetType::Trifecta, trifecta_dividend);
        let quinella_return = line_return(BetType::Quinella, quinella_dividend);

        PayoutEstimate {
            trifecta_dividend,
            quinella_dividend,
            trifecta_return,
            quinella_return,
            total_return: round2(trifecta_return + quinella_return),
            disclaimer: PAYOUT_DISCLAIMER.to_string(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(bet_type: BetType, unit_cents: i64, flexi_bps: i64, flexi: bool) -> BetLine {
        BetLine {
            bet_type,
            label: bet_type.to_string(),
            runners: vec![],
            combinations: vec![],
            combination_count: 0,
            unit_cents,
            stake_cents: 0,
            flexi,
            flexi_bps,
        }
    }

    #[test]
    fn test_dividends() {
        let cfg = PayoutConfig::default();
        let odds = [3.5, 6.0, 12.0];

        // 3.5 * 6 * 12 = 252, less 20% = 201.6
        assert_eq!(cfg.trifecta_dividend(&odds), Some(201.6));
        // (21 + 42 + 72) / 3 = 45, * 0.8 * 0.5 = 18
        assert_eq!(cfg.quinella_dividend(&odds), Some(18.0));

        assert_eq!(cfg.trifecta_dividend(&odds[..2]), None);
        assert_eq!(cfg.quinella_dividend(&odds[..1]), None);
    }

    #[test]
    fn test_estimate_scales_by_stake() {
        let cfg = PayoutConfig::default();
        let odds = [3.5, 6.0, 12.0];
        let lines = vec![
            line(BetType::Trifecta, 50, 10_000, false),
            line(BetType::Quinella, 100, 3_300, true),
        ];

        let estimate = cfg.estimate(&odds, &lines);
        assert_eq!(estimate.trifecta_return, 100.8);
        assert_eq!(estimate.quinella_return, 5.94);
        assert_eq!(estimate.total_return, 106.74);
        assert_eq!(estimate.disclaimer, PAYOUT_DISCLAIMER);
    }

    #[test]
    fn test_estimate_without_lines() {
        let estimate = PayoutConfig::default().estimate(&[4.0, 5.0], &[]);
        assert_eq!(estimate.trifecta_dividend, None);
        assert_eq!(estimate.quinella_dividend, Some(8.0));
        assert_eq!(estimate.total_return, 0.0);
    }
}
