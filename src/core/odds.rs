//! Odds and money helpers
//!
//! Odds are decimal fixed odds (e.g. 3.50 means a $1 bet returns $3.50).
//! Money is carried in integer cents so stake arithmetic never drifts.

use serde::{Deserialize, Serialize};

/// Smallest decimal odds a bookmaker will offer
pub const MIN_DECIMAL_ODDS: f64 = 1.01;

/// Default ratio below which current odds count as "firmer" than opening odds
pub const DEFAULT_FIRMER_RATIO: f64 = 0.9;

/// Inclusive odds range used to qualify a runner for a role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsBand {
    pub min: f64,
    pub max: f64,
}

impl OddsBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether odds fall inside the band (both ends inclusive)
    pub fn contains(&self, odds: f64) -> bool {
        self.min <= odds && odds <= self.max
    }

    /// Render as "$2.80-$4.50"
    pub fn label(&self) -> String {
        format!("{}-{}", format_odds(self.min), format_odds(self.max))
    }
}

/// Parse odds text into decimal odds
///
/// Accepts decimal (`3.5`, `$3.50`) and fractional (`5/2` -> 3.5) notation.
/// Returns `None` for anything else, including non-positive values.
///
/// # Examples
/// ```
/// use clickpunter::core::odds::parse_odds;
/// assert_eq!(parse_odds("$3.50"), Some(3.5));
/// assert_eq!(parse_odds("5/2"), Some(3.5));
/// assert_eq!(parse_odds("abc"), None);
/// ```
pub fn parse_odds(text: &str) -> Option<f64> {
    let cleaned = text.trim().trim_start_matches('$').trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = cleaned.parse::<f64>() {
        return (value.is_finite() && value > 0.0).then_some(value);
    }

    let (numerator, denominator) = cleaned.split_once('/')?;
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    if denominator <= 0.0 || numerator <= 0.0 {
        return None;
    }

    Some(numerator / denominator + 1.0)
}

/// Check if odds have shortened relative to the opening price
///
/// Firmer means `current < open * ratio` (0.9 = at least 10% shorter).
pub fn odds_shortening(open: Option<f64>, current: f64, ratio: f64) -> bool {
    match open {
        Some(open) if open > 0.0 => current < open * ratio,
        _ => false,
    }
}

/// Flexi percentage in basis points (10_000 = 100%)
///
/// `spend / full_cost`, rounded down to `granularity_bps` and capped at 100%.
pub fn flexi_basis_points(spend_cents: i64, full_cost_cents: i64, granularity_bps: i64) -> i64 {
    if full_cost_cents <= 0 || spend_cents <= 0 {
        return 0;
    }

    let raw = (spend_cents as i128 * 10_000 / full_cost_cents as i128) as i64;
    let granularity = granularity_bps.max(1);
    let rounded = (raw / granularity) * granularity;

    rounded.min(10_000)
}

/// Round a cent amount down to a whole number of betting units
pub fn round_down_to_unit(cents: i64, unit_cents: i64) -> i64 {
    if unit_cents <= 0 {
        return cents.max(0);
    }
    (cents.max(0) / unit_cents) * unit_cents
}

/// Convert a dollar amount to cents, rounding to the nearest cent
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Convert cents to dollars
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format cents as "$5.00"
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Format decimal odds as "$3.50"
pub fn format_odds(odds: f64) -> String {
    format!("${:.2}", odds)
}
