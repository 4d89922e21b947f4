//! Boxed bet combinatorics
//!
//! A box covers every finishing order of the chosen runners:
//! - Trifecta: ordered 1st-2nd-3rd, k×(k−1)×(k−2) combinations
//! - Quinella: unordered first two, k×(k−1)/2 combinations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exotic bet types supported by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Trifecta,
    Quinella,
}

impl BetType {
    /// Number of placings the bet covers
    pub fn places(&self) -> usize {
        match self {
            BetType::Trifecta => 3,
            BetType::Quinella => 2,
        }
    }

    /// Whether finishing order matters
    pub fn is_ordered(&self) -> bool {
        matches!(self, BetType::Trifecta)
    }

    /// Combination count for a box of `k` runners
    pub fn box_count(&self, k: usize) -> usize {
        match self {
            BetType::Trifecta => trifecta_box_count(k),
            BetType::Quinella => quinella_box_count(k),
        }
    }

    /// Enumerate every combination in a box of `runners`
    pub fn box_combinations<T: Clone>(&self, runners: &[T]) -> Vec<Vec<T>> {
        if self.is_ordered() {
            permutations(runners, self.places())
        } else {
            combinations(runners, self.places())
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BetType::Trifecta => "Trifecta",
            BetType::Quinella => "Quinella",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// k×(k−1)×(k−2), zero below three runners
pub fn trifecta_box_count(k: usize) -> usize {
    if k < 3 {
        return 0;
    }
    k * (k - 1) * (k - 2)
}

/// k×(k−1)/2, zero below two runners
pub fn quinella_box_count(k: usize) -> usize {
    if k < 2 {
        return 0;
    }
    k * (k - 1) / 2
}

/// Ordered selections of `size` distinct items
pub fn permutations<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    if size == 0 || size > items.len() {
        return out;
    }

    let mut used = vec![false; items.len()];
    let mut current = Vec::with_capacity(size);
    permute(items, size, &mut used, &mut current, &mut out);
    out
}

fn permute<T: Clone>(
    items: &[T],
    size: usize,
    used: &mut [bool],
    current: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(item.clone());
        permute(items, size, used, current, out);
        current.pop();
        used[i] = false;
    }
}

/// Unordered selections of `size` distinct items, in input order
pub fn combinations<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    if size == 0 || size > items.len() {
        return out;
    }

    let mut current = Vec::with_capacity(size);
    combine(items, size, 0, &mut current, &mut out);
    out
}

fn combine<T: Clone>(
    items: &[T],
    size: usize,
    start: usize,
    current: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for (i, item) in items.iter().enumerate().skip(start) {
        current.push(item.clone());
        combine(items, size, i + 1, current, out);
        current.pop();
    }
}
