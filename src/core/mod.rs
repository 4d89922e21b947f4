//! Core business logic modules

pub mod checklist;
pub mod classifier;
pub mod combinations;
pub mod form;
pub mod odds;
pub mod payout;
pub mod runner;
pub mod stake;

// Re-export commonly used types
pub use checklist::{evaluate_checklist, Checklist, ChecklistConfig};
pub use classifier::{
    AnalysisError, Candidate, ClassifierConfig, RaceAnalysis, Role, RoleClassifier, RoleSlot,
    Selection,
};
pub use combinations::BetType;
pub use odds::{format_currency, OddsBand};
pub use payout::{PayoutConfig, PayoutEstimate};
pub use runner::{validate_field, ExcludedRunner, RunnerError};
pub use stake::{
    BetLine, StakeBreakdown, StakeCalculator, StakeConfig, StakeError, Strategy, StrategyKind,
};
