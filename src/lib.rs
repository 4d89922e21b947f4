//! ClickPunter - A/B/C race selection and boxed exotic stake calculator
//!
//! This library provides:
//! - Runner validation and rule-based Anchor/Pace/Value classification
//! - A pre-bet checklist (field size, barriers, track, market movers)
//! - Boxed trifecta and quinella stake calculation for budget presets
//! - Rough payout estimates and a settled bet history
//! - CSV and pasted-text runner intake
//!
//! # Example
//!
//! ```no_run
//! use clickpunter::core::{RoleClassifier, StakeCalculator, Strategy, StrategyKind};
//! use clickpunter::data::load_runners;
//! use clickpunter::models::RaceContext;
//! use std::path::Path;
//!
//! let entries = load_runners(Path::new("race4.csv")).unwrap();
//! let analysis = RoleClassifier::default()
//!     .analyze(&RaceContext::default(), &entries)
//!     .unwrap();
//!
//! let strategy = Strategy::preset(StrategyKind::Budget6).unwrap();
//! let breakdown = StakeCalculator::default()
//!     .calculate(&analysis.selection, &strategy)
//!     .unwrap();
//! println!("{}", breakdown.instructions());
//! ```

pub mod core;
pub mod data;
pub mod history;
pub mod models;
pub mod settings;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;

// Re-export commonly used types
pub use data::{load_runners, IntakeError};
pub use history::{BetHistory, BetRecord, HistoryError, HistorySummary, RaceResult};
pub use models::{RaceContext, Runner, RunnerEntry, SpeedMapHint, TrackCondition};
pub use settings::{Settings, SettingsError};
