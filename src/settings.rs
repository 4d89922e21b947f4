//! Tunables loaded from an optional JSON file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::core::checklist::ChecklistConfig;
use crate::core::classifier::{ClassifierConfig, RoleClassifier};
use crate::core::payout::PayoutConfig;
use crate::core::stake::{StakeCalculator, StakeConfig};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Every tunable, each section optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub classifier: ClassifierConfig,
    pub checklist: ChecklistConfig,
    pub stake: StakeConfig,
    pub payout: PayoutConfig,
}

impl Settings {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let c = &self.classifier;
        for (name, band) in [
            ("anchor", c.anchor_band),
            ("pace", c.pace_band),
            ("value", c.value_band),
        ] {
            if !(band.min > 0.0 && band.min <= band.max) {
                return Err(SettingsError::Invalid(format!(
                    "{} band {} is empty",
                    name,
                    band.label()
                )));
            }
        }
        if !(0.0..1.0).contains(&self.payout.takeout_rate) {
            return Err(SettingsError::Invalid(format!(
                "takeout rate must be in [0, 1), got {}",
                self.payout.takeout_rate
            )));
        }
        if self.stake.flexi_granularity_bps <= 0 || self.stake.flexi_granularity_bps > 10_000 {
            return Err(SettingsError::Invalid(format!(
                "flexi granularity must be 1-10000 basis points, got {}",
                self.stake.flexi_granularity_bps
            )));
        }
        if self.checklist.field_size_min > self.checklist.field_size_max {
            return Err(SettingsError::Invalid(
                "field_size_min is above field_size_max".to_string(),
            ));
        }
        Ok(())
    }

    pub fn classifier(&self) -> RoleClassifier {
        RoleClassifier::new(self.classifier.clone(), self.checklist.clone())
    }

    pub fn calculator(&self) -> StakeCalculator {
        StakeCalculator::new(self.stake.clone(), self.payout.clone())
    }
}
