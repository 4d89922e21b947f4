//! Runner intake from CSV files and pasted text

pub mod csv_loader;
pub mod parser;

use polars::prelude::PolarsError;
use std::path::Path;
use thiserror::Error;

use crate::models::RunnerEntry;

// Re-export commonly used types
pub use csv_loader::{load_runners_csv, parse_runners_csv};
pub use parser::RunnerTextParser;

/// Intake failures
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to read runner file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("no runners found")]
    NoRunners,
}

/// Load runners from a file: `.csv` via the CSV reader, anything else as text
pub fn load_runners(path: &Path) -> Result<Vec<RunnerEntry>, IntakeError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        load_runners_csv(path)
    } else {
        RunnerTextParser::new().parse_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_runners_dispatches_on_extension() {
        let dir = std::env::temp_dir();
        let id = std::process::id();

        let csv = dir.join(format!("clickpunter-intake-{}.CSV", id));
        std::fs::write(&csv, "name,barrier,odds\nAlpha,3,3.50\n").unwrap();
        let entries = load_runners(&csv).unwrap();
        std::fs::remove_file(&csv).unwrap();
        assert_eq!(entries[0].barrier, Some(3));

        let txt = dir.join(format!("clickpunter-intake-{}.txt", id));
        std::fs::write(&txt, "1. Alpha (3) $3.50 12x\n").unwrap();
        let entries = load_runners(&txt).unwrap();
        std::fs::remove_file(&txt).unwrap();
        assert_eq!(entries[0].form, "12x");

        assert!(matches!(
            load_runners(&dir.join("clickpunter-missing.txt")),
            Err(IntakeError::Io(_))
        ));
    }
}
