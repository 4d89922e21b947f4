//! CSV loading for race fields
//!
//! Columns: `name, barrier, odds, form, note, speed_map, jockey, trainer,
//! track_pref, distance_pref, open_odds, scratched`. Only `name` is required;
//! `last3_form` is accepted for `form`. Every column is read as text so form
//! tokens like `012` keep their leading zero.

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use super::IntakeError;
use crate::core::odds::parse_odds;
use crate::models::{OddsValue, RunnerEntry};

/// Load runner entries from a CSV file
pub fn load_runners_csv<P: AsRef<Path>>(csv_path: P) -> Result<Vec<RunnerEntry>, IntakeError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
        .finish()?;

    dataframe_to_entries(&df)
}

/// Load runner entries from CSV text
pub fn parse_runners_csv(text: &str) -> Result<Vec<RunnerEntry>, IntakeError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;

    dataframe_to_entries(&df)
}

/// Text values of an optional column, one per row
fn text_column(df: &DataFrame, names: &[&str]) -> Result<Vec<Option<String>>, PolarsError> {
    let Some(name) = names
        .iter()
        .find(|n| df.get_column_names().iter().any(|c| c.as_str() == **n))
    else {
        return Ok(vec![None; df.height()]);
    };

    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "scr" | "scratched"
    )
}

fn parse_barrier(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0)
            .map(|v| v as u32)
    })
}

/// Convert a DataFrame into runner entries
fn dataframe_to_entries(df: &DataFrame) -> Result<Vec<RunnerEntry>, IntakeError> {
    if !df.get_column_names().iter().any(|c| c.as_str() == "name") {
        return Err(IntakeError::MissingColumn("name".to_string()));
    }

    let names = text_column(df, &["name"])?;
    let barriers = text_column(df, &["barrier"])?;
    let odds = text_column(df, &["odds"])?;
    let forms = text_column(df, &["form", "last3_form"])?;
    let notes = text_column(df, &["note"])?;
    let speed_maps = text_column(df, &["speed_map", "speed_map_hint"])?;
    let jockeys = text_column(df, &["jockey"])?;
    let trainers = text_column(df, &["trainer"])?;
    let track_prefs = text_column(df, &["track_pref"])?;
    let distance_prefs = text_column(df, &["distance_pref"])?;
    let open_odds = text_column(df, &["open_odds", "market_open_odds"])?;
    let scratched = text_column(df, &["scratched", "is_scratched"])?;

    let mut entries = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        entries.push(RunnerEntry {
            name: names[i].clone().unwrap_or_default(),
            barrier: barriers[i].as_deref().and_then(parse_barrier),
            odds: odds[i].clone().map(OddsValue::Text),
            form: forms[i].clone().unwrap_or_default(),
            note: notes[i].clone(),
            speed_map: speed_maps[i].clone(),
            jockey: jockeys[i].clone(),
            trainer: trainers[i].clone(),
            track_pref: track_prefs[i].clone(),
            distance_pref: distance_prefs[i].clone(),
            open_odds: open_odds[i].as_deref().and_then(parse_odds),
            scratched: scratched[i].as_deref().is_some_and(parse_flag),
        });
    }

    debug!("Loaded {} runners from CSV", entries.len());
    if entries.is_empty() {
        return Err(IntakeError::NoRunners);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: &str = "\
name,barrier,odds,last3_form,note,speed_map,open_odds,scratched
Alpha,3,3.50,12x,,leader,4.00,
Bravo,7,$6.00,234,,,,false
Charlie,5,12,x15,up in trip,,,
Delta,9,SCR,012,,,,true
";

    #[test]
    fn test_parse_runners_csv() {
        let entries = parse_runners_csv(FIELD).unwrap();
        assert_eq!(entries.len(), 4);

        let alpha = &entries[0];
        assert_eq!(alpha.name, "Alpha");
        assert_eq!(alpha.barrier, Some(3));
        assert_eq!(alpha.odds, Some(OddsValue::Text("3.50".to_string())));
        assert_eq!(alpha.form, "12x");
        assert_eq!(alpha.speed_map.as_deref(), Some("leader"));
        assert_eq!(alpha.open_odds, Some(4.0));
        assert!(alpha.note.is_none());

        assert_eq!(entries[2].note.as_deref(), Some("up in trip"));
        assert_eq!(entries[3].form, "012");
        assert!(entries[3].scratched);
        assert!(!entries[1].scratched);
    }

    #[test]
    fn test_name_column_required() {
        let result = parse_runners_csv("horse,odds\nAlpha,3.5\n");
        assert!(matches!(result, Err(IntakeError::MissingColumn(c)) if c == "name"));
    }

    #[test]
    fn test_minimal_columns() {
        let entries = parse_runners_csv("name\nAlpha\nBravo\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].odds.is_none());
        assert!(entries[0].barrier.is_none());
    }

    #[test]
    fn test_parse_barrier() {
        assert_eq!(parse_barrier("4"), Some(4));
        assert_eq!(parse_barrier("4.0"), Some(4));
        assert_eq!(parse_barrier("4.5"), None);
        assert_eq!(parse_barrier("wide"), None);
    }

    #[test]
    fn test_load_runners_csv_file() {
        let path =
            std::env::temp_dir().join(format!("clickpunter-field-{}.csv", std::process::id()));
        std::fs::write(&path, FIELD).unwrap();
        let entries = load_runners_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(entries.len(), 4);
    }
}
