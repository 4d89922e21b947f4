//! Pasted race text parser
//!
//! Two shapes are accepted. One runner per line, as form guides are usually
//! copied:
//!
//! ```text
//! 5. Fast Hoof (4) $6.50 12x3 J:Smith T:Brown up in trip
//! 5. Fast Hoof (B4) $6.50 J:Smith T:Brown 12x3
//! ```
//!
//! Saddlecloth number, form, `J:` jockey, `T:` trainer, `O:` opening odds and
//! the trailing note are optional and may come in any order after the odds.
//! Odds of `SCR` mark a scratching.
//!
//! When no line has that shape, the text is read as race-card blocks: each
//! runner starts at a `N. Name (barrier)` line and its price, jockey, trainer
//! and form sit on the lines below.
//!
//! ```text
//! 1. Fast Hoof (NZ) (4)
//! J: Smith T: Brown
//! 12-3
//! WIN $6.50
//! ```
//!
//! # Example
//!
//! ```
//! use clickpunter::data::parser::RunnerTextParser;
//!
//! let parser = RunnerTextParser::new();
//! let entries = parser.parse_str("1. Fast Hoof (4) $6.50 12x3").unwrap();
//! assert_eq!(entries[0].name, "Fast Hoof");
//! ```

use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::IntakeError;
use crate::models::{OddsValue, RunnerEntry};

/// Line and block parser for pasted runner text
pub struct RunnerTextParser {
    line_pattern: Regex,
    form_pattern: Regex,
    block_start: Regex,
    barrier_pattern: Regex,
    country_pattern: Regex,
    win_odds_pattern: Regex,
    price_pattern: Regex,
    jockey_pattern: Regex,
    trainer_pattern: Regex,
    block_form_pattern: Regex,
}

impl Default for RunnerTextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerTextParser {
    pub fn new() -> Self {
        Self {
            line_pattern: Regex::new(
                r"(?i)^\s*(?:\d+[.)]\s+)?(?P<name>.+?)\s*\(B?(?P<barrier>\d+)\)\s+(?P<odds>SCR|\$?\d+(?:\.\d+)?(?:/\d+)?)(?:\s+(?P<rest>.*))?$",
            )
            .unwrap(),
            form_pattern: Regex::new(r"^[0-9xXfFlLdD]+$").unwrap(),
            block_start: Regex::new(r"^\d+\.\s+\w").unwrap(),
            barrier_pattern: Regex::new(r"(?i)\(B?(\d{1,2})\)").unwrap(),
            country_pattern: Regex::new(r"\([A-Z]{2,3}\)").unwrap(),
            win_odds_pattern: Regex::new(r"(?i)\b(?:WIN|W)\s*\$?\s*(\d+(?:\.\d+)?)").unwrap(),
            price_pattern: Regex::new(r"\$(\d+(?:\.\d+)?)").unwrap(),
            jockey_pattern: Regex::new(r"(?m)\bJ:\s*(.+?)\s*(?:\bT:|$)").unwrap(),
            trainer_pattern: Regex::new(r"(?m)\bT:\s*(.+?)\s*(?:\bJ:|$)").unwrap(),
            block_form_pattern: Regex::new(r"(?m)^\s*([0-9xX-]{3,10})\s*$").unwrap(),
        }
    }

    /// Parse a text file
    pub fn parse_file(&self, path: &Path) -> Result<Vec<RunnerEntry>, IntakeError> {
        let text = fs::read_to_string(path)?;
        self.parse_str(&text)
    }

    /// Parse pasted text, skipping lines or blocks that are not runners
    pub fn parse_str(&self, text: &str) -> Result<Vec<RunnerEntry>, IntakeError> {
        let line_shaped = text
            .lines()
            .any(|line| self.line_pattern.is_match(line.trim()));

        let entries = if line_shaped {
            self.parse_lines(text)
        } else {
            self.parse_blocks(text)
        };

        if entries.is_empty() {
            return Err(IntakeError::NoRunners);
        }
        debug!("Parsed {} runners from text", entries.len());
        Ok(entries)
    }

    fn parse_lines(&self, text: &str) -> Vec<RunnerEntry> {
        let mut entries = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.parse_line(trimmed) {
                Some(entry) => entries.push(entry),
                None => warn!("Skipping line {}: {}", idx + 1, trimmed),
            }
        }
        entries
    }

    /// Parse a single runner line
    pub fn parse_line(&self, line: &str) -> Option<RunnerEntry> {
        let caps = self.line_pattern.captures(line)?;

        let name = caps.name("name")?.as_str().trim().to_string();
        let barrier = caps.name("barrier")?.as_str().parse::<u32>().ok();
        let odds_text = caps.name("odds")?.as_str();
        let scratched = odds_text.eq_ignore_ascii_case("SCR");

        let mut entry = RunnerEntry {
            name,
            barrier,
            odds: (!scratched).then(|| OddsValue::Text(odds_text.to_string())),
            scratched,
            ..Default::default()
        };

        let rest = caps.name("rest").map_or("", |m| m.as_str());
        let mut note = Vec::new();
        for token in rest.split_whitespace() {
            if let Some(jockey) = strip_tag(token, "J:") {
                entry.jockey = Some(jockey.to_string());
            } else if let Some(trainer) = strip_tag(token, "T:") {
                entry.trainer = Some(trainer.to_string());
            } else if let Some(open) = strip_tag(token, "O:") {
                entry.open_odds = crate::core::odds::parse_odds(open);
            } else if entry.form.is_empty() && self.form_pattern.is_match(token) {
                entry.form = token.to_string();
            } else {
                note.push(token);
            }
        }
        if !note.is_empty() {
            entry.note = Some(note.join(" "));
        }

        Some(entry)
    }

    /// Parse race-card blocks, one runner per `N. Name` heading
    pub fn parse_blocks(&self, text: &str) -> Vec<RunnerEntry> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in text.lines() {
            if self.block_start.is_match(line.trim()) {
                blocks.push(vec![line.trim()]);
            } else if let Some(block) = blocks.last_mut() {
                block.push(line.trim());
            }
        }

        blocks
            .iter()
            .filter_map(|block| {
                let entry = self.parse_block(&block.join("\n"));
                if entry.is_none() {
                    warn!("Skipping block: {}", block[0]);
                }
                entry
            })
            .collect()
    }

    fn parse_block(&self, block: &str) -> Option<RunnerEntry> {
        let heading = block.lines().next()?;
        let (_, raw_name) = heading.split_once('.')?;

        let barrier = self
            .barrier_pattern
            .captures(raw_name)
            .and_then(|c| c[1].parse::<u32>().ok());
        let without_country = self.country_pattern.replace_all(raw_name, " ");
        let without_barrier = self.barrier_pattern.replace_all(&without_country, " ");
        let name = without_barrier.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return None;
        }

        let odds = self
            .win_odds_pattern
            .captures(block)
            .or_else(|| self.price_pattern.captures(block))
            .map(|c| OddsValue::Text(c[1].to_string()))?;

        let capture = |pattern: &Regex| {
            pattern
                .captures(block)
                .map(|c| c[1].trim_end_matches([',', ' ']).to_string())
                .filter(|s| !s.is_empty())
        };

        Some(RunnerEntry {
            name,
            barrier,
            odds: Some(odds),
            form: self.block_form(block),
            jockey: capture(&self.jockey_pattern),
            trainer: capture(&self.trainer_pattern),
            speed_map: block_speed_hint(block).map(str::to_string),
            ..Default::default()
        })
    }

    fn block_form(&self, block: &str) -> String {
        if block.to_lowercase().contains("first start") {
            return "first start".to_string();
        }
        // A dash marks a break between preparations, written `x` in form tokens
        self.block_form_pattern
            .captures(block)
            .map(|c| c[1].replace('-', "x"))
            .unwrap_or_default()
    }
}

fn block_speed_hint(block: &str) -> Option<&'static str> {
    let upper = block.to_uppercase();
    if upper.contains("FAVOURITE") || upper.contains("LEADER") {
        Some("leader")
    } else if upper.contains("MOVER") {
        Some("on-pace")
    } else if upper.contains("CLOSER") || upper.contains("BACKMARKER") {
        Some("back")
    } else {
        None
    }
}

fn strip_tag<'a>(token: &'a str, tag: &str) -> Option<&'a str> {
    let head = token.get(..tag.len())?;
    if head.eq_ignore_ascii_case(tag) && token.len() > tag.len() {
        token.get(tag.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let parser = RunnerTextParser::new();
        let entry = parser
            .parse_line("5. Fast Hoof (4) $6.50 12x3 J:Smith T:Brown up in trip")
            .unwrap();

        assert_eq!(entry.name, "Fast Hoof");
        assert_eq!(entry.barrier, Some(4));
        assert_eq!(entry.odds, Some(OddsValue::Text("$6.50".to_string())));
        assert_eq!(entry.form, "12x3");
        assert_eq!(entry.jockey.as_deref(), Some("Smith"));
        assert_eq!(entry.trainer.as_deref(), Some("Brown"));
        assert_eq!(entry.note.as_deref(), Some("up in trip"));
        assert!(!entry.scratched);
    }

    #[test]
    fn test_parse_minimal_and_fractional() {
        let parser = RunnerTextParser::new();
        let entry = parser.parse_line("Slow Coach (11) 5/2").unwrap();
        assert_eq!(entry.name, "Slow Coach");
        assert_eq!(entry.barrier, Some(11));
        assert_eq!(entry.odds, Some(OddsValue::Text("5/2".to_string())));
        assert!(entry.form.is_empty());
        assert!(entry.note.is_none());
    }

    #[test]
    fn test_parse_scratched_and_open_odds() {
        let parser = RunnerTextParser::new();
        let entry = parser.parse_line("3) Gone Home (2) SCR").unwrap();
        assert!(entry.scratched);
        assert!(entry.odds.is_none());

        let entry = parser
            .parse_line("Firming Fast (6) 4.20 O:$5.50 settles midfield")
            .unwrap();
        assert_eq!(entry.open_odds, Some(5.5));
        assert_eq!(entry.note.as_deref(), Some("settles midfield"));
    }

    #[test]
    fn test_parse_str_skips_noise() {
        let text = "\
# Race 4, Randwick 1200m
Race 4 - BM72
1. Alpha (3) $3.50 12x
2. Bravo (7) $6.00 234

3. Charlie (5) $12.00 x15 up in trip
";
        let entries = RunnerTextParser::new().parse_str(text).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].name, "Charlie");
        assert_eq!(entries[2].form, "x15");
        assert_eq!(entries[2].note.as_deref(), Some("up in trip"));
    }

    #[test]
    fn test_parse_tags_before_form() {
        let parser = RunnerTextParser::new();
        let entry = parser
            .parse_line("5. Fast Hoof (4) $6.50 J:Smith T:Brown 12x3")
            .unwrap();
        assert_eq!(entry.form, "12x3");
        assert_eq!(entry.jockey.as_deref(), Some("Smith"));
        assert_eq!(entry.trainer.as_deref(), Some("Brown"));
        assert!(entry.note.is_none());

        let entry = parser
            .parse_line("Late Charge (9) 8.00 J:Jones drifted late 3x21")
            .unwrap();
        assert_eq!(entry.form, "3x21");
        assert_eq!(entry.note.as_deref(), Some("drifted late"));
    }

    #[test]
    fn test_parse_b_prefixed_barrier() {
        let parser = RunnerTextParser::new();
        let entry = parser
            .parse_line("5. Fast Hoof (B4) $6.50 J:Smith T:Brown 12x3")
            .unwrap();
        assert_eq!(entry.name, "Fast Hoof");
        assert_eq!(entry.barrier, Some(4));
        assert_eq!(entry.form, "12x3");
    }

    #[test]
    fn test_parse_race_card_blocks() {
        let text = "\
Race 4 - Randwick
1. Fast Hoof (NZ) (4)
J: Smith T: Brown
12-3
WIN $6.50
Likely leader
2. Slow Coach (11)
T: Green J: White
First Start
$21.00
3. No Price (2)
J: Nobody
";
        let parser = RunnerTextParser::new();
        let entries = parser.parse_str(text).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.name, "Fast Hoof");
        assert_eq!(first.barrier, Some(4));
        assert_eq!(first.odds, Some(OddsValue::Text("6.50".to_string())));
        assert_eq!(first.jockey.as_deref(), Some("Smith"));
        assert_eq!(first.trainer.as_deref(), Some("Brown"));
        assert_eq!(first.form, "12x3");
        assert_eq!(first.speed_map.as_deref(), Some("leader"));

        let second = &entries[1];
        assert_eq!(second.name, "Slow Coach");
        assert_eq!(second.barrier, Some(11));
        assert_eq!(second.odds, Some(OddsValue::Text("21.00".to_string())));
        assert_eq!(second.trainer.as_deref(), Some("Green"));
        assert_eq!(second.jockey.as_deref(), Some("White"));
        assert_eq!(second.form, "first start");
        assert!(second.speed_map.is_none());
    }

    #[test]
    fn test_parse_str_no_runners() {
        assert!(matches!(
            RunnerTextParser::new().parse_str("nothing here\n"),
            Err(IntakeError::NoRunners)
        ));
    }
}
