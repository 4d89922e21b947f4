//! Form token grammar and keyword cues
//!
//! A form token reads oldest run first, newest run last, optionally followed
//! by a free-text remark: `"x15 up in trip"` is a spell, a win, a fifth, then
//! the remark "up in trip".
//!
//! Run symbols:
//! - `1`-`9`: finishing position
//! - `0`: tenth or worse
//! - `x`: spell (let-up between preparations)
//! - `f`: fell, `l`: lost rider, `d`: disqualified

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::SpeedMapHint;

/// Number of most recent runs considered for form strength
pub const RECENT_RUNS: usize = 3;

fn form_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<runs>[0-9xXfFlLdD]+)(?:\s+(?P<remark>.+))?$")
            .expect("form pattern is valid")
    })
}

/// A single entry in a runner's form line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormRun {
    /// Finishing position (10 stands for "tenth or worse")
    Finished(u8),
    Spell,
    Fell,
    LostRider,
    Disqualified,
}

impl FormRun {
    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(FormRun::Finished(10)),
            '1'..='9' => symbol.to_digit(10).map(|d| FormRun::Finished(d as u8)),
            'x' | 'X' => Some(FormRun::Spell),
            'f' | 'F' => Some(FormRun::Fell),
            'l' | 'L' => Some(FormRun::LostRider),
            'd' | 'D' => Some(FormRun::Disqualified),
            _ => None,
        }
    }

    /// Finished first to fourth
    pub fn is_top4(&self) -> bool {
        matches!(self, FormRun::Finished(1..=4))
    }
}

/// Typed form history parsed from a form token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormHistory {
    pub raw: String,
    /// Oldest first
    pub runs: Vec<FormRun>,
    pub remark: Option<String>,
    pub first_starter: bool,
}

impl FormHistory {
    /// Parse a form token
    ///
    /// Never fails: text that does not start with run symbols is kept as a
    /// remark with no runs.
    ///
    /// # Examples
    /// ```
    /// use clickpunter::core::form::FormHistory;
    /// let form = FormHistory::parse("x15 up in trip");
    /// assert_eq!(form.runs.len(), 3);
    /// assert_eq!(form.top4_in_last3(), 1);
    /// assert_eq!(form.remark.as_deref(), Some("up in trip"));
    /// ```
    pub fn parse(token: &str) -> Self {
        let raw = token.trim().to_string();

        let lower = raw.to_lowercase();
        if lower.starts_with("first start") {
            let remark = raw.get("first start".len()..).unwrap_or("").trim();
            return Self {
                remark: (!remark.is_empty()).then(|| remark.to_string()),
                first_starter: true,
                raw,
                runs: Vec::new(),
            };
        }

        match form_pattern().captures(&raw) {
            Some(caps) => {
                let runs = caps["runs"]
                    .chars()
                    .filter_map(FormRun::from_symbol)
                    .collect();
                let remark = caps
                    .name("remark")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|r| !r.is_empty());
                Self {
                    runs,
                    remark,
                    first_starter: false,
                    raw,
                }
            }
            None => Self {
                remark: (!raw.is_empty()).then(|| raw.clone()),
                runs: Vec::new(),
                first_starter: false,
                raw,
            },
        }
    }

    /// The most recent runs (up to three), oldest first
    ///
    /// The window is the newest end of the token, and a spell counts as a run.
    pub fn last_three(&self) -> &[FormRun] {
        let start = self.runs.len().saturating_sub(RECENT_RUNS);
        &self.runs[start..]
    }

    /// Count of first-to-fourth finishes in the last three runs
    pub fn top4_in_last3(&self) -> usize {
        self.last_three().iter().filter(|r| r.is_top4()).count()
    }

    pub fn has_runs(&self) -> bool {
        !self.runs.is_empty()
    }
}

/// Keyword cues found in free text (notes, form remarks, preferences)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCues {
    pub up_in_trip: bool,
    pub down_in_class: bool,
    pub forgive: bool,
    pub wet_form: bool,
    pub speed: Option<SpeedMapHint>,
}

impl FormCues {
    /// Scan one or more text fragments for cues
    pub fn scan<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized = normalize(texts);
        let has = |phrase: &str| normalized.contains(&format!(" {} ", phrase));

        let speed = if has("on pace") || has("on speed") || has("on the pace") {
            Some(SpeedMapHint::OnPace)
        } else if has("leader") || has("leaders") || has("lead") {
            Some(SpeedMapHint::Leader)
        } else if has("midfield") {
            Some(SpeedMapHint::Midfield)
        } else if has("backmarker") || has("back marker") || has("settles back") {
            Some(SpeedMapHint::Back)
        } else {
            None
        };

        Self {
            up_in_trip: has("up in trip") || has("step up") || has("steps up"),
            down_in_class: has("down in class") || has("drop") || has("drops"),
            forgive: has("forgive") || has("excuse") || has("excused"),
            wet_form: has("wet") || has("soft") || has("heavy"),
            speed,
        }
    }
}

/// Lowercase, split on anything that is not alphanumeric, rejoin with single
/// spaces and pad both ends so phrase lookups match on word boundaries.
fn normalize<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut words: Vec<String> = Vec::new();
    for text in texts {
        words.extend(
            text.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_string),
        );
    }
    format!(" {} ", words.join(" "))
}
