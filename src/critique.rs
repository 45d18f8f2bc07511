//! Best-effort extraction of scores and justification from critic output.
//!
//! The model is asked for `"<Axis>: <score>/10"` lines but nothing enforces
//! that, so parsing never fails: missing axes score 0 and, with no score
//! token at all, the whole text is the justification.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(novelty|coherence|usefulness):\s*([0-9]+)/10").unwrap()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Novelty,
    Coherence,
    Usefulness,
}

impl Axis {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Novelty => "Novelty",
            Self::Coherence => "Coherence",
            Self::Usefulness => "Usefulness",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("novelty") {
            Ok(Self::Novelty)
        } else if s.eq_ignore_ascii_case("coherence") {
            Ok(Self::Coherence)
        } else if s.eq_ignore_ascii_case("usefulness") {
            Ok(Self::Usefulness)
        } else {
            Err(format!(
                "unknown axis '{}' (expected novelty, coherence or usefulness)",
                s
            ))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCritique {
    pub novelty: u32,
    pub coherence: u32,
    pub usefulness: u32,
    pub justification: String,
}

impl ParsedCritique {
    fn set(&mut self, axis: Axis, score: u32) {
        match axis {
            Axis::Novelty => self.novelty = score,
            Axis::Coherence => self.coherence = score,
            Axis::Usefulness => self.usefulness = score,
        }
    }
}

/// Scan left to right; a later token for an axis overwrites an earlier one.
/// The justification is whatever follows the last token of any axis, trimmed.
pub fn parse_critique(text: &str) -> ParsedCritique {
    let mut parsed = ParsedCritique::default();
    let mut last_end: Option<usize> = None;

    for caps in SCORE_RE.captures_iter(text) {
        let (Some(whole), Some(name), Some(digits)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let Ok(axis) = name.as_str().parse::<Axis>() else {
            continue;
        };
        // ASCII digits only, so the sole failure mode is overflow.
        let score = digits.as_str().parse::<u32>().unwrap_or(u32::MAX);
        parsed.set(axis, score);
        last_end = Some(whole.end());
    }

    parsed.justification = match last_end {
        Some(end) => text[end..].trim().to_string(),
        None => text.to_string(),
    };
    parsed
}
