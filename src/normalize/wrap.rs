//! Hard-wrap detection.
//!
//! Plain-text bodies come in two shapes: flowed text, where each paragraph
//! is one long line, and hard-wrapped text, where a composer inserted a
//! newline every ~72 characters. Reflowing a flowed body is harmless;
//! reflowing poetry or ASCII tables destroys them, and leaving hard wraps
//! in place produces a ragged right edge in the rendered book. This module
//! votes on three statistical indicators to tell the two apart.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Characters that legitimately end a flowed line.
const SENTENCE_END: [char; 8] = ['.', '!', '?', ',', ';', ':', '\'', '"'];

/// Thresholds for the wrap detector. All tunable from the `[detect]`
/// section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Bodies with fewer non-blank lines than this are never reflowed.
    pub min_lines: usize,
    /// Indicator 1 fires when more than this fraction of non-blank lines
    /// ends in a lowercase letter.
    pub lowercase_ratio: f64,
    /// Lines longer than this (in characters) count as "long" for
    /// indicators 2 and 3.
    pub long_line_chars: usize,
    /// Indicator 2 fires when more than this fraction of long lines ends
    /// without sentence punctuation.
    pub midline_ratio: f64,
    /// Indicator 3 needs at least this many long lines.
    pub uniform_min_lines: usize,
    /// Indicator 3 fires when the mean line length falls inside
    /// `[uniform_mean_min, uniform_mean_max]`...
    pub uniform_mean_min: f64,
    pub uniform_mean_max: f64,
    /// ...and the population standard deviation stays below this.
    pub uniform_stddev: f64,
    /// How many indicators must vote "wrapped".
    pub agreement: usize,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            min_lines: 5,
            lowercase_ratio: 0.4,
            long_line_chars: 20,
            midline_ratio: 0.4,
            uniform_min_lines: 3,
            uniform_mean_min: 50.0,
            uniform_mean_max: 85.0,
            uniform_stddev: 20.0,
            agreement: 2,
        }
    }
}

/// Decide whether `text` looks hard-wrapped.
///
/// Non-blank lines (trailing whitespace trimmed) feed three indicators:
/// lowercase line endings, long lines breaking mid-sentence, and uniform
/// line lengths. An indicator without enough data to judge is skipped
/// rather than counted against. The body is wrapped when at least
/// `agreement` of the evaluated indicators vote wrapped; bodies shorter
/// than `min_lines` are never wrapped.
pub fn is_hard_wrapped(text: &str, cfg: &WrapConfig) -> bool {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < cfg.min_lines {
        return false;
    }

    let mut votes = 0usize;
    let mut evaluated = 0usize;

    // Indicator 1: prose broken mid-sentence tends to end lines on a
    // lowercase letter.
    evaluated += 1;
    let lowercase = lines
        .iter()
        .filter(|line| line.chars().next_back().is_some_and(char::is_lowercase))
        .count();
    if lowercase as f64 / lines.len() as f64 > cfg.lowercase_ratio {
        votes += 1;
    }

    // Indicator 2: long lines ending without punctuation. Short lines
    // (greetings, sign-offs) are excluded; with no long lines at all the
    // indicator is skipped.
    let long: Vec<&&str> = lines
        .iter()
        .filter(|line| line.chars().count() > cfg.long_line_chars)
        .collect();
    if !long.is_empty() {
        evaluated += 1;
        let midline = long
            .iter()
            .filter(|line| {
                line.chars()
                    .next_back()
                    .is_some_and(|c| !SENTENCE_END.contains(&c))
            })
            .count();
        if midline as f64 / long.len() as f64 > cfg.midline_ratio {
            votes += 1;
        }
    }

    // Indicator 3: a composer wrapping at a fixed column produces long
    // lines of conspicuously uniform length. Judged over the long lines
    // only, so one-word closers do not inflate the spread.
    if long.len() >= cfg.uniform_min_lines {
        evaluated += 1;
        let lengths: Vec<f64> = long
            .iter()
            .map(|line| line.chars().count() as f64)
            .collect();
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let variance = lengths
            .iter()
            .map(|len| (len - mean).powi(2))
            .sum::<f64>()
            / lengths.len() as f64;
        if mean >= cfg.uniform_mean_min
            && mean <= cfg.uniform_mean_max
            && variance.sqrt() < cfg.uniform_stddev
        {
            votes += 1;
        }
    }

    let wrapped = votes >= cfg.agreement;
    debug!(
        lines = lines.len(),
        votes, evaluated, wrapped, "hard-wrap detection"
    );
    wrapped
}
