use regex::Regex;

use keywatch_common::config::DEFAULT_KEY_PATTERN;
use keywatch_common::KeyWatchError;

/// Characters of surrounding text captured on each side of a match.
const CONTEXT_RADIUS: usize = 100;
/// Upper bound on the normalized context string, before the ellipsis.
const CONTEXT_MAX: usize = 200;

/// One match produced by [`KeyMatcher::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatch {
    pub code: String,
    pub context: String,
}

/// The single definition of the key grammar.
///
/// All consumers go through this type so the code shape lives in one place.
/// Matching is case sensitive and word bounded: a key embedded in a longer
/// alphanumeric run is not a match.
pub struct KeyMatcher {
    re: Regex,
}

impl KeyMatcher {
    /// Compile a matcher from an (overridable) pattern.
    pub fn new(pattern: &str) -> Result<Self, KeyWatchError> {
        let re = Regex::new(pattern)
            .map_err(|e| KeyWatchError::Config(format!("invalid key pattern: {e}")))?;
        Ok(Self { re })
    }

    /// Extract all key codes from `text`, left to right, with a normalized
    /// window of surrounding context for each. Empty input yields no matches.
    pub fn extract(&self, text: &str) -> Vec<KeyMatch> {
        if text.is_empty() {
            return Vec::new();
        }

        self.re
            .find_iter(text)
            .map(|m| KeyMatch {
                code: m.as_str().to_string(),
                context: build_context(text, m.start(), m.end()),
            })
            .collect()
    }
}

impl Default for KeyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PATTERN).expect("default key pattern must compile")
    }
}

/// Window `text` to CONTEXT_RADIUS characters either side of the match,
/// collapse whitespace runs, and truncate to CONTEXT_MAX + `...`.
fn build_context(text: &str, start: usize, end: usize) -> String {
    let w_start = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let w_end = text[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let collapsed = text[w_start..w_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() > CONTEXT_MAX {
        let truncated: String = collapsed.chars().take(CONTEXT_MAX).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}
