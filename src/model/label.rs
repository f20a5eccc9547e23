//! Label — the one canonical form used for every name comparison.
//!
//! Node ids are derived from a label's key, and the merge engine compares
//! labels by key, so the two can never drift apart.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Canonical key for a display string: trimmed, whitespace runs collapsed
/// to a single `-`, lower-cased.
///
/// ```
/// use progression_graph::model::canonical_key;
///
/// assert_eq!(canonical_key("  Deep   Work "), "deep-work");
/// ```
pub fn canonical_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A human-facing name that compares by its canonical key.
///
/// The display form is whatever the first writer supplied. Equality,
/// ordering and hashing only look at the key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Label {
    display: String,
    key: String,
}

impl Label {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let key = canonical_key(&display);
        Self { display, key }
    }

    /// The string as originally written.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// The canonical key (`"Deep Work"` → `"deep-work"`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the label is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.key.is_empty()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Label {}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.display)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self { Label::new(v) }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self { Label::new(v) }
}

impl From<Label> for String {
    fn from(v: Label) -> Self { v.display }
}
