//! Normalised equipment token sets.
//!
//! Courses declare required equipment and classrooms declare installed
//! equipment as small sets of free-form tokens ("projector", "smart-whiteboard").
//! Tokens are lower-cased and whitespace-trimmed on construction, and
//! containment uses a bidirectional substring match: a required token is
//! satisfied when it contains, or is contained in, an installed token. This
//! keeps compound tokens ("smart-whiteboard") compatible with simple ones
//! ("whiteboard") in either direction, and existing data sets rely on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of normalised equipment tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSet(BTreeSet<String>);

impl EquipmentSet {
    /// Build a set from raw tokens, normalising each to lower-case trimmed
    /// form and dropping empties.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalised = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self(normalised)
    }

    /// Parse a comma-separated equipment string ("Projector, Smart-Whiteboard").
    ///
    /// Entity sources commonly store equipment as one CSV column; the split
    /// tokens go through the same normalisation as [`EquipmentSet::new`].
    pub fn parse_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether this (installed) set satisfies every token in `required`.
    ///
    /// Each required token must match at least one installed token under the
    /// bidirectional substring rule. An empty requirement is always covered.
    pub fn covers(&self, required: &EquipmentSet) -> bool {
        required
            .0
            .iter()
            .all(|req| self.0.iter().any(|have| tokens_match(req, have)))
    }
}

/// Bidirectional substring match between two normalised tokens.
fn tokens_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

impl<const N: usize> From<[&str; N]> for EquipmentSet {
    fn from(tokens: [&str; N]) -> Self {
        Self::new(tokens)
    }
}
