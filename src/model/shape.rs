use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ModelError;

/// A state value a [`Model`](super::Model) can hold.
///
/// The shape names its fields with a small identifier type and describes
/// partial updates with a typed patch. Change detection is driven purely by
/// which fields a patch carries, never by comparing values.
pub trait Shape: Clone {
    type Field: Copy + Eq + Hash + fmt::Debug;
    type Patch: fmt::Debug;

    /// Fields present in `patch`.
    fn changed_fields(patch: &Self::Patch) -> WatchSet<Self::Field>;

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    fn apply(&mut self, patch: Self::Patch);

    /// Decode a dynamic update (a JSON object keyed by field name).
    fn parse_patch(value: Value) -> Result<Self::Patch, ModelError>;
}

/// Set of field identifiers, used both for a subscriber's declared interest
/// and for the fields touched by one update.
#[derive(Clone, PartialEq, Eq)]
pub struct WatchSet<F: Eq + Hash>(HashSet<F>);

impl<F: Copy + Eq + Hash> WatchSet<F> {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn insert(&mut self, field: F) {
        self.0.insert(field);
    }

    pub fn contains(&self, field: F) -> bool {
        self.0.contains(&field)
    }

    pub fn intersects(&self, other: &WatchSet<F>) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.0.iter().copied()
    }
}

impl<F: Copy + Eq + Hash> Default for WatchSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Copy + Eq + Hash> FromIterator<F> for WatchSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<F: Copy + Eq + Hash, const N: usize> From<[F; N]> for WatchSet<F> {
    fn from(fields: [F; N]) -> Self {
        fields.into_iter().collect()
    }
}

impl<F: Eq + Hash + fmt::Debug> fmt::Debug for WatchSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

/// Decode `value` into a patch, rejecting keys outside `known_fields`.
///
/// Unknown keys surface as [`ModelError::InvalidUpdate`] naming the first
/// offender; anything else serde refuses is [`ModelError::MalformedUpdate`].
pub fn parse_strict<P: DeserializeOwned>(
    value: Value,
    known_fields: &[&str],
) -> Result<P, ModelError> {
    if let Value::Object(map) = &value {
        if let Some(unknown) = map.keys().find(|key| !known_fields.contains(&key.as_str())) {
            return Err(ModelError::InvalidUpdate {
                field: unknown.clone(),
            });
        }
    }

    serde_json::from_value(value).map_err(ModelError::MalformedUpdate)
}
