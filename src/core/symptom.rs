use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::types::SymptomId;

/// A symptom in the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    /// Unique identifier
    pub id: SymptomId,

    /// Human-readable name, used for search
    pub name: String,

    #[serde(default)]
    pub description: String,
}

impl Symptom {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SymptomId::new(id),
            name: name.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Symptoms picked during a diagnosis session.
///
/// Keeps insertion order for display and rejects duplicate ids. Only the owner of
/// the selection mutates it; the matcher reads it through a shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedSymptoms {
    order: Vec<SymptomId>,
    members: HashSet<SymptomId>,
}

impl SelectedSymptoms {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symptom id. Returns false if it was already selected.
    pub fn insert(&mut self, id: impl Into<SymptomId>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Remove a symptom id. Returns false if it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|s| s.as_str() != id);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SymptomId> {
        self.order.iter()
    }
}

impl<S: Into<SymptomId>> FromIterator<S> for SelectedSymptoms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selected = Self::new();
        for id in iter {
            selected.insert(id);
        }
        selected
    }
}
