use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::types::{DiagnosisId, SymptomId};

/// Id used for free-text diagnoses entered without the catalog
pub const MANUAL_DIAGNOSIS_ID: &str = "manual";

/// Classification code used for free-text diagnoses
pub const MANUAL_DIAGNOSIS_CODE: &str = "MANUAL";

/// A diagnosis in the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Unique identifier
    pub id: DiagnosisId,

    /// External classification code (ICD-10 style, e.g. "J06.9")
    pub code: String,

    /// Human-readable display name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Symptom ids characteristic of this diagnosis, in declaration order
    pub symptoms: Vec<SymptomId>,

    // === Pre-computed for fast matching (populated on load) ===
    /// Set view of `symptoms`
    #[serde(skip)]
    pub symptom_set: HashSet<SymptomId>,
}

impl Diagnosis {
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DiagnosisId::new(id),
            code: code.into(),
            name: name.into(),
            description: String::new(),
            symptoms: Vec::new(),
            symptom_set: HashSet::new(),
        }
    }

    /// A free-text diagnosis that does not come from the catalog
    pub fn manual(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            "Clinical Diagnosis".to_string()
        } else {
            name
        };
        Self::new(MANUAL_DIAGNOSIS_ID, MANUAL_DIAGNOSIS_CODE, name)
            .with_description("Manually entered diagnosis")
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SymptomId>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self.rebuild_indexes();
        self
    }

    /// Rebuild the symptom set after modifying symptoms.
    ///
    /// Repeated ids are dropped from `symptoms` so the list and the set always
    /// have the same size.
    pub fn rebuild_indexes(&mut self) {
        self.symptom_set.clear();
        let set = &mut self.symptom_set;
        self.symptoms.retain(|id| set.insert(id.clone()));
    }

    /// Number of distinct characteristic symptoms
    #[must_use]
    pub fn symptom_count(&self) -> usize {
        self.symptom_set.len()
    }

    #[must_use]
    pub fn has_symptom(&self, id: &str) -> bool {
        self.symptom_set.contains(id)
    }

    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.id.as_str() == MANUAL_DIAGNOSIS_ID
    }
}
