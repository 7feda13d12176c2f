use serde::Serialize;
use std::collections::HashMap;

use crate::core::diagnosis::Diagnosis;
use crate::core::types::{DiagnosisId, SymptomId};

/// How to handle diagnoses that reference symptom ids missing from the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityMode {
    /// Log each dangling reference and keep loading
    #[default]
    Warn,
    /// Refuse to load a catalog with dangling references
    Strict,
    /// Keep loading without mentioning dangling references
    Silent,
}

/// A diagnosis symptom reference with no matching symptom record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub diagnosis: DiagnosisId,
    pub symptom: SymptomId,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "diagnosis '{}' references unknown symptom '{}'",
            self.diagnosis, self.symptom
        )
    }
}

/// Collect every dangling reference, in diagnosis then symptom declaration order
pub fn find_dangling_references(
    diagnoses: &[Diagnosis],
    symptom_index: &HashMap<SymptomId, usize>,
) -> Vec<DanglingReference> {
    diagnoses
        .iter()
        .flat_map(|diagnosis| {
            diagnosis
                .symptoms
                .iter()
                .filter(move |id| !symptom_index.contains_key(*id))
                .map(move |id| DanglingReference {
                    diagnosis: diagnosis.id.clone(),
                    symptom: id.clone(),
                })
        })
        .collect()
}
