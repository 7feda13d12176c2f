use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::integrity::{find_dangling_references, DanglingReference, IntegrityMode};
use crate::catalog::search::SymptomSearch;
use crate::core::diagnosis::Diagnosis;
use crate::core::formulary::{Drug, DrugSuggestionRule, LabTest};
use crate::core::symptom::{SelectedSymptoms, Symptom};
use crate::core::types::{DiagnosisId, SymptomId};
use crate::utils::validation::{compute_fingerprint, validate_identifier, ValidationError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate {kind} id '{id}' in catalog")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Invalid {kind} id in catalog: {source}")]
    InvalidId {
        kind: &'static str,
        source: ValidationError,
    },

    #[error("Catalog integrity check failed: {0}")]
    DanglingSymptom(DanglingReference),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub symptoms: Vec<Symptom>,
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub drugs: Vec<Drug>,
    #[serde(default)]
    pub lab_tests: Vec<LabTest>,
    #[serde(default)]
    pub drug_suggestions: Vec<DrugSuggestionRule>,
}

/// The clinical reference catalog with lookup indexes.
///
/// Read-only once loaded; every accessor takes `&self`.
#[derive(Debug, Default)]
pub struct ClinicalCatalog {
    symptoms: Vec<Symptom>,
    diagnoses: Vec<Diagnosis>,
    drugs: Vec<Drug>,
    lab_tests: Vec<LabTest>,
    drug_suggestions: Vec<DrugSuggestionRule>,

    /// Index: symptom ID -> index in symptoms vec
    symptom_index: HashMap<SymptomId, usize>,

    /// Index: diagnosis ID -> index in diagnoses vec
    diagnosis_index: HashMap<DiagnosisId, usize>,

    /// Index: drug ID -> index in drugs vec
    drug_index: HashMap<String, usize>,

    /// Index: lab test ID -> index in lab tests vec
    lab_test_index: HashMap<String, usize>,
}

/// Catalog ids must pass the same check as ids given on the command line
fn check_id(kind: &'static str, id: &str) -> Result<(), CatalogError> {
    validate_identifier(id)
        .map(|_| ())
        .map_err(|source| CatalogError::InvalidId { kind, source })
}

impl ClinicalCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the embedded default catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON fails to parse. The build script
    /// validates it, so this only fails if the two drift apart.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Embedded at compile time, validated by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/clinical_reference.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::load_from_file_with_mode(path, IntegrityMode::default())
    }

    /// Load catalog from a JSON file with an explicit integrity mode
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the integrity
    /// check fails in strict mode.
    pub fn load_from_file_with_mode(path: &Path, mode: IntegrityMode) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loading catalog from {}", path.display());
        Self::from_json_with_mode(&content, mode)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or contains malformed or duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_with_mode(json, IntegrityMode::default())
    }

    /// Parse catalog from JSON string with an explicit integrity mode
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid, contains duplicate ids, or (in
    /// strict mode) a diagnosis references an unknown symptom.
    pub fn from_json_with_mode(json: &str, mode: IntegrityMode) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION, data.version
            );
        }

        let mut catalog = Self::new();
        for symptom in data.symptoms {
            catalog.add_symptom(symptom)?;
        }
        for diagnosis in data.diagnoses {
            catalog.add_diagnosis(diagnosis)?;
        }
        for drug in data.drugs {
            catalog.add_drug(drug)?;
        }
        for test in data.lab_tests {
            catalog.add_lab_test(test)?;
        }
        for rule in data.drug_suggestions {
            catalog.add_drug_suggestion(rule);
        }

        catalog.check_integrity(mode)?;

        debug!(
            "Loaded catalog: {} symptoms, {} diagnoses, {} drugs, {} lab tests",
            catalog.symptoms.len(),
            catalog.diagnoses.len(),
            catalog.drugs.len(),
            catalog.lab_tests.len()
        );

        Ok(catalog)
    }

    fn check_integrity(&self, mode: IntegrityMode) -> Result<(), CatalogError> {
        if mode == IntegrityMode::Silent {
            return Ok(());
        }

        let dangling = self.integrity_report();
        match mode {
            IntegrityMode::Strict => match dangling.into_iter().next() {
                Some(first) => Err(CatalogError::DanglingSymptom(first)),
                None => Ok(()),
            },
            IntegrityMode::Warn => {
                for reference in &dangling {
                    warn!("Catalog integrity: {reference}");
                }
                Ok(())
            }
            IntegrityMode::Silent => Ok(()),
        }
    }

    /// Add a symptom to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` if an id could not be typed on the
    /// command line, or `CatalogError::DuplicateId` if it is already present.
    pub fn add_symptom(&mut self, symptom: Symptom) -> Result<(), CatalogError> {
        check_id("symptom", symptom.id.as_str())?;
        if self.symptom_index.contains_key(&symptom.id) {
            return Err(CatalogError::DuplicateId {
                kind: "symptom",
                id: symptom.id.0,
            });
        }
        self.symptom_index
            .insert(symptom.id.clone(), self.symptoms.len());
        self.symptoms.push(symptom);
        Ok(())
    }

    /// Add a diagnosis to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` if an id could not be typed on the
    /// command line, or `CatalogError::DuplicateId` if it is already present.
    pub fn add_diagnosis(&mut self, mut diagnosis: Diagnosis) -> Result<(), CatalogError> {
        check_id("diagnosis", diagnosis.id.as_str())?;
        for symptom in &diagnosis.symptoms {
            check_id("symptom", symptom.as_str())?;
        }
        if self.diagnosis_index.contains_key(&diagnosis.id) {
            return Err(CatalogError::DuplicateId {
                kind: "diagnosis",
                id: diagnosis.id.0,
            });
        }
        diagnosis.rebuild_indexes();
        self.diagnosis_index
            .insert(diagnosis.id.clone(), self.diagnoses.len());
        self.diagnoses.push(diagnosis);
        Ok(())
    }

    /// Add a drug to the formulary
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` if an id could not be typed on the
    /// command line, or `CatalogError::DuplicateId` if it is already present.
    pub fn add_drug(&mut self, drug: Drug) -> Result<(), CatalogError> {
        check_id("drug", &drug.id)?;
        if self.drug_index.contains_key(&drug.id) {
            return Err(CatalogError::DuplicateId {
                kind: "drug",
                id: drug.id,
            });
        }
        self.drug_index.insert(drug.id.clone(), self.drugs.len());
        self.drugs.push(drug);
        Ok(())
    }

    /// Add a lab test to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` if an id could not be typed on the
    /// command line, or `CatalogError::DuplicateId` if it is already present.
    pub fn add_lab_test(&mut self, test: LabTest) -> Result<(), CatalogError> {
        check_id("lab test", &test.id)?;
        if self.lab_test_index.contains_key(&test.id) {
            return Err(CatalogError::DuplicateId {
                kind: "lab test",
                id: test.id,
            });
        }
        self.lab_test_index
            .insert(test.id.clone(), self.lab_tests.len());
        self.lab_tests.push(test);
        Ok(())
    }

    /// Add a drug suggestion rule. Rules are tried in insertion order.
    pub fn add_drug_suggestion(&mut self, rule: DrugSuggestionRule) {
        self.drug_suggestions.push(rule);
    }

    /// Get a symptom by ID. Unknown ids are not an error.
    #[must_use]
    pub fn find_symptom(&self, id: &str) -> Option<&Symptom> {
        self.symptom_index.get(id).map(|&idx| &self.symptoms[idx])
    }

    /// Display name for a symptom id, falling back to the raw id when unknown
    #[must_use]
    pub fn symptom_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.find_symptom(id).map_or(id, |s| s.name.as_str())
    }

    /// Search symptom names, skipping anything already selected
    #[must_use]
    pub fn search_symptoms<'a>(
        &'a self,
        query: &str,
        already_selected: &'a SelectedSymptoms,
    ) -> SymptomSearch<'a> {
        SymptomSearch::new(&self.symptoms, query.to_lowercase(), already_selected)
    }

    /// All symptoms, catalog order
    #[must_use]
    pub fn all_symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    /// All diagnoses, catalog order
    #[must_use]
    pub fn all_diagnoses(&self) -> &[Diagnosis] {
        &self.diagnoses
    }

    /// Get a diagnosis by ID
    #[must_use]
    pub fn get_diagnosis(&self, id: &str) -> Option<&Diagnosis> {
        self.diagnosis_index.get(id).map(|&idx| &self.diagnoses[idx])
    }

    /// All drugs, formulary order
    #[must_use]
    pub fn all_drugs(&self) -> &[Drug] {
        &self.drugs
    }

    #[must_use]
    pub fn find_drug(&self, id: &str) -> Option<&Drug> {
        self.drug_index.get(id).map(|&idx| &self.drugs[idx])
    }

    /// Search drugs by name or generic name (case-insensitive)
    pub fn search_drugs(&self, query: &str) -> impl Iterator<Item = &Drug> + '_ {
        let needle = query.to_lowercase();
        self.drugs.iter().filter(move |d| d.matches_query(&needle))
    }

    /// All lab tests, catalog order
    #[must_use]
    pub fn all_lab_tests(&self) -> &[LabTest] {
        &self.lab_tests
    }

    #[must_use]
    pub fn find_lab_test(&self, id: &str) -> Option<&LabTest> {
        self.lab_test_index.get(id).map(|&idx| &self.lab_tests[idx])
    }

    /// Search lab tests by name or category (case-insensitive)
    pub fn search_lab_tests(&self, query: &str) -> impl Iterator<Item = &LabTest> + '_ {
        let needle = query.to_lowercase();
        self.lab_tests
            .iter()
            .filter(move |t| t.matches_query(&needle))
    }

    /// Drugs worth pre-filling for a diagnosis.
    ///
    /// Uses the first rule whose keywords match the diagnosis name. Returns an
    /// empty list when no rule applies.
    #[must_use]
    pub fn suggest_drugs(&self, diagnosis: &Diagnosis) -> Vec<&Drug> {
        let Some(rule) = self
            .drug_suggestions
            .iter()
            .find(|rule| rule.applies_to(&diagnosis.name))
        else {
            return Vec::new();
        };

        self.drugs
            .iter()
            .filter(|drug| rule.covers(drug))
            .take(rule.limit)
            .collect()
    }

    /// Every diagnosis symptom reference that has no symptom record
    #[must_use]
    pub fn integrity_report(&self) -> Vec<DanglingReference> {
        find_dangling_references(&self.diagnoses, &self.symptom_index)
    }

    /// Digest identifying which diagnoses link to which symptoms
    #[must_use]
    pub fn fingerprint(&self) -> String {
        compute_fingerprint(self.diagnoses.iter().flat_map(|d| {
            d.symptoms
                .iter()
                .map(move |s| (d.id.as_str(), s.as_str()))
        }))
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            symptoms: self.symptoms.clone(),
            diagnoses: self.diagnoses.clone(),
            drugs: self.drugs.clone(),
            lab_tests: self.lab_tests.clone(),
            drug_suggestions: self.drug_suggestions.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of diagnoses in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnoses.len()
    }

    /// Check if catalog has no diagnoses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DANGLING_CATALOG: &str = r#"{
        "version": "1.0.0",
        "created_at": "2026-01-01T00:00:00Z",
        "symptoms": [{ "id": "fever", "name": "Fever" }],
        "diagnoses": [
            { "id": "d1", "code": "X01", "name": "One", "symptoms": ["fever", "aura"] }
        ]
    }"#;

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(!catalog.all_symptoms().is_empty());
        assert!(!catalog.all_drugs().is_empty());
        assert!(!catalog.all_lab_tests().is_empty());
    }

    #[test]
    fn test_embedded_catalog_is_referentially_clean() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        assert!(catalog.integrity_report().is_empty());
    }

    #[test]
    fn test_find_symptom() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let fever = catalog.find_symptom("fever").unwrap();
        assert_eq!(fever.name, "Fever");
        assert!(catalog.find_symptom("nonexistent").is_none());
    }

    #[test]
    fn test_symptom_label_falls_back_to_id() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        assert_eq!(catalog.symptom_label("chest-pain"), "Chest Pain");
        assert_eq!(catalog.symptom_label("made-up"), "made-up");
    }

    #[test]
    fn test_get_diagnosis() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let urti = catalog.get_diagnosis("upper-respiratory").unwrap();
        assert_eq!(urti.code, "J06.9");
        assert_eq!(urti.symptom_count(), 5);
        assert!(catalog.get_diagnosis("nonexistent").is_none());
    }

    #[test]
    fn test_all_diagnoses_in_catalog_order() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let ids: Vec<&str> = catalog
            .all_diagnoses()
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "hypertension",
                "diabetes-t2",
                "upper-respiratory",
                "gastritis",
                "migraine",
                "anxiety"
            ]
        );
    }

    #[test]
    fn test_search_symptoms_excludes_selected() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let selected: SelectedSymptoms = ["headache"].into_iter().collect();
        let found: Vec<&str> = catalog
            .search_symptoms("HEAD", &selected)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(found, vec!["severe-headache"]);
    }

    #[test]
    fn test_search_drugs_and_lab_tests() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let drugs: Vec<&str> = catalog
            .search_drugs("acetaminophen")
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(drugs, vec!["paracetamol"]);

        let tests: Vec<&str> = catalog
            .search_lab_tests("biochem")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(tests, vec!["fbs", "hba1c", "lipid-profile"]);
    }

    #[test]
    fn test_suggest_drugs() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();

        let urti = catalog.get_diagnosis("upper-respiratory").unwrap();
        let ids: Vec<&str> = catalog
            .suggest_drugs(urti)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["paracetamol", "amoxicillin"]);

        let gastritis = catalog.get_diagnosis("gastritis").unwrap();
        assert_eq!(catalog.suggest_drugs(gastritis).len(), 1);

        let migraine = catalog.get_diagnosis("migraine").unwrap();
        assert!(catalog.suggest_drugs(migraine).is_empty());
    }

    #[test]
    fn test_dangling_reference_warn_mode_loads() {
        let catalog = ClinicalCatalog::from_json(DANGLING_CATALOG).unwrap();
        let report = catalog.integrity_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].symptom.as_str(), "aura");
    }

    #[test]
    fn test_dangling_reference_strict_mode_fails() {
        let result = ClinicalCatalog::from_json_with_mode(DANGLING_CATALOG, IntegrityMode::Strict);
        assert!(matches!(result, Err(CatalogError::DanglingSymptom(_))));
    }

    #[test]
    fn test_dangling_reference_silent_mode_loads() {
        let result = ClinicalCatalog::from_json_with_mode(DANGLING_CATALOG, IntegrityMode::Silent);
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_symptom_id_rejected() {
        let json = r#"{
            "version": "1.0.0",
            "created_at": "2026-01-01T00:00:00Z",
            "symptoms": [
                { "id": "fever", "name": "Fever" },
                { "id": "fever", "name": "Pyrexia" }
            ],
            "diagnoses": []
        }"#;
        let result = ClinicalCatalog::from_json(json);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateId { kind: "symptom", .. })
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            ClinicalCatalog::from_json("{ not json"),
            Err(CatalogError::ParseError(_))
        ));
    }

    #[test]
    fn test_to_json_round_trip_keeps_fingerprint() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"drug_suggestions\""));
        assert!(!json.contains("symptom_set"));

        let reloaded = ClinicalCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.fingerprint(), catalog.fingerprint());
        assert_eq!(reloaded.len(), catalog.len());
    }

    #[test]
    fn test_add_diagnosis() {
        let mut catalog = ClinicalCatalog::new();
        assert_eq!(catalog.len(), 0);

        catalog
            .add_diagnosis(Diagnosis::new("d1", "X01", "Test").with_symptoms(["fever"]))
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog
            .add_diagnosis(Diagnosis::new("d1", "X02", "Again"))
            .is_err());

        let retrieved = catalog.get_diagnosis("d1").unwrap();
        assert_eq!(retrieved.name, "Test");
    }

    #[test]
    fn test_ids_that_cannot_be_selected_are_rejected() {
        let json = r#"{
            "version": "1.0.0",
            "created_at": "2026-01-01T00:00:00Z",
            "symptoms": [
                { "id": "fever", "name": "Fever" },
                { "id": "chest pain", "name": "Chest Pain" }
            ],
            "diagnoses": []
        }"#;
        assert!(matches!(
            ClinicalCatalog::from_json(json),
            Err(CatalogError::InvalidId { kind: "symptom", .. })
        ));

        let mut catalog = ClinicalCatalog::new();
        assert!(matches!(
            catalog.add_diagnosis(Diagnosis::new("d1", "X01", "One").with_symptoms(["fièvre"])),
            Err(CatalogError::InvalidId { kind: "symptom", .. })
        ));
        assert!(matches!(
            catalog.add_symptom(Symptom::new("", "Blank")),
            Err(CatalogError::InvalidId {
                source: ValidationError::EmptyIdentifier,
                ..
            })
        ));
        assert!(catalog.is_empty());
        assert!(catalog.all_symptoms().is_empty());
    }

    #[test]
    fn test_add_drug_suggestion() {
        let mut catalog = ClinicalCatalog::new();
        for (id, category) in [("ors", "Rehydration"), ("zinc", "Supplement"), ("ors-plus", "Rehydration")] {
            catalog
                .add_drug(Drug {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    generic_name: String::new(),
                    dosage: "1 sachet".to_string(),
                    frequency: String::new(),
                    duration: String::new(),
                    instructions: String::new(),
                    category: category.to_string(),
                })
                .unwrap();
        }
        let gastro = Diagnosis::new("gastroenteritis", "A09", "Acute Gastroenteritis");
        assert!(catalog.suggest_drugs(&gastro).is_empty());

        catalog.add_drug_suggestion(DrugSuggestionRule {
            keywords: vec!["gastro".to_string()],
            categories: vec!["Rehydration".to_string()],
            limit: 1,
        });
        catalog.add_drug_suggestion(DrugSuggestionRule {
            keywords: vec!["acute".to_string()],
            categories: vec!["Supplement".to_string()],
            limit: 3,
        });

        // First matching rule wins, capped at its limit
        let ids: Vec<&str> = catalog
            .suggest_drugs(&gastro)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ors"]);
    }
}
