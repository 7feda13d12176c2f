use thiserror::Error;
use tracing::debug;

use crate::catalog::store::ClinicalCatalog;
use crate::core::diagnosis::Diagnosis;
use crate::core::doctor::DoctorProfile;
use crate::core::patient::Patient;
use crate::core::prescription::PrescriptionDraft;
use crate::core::symptom::SelectedSymptoms;
use crate::core::types::{DiagnosisId, SymptomId};
use crate::matching::engine::{DifferentialMatcher, MatchResult, MatchingConfig};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No patient selected")]
    NoPatient,

    #[error("No diagnosis chosen")]
    NoDiagnosis,

    #[error("Diagnosis '{0}' is not among the current candidates")]
    NotACandidate(String),
}

/// Receives fresh results after every recompute
pub trait SessionObserver {
    fn on_recompute(&mut self, selected: &SelectedSymptoms, results: &[MatchResult]);
}

/// Observer that logs each recompute at debug level
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_recompute(&mut self, selected: &SelectedSymptoms, results: &[MatchResult]) {
        debug!(
            "Recomputed: {} symptoms selected, {} candidates",
            selected.len(),
            results.len()
        );
    }
}

/// State of one diagnosis interaction: patient, selected symptoms, chosen diagnosis.
///
/// Every mutation of the selection runs the matcher again from scratch and
/// notifies observers. The chosen diagnosis is dropped whenever it stops being a
/// candidate.
pub struct SelectionSession<'a> {
    matcher: DifferentialMatcher<'a>,
    patient: Option<Patient>,
    selected: SelectedSymptoms,
    results: Vec<MatchResult>,
    chosen: Option<DiagnosisId>,
    observers: Vec<Box<dyn SessionObserver + 'a>>,
}

impl<'a> SelectionSession<'a> {
    #[must_use]
    pub fn new(catalog: &'a ClinicalCatalog) -> Self {
        Self::with_config(catalog, MatchingConfig::default())
    }

    #[must_use]
    pub fn with_config(catalog: &'a ClinicalCatalog, config: MatchingConfig) -> Self {
        Self {
            matcher: DifferentialMatcher::with_config(catalog, config),
            patient: None,
            selected: SelectedSymptoms::new(),
            results: Vec::new(),
            chosen: None,
            observers: Vec::new(),
        }
    }

    /// Register an observer for recompute notifications
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver + 'a>) {
        self.observers.push(observer);
    }

    pub fn select_patient(&mut self, patient: Patient) {
        self.patient = Some(patient);
    }

    #[must_use]
    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> &SelectedSymptoms {
        &self.selected
    }

    /// Candidates for the current selection, best first
    #[must_use]
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Add a symptom and recompute. Returns false if it was already selected.
    pub fn add(&mut self, id: impl Into<SymptomId>) -> bool {
        let id = id.into();
        if self.matcher.catalog().find_symptom(id.as_str()).is_none() {
            debug!("Adding symptom '{id}' not present in catalog");
        }
        let changed = self.selected.insert(id);
        self.recompute();
        changed
    }

    /// Remove a symptom and recompute. Returns false if it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let changed = self.selected.remove(id);
        self.recompute();
        changed
    }

    /// Drop every selected symptom and recompute
    pub fn clear(&mut self) {
        self.selected.clear();
        self.recompute();
    }

    /// Run the matcher against the current selection and notify observers
    pub fn recompute(&mut self) {
        self.results = self.matcher.find_matches(&self.selected);

        if let Some(chosen) = &self.chosen {
            let still_candidate = self.results.iter().any(|r| &r.diagnosis.id == chosen);
            if !still_candidate {
                debug!("Clearing chosen diagnosis '{chosen}': no longer a candidate");
                self.chosen = None;
            }
        }

        for observer in &mut self.observers {
            observer.on_recompute(&self.selected, &self.results);
        }
    }

    /// Choose one of the current candidates
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotACandidate` if `id` is not in the current results.
    pub fn choose(&mut self, id: &str) -> Result<&Diagnosis, SessionError> {
        let Some(index) = self
            .results
            .iter()
            .position(|r| r.diagnosis.id.as_str() == id)
        else {
            return Err(SessionError::NotACandidate(id.to_string()));
        };
        self.chosen = Some(self.results[index].diagnosis.id.clone());
        Ok(&self.results[index].diagnosis)
    }

    /// The chosen diagnosis, if it is still a candidate
    #[must_use]
    pub fn chosen_diagnosis(&self) -> Option<&Diagnosis> {
        let chosen = self.chosen.as_ref()?;
        self.results
            .iter()
            .map(|r| &r.diagnosis)
            .find(|d| &d.id == chosen)
    }

    /// Copy the chosen diagnosis and patient into a new prescription draft,
    /// pre-filled with suggested drugs.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPatient` or `SessionError::NoDiagnosis` when
    /// either is missing.
    pub fn to_prescription_draft(
        &self,
        doctor: impl Into<DoctorProfile>,
    ) -> Result<PrescriptionDraft, SessionError> {
        let patient = self.patient.clone().ok_or(SessionError::NoPatient)?;
        let diagnosis = self.chosen_diagnosis().ok_or(SessionError::NoDiagnosis)?;

        let suggested = self
            .matcher
            .catalog()
            .suggest_drugs(diagnosis)
            .into_iter()
            .cloned();

        Ok(PrescriptionDraft::new(patient, diagnosis.clone(), doctor).with_drugs(suggested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small_catalog() -> ClinicalCatalog {
        let mut catalog = ClinicalCatalog::new();
        catalog
            .add_diagnosis(Diagnosis::new("d1", "X01", "One").with_symptoms(["fever", "cough"]))
            .unwrap();
        catalog
            .add_diagnosis(Diagnosis::new("d2", "X02", "Two").with_symptoms(["fever"]))
            .unwrap();
        catalog
    }

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl SessionObserver for Recorder {
        fn on_recompute(&mut self, _selected: &SelectedSymptoms, results: &[MatchResult]) {
            self.0.borrow_mut().push(results.len());
        }
    }

    #[test]
    fn test_every_mutation_recomputes() {
        let catalog = small_catalog();
        let counts = Rc::new(RefCell::new(Vec::new()));
        let mut session = SelectionSession::new(&catalog);
        session.subscribe(Box::new(Recorder(Rc::clone(&counts))));

        assert!(session.add("fever"));
        assert!(!session.add("fever"));
        assert!(session.add("cough"));
        assert!(session.remove("fever"));
        assert!(!session.remove("fever"));

        assert_eq!(*counts.borrow(), vec![2, 2, 2, 1, 1]);
    }

    #[test]
    fn test_remove_reorders_remaining_candidates() {
        let mut catalog = ClinicalCatalog::new();
        catalog
            .add_diagnosis(Diagnosis::new("d1", "X01", "One").with_symptoms(["a", "b"]))
            .unwrap();
        catalog
            .add_diagnosis(Diagnosis::new("d2", "X02", "Two").with_symptoms(["c", "d", "e"]))
            .unwrap();
        let mut session = SelectionSession::new(&catalog);

        for id in ["a", "b", "c", "d", "e"] {
            session.add(id);
        }
        let order: Vec<&str> = session.results().iter().map(|r| r.diagnosis.id.as_str()).collect();
        assert_eq!(order, vec!["d2", "d1"]);

        session.remove("d");
        session.remove("e");
        let order: Vec<&str> = session.results().iter().map(|r| r.diagnosis.id.as_str()).collect();
        assert_eq!(order, vec!["d1", "d2"]);
        assert_eq!(session.results()[0].score.match_count, 2);
        assert_eq!(session.results()[1].score.match_count, 1);
    }

    #[test]
    fn test_removing_last_symptom_clears_choice() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);

        session.add("fever");
        assert_eq!(session.results().len(), 2);
        session.choose("d2").unwrap();
        assert_eq!(session.chosen_diagnosis().unwrap().id.as_str(), "d2");

        session.remove("fever");
        assert!(session.results().is_empty());
        assert!(session.chosen_diagnosis().is_none());
    }

    #[test]
    fn test_choice_dropped_when_no_longer_candidate() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);

        session.add("cough");
        session.add("fever");
        session.choose("d2").unwrap();

        // d2 only lists fever
        session.remove("fever");
        assert_eq!(session.results().len(), 1);
        assert!(session.chosen_diagnosis().is_none());
    }

    #[test]
    fn test_choice_survives_unrelated_removal() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);

        session.add("fever");
        session.add("cough");
        session.choose("d2").unwrap();
        session.remove("cough");
        assert_eq!(session.chosen_diagnosis().unwrap().id.as_str(), "d2");
    }

    #[test]
    fn test_choose_rejects_non_candidates() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);

        assert_eq!(
            session.choose("d1").unwrap_err(),
            SessionError::NotACandidate("d1".to_string())
        );
        session.add("fever");
        assert!(session.choose("missing").is_err());
        assert!(session.choose("d1").is_ok());
    }

    #[test]
    fn test_clear() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);
        session.add("fever");
        session.choose("d1").unwrap();
        session.clear();
        assert!(session.selected().is_empty());
        assert!(session.results().is_empty());
        assert!(session.chosen_diagnosis().is_none());
    }

    #[test]
    fn test_prescription_draft_requires_patient_and_diagnosis() {
        let catalog = small_catalog();
        let mut session = SelectionSession::new(&catalog);
        session.add("fever");
        session.choose("d1").unwrap();
        assert_eq!(
            session.to_prescription_draft("Doc").unwrap_err(),
            SessionError::NoPatient
        );

        let mut session = SelectionSession::new(&catalog);
        session.select_patient(Patient::new("1", "John Smith"));
        assert_eq!(
            session.to_prescription_draft("Doc").unwrap_err(),
            SessionError::NoDiagnosis
        );
    }

    #[test]
    fn test_prescription_draft_copies_choice_and_suggests_drugs() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let mut session = SelectionSession::new(&catalog);
        session.select_patient(Patient::new("1", "John Smith"));
        session.add("headache");
        session.add("dizziness");
        session.choose("hypertension").unwrap();

        let doctor = DoctorProfile::new("A. Physician").with_registration_number("REG123456");
        let draft = session.to_prescription_draft(doctor.clone()).unwrap();
        assert_eq!(draft.patient.name, "John Smith");
        assert_eq!(draft.diagnosis.code, "I10");
        assert_eq!(draft.doctor, doctor);
        let drug_ids: Vec<&str> = draft.drugs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(drug_ids, vec!["amlodipine"]);

        // The draft is a copy; later session changes do not touch it
        session.clear();
        assert_eq!(draft.diagnosis.id.as_str(), "hypertension");
    }
}
