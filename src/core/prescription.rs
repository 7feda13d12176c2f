use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::diagnosis::Diagnosis;
use crate::core::doctor::DoctorProfile;
use crate::core::formulary::{Drug, LabTest};
use crate::core::patient::Patient;

/// A prescription being authored from a diagnosis session.
///
/// Holds copies of the patient and diagnosis, not references into the catalog or
/// the session, so it can outlive both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionDraft {
    pub patient: Patient,
    pub diagnosis: Diagnosis,
    #[serde(default)]
    pub drugs: Vec<Drug>,
    #[serde(default)]
    pub lab_tests: Vec<LabTest>,
    #[serde(default)]
    pub notes: String,
    pub doctor: DoctorProfile,
    pub created_at: DateTime<Utc>,
}

impl PrescriptionDraft {
    pub fn new(patient: Patient, diagnosis: Diagnosis, doctor: impl Into<DoctorProfile>) -> Self {
        Self {
            patient,
            diagnosis,
            drugs: Vec::new(),
            lab_tests: Vec::new(),
            notes: String::new(),
            doctor: doctor.into(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_drugs(mut self, drugs: impl IntoIterator<Item = Drug>) -> Self {
        for drug in drugs {
            self.add_drug(drug);
        }
        self
    }

    #[must_use]
    pub fn with_lab_tests(mut self, tests: impl IntoIterator<Item = LabTest>) -> Self {
        for test in tests {
            self.add_lab_test(test);
        }
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Add a drug unless one with the same id is already listed
    pub fn add_drug(&mut self, drug: Drug) -> bool {
        if self.drugs.iter().any(|d| d.id == drug.id) {
            return false;
        }
        self.drugs.push(drug);
        true
    }

    pub fn remove_drug(&mut self, id: &str) -> bool {
        let before = self.drugs.len();
        self.drugs.retain(|d| d.id != id);
        self.drugs.len() != before
    }

    /// Add a lab test unless one with the same id is already listed
    pub fn add_lab_test(&mut self, test: LabTest) -> bool {
        if self.lab_tests.iter().any(|t| t.id == test.id) {
            return false;
        }
        self.lab_tests.push(test);
        true
    }

    pub fn remove_lab_test(&mut self, id: &str) -> bool {
        let before = self.lab_tests.len();
        self.lab_tests.retain(|t| t.id != id);
        self.lab_tests.len() != before
    }

    /// Plain-text rendering suitable for printing or saving
    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for PrescriptionDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doctor = &self.doctor;
        if !doctor.clinic_name.is_empty() || !doctor.clinic_address.is_empty() {
            for line in [&doctor.clinic_name, &doctor.clinic_address] {
                if !line.is_empty() {
                    writeln!(f, "{line}")?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "Dr. {}", doctor.name)?;
        for line in [&doctor.degree, &doctor.specialization] {
            if !line.is_empty() {
                writeln!(f, "{line}")?;
            }
        }
        if !doctor.registration_number.is_empty() {
            writeln!(f, "Registration: {}", doctor.registration_number)?;
        }
        writeln!(f)?;
        writeln!(f, "Date: {}", self.created_at.format("%Y-%m-%d"))?;
        writeln!(f)?;

        writeln!(f, "Patient: {}", self.patient.name)?;
        if let Some(age) = self.patient.age {
            writeln!(f, "Age: {age} years")?;
        }
        if let Some(gender) = self.patient.gender {
            writeln!(f, "Gender: {gender}")?;
        }
        writeln!(f)?;

        if self.diagnosis.is_manual() {
            writeln!(f, "Diagnosis: {}", self.diagnosis.name)?;
        } else {
            writeln!(
                f,
                "Diagnosis: {} ({})",
                self.diagnosis.name, self.diagnosis.code
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Medications:")?;
        for (i, drug) in self.drugs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}. {} ({})", i + 1, drug.name, drug.generic_name)?;
            writeln!(f, "   Dosage: {}", drug.dosage)?;
            writeln!(f, "   Frequency: {}", drug.frequency)?;
            writeln!(f, "   Duration: {}", drug.duration)?;
            writeln!(f, "   Instructions: {}", drug.instructions)?;
        }
        writeln!(f)?;

        writeln!(f, "Lab Tests:")?;
        for (i, test) in self.lab_tests.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, test.name)?;
        }

        if !self.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Additional Notes:")?;
            writeln!(f, "{}", self.notes)?;
        }

        Ok(())
    }
}
