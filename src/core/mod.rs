//! Core data types for clinical reference data and diagnosis sessions.
//!
//! - [`Symptom`], [`SelectedSymptoms`]: reference symptoms and a session's selection
//! - [`Diagnosis`]: a diagnosis with its characteristic symptom set
//! - [`Drug`], [`LabTest`], [`DrugSuggestionRule`]: formulary and investigations
//! - [`Patient`], [`DoctorProfile`], [`PrescriptionDraft`]: what a finished session hands onward
//! - [`SymptomId`], [`DiagnosisId`], [`MatchStrength`]: identifiers and result bands
//!
//! Reference records are immutable once the catalog is loaded.

pub mod diagnosis;
pub mod doctor;
pub mod formulary;
pub mod patient;
pub mod prescription;
pub mod symptom;
pub mod types;

pub use diagnosis::Diagnosis;
pub use doctor::DoctorProfile;
pub use formulary::{Drug, DrugSuggestionRule, LabTest};
pub use patient::{Gender, Patient};
pub use prescription::PrescriptionDraft;
pub use symptom::{SelectedSymptoms, Symptom};
pub use types::{DiagnosisId, MatchStrength, SymptomId};
