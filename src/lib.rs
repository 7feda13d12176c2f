//! # clinic-dx
//!
//! A library for symptom-driven differential diagnosis over a clinical
//! reference catalog.
//!
//! A clinician records the symptoms a patient presents with. `clinic-dx`
//! ranks every catalog diagnosis that lists at least one of them, shows how
//! much of each diagnosis's symptom picture was observed, and carries the
//! chosen diagnosis into a prescription draft with suggested drugs.
//!
//! ## Features
//!
//! - **Overlap ranking**: Candidates sorted by number of shared symptoms
//! - **Match ratio**: Fraction of a diagnosis's own symptoms that were observed
//! - **Sessions**: Add/remove/clear symptoms with automatic recomputation
//! - **Referential integrity**: Dangling symptom references warned about or rejected
//! - **Prescription drafts**: Keyword-driven drug suggestions and plain-text rendering
//!
//! ## Example
//!
//! ```rust,no_run
//! use clinic_dx::{ClinicalCatalog, DifferentialMatcher, SelectedSymptoms};
//!
//! // Load the embedded clinical reference catalog
//! let catalog = ClinicalCatalog::load_embedded().unwrap();
//!
//! let selected: SelectedSymptoms = ["fever", "cough", "headache"].into_iter().collect();
//!
//! let matcher = DifferentialMatcher::new(&catalog);
//! for m in matcher.find_matches(&selected) {
//!     println!("{}: {}%", m.diagnosis.name, m.score.percentage());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog storage, indexing, search and integrity checks
//! - [`core`]: Symptoms, diagnoses, formulary, patients and prescription drafts
//! - [`matching`]: Differential matcher, scoring and the selection session
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::ClinicalCatalog;
pub use core::diagnosis::Diagnosis;
pub use core::doctor::DoctorProfile;
pub use core::patient::{Gender, Patient};
pub use core::prescription::PrescriptionDraft;
pub use core::symptom::{SelectedSymptoms, Symptom};
pub use core::types::*;
pub use matching::engine::{DifferentialMatcher, MatchResult, MatchingConfig, TieBreak};
pub use matching::session::SelectionSession;
