//! Clinical reference catalog storage and lookup.
//!
//! The catalog holds the symptoms and diagnoses the differential matcher works
//! over, plus the formulary, lab tests and drug suggestion rules used when a
//! diagnosis is turned into a prescription. An embedded catalog is compiled into
//! the binary, but custom catalogs can also be loaded from JSON files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clinic_dx::ClinicalCatalog;
//! use clinic_dx::core::SelectedSymptoms;
//!
//! let catalog = ClinicalCatalog::load_embedded().unwrap();
//!
//! // Unknown ids fall back to the raw id for display
//! assert_eq!(catalog.symptom_label("fever"), "Fever");
//! assert_eq!(catalog.symptom_label("made-up"), "made-up");
//!
//! // Search names, skipping symptoms already picked
//! let selected: SelectedSymptoms = ["headache"].into_iter().collect();
//! for symptom in catalog.search_symptoms("head", &selected) {
//!     println!("{}", symptom.name);
//! }
//! ```
//!
//! ## Referential Integrity
//!
//! Diagnoses reference symptoms by id. Loading checks every reference according
//! to an [`IntegrityMode`]: warn and keep going (default), fail, or stay silent.

pub mod integrity;
pub mod search;
pub mod store;

pub use integrity::{DanglingReference, IntegrityMode};
pub use search::SymptomSearch;
pub use store::{CatalogError, ClinicalCatalog};
