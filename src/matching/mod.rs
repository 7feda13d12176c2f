//! Differential diagnosis matching and the session that drives it.
//!
//! - [`DifferentialMatcher`]: ranks catalog diagnoses against selected symptoms
//! - [`MatchScore`]: match count, ratio and display band for one candidate
//! - [`SelectionSession`]: selected symptoms, chosen diagnosis, recompute-on-change
//!
//! ## Matching Algorithm
//!
//! 1. An empty selection has no candidates.
//! 2. A diagnosis is a candidate iff it lists at least one selected symptom.
//! 3. `match_count` is the size of that overlap; `match_ratio` divides it by the
//!    number of symptoms the diagnosis lists, so broad diagnoses need more
//!    overlap to reach the same ratio.
//! 4. Candidates are sorted by `match_count`, descending. Ties keep catalog order
//!    unless [`TieBreak::MatchRatio`] is configured.
//!
//! The matcher re-scans the catalog on every call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clinic_dx::{ClinicalCatalog, DifferentialMatcher};
//! use clinic_dx::core::SelectedSymptoms;
//!
//! let catalog = ClinicalCatalog::load_embedded().unwrap();
//! let matcher = DifferentialMatcher::new(&catalog);
//!
//! let selected: SelectedSymptoms = ["fever", "cough"].into_iter().collect();
//! for m in matcher.find_matches(&selected) {
//!     println!("{} ({}): {}/{} symptoms, {}%",
//!         m.diagnosis.name,
//!         m.diagnosis.code,
//!         m.score.match_count,
//!         m.score.total_symptoms,
//!         m.score.percentage(),
//!     );
//! }
//! ```

pub mod engine;
pub mod scoring;
pub mod session;

pub use engine::{DifferentialMatcher, MatchResult, MatchingConfig, TieBreak};
pub use scoring::MatchScore;
pub use session::{SelectionSession, SessionError, SessionObserver, TracingObserver};
