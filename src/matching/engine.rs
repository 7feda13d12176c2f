use serde::Serialize;
use tracing::debug;

use crate::catalog::store::ClinicalCatalog;
use crate::core::diagnosis::Diagnosis;
use crate::core::symptom::SelectedSymptoms;
use crate::core::types::SymptomId;
use crate::matching::scoring::{matching_symptoms, MatchScore};

/// A candidate diagnosis for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// The candidate diagnosis
    pub diagnosis: Diagnosis,

    /// Selected symptoms this diagnosis lists
    pub matching_symptoms: Vec<SymptomId>,

    /// Match score details
    pub score: MatchScore,
}

impl MatchResult {
    /// Score a diagnosis, or `None` when it shares no symptom with the selection
    #[must_use]
    pub fn evaluate(diagnosis: &Diagnosis, selected: &SelectedSymptoms) -> Option<Self> {
        let matching_symptoms = matching_symptoms(diagnosis, selected);
        if matching_symptoms.is_empty() {
            return None;
        }

        let score = MatchScore::from_counts(matching_symptoms.len(), diagnosis.symptom_count());
        Some(Self {
            diagnosis: diagnosis.clone(),
            matching_symptoms,
            score,
        })
    }
}

/// How to order candidates that share the same match count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep catalog declaration order
    #[default]
    CatalogOrder,
    /// Higher match ratio first, then catalog order
    MatchRatio,
}

/// Default minimum number of shared symptoms for a candidate
pub const DEFAULT_MIN_MATCH_COUNT: usize = 1;

/// Configuration for the matcher
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Ordering among candidates with equal match counts
    pub tie_break: TieBreak,
    /// Minimum shared symptoms for inclusion; values below 1 are treated as 1
    pub min_match_count: usize,
    /// Maximum number of candidates to return
    pub limit: Option<usize>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            min_match_count: DEFAULT_MIN_MATCH_COUNT,
            limit: None,
        }
    }
}

/// Ranks catalog diagnoses against a symptom selection.
///
/// Each call re-scans the whole catalog; nothing is carried between calls.
#[derive(Debug, Clone)]
pub struct DifferentialMatcher<'a> {
    catalog: &'a ClinicalCatalog,
    config: MatchingConfig,
}

impl<'a> DifferentialMatcher<'a> {
    /// Create a matcher with default configuration
    #[must_use]
    pub fn new(catalog: &'a ClinicalCatalog) -> Self {
        Self {
            catalog,
            config: MatchingConfig::default(),
        }
    }

    /// Create a matcher with custom configuration
    #[must_use]
    pub fn with_config(catalog: &'a ClinicalCatalog, config: MatchingConfig) -> Self {
        Self { catalog, config }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a ClinicalCatalog {
        self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Candidate diagnoses for a selection, best first.
    ///
    /// Empty when nothing is selected. A diagnosis is a candidate exactly when it
    /// shares at least one symptom with the selection. Candidates are ordered by
    /// match count, descending; ties follow the configured [`TieBreak`].
    #[must_use]
    pub fn find_matches(&self, selected: &SelectedSymptoms) -> Vec<MatchResult> {
        if selected.is_empty() {
            return Vec::new();
        }

        let min_match_count = self.config.min_match_count.max(1);

        let mut results: Vec<MatchResult> = self
            .catalog
            .all_diagnoses()
            .iter()
            .filter_map(|diagnosis| MatchResult::evaluate(diagnosis, selected))
            .filter(|r| r.score.match_count >= min_match_count)
            .collect();

        // Stable sort, so equal keys keep catalog order
        match self.config.tie_break {
            TieBreak::CatalogOrder => {
                results.sort_by(|a, b| b.score.match_count.cmp(&a.score.match_count));
            }
            TieBreak::MatchRatio => {
                results.sort_by(|a, b| {
                    b.score.match_count.cmp(&a.score.match_count).then_with(|| {
                        b.score
                            .match_ratio
                            .partial_cmp(&a.score.match_ratio)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                });
            }
        }

        if let Some(limit) = self.config.limit {
            results.truncate(limit);
        }

        debug!(
            "Matched {} of {} diagnoses against {} selected symptoms",
            results.len(),
            self.catalog.len(),
            selected.len()
        );

        results
    }

    /// The top-ranked candidate, if any
    #[must_use]
    pub fn find_best_match(&self, selected: &SelectedSymptoms) -> Option<MatchResult> {
        self.find_matches(selected).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// d1 {fever, cough}, d2 {fever}, d3 {nausea}
    fn small_catalog() -> ClinicalCatalog {
        let mut catalog = ClinicalCatalog::new();
        catalog
            .add_diagnosis(Diagnosis::new("d1", "X01", "One").with_symptoms(["fever", "cough"]))
            .unwrap();
        catalog
            .add_diagnosis(Diagnosis::new("d2", "X02", "Two").with_symptoms(["fever"]))
            .unwrap();
        catalog
            .add_diagnosis(Diagnosis::new("d3", "X03", "Three").with_symptoms(["nausea"]))
            .unwrap();
        catalog
    }

    fn ids(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|r| r.diagnosis.id.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let catalog = small_catalog();
        let matcher = DifferentialMatcher::new(&catalog);
        assert!(matcher.find_matches(&SelectedSymptoms::new()).is_empty());
    }

    #[test]
    fn test_single_shared_symptom_ties_keep_catalog_order() {
        let catalog = small_catalog();
        let matcher = DifferentialMatcher::new(&catalog);
        let selected: SelectedSymptoms = ["fever"].into_iter().collect();

        let results = matcher.find_matches(&selected);
        assert_eq!(ids(&results), vec!["d1", "d2"]);
        assert!((results[0].score.match_ratio - 0.5).abs() < f64::EPSILON);
        assert!((results[1].score.match_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_tie_break_is_opt_in() {
        let catalog = small_catalog();
        let config = MatchingConfig {
            tie_break: TieBreak::MatchRatio,
            ..MatchingConfig::default()
        };
        let matcher = DifferentialMatcher::with_config(&catalog, config);
        let selected: SelectedSymptoms = ["fever"].into_iter().collect();

        assert_eq!(ids(&matcher.find_matches(&selected)), vec!["d2", "d1"]);
    }

    #[test]
    fn test_higher_match_count_ranks_first() {
        let catalog = small_catalog();
        let matcher = DifferentialMatcher::new(&catalog);
        let selected: SelectedSymptoms = ["fever", "cough"].into_iter().collect();

        let results = matcher.find_matches(&selected);
        assert_eq!(ids(&results), vec!["d1", "d2"]);
        assert_eq!(results[0].score.match_count, 2);
        assert_eq!(results[1].score.match_count, 1);
    }

    #[test]
    fn test_unrelated_symptom_yields_nothing() {
        let catalog = small_catalog();
        let matcher = DifferentialMatcher::new(&catalog);
        let selected: SelectedSymptoms = ["unrelated-symptom"].into_iter().collect();
        assert!(matcher.find_matches(&selected).is_empty());
    }

    #[test]
    fn test_min_match_count_and_limit() {
        let catalog = small_catalog();
        let selected: SelectedSymptoms = ["fever", "cough", "nausea"].into_iter().collect();

        let config = MatchingConfig {
            min_match_count: 2,
            ..MatchingConfig::default()
        };
        let matcher = DifferentialMatcher::with_config(&catalog, config);
        assert_eq!(ids(&matcher.find_matches(&selected)), vec!["d1"]);

        let config = MatchingConfig {
            limit: Some(2),
            ..MatchingConfig::default()
        };
        let matcher = DifferentialMatcher::with_config(&catalog, config);
        assert_eq!(ids(&matcher.find_matches(&selected)), vec!["d1", "d2"]);
    }

    #[test]
    fn test_zero_min_match_count_never_admits_zero_overlap() {
        let catalog = small_catalog();
        let config = MatchingConfig {
            min_match_count: 0,
            ..MatchingConfig::default()
        };
        let matcher = DifferentialMatcher::with_config(&catalog, config);
        let selected: SelectedSymptoms = ["nausea"].into_iter().collect();
        assert_eq!(ids(&matcher.find_matches(&selected)), vec!["d3"]);
    }

    #[test]
    fn test_find_best_match_embedded() {
        let catalog = ClinicalCatalog::load_embedded().unwrap();
        let matcher = DifferentialMatcher::new(&catalog);
        let selected: SelectedSymptoms =
            ["cough", "fever", "headache"].into_iter().collect();

        let best = matcher.find_best_match(&selected).unwrap();
        assert_eq!(best.diagnosis.id.as_str(), "upper-respiratory");
        assert_eq!(best.score.match_count, 3);
        assert_eq!(best.score.percentage(), 60);
    }
}
