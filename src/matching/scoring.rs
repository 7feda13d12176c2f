use serde::Serialize;

use crate::core::diagnosis::Diagnosis;
use crate::core::symptom::SelectedSymptoms;
use crate::core::types::{MatchStrength, SymptomId};
use crate::utils::validation::count_to_f64;

/// How well a diagnosis is covered by the selected symptoms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    /// Number of the diagnosis's symptoms that are selected
    pub match_count: usize,

    /// Number of distinct symptoms the diagnosis lists
    pub total_symptoms: usize,

    /// `match_count / total_symptoms`, unrounded
    pub match_ratio: f64,

    /// Display band derived from the rounded percentage
    pub strength: MatchStrength,
}

impl MatchScore {
    /// Score a diagnosis against a selection
    #[must_use]
    pub fn calculate(diagnosis: &Diagnosis, selected: &SelectedSymptoms) -> Self {
        let match_count = diagnosis
            .symptoms
            .iter()
            .filter(|id| selected.contains(id.as_str()))
            .count();
        Self::from_counts(match_count, diagnosis.symptom_count())
    }

    #[must_use]
    pub fn from_counts(match_count: usize, total_symptoms: usize) -> Self {
        let match_ratio = if total_symptoms == 0 {
            0.0
        } else {
            count_to_f64(match_count) / count_to_f64(total_symptoms)
        };
        let strength = MatchStrength::from_percentage(ratio_to_percentage(match_ratio));

        Self {
            match_count,
            total_symptoms,
            match_ratio,
            strength,
        }
    }

    /// Match ratio as a whole percentage, rounded for display only
    #[must_use]
    pub fn percentage(&self) -> u32 {
        ratio_to_percentage(self.match_ratio)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // ratio is within 0.0..=1.0
fn ratio_to_percentage(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}

/// Selected symptoms a diagnosis lists, in the diagnosis's declaration order
#[must_use]
pub fn matching_symptoms(diagnosis: &Diagnosis, selected: &SelectedSymptoms) -> Vec<SymptomId> {
    diagnosis
        .symptoms
        .iter()
        .filter(|id| selected.contains(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_counts_intersection() {
        let diagnosis = Diagnosis::new("d1", "X01", "One").with_symptoms(["fever", "cough"]);
        let selected: SelectedSymptoms = ["fever", "nausea"].into_iter().collect();

        let score = MatchScore::calculate(&diagnosis, &selected);
        assert_eq!(score.match_count, 1);
        assert_eq!(score.total_symptoms, 2);
        assert!((score.match_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(score.percentage(), 50);
        assert_eq!(score.strength, MatchStrength::Moderate);
    }

    #[test]
    fn test_ratio_is_exact() {
        let score = MatchScore::from_counts(1, 3);
        assert!((score.match_ratio - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(score.percentage(), 33);
        assert_eq!(score.strength, MatchStrength::Weak);

        let score = MatchScore::from_counts(2, 3);
        assert_eq!(score.percentage(), 67);
        assert_eq!(score.strength, MatchStrength::Moderate);
    }

    #[test]
    fn test_zero_symptoms_scores_zero() {
        let score = MatchScore::from_counts(0, 0);
        assert!((score.match_ratio - 0.0).abs() < f64::EPSILON);
        assert_eq!(score.strength, MatchStrength::Weak);
    }

    #[test]
    fn test_matching_symptoms_in_diagnosis_order() {
        let diagnosis = Diagnosis::new("d1", "X01", "One")
            .with_symptoms(["cough", "sore-throat", "fever"]);
        let selected: SelectedSymptoms = ["fever", "cough"].into_iter().collect();

        let ids: Vec<String> = matching_symptoms(&diagnosis, &selected)
            .into_iter()
            .map(|id| id.0)
            .collect();
        assert_eq!(ids, vec!["cough", "fever"]);
    }
}
