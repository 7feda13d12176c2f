use serde::{Deserialize, Serialize};

/// A drug in the clinic formulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drug {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub generic_name: String,
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
    /// Therapeutic category (e.g., "Antihypertensive")
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Other".to_string()
}

impl Drug {
    /// Case-insensitive match against name or generic name
    #[must_use]
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.generic_name.to_lowercase().contains(needle_lower)
    }
}

/// A laboratory investigation that can be ordered with a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range: Option<String>,
    pub category: String,
}

impl LabTest {
    /// Case-insensitive match against name or category
    #[must_use]
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
    }
}

/// Rule mapping a diagnosis name to drug categories worth pre-filling.
///
/// A rule fires when any keyword occurs in the diagnosis name (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugSuggestionRule {
    pub keywords: Vec<String>,
    pub categories: Vec<String>,
    /// Maximum number of drugs to suggest
    pub limit: usize,
}

impl DrugSuggestionRule {
    #[must_use]
    pub fn applies_to(&self, diagnosis_name: &str) -> bool {
        let name = diagnosis_name.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }

    #[must_use]
    pub fn covers(&self, drug: &Drug) -> bool {
        self.categories.iter().any(|c| c == &drug.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drug(id: &str, name: &str, generic: &str, category: &str) -> Drug {
        Drug {
            id: id.to_string(),
            name: name.to_string(),
            generic_name: generic.to_string(),
            dosage: "500mg".to_string(),
            frequency: String::new(),
            duration: String::new(),
            instructions: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_drug_matches_generic_name() {
        let paracetamol = drug("paracetamol", "Paracetamol", "Acetaminophen", "Analgesic");
        assert!(paracetamol.matches_query("acetam"));
        assert!(paracetamol.matches_query("para"));
        assert!(!paracetamol.matches_query("ibu"));
    }

    #[test]
    fn test_rule_keywords_are_case_insensitive() {
        let rule = DrugSuggestionRule {
            keywords: vec!["Respiratory".to_string(), "cold".to_string()],
            categories: vec!["Analgesic".to_string()],
            limit: 2,
        };
        assert!(rule.applies_to("Upper Respiratory Tract Infection"));
        assert!(rule.applies_to("Common COLD"));
        assert!(!rule.applies_to("Gastritis"));
        assert!(rule.covers(&drug("p", "P", "P", "Analgesic")));
        assert!(!rule.covers(&drug("a", "A", "A", "Antibiotic")));
    }

    #[test]
    fn test_drug_category_defaults_to_other() {
        let json = r#"{"id":"x","name":"X","dosage":"1mg"}"#;
        let parsed: Drug = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.category, "Other");
    }
}
