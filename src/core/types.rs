use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Unique identifier for a symptom in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymptomId(pub String);

impl SymptomId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymptomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for SymptomId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SymptomId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SymptomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a diagnosis in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiagnosisId(pub String);

impl DiagnosisId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiagnosisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for DiagnosisId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiagnosisId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Display band for how well a diagnosis is covered by the selected symptoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrength {
    Weak,
    Moderate,
    Strong,
}

impl MatchStrength {
    /// Band a rounded match percentage (0-100)
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 70 {
            Self::Strong
        } else if percentage >= 50 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

impl std::fmt::Display for MatchStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Moderate => write!(f, "moderate"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_strength_bands() {
        assert_eq!(MatchStrength::from_percentage(100), MatchStrength::Strong);
        assert_eq!(MatchStrength::from_percentage(70), MatchStrength::Strong);
        assert_eq!(MatchStrength::from_percentage(69), MatchStrength::Moderate);
        assert_eq!(MatchStrength::from_percentage(50), MatchStrength::Moderate);
        assert_eq!(MatchStrength::from_percentage(49), MatchStrength::Weak);
        assert_eq!(MatchStrength::from_percentage(0), MatchStrength::Weak);
    }

    #[test]
    fn test_symptom_id_str_lookup() {
        let set: HashSet<SymptomId> = [SymptomId::new("fever")].into_iter().collect();
        assert!(set.contains("fever"));
        assert!(!set.contains("cough"));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&SymptomId::new("fever")).unwrap();
        assert_eq!(json, "\"fever\"");

        let id: DiagnosisId = serde_json::from_str("\"migraine\"").unwrap();
        assert_eq!(id.as_str(), "migraine");
    }
}
