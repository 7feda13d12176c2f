use serde::{Deserialize, Serialize};

/// The prescribing doctor and the clinic printed at the top of a prescription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub name: String,
    /// Qualifications, e.g. "MBBS, MD"
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub clinic_name: String,
    #[serde(default)]
    pub clinic_address: String,
}

impl DoctorProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_degree(mut self, degree: impl Into<String>) -> Self {
        self.degree = degree.into();
        self
    }

    #[must_use]
    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = specialization.into();
        self
    }

    #[must_use]
    pub fn with_registration_number(mut self, number: impl Into<String>) -> Self {
        self.registration_number = number.into();
        self
    }

    #[must_use]
    pub fn with_clinic(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.clinic_name = name.into();
        self.clinic_address = address.into();
        self
    }
}

impl From<&str> for DoctorProfile {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DoctorProfile {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
