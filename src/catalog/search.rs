use crate::core::symptom::{SelectedSymptoms, Symptom};

/// Lazy symptom search over the catalog.
///
/// Yields symptoms whose name contains the query (case-insensitive) and that are
/// not already selected, in catalog declaration order. The iterator is finite, and
/// cloning it before consuming gives a fresh pass over the same results.
#[derive(Debug, Clone)]
pub struct SymptomSearch<'a> {
    symptoms: std::slice::Iter<'a, Symptom>,
    needle: String,
    exclude: &'a SelectedSymptoms,
}

impl<'a> SymptomSearch<'a> {
    /// `needle` must already be lowercased
    pub(crate) fn new(symptoms: &'a [Symptom], needle: String, exclude: &'a SelectedSymptoms) -> Self {
        Self {
            symptoms: symptoms.iter(),
            needle,
            exclude,
        }
    }

    /// The normalized query this search filters on
    #[must_use]
    pub fn query(&self) -> &str {
        &self.needle
    }
}

impl<'a> Iterator for SymptomSearch<'a> {
    type Item = &'a Symptom;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_str();
        let exclude = self.exclude;
        self.symptoms.find(|symptom| {
            !exclude.contains(symptom.id.as_str()) && symptom.name.to_lowercase().contains(needle)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.symptoms.size_hint().1)
    }
}

impl std::iter::FusedIterator for SymptomSearch<'_> {}
