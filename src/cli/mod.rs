//! Command-line interface for clinic-dx.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **differential**: Rank candidate diagnoses for a set of symptoms
//! - **symptoms**: Search the symptom catalog
//! - **session**: Replay a scripted diagnosis session and optionally draft a prescription
//! - **catalog**: List, show, validate, or export the clinical catalog
//!
//! ## Usage
//!
//! ```text
//! # Rank diagnoses for two symptoms
//! clinic-dx differential fever cough
//!
//! # JSON output for scripting
//! clinic-dx differential fever cough --format json
//!
//! # Find symptom ids by name
//! clinic-dx symptoms head --exclude headache
//!
//! # Replay a session from stdin
//! printf 'add fever\nadd cough\nchoose upper-respiratory\n' | clinic-dx session -
//!
//! # Check a custom catalog before using it
//! clinic-dx catalog validate --catalog my_catalog.json --strict
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::{ClinicalCatalog, IntegrityMode};
use crate::core::types::SymptomId;
use crate::matching::scoring::MatchScore;

pub mod catalog;
pub mod differential;
pub mod session;
pub mod symptoms;

#[derive(Parser)]
#[command(name = "clinic-dx")]
#[command(version)]
#[command(about = "Symptom-driven differential diagnosis over a clinical reference catalog")]
#[command(
    long_about = "clinic-dx ranks candidate diagnoses for a set of observed symptoms.\n\nA diagnosis is a candidate when it lists at least one selected symptom. Candidates are ranked by how many selected symptoms they list, and each carries the fraction of its own symptoms that were observed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidate diagnoses for a set of symptoms
    Differential(differential::DifferentialArgs),

    /// Search symptoms by name
    Symptoms(symptoms::SymptomsArgs),

    /// Replay a scripted diagnosis session
    Session(session::SessionArgs),

    /// Inspect the clinical catalog
    Catalog(catalog::CatalogArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Catalog selection flags shared by every catalog-consuming command
#[derive(clap::Args, Clone, Debug, Default)]
pub struct CatalogSource {
    /// Path to custom catalog file (defaults to the embedded catalog)
    #[arg(long, global = true)]
    pub catalog: Option<std::path::PathBuf>,

    /// Refuse catalogs whose diagnoses reference unknown symptoms
    #[arg(long, global = true)]
    pub strict: bool,
}

impl CatalogSource {
    #[must_use]
    pub fn integrity_mode(&self) -> IntegrityMode {
        if self.strict {
            IntegrityMode::Strict
        } else {
            IntegrityMode::Warn
        }
    }

    /// Load the selected catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read, parsed, or fails the
    /// integrity check in strict mode.
    pub fn load(&self) -> anyhow::Result<ClinicalCatalog> {
        match &self.catalog {
            Some(path) => load_catalog_file(path, self.integrity_mode()),
            None => Ok(ClinicalCatalog::load_embedded()?),
        }
    }
}

fn load_catalog_file(path: &Path, mode: IntegrityMode) -> anyhow::Result<ClinicalCatalog> {
    ClinicalCatalog::load_from_file_with_mode(path, mode)
        .with_context(|| format!("Failed to load catalog {}", path.display()))
}

/// Comma-joined display names for symptom ids
pub(crate) fn symptom_labels<'a>(
    catalog: &'a ClinicalCatalog,
    ids: impl IntoIterator<Item = &'a SymptomId>,
) -> String {
    ids.into_iter()
        .map(|id| catalog.symptom_label(id.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// "2/5 symptoms match | 40% match (weak)"
pub(crate) fn describe_score(score: &MatchScore) -> String {
    format!(
        "{}/{} symptoms match | {}% match ({})",
        score.match_count,
        score.total_symptoms,
        score.percentage(),
        score.strength
    )
}
