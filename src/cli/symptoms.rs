use clap::Args;

use crate::cli::{CatalogSource, OutputFormat};
use crate::core::symptom::{SelectedSymptoms, Symptom};
use crate::utils::validation::normalize_query;

#[derive(Args)]
pub struct SymptomsArgs {
    /// Text to look for in symptom names (case-insensitive); omit to list all
    pub query: Option<String>,

    /// Symptom ids to leave out, e.g. ones already selected (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub source: CatalogSource,
}

/// Execute symptoms subcommand
///
/// # Errors
///
/// Returns an error if the query is too long or the catalog cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SymptomsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = normalize_query(args.query.as_deref().unwrap_or_default())?;
    let catalog = args.source.load()?;

    let exclude: SelectedSymptoms = args.exclude.iter().map(String::as_str).collect();
    let search = catalog.search_symptoms(&query, &exclude);
    let needle = search.query().to_string();
    let found: Vec<&Symptom> = search.collect();

    if verbose {
        eprintln!(
            "{} of {} symptoms match '{needle}'",
            found.len(),
            catalog.all_symptoms().len()
        );
    }

    match format {
        OutputFormat::Text => {
            if found.is_empty() {
                println!("No symptoms found.");
            }
            for symptom in &found {
                println!("{:<28} {}", symptom.id.as_str(), symptom.name);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tdescription");
            for symptom in &found {
                println!("{}\t{}\t{}", symptom.id, symptom.name, symptom.description);
            }
        }
    }

    Ok(())
}
