use clap::Args;

use crate::catalog::ClinicalCatalog;
use crate::cli::{describe_score, symptom_labels, CatalogSource, OutputFormat};
use crate::core::symptom::SelectedSymptoms;
use crate::matching::engine::{DifferentialMatcher, MatchResult, MatchingConfig, TieBreak};
use crate::utils::validation::validate_identifier;

/// How to order diagnoses with equal match counts
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum TieBreakArg {
    /// Keep catalog declaration order
    #[default]
    CatalogOrder,
    /// Prefer diagnoses with a higher fraction of their symptoms matched
    MatchRatio,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::CatalogOrder => Self::CatalogOrder,
            TieBreakArg::MatchRatio => Self::MatchRatio,
        }
    }
}

#[derive(Args)]
pub struct DifferentialArgs {
    /// Observed symptom ids (e.g., fever cough)
    #[arg(required = true, num_args = 1..)]
    pub symptoms: Vec<String>,

    /// Ordering for diagnoses with equal match counts
    #[arg(long, value_enum, default_value = "catalog-order")]
    pub tie_break: TieBreakArg,

    /// Maximum number of diagnoses to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Minimum number of shared symptoms for a diagnosis to be listed
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub min_matches: u32,

    #[command(flatten)]
    pub source: CatalogSource,
}

impl DifferentialArgs {
    fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            tie_break: self.tie_break.into(),
            min_match_count: self.min_matches as usize,
            limit: self.limit,
        }
    }
}

/// Execute differential subcommand
///
/// # Errors
///
/// Returns an error if a symptom id is malformed or the catalog cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DifferentialArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    for id in &args.symptoms {
        validate_identifier(id)?;
    }

    let catalog = args.source.load()?;
    if verbose {
        eprintln!(
            "Loaded catalog with {} diagnoses and {} symptoms",
            catalog.len(),
            catalog.all_symptoms().len()
        );
    }

    let selected: SelectedSymptoms = args.symptoms.iter().map(String::as_str).collect();
    for id in selected.iter() {
        if catalog.find_symptom(id.as_str()).is_none() {
            eprintln!("Warning: '{id}' is not a known symptom id");
        }
    }

    let matcher = DifferentialMatcher::with_config(&catalog, args.matching_config());
    let matches = matcher.find_matches(&selected);

    match format {
        OutputFormat::Text => print_text_results(&catalog, &selected, &matches),
        OutputFormat::Json => print_json_results(&catalog, &selected, &matches)?,
        OutputFormat::Tsv => print_tsv_results(&matches),
    }

    Ok(())
}

fn print_text_results(catalog: &ClinicalCatalog, selected: &SelectedSymptoms, matches: &[MatchResult]) {
    println!("Differential Diagnosis");
    println!("{}", "=".repeat(60));
    println!("Selected symptoms: {}", symptom_labels(catalog, selected.iter()));

    if matches.is_empty() {
        println!("\nNo matching diagnoses found.");
        return;
    }

    println!("{} matches found", matches.len());

    for (i, m) in matches.iter().enumerate() {
        println!(
            "\n{}. {} ({})",
            i + 1,
            m.diagnosis.name,
            m.diagnosis.code
        );
        if !m.diagnosis.description.is_empty() {
            println!("   {}", m.diagnosis.description);
        }
        println!("   {}", describe_score(&m.score));
        println!(
            "   Matching symptoms: {}",
            symptom_labels(catalog, &m.matching_symptoms)
        );
    }
}

fn print_json_results(
    catalog: &ClinicalCatalog,
    selected: &SelectedSymptoms,
    matches: &[MatchResult],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "catalog_fingerprint": catalog.fingerprint(),
        "selected": selected.iter().collect::<Vec<_>>(),
        "matches": matches.iter().enumerate().map(|(i, m)| {
            serde_json::json!({
                "rank": i + 1,
                "id": m.diagnosis.id,
                "code": m.diagnosis.code,
                "name": m.diagnosis.name,
                "matching_symptoms": m.matching_symptoms,
                "match_count": m.score.match_count,
                "total_symptoms": m.score.total_symptoms,
                "match_ratio": m.score.match_ratio,
                "percentage": m.score.percentage(),
                "strength": m.score.strength,
            })
        }).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(matches: &[MatchResult]) {
    println!("rank\tid\tcode\tname\tmatch_count\ttotal_symptoms\tmatch_ratio\tstrength");
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{}",
            i + 1,
            m.diagnosis.id,
            m.diagnosis.code,
            m.diagnosis.name,
            m.score.match_count,
            m.score.total_symptoms,
            m.score.match_ratio,
            m.score.strength,
        );
    }
}
