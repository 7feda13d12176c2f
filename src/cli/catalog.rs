use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::catalog::{ClinicalCatalog, IntegrityMode};
use crate::cli::{symptom_labels, CatalogSource, OutputFormat};
use crate::core::diagnosis::Diagnosis;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,

    #[command(flatten)]
    pub source: CatalogSource,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum EntryKind {
    #[default]
    Diagnoses,
    Symptoms,
    Drugs,
    LabTests,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List catalog entries
    List {
        /// Which entries to list
        #[arg(long, value_enum, default_value = "diagnoses")]
        kind: EntryKind,
    },

    /// Show details of a diagnosis, symptom, drug, or lab test
    Show {
        /// Entry ID
        #[arg(required = true)]
        id: String,
    },

    /// Check referential integrity and print the catalog fingerprint
    Validate,

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the entry is not found,
/// validation fails, or the export cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { kind } => {
            let catalog = args.source.load()?;
            run_list(&catalog, kind, format)
        }
        CatalogCommands::Show { id } => {
            let catalog = args.source.load()?;
            run_show(&catalog, &id, format)
        }
        CatalogCommands::Validate => run_validate(&args.source, format, verbose),
        CatalogCommands::Export { output } => {
            let catalog = args.source.load()?;
            let json = catalog.to_json()?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!(
                "Exported {} diagnoses and {} symptoms to {}",
                catalog.len(),
                catalog.all_symptoms().len(),
                output.display()
            );
            Ok(())
        }
    }
}

fn run_list(catalog: &ClinicalCatalog, kind: EntryKind, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = match kind {
                EntryKind::Diagnoses => serde_json::to_string_pretty(catalog.all_diagnoses())?,
                EntryKind::Symptoms => serde_json::to_string_pretty(catalog.all_symptoms())?,
                EntryKind::Drugs => serde_json::to_string_pretty(catalog.all_drugs())?,
                EntryKind::LabTests => serde_json::to_string_pretty(catalog.all_lab_tests())?,
            };
            println!("{json}");
        }
        OutputFormat::Tsv => match kind {
            EntryKind::Diagnoses => {
                println!("id\tcode\tname\tsymptom_count");
                for d in catalog.all_diagnoses() {
                    println!("{}\t{}\t{}\t{}", d.id, d.code, d.name, d.symptom_count());
                }
            }
            EntryKind::Symptoms => {
                println!("id\tname\tdescription");
                for s in catalog.all_symptoms() {
                    println!("{}\t{}\t{}", s.id, s.name, s.description);
                }
            }
            EntryKind::Drugs => {
                println!("id\tname\tgeneric_name\tdosage\tcategory");
                for d in catalog.all_drugs() {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        d.id, d.name, d.generic_name, d.dosage, d.category
                    );
                }
            }
            EntryKind::LabTests => {
                println!("id\tname\tcategory\tnormal_range");
                for t in catalog.all_lab_tests() {
                    println!(
                        "{}\t{}\t{}\t{}",
                        t.id,
                        t.name,
                        t.category,
                        t.normal_range.as_deref().unwrap_or("")
                    );
                }
            }
        },
        OutputFormat::Text => match kind {
            EntryKind::Diagnoses => {
                println!("{:<20} {:<8} {:<36} Symptoms", "ID", "Code", "Name");
                println!("{}", "-".repeat(75));
                for d in catalog.all_diagnoses() {
                    println!(
                        "{:<20} {:<8} {:<36} {}",
                        d.id.as_str(),
                        d.code,
                        d.name,
                        d.symptom_count()
                    );
                }
            }
            EntryKind::Symptoms => {
                println!("{:<28} {:<28} Description", "ID", "Name");
                println!("{}", "-".repeat(75));
                for s in catalog.all_symptoms() {
                    println!("{:<28} {:<28} {}", s.id.as_str(), s.name, s.description);
                }
            }
            EntryKind::Drugs => {
                println!("{:<16} {:<16} {:<8} Category", "ID", "Name", "Dosage");
                println!("{}", "-".repeat(60));
                for d in catalog.all_drugs() {
                    println!("{:<16} {:<16} {:<8} {}", d.id, d.name, d.dosage, d.category);
                }
            }
            EntryKind::LabTests => {
                println!("{:<16} {:<28} Category", "ID", "Name");
                println!("{}", "-".repeat(60));
                for t in catalog.all_lab_tests() {
                    println!("{:<16} {:<28} {}", t.id, t.name, t.category);
                }
            }
        },
    }

    Ok(())
}

fn run_show(catalog: &ClinicalCatalog, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(diagnosis) = catalog.get_diagnosis(id) {
        return show_diagnosis(catalog, diagnosis, format);
    }

    let value = if let Some(symptom) = catalog.find_symptom(id) {
        serde_json::to_value(symptom)?
    } else if let Some(drug) = catalog.find_drug(id) {
        serde_json::to_value(drug)?
    } else if let Some(test) = catalog.find_lab_test(id) {
        serde_json::to_value(test)?
    } else {
        anyhow::bail!("Entry '{id}' not found in catalog");
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Text | OutputFormat::Tsv => {
            if let Some(fields) = value.as_object() {
                for (key, field) in fields {
                    let shown = field.as_str().map_or_else(|| field.to_string(), str::to_string);
                    match format {
                        OutputFormat::Tsv => println!("{key}\t{shown}"),
                        _ => println!("{key}: {shown}"),
                    }
                }
            }
        }
    }

    Ok(())
}

fn show_diagnosis(
    catalog: &ClinicalCatalog,
    diagnosis: &Diagnosis,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let suggested = catalog.suggest_drugs(diagnosis);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "diagnosis": diagnosis,
                "suggested_drugs": suggested,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("symptom_id\tsymptom_name\tknown");
            for id in &diagnosis.symptoms {
                println!(
                    "{}\t{}\t{}",
                    id,
                    catalog.symptom_label(id.as_str()),
                    catalog.find_symptom(id.as_str()).is_some()
                );
            }
        }
        OutputFormat::Text => {
            println!("{} ({})", diagnosis.name, diagnosis.code);
            println!("{}", "=".repeat(60));
            println!("ID: {}", diagnosis.id);
            if !diagnosis.description.is_empty() {
                println!("Description: {}", diagnosis.description);
            }
            println!(
                "Symptoms ({}): {}",
                diagnosis.symptom_count(),
                symptom_labels(catalog, &diagnosis.symptoms)
            );
            if !suggested.is_empty() {
                let names: Vec<&str> = suggested.iter().map(|d| d.name.as_str()).collect();
                println!("Suggested drugs: {}", names.join(", "));
            }
        }
    }

    Ok(())
}

fn run_validate(source: &CatalogSource, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Load permissively so every problem can be reported, then apply strictness
    let catalog = match &source.catalog {
        Some(path) => ClinicalCatalog::load_from_file_with_mode(path, IntegrityMode::Silent)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => ClinicalCatalog::load_embedded()?,
    };

    let dangling = catalog.integrity_report();
    let fingerprint = catalog.fingerprint();

    if verbose {
        eprintln!(
            "Checked {} diagnoses against {} symptoms",
            catalog.len(),
            catalog.all_symptoms().len()
        );
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "fingerprint": fingerprint,
                "diagnoses": catalog.len(),
                "symptoms": catalog.all_symptoms().len(),
                "drugs": catalog.all_drugs().len(),
                "lab_tests": catalog.all_lab_tests().len(),
                "dangling_references": dangling,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("diagnosis\tsymptom");
            for reference in &dangling {
                println!("{}\t{}", reference.diagnosis, reference.symptom);
            }
        }
        OutputFormat::Text => {
            println!("Fingerprint: {fingerprint}");
            println!(
                "Entries: {} diagnoses, {} symptoms, {} drugs, {} lab tests",
                catalog.len(),
                catalog.all_symptoms().len(),
                catalog.all_drugs().len(),
                catalog.all_lab_tests().len()
            );
            if dangling.is_empty() {
                println!("Integrity: OK");
            } else {
                println!("Integrity: {} dangling references", dangling.len());
                for reference in &dangling {
                    println!("  - {reference}");
                }
            }
        }
    }

    if source.strict && !dangling.is_empty() {
        anyhow::bail!(
            "Catalog has {} dangling symptom references",
            dangling.len()
        );
    }

    Ok(())
}
