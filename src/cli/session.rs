use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::ClinicalCatalog;
use crate::cli::differential::TieBreakArg;
use crate::cli::{describe_score, symptom_labels, CatalogSource, OutputFormat};
use crate::core::doctor::DoctorProfile;
use crate::core::patient::{Gender, Patient};
use crate::core::prescription::PrescriptionDraft;
use crate::core::types::SymptomId;
use crate::matching::engine::MatchingConfig;
use crate::matching::session::{SelectionSession, SessionError, TracingObserver};
use crate::utils::validation::{check_line_limit, validate_identifier, ValidationError};

#[derive(Args)]
pub struct SessionArgs {
    /// Session script: one `add <id>`, `remove <id>`, `choose <id>` or `clear`
    /// per line, `#` for comments. Use '-' or omit to read stdin.
    pub script: Option<PathBuf>,

    /// Patient id; enables prescription drafting
    #[arg(long, requires = "patient_name")]
    pub patient_id: Option<String>,

    /// Patient name
    #[arg(long, requires = "patient_id")]
    pub patient_name: Option<String>,

    /// Patient age in years
    #[arg(long)]
    pub patient_age: Option<u32>,

    /// Patient gender (male, female, other)
    #[arg(long)]
    pub patient_gender: Option<Gender>,

    /// Prescribing doctor's name
    #[arg(long, default_value = "Attending Physician")]
    pub doctor: String,

    /// Doctor's degrees, e.g. "MBBS, MD"
    #[arg(long, default_value = "")]
    pub degree: String,

    /// Doctor's specialization
    #[arg(long, default_value = "")]
    pub specialization: String,

    /// Doctor's medical registration number
    #[arg(long, default_value = "")]
    pub registration_number: String,

    /// Clinic name printed above the doctor
    #[arg(long, default_value = "")]
    pub clinic_name: String,

    /// Clinic address printed below the clinic name
    #[arg(long, default_value = "")]
    pub clinic_address: String,

    /// Lab test ids to order with the prescription (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub lab_tests: Vec<String>,

    /// Free-text notes for the prescription
    #[arg(long)]
    pub notes: Option<String>,

    /// Ordering for diagnoses with equal match counts
    #[arg(long, value_enum, default_value = "catalog-order")]
    pub tie_break: TieBreakArg,

    #[command(flatten)]
    pub source: CatalogSource,
}

/// One line of a session script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(String),
    Remove(String),
    Choose(String),
    Clear,
}

impl std::fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add(id) => write!(f, "add {id}"),
            Self::Remove(id) => write!(f, "remove {id}"),
            Self::Choose(id) => write!(f, "choose {id}"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}' (expected add, remove, choose or clear)")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' takes exactly one id")]
    WrongArity { line: usize, command: String },

    #[error("line {line}: {source}")]
    InvalidId {
        line: usize,
        source: ValidationError,
    },

    #[error("{0}")]
    TooLong(ValidationError),
}

/// Parse a session script into commands
///
/// # Errors
///
/// Returns a `ScriptError` naming the first offending line.
pub fn parse_script(text: &str) -> Result<Vec<SessionCommand>, ScriptError> {
    let mut commands = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        if let Some(err) = check_line_limit(i) {
            return Err(ScriptError::TooLong(err));
        }

        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let single_id = || -> Result<String, ScriptError> {
            match args.as_slice() {
                [id] => validate_identifier(id)
                    .map(str::to_string)
                    .map_err(|source| ScriptError::InvalidId {
                        line: line_no,
                        source,
                    }),
                _ => Err(ScriptError::WrongArity {
                    line: line_no,
                    command: command.clone(),
                }),
            }
        };

        let parsed = match command.as_str() {
            "add" => SessionCommand::Add(single_id()?),
            "remove" => SessionCommand::Remove(single_id()?),
            "choose" => SessionCommand::Choose(single_id()?),
            "clear" if args.is_empty() => SessionCommand::Clear,
            "clear" => {
                return Err(ScriptError::WrongArity {
                    line: line_no,
                    command: command.clone(),
                })
            }
            _ => {
                return Err(ScriptError::UnknownCommand {
                    line: line_no,
                    command: command.clone(),
                })
            }
        };
        commands.push(parsed);
    }

    Ok(commands)
}

#[derive(Debug, Serialize)]
struct StepMatch {
    id: String,
    code: String,
    name: String,
    match_count: usize,
    total_symptoms: usize,
    match_ratio: f64,
}

#[derive(Debug, Serialize)]
struct Step {
    command: String,
    changed: bool,
    selected: Vec<SymptomId>,
    matches: Vec<StepMatch>,
    chosen: Option<String>,
    #[serde(skip)]
    lines: Vec<String>,
}

/// Execute session subcommand
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or the catalog
/// cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SessionArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let text = read_script(args.script.as_ref())?;
    let commands = parse_script(&text)?;
    let catalog = args.source.load()?;

    let config = MatchingConfig {
        tie_break: args.tie_break.into(),
        ..MatchingConfig::default()
    };
    let mut session = SelectionSession::with_config(&catalog, config);
    if verbose {
        session.subscribe(Box::new(TracingObserver));
        eprintln!("Replaying {} session commands", commands.len());
    }

    if let (Some(id), Some(name)) = (&args.patient_id, &args.patient_name) {
        let mut patient = Patient::new(id.as_str(), name.as_str());
        patient.age = args.patient_age;
        patient.gender = args.patient_gender;
        session.select_patient(patient);
    }

    let steps: Vec<Step> = commands
        .iter()
        .map(|command| apply(&mut session, &catalog, command))
        .collect();

    let draft = draft_prescription(&session, &catalog, &args);

    match format {
        OutputFormat::Text => print_text(&steps, draft.as_ref()),
        OutputFormat::Json => print_json(&steps, &session, draft.as_ref())?,
        OutputFormat::Tsv => print_tsv(&steps),
    }

    Ok(())
}

fn read_script(path: Option<&PathBuf>) -> anyhow::Result<String> {
    let mut text = String::new();
    match path {
        Some(path) if path.as_os_str() != "-" => {
            text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read session script {}", path.display()))?;
        }
        _ => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read session script from stdin")?;
        }
    }
    Ok(text)
}

fn apply(session: &mut SelectionSession<'_>, catalog: &ClinicalCatalog, command: &SessionCommand) -> Step {
    let changed = match command {
        SessionCommand::Add(id) => {
            if catalog.find_symptom(id).is_none() {
                eprintln!("Warning: '{id}' is not a known symptom id");
            }
            session.add(id.as_str())
        }
        SessionCommand::Remove(id) => session.remove(id),
        SessionCommand::Choose(id) => match session.choose(id) {
            Ok(_) => true,
            Err(e) => {
                eprintln!("Warning: {e}");
                false
            }
        },
        SessionCommand::Clear => {
            let had_selection = !session.selected().is_empty();
            session.clear();
            had_selection
        }
    };

    let chosen = session.chosen_diagnosis().map(|d| d.id.0.clone());
    let lines = session
        .results()
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let marker = if chosen.as_deref() == Some(m.diagnosis.id.as_str()) {
                '*'
            } else {
                ' '
            };
            format!(
                "{marker} {}. {} ({}): {} [{}]",
                i + 1,
                m.diagnosis.name,
                m.diagnosis.code,
                describe_score(&m.score),
                symptom_labels(catalog, &m.matching_symptoms)
            )
        })
        .collect();

    Step {
        command: command.to_string(),
        changed,
        selected: session.selected().iter().cloned().collect(),
        matches: session
            .results()
            .iter()
            .map(|m| StepMatch {
                id: m.diagnosis.id.0.clone(),
                code: m.diagnosis.code.clone(),
                name: m.diagnosis.name.clone(),
                match_count: m.score.match_count,
                total_symptoms: m.score.total_symptoms,
                match_ratio: m.score.match_ratio,
            })
            .collect(),
        chosen,
        lines,
    }
}

fn draft_prescription(
    session: &SelectionSession<'_>,
    catalog: &ClinicalCatalog,
    args: &SessionArgs,
) -> Option<PrescriptionDraft> {
    let doctor = DoctorProfile::new(args.doctor.as_str())
        .with_degree(args.degree.as_str())
        .with_specialization(args.specialization.as_str())
        .with_registration_number(args.registration_number.as_str())
        .with_clinic(args.clinic_name.as_str(), args.clinic_address.as_str());

    let mut draft = match session.to_prescription_draft(doctor) {
        Ok(draft) => draft,
        Err(SessionError::NoPatient) => return None,
        Err(e) => {
            eprintln!("Warning: no prescription drafted: {e}");
            return None;
        }
    };

    for id in &args.lab_tests {
        match catalog.find_lab_test(id) {
            Some(test) => {
                draft.add_lab_test(test.clone());
            }
            None => eprintln!("Warning: '{id}' is not a known lab test id"),
        }
    }

    if let Some(notes) = &args.notes {
        draft.notes.clone_from(notes);
    }

    Some(draft)
}

fn print_text(steps: &[Step], draft: Option<&PrescriptionDraft>) {
    for step in steps {
        println!("> {}", step.command);
        if step.lines.is_empty() {
            println!("  No matching diagnoses.");
        }
        for line in &step.lines {
            println!("  {line}");
        }
    }

    if let Some(draft) = draft {
        println!("\nPrescription Draft");
        println!("{}", "=".repeat(60));
        print!("{}", draft.render_text());
    }
}

fn print_json(
    steps: &[Step],
    session: &SelectionSession<'_>,
    draft: Option<&PrescriptionDraft>,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "steps": steps,
        "chosen": session.chosen_diagnosis(),
        "prescription": draft,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(steps: &[Step]) {
    println!("step\tcommand\trank\tid\tmatch_count\ttotal_symptoms\tmatch_ratio\tchosen");
    for (i, step) in steps.iter().enumerate() {
        for (rank, m) in step.matches.iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{}",
                i + 1,
                step.command,
                rank + 1,
                m.id,
                m.match_count,
                m.total_symptoms,
                m.match_ratio,
                step.chosen.as_deref() == Some(m.id.as_str()),
            );
        }
    }
}
