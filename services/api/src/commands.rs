use crate::infra::load_store;
use admission_engine::admissions::{
    AdmissionAdminService, ReconciliationReport, RowAction, UnknownHeaderPolicy,
};
use admission_engine::eligibility::{
    CandidateScore, EligibilityResult, EligibilityService, MatchMode, MatchRequest,
};
use admission_engine::error::AppError;
use chrono::SecondsFormat;
use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Snapshot CSV holding the admission table
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Grade average between 2 and 12.7 (comma or period decimals)
    #[arg(long, value_parser = CandidateScore::parse)]
    pub(crate) score: CandidateScore,
    /// Also list programmes whose threshold is more than 0.5 above the score
    #[arg(long)]
    pub(crate) include_all: bool,
    /// Only programmes owned by this institution
    #[arg(long)]
    pub(crate) institution: Option<String>,
    /// Only programmes in cities containing this text
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Pick a single eligible programme at random
    #[arg(long)]
    pub(crate) random: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Snapshot CSV holding the admission table
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Semicolon-delimited file to reconcile into the snapshot
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Write the reconciled table to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Fail when the import file carries columns outside the schema
    #[arg(long)]
    pub(crate) strict_headers: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Snapshot CSV holding the admission table
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Destination file (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        snapshot,
        score,
        include_all,
        institution,
        city,
        random,
    } = args;

    let store = load_store(Some(&snapshot))?;
    let service = EligibilityService::new(Arc::new(store));
    let request = MatchRequest {
        score,
        include_above_threshold: include_all,
        institution,
        city,
    };
    let mode = if random { MatchMode::Random } else { MatchMode::All };

    let mut rng = rand::thread_rng();
    let results = service.run(&request, mode, &mut rng)?;

    println!("Eligibility for grade average {score}");
    if results.is_empty() {
        println!("  no programmes within reach");
    }
    for result in &results {
        println!("{}", render_result(result));
    }
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        snapshot,
        csv,
        output,
        strict_headers,
    } = args;

    let policy = if strict_headers {
        UnknownHeaderPolicy::Reject
    } else {
        UnknownHeaderPolicy::Ignore
    };
    let store = Arc::new(load_store(Some(&snapshot))?);
    let service = AdmissionAdminService::with_header_policy(Arc::clone(&store), policy);

    let bytes = std::fs::read(&csv)?;
    let report = service.import_csv(&bytes)?;
    println!("{}", render_report(&report));

    if let Some(output) = output {
        let file = BufWriter::new(File::create(&output)?);
        store.write_snapshot(file)?.flush()?;
        println!("Reconciled snapshot written to {}", output.display());
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let store = load_store(Some(&args.snapshot))?;
    let service = AdmissionAdminService::new(Arc::new(store));
    let bytes = service.export_csv()?;

    match args.output {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn render_result(result: &EligibilityResult) -> String {
    let program = &result.program;
    let location = [program.institution.as_deref(), program.city.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "- {} [{}] threshold {}: {} ({})",
        program.name,
        location,
        result.threshold_label,
        result.message,
        result.category.as_str()
    )
}

fn render_report(report: &ReconciliationReport) -> String {
    let mut lines = vec![format!(
        "Reconciliation finished at {}: {} updated, {} inserted, {} skipped",
        report
            .completed_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        report.updated,
        report.inserted,
        report.skipped
    )];

    if !report.ignored_headers.is_empty() {
        lines.push(format!(
            "Ignored columns: {}",
            report.ignored_headers.join(", ")
        ));
    }

    for entry in &report.entries {
        let marker = match entry.action {
            RowAction::Updated => "~",
            RowAction::Inserted => "+",
            RowAction::Skipped => "!",
        };
        lines.push(format!("  {marker} row {}: {}", entry.row, entry.message));
    }

    lines.join("\n")
}
