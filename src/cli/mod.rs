//! # CLI Module
//!
//! Command-line interface for the roster photo sorter.
//!
//! ## Usage
//! ```bash
//! # Group a detections file against a participants file
//! roster-sort group detection_results.json participants.json
//!
//! # Run a full job
//! roster-sort run job.json
//!
//! # JSON output for a host process
//! roster-sort run job.json --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use roster_sort::core::grouping::{group_photos, GroupingReport, GroupingResult};
use roster_sort::core::materialize::CopyReport;
use roster_sort::core::pipeline::{JobConfig, JobReport, Pipeline};
use roster_sort::core::recognition::{DetectionsFileRecognizer, RecognitionRecord};
use roster_sort::core::roster::ParticipantEntry;
use roster_sort::error::Result;
use roster_sort::events::{
    null_sender, Event, EventChannel, MaterializeEvent, PipelineEvent, RecognitionEvent,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Markers a host process looks for around the JSON report
const JSON_START: &str = "==JSON_START==";
const JSON_END: &str = "==JSON_END==";

/// Roster Sort - file event photos under the participant who held the QR code
#[derive(Parser, Debug)]
#[command(name = "roster-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group recognition results and print the grouping as JSON
    Group {
        /// Recognizer output (`{"results": [...]}` or a bare array)
        detections: PathBuf,

        /// JSON array of `{name, turma, qrCode}` objects
        participants: PathBuf,
    },

    /// Run a full job: validate, recognize, group and copy
    Run {
        /// Job description file
        job: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// List every copy error
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON between start/end markers, for a host process
    Json,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Group {
            detections,
            participants,
        } => run_group(&detections, &participants),
        Commands::Run {
            job,
            output,
            verbose,
        } => run_job(&job, output, verbose),
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_group(detections: &Path, participants: &Path) -> Result<ExitCode> {
    let report = match load_group_inputs(detections, participants) {
        Ok((records, entries)) => group_photos(&records, entries, &null_sender()),
        Err(e) => GroupingReport::failure(e.to_string()),
    };

    println!("{}", to_json(&report));
    Ok(exit_code(report.success))
}

fn load_group_inputs(
    detections: &Path,
    participants: &Path,
) -> Result<(Vec<RecognitionRecord>, Vec<ParticipantEntry>)> {
    let records = DetectionsFileRecognizer::new(detections).load()?;
    let entries = ParticipantEntry::load_all(participants)?;
    Ok((records, entries))
}

fn run_job(job_path: &Path, output: OutputFormat, verbose: bool) -> Result<ExitCode> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Roster Sort").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let job = match JobConfig::load(job_path) {
        Ok(job) => job,
        Err(e) => {
            let message = e.to_string();
            match output {
                OutputFormat::Pretty => print_failure(&term, &message),
                OutputFormat::Json => print_json_marked(&serde_json::json!({
                    "success": false,
                    "error": message,
                })),
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let pipeline = Pipeline::builder().job(job).build();

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_position(0);
                    pb.set_message(format!("{}", phase));
                }
                Event::Recognition(RecognitionEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Recognition(RecognitionEvent::Progress(p)) => {
                    pb.set_position(p.current as u64);
                }
                Event::Materialize(MaterializeEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Materialize(MaterializeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let report = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    match output {
        OutputFormat::Pretty => print_pretty_report(&term, &report, verbose),
        OutputFormat::Json => print_json_marked(&report),
    }

    Ok(exit_code(report.success))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "success": false, "error": e.to_string() }).to_string()
    })
}

fn print_json_marked<T: serde::Serialize>(value: &T) {
    println!("{}", JSON_START);
    println!("{}", to_json(value));
    println!("{}", JSON_END);
}

fn print_failure(term: &Term, message: &str) {
    term.write_line(&format!("{} {}", style("✗").red().bold(), style(message).red()))
        .ok();
}

fn print_pretty_report(term: &Term, report: &JobReport, verbose: bool) {
    if !report.success {
        print_failure(term, report.error.as_deref().unwrap_or("Unknown error"));
        return;
    }

    term.write_line(&format!("{} Job Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    if let Some(summary) = &report.processing_summary {
        term.write_line(&format!(
            "  {} images processed in {:.1}s",
            style(summary.total_images).cyan(),
            report.duration_ms as f64 / 1000.0
        ))
        .ok();
        term.write_line(&format!(
            "  {} QR codes detected ({:.1}%)",
            style(summary.qr_detected).cyan(),
            summary.qr_detection_rate
        ))
        .ok();
        term.write_line(&format!(
            "  {} groups created",
            style(summary.groups_created).cyan()
        ))
        .ok();
        term.write_line(&format!(
            "  {} ungrouped photos",
            style(summary.ungrouped_photos).yellow()
        ))
        .ok();
        if let Some(dir) = &summary.artifacts_directory {
            term.write_line(&format!(
                "  {} {}",
                style("Artifacts kept in").dim(),
                dir.display()
            ))
            .ok();
        }
    }

    if let Some(result) = report.grouping_result() {
        print_suggestions(term, result);
    }

    if let Some(copying) = &report.copying {
        print_copying(term, copying, verbose);
    }
}

fn print_suggestions(term: &Term, result: &GroupingResult) {
    let suggestions = &result.suggestions;
    if suggestions.is_empty() {
        return;
    }

    term.write_line("").ok();
    term.write_line(&format!("{}", style("Review Suggestions:").bold().underlined()))
        .ok();

    for group in &suggestions.low_confidence_groups {
        term.write_line(&format!(
            "  {} {} ({}) confidence {:.2} over {} photos",
            style("?").yellow(),
            group.participant_name,
            group.qr_code,
            group.confidence,
            group.photo_count
        ))
        .ok();
    }
    for photo in &suggestions.ungrouped_with_qr {
        term.write_line(&format!(
            "  {} {} carries unknown code {}",
            style("?").yellow(),
            photo.file_name,
            style(&photo.detected_qr).bold()
        ))
        .ok();
    }
    for group in &suggestions.oversized_groups {
        term.write_line(&format!(
            "  {} {} ({}) has {} photos over {:.1}h",
            style("!").yellow(),
            group.participant_name,
            group.qr_code,
            group.photo_count,
            group.time_span_hours
        ))
        .ok();
    }
    for repeated in &suggestions.repeated_participants {
        term.write_line(&format!(
            "  {} {} ({}) appears in {} separate runs",
            style("!").yellow(),
            repeated.participant_name,
            repeated.qr_code,
            repeated.runs
        ))
        .ok();
    }
}

fn print_copying(term: &Term, copying: &CopyReport, verbose: bool) {
    term.write_line("").ok();

    if let Some(error) = &copying.error {
        term.write_line(&format!("  {} {}", style("Copy skipped:").yellow(), error))
            .ok();
        return;
    }

    term.write_line(&format!(
        "  {} files copied into {} folders",
        style(copying.summary.total_copied).green(),
        copying.folders_created
    ))
    .ok();

    if copying.summary.total_errors > 0 {
        term.write_line(&format!(
            "  {} copy errors",
            style(copying.summary.total_errors).red()
        ))
        .ok();
        if verbose {
            for error in &copying.errors {
                term.write_line(&format!(
                    "    {} {}: {}",
                    style("✗").red(),
                    error.subject(),
                    error.message()
                ))
                .ok();
            }
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Source photos were not modified.").dim()
    ))
    .ok();
}
