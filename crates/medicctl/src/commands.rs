//! Command handlers for medicctl.
//!
//! Each handler launches the corresponding core run on its worker thread,
//! drains the event channel into the terminal, and renders the result. The
//! core never sees any of this; it only talks to the event sink.

use anyhow::{anyhow, Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::debug;

use medic_common::events::{ChannelSink, MedicEvent};
use medic_common::issue::Issue;
use medic_common::platform::{SystemCommands, WindowsCommands};
use medic_common::remediation::{RemediationEngine, RemediationOutcome, RemediationStatus};
use medic_common::report::{DiagnosticReport, ProbeReport};
use medic_common::runner::{spawn_diagnostics, spawn_remediation, RunGuard};
use medic_common::{DiagnosticPipeline, MedicConfig};

use crate::ui;

const APP_NAME: &str = "CodeGPT Medic";

/// Handle the diagnose command
pub fn diagnose(verbose: bool, save: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    ui::print_header(APP_NAME, env!("CARGO_PKG_VERSION"));

    let (findings, report) = run_diagnostics(verbose)?;

    println!();
    for line in report.render().lines() {
        ui::print_narrative(line);
    }
    ui::print_footer();

    if let Some(path) = save {
        save_text_report(&path, &findings, &report)?;
        println!("Report saved to {}", path.display());
    }
    if let Some(path) = json {
        save_json_report(&path, &report)?;
        println!("Structured report saved to {}", path.display());
    }

    Ok(())
}

/// Handle the fix command: diagnose, confirm, remediate
pub fn fix(verbose: bool, yes: bool) -> Result<()> {
    ui::print_header(APP_NAME, env!("CARGO_PKG_VERSION"));

    let (_, report) = run_diagnostics(verbose)?;

    println!();
    for line in report.render().lines() {
        ui::print_narrative(line);
    }

    if !report.has_issues() {
        println!();
        println!("Nothing to fix.");
        ui::print_footer();
        return Ok(());
    }

    if !yes && !confirm("Attempt to fix the detected problems?")? {
        println!("No changes made.");
        ui::print_footer();
        return Ok(());
    }

    println!();
    let outcomes = run_remediation(verbose, report.issues.clone())?;

    println!();
    for outcome in &outcomes {
        ui::print_kv(outcome.kind.as_str(), &describe_outcome(outcome), 36);
    }
    println!();
    println!("All possible fixes were applied. A system restart is recommended.");
    ui::print_footer();

    Ok(())
}

/// Handle the restart-extension command
pub fn restart_extension() -> Result<()> {
    let commands = WindowsCommands;
    let result = commands.restart_extension_host();
    if result.success() {
        println!("CodeGPT extension restarted.");
        Ok(())
    } else {
        Err(anyhow!(
            "failed to restart the extension host: {}",
            result.error_summary()
        ))
    }
}

/// Handle the reboot command
pub fn reboot(delay: u32, yes: bool) -> Result<()> {
    if !yes && !confirm("Are you sure you want to restart the system?")? {
        println!("Reboot cancelled.");
        return Ok(());
    }

    let commands = WindowsCommands;
    let message = format!(
        "The system will restart in {} seconds to apply network changes.",
        delay
    );
    let result = commands.schedule_reboot(delay, &message);
    if result.success() {
        println!(
            "Reboot scheduled in {} seconds. Save your work and close all programs.",
            delay
        );
        Ok(())
    } else {
        Err(anyhow!(
            "failed to schedule the reboot: {}",
            result.error_summary()
        ))
    }
}

/// Launch the diagnostic worker and drain its events into the terminal
fn run_diagnostics(verbose: bool) -> Result<(ProbeReport, DiagnosticReport)> {
    let config = MedicConfig::load()?;
    let commands: Arc<dyn SystemCommands> = Arc::new(WindowsCommands);
    let pipeline = DiagnosticPipeline::new(commands, &config)?;

    let (sink, rx) = ChannelSink::new();
    let guard = RunGuard::new();
    let handle = spawn_diagnostics(pipeline, Arc::new(sink), &guard)?;

    drain_events(rx, verbose);
    handle
        .join()
        .map_err(|_| anyhow!("the diagnostic worker terminated abnormally"))
}

/// Launch the remediation worker and drain its events into the terminal
fn run_remediation(verbose: bool, issues: Vec<Issue>) -> Result<Vec<RemediationOutcome>> {
    let commands: Arc<dyn SystemCommands> = Arc::new(WindowsCommands);
    let engine = RemediationEngine::new(commands);

    let (sink, rx) = ChannelSink::new();
    let guard = RunGuard::new();
    let handle = spawn_remediation(engine, issues, Arc::new(sink), &guard)?;

    drain_events(rx, verbose);
    handle
        .join()
        .map_err(|_| anyhow!("the remediation worker terminated abnormally"))
}

/// Print events until the worker drops its end of the channel
fn drain_events(rx: Receiver<MedicEvent>, verbose: bool) {
    for event in rx {
        match event {
            MedicEvent::Progress { text } => {
                if verbose {
                    debug!("{}", text);
                }
                ui::print_narrative(&text);
            }
            MedicEvent::Error { text } => {
                if verbose {
                    debug!("{}", text);
                }
                ui::print_err(&text);
            }
            MedicEvent::DiagnosticsFinished { .. } | MedicEvent::RemediationFinished => {}
        }
    }
}

fn describe_outcome(outcome: &RemediationOutcome) -> String {
    match &outcome.status {
        RemediationStatus::Succeeded => {
            format!("fixed after {} attempt(s)", outcome.attempts)
        }
        RemediationStatus::NoOp { reason } => format!("skipped ({})", reason),
        RemediationStatus::Failed { last_error } => {
            format!("failed after {} attempts: {}", outcome.attempts, last_error)
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Write the narrative plus the rendered report to a plain-text file
fn save_text_report(path: &Path, findings: &ProbeReport, report: &DiagnosticReport) -> Result<()> {
    let mut contents = findings.narrative();
    contents.push_str("\n\n");
    contents.push_str(&report.render());
    contents.push('\n');

    std::fs::write(path, contents)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

/// Write the structured report as pretty JSON
fn save_json_report(path: &Path, report: &DiagnosticReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))
}
