//! Diagnostic pipeline.
//!
//! Runs the extension probe then the connectivity probe, merges their
//! findings, and assembles the diagnostic report. A probe that fails to
//! execute is converted into an error narrative plus a synthetic issue and
//! never aborts the other probe.

use anyhow::Result;
use chrono::Utc;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::MedicConfig;
use crate::connectivity_probe::ConnectivityProbe;
use crate::events::{EventSink, MedicEvent};
use crate::extension_probe::ExtensionProbe;
use crate::issue::Issue;
use crate::platform::SystemCommands;
use crate::report::{DiagnosticReport, ProbeReport};

pub struct DiagnosticPipeline {
    extension: ExtensionProbe,
    connectivity: ConnectivityProbe,
}

impl DiagnosticPipeline {
    pub fn new(commands: Arc<dyn SystemCommands>, config: &MedicConfig) -> Result<Self> {
        Ok(Self {
            extension: ExtensionProbe::new(commands),
            connectivity: ConnectivityProbe::new(&config.network)?,
        })
    }

    pub fn with_probes(extension: ExtensionProbe, connectivity: ConnectivityProbe) -> Self {
        Self {
            extension,
            connectivity,
        }
    }

    /// Run both probes to completion and emit `DiagnosticsFinished`.
    ///
    /// The extension probe fully completes before the connectivity probe
    /// begins; narratives and issues concatenate in invocation order.
    pub fn run(&self, sink: &dyn EventSink) -> (ProbeReport, DiagnosticReport) {
        let started_at = Utc::now();
        let mut merged = ProbeReport::new();

        merged.merge(run_probe_guarded("extension check", sink, || {
            self.extension.run(sink)
        }));
        debug!("extension probe complete");

        merged.merge(run_probe_guarded("network check", sink, || {
            self.connectivity.check_all(sink)
        }));
        debug!("connectivity probe complete");

        let report = DiagnosticReport::new(merged.issues.clone(), started_at);
        sink.emit(MedicEvent::DiagnosticsFinished {
            issues: merged.issues.clone(),
        });

        (merged, report)
    }
}

/// Run one probe, containing any unexpected failure inside its own findings
fn run_probe_guarded(
    name: &str,
    sink: &dyn EventSink,
    probe: impl FnOnce() -> ProbeReport,
) -> ProbeReport {
    match catch_unwind(AssertUnwindSafe(probe)) {
        Ok(report) => report,
        Err(payload) => {
            let detail = crate::runner::panic_detail(&payload);
            error!("{} aborted: {}", name, detail);

            let mut report = ProbeReport::new();
            report.record_error(
                sink,
                format!("[FAIL] The {} aborted unexpectedly: {}", name, detail),
            );
            report.issue(Issue::ProbeError {
                detail: format!("{} aborted: {}", name, detail),
            });
            report
        }
    }
}
