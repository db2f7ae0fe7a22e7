//! Worker-thread execution of diagnostic and remediation runs.
//!
//! Each run executes on its own dedicated thread so the frontend stays
//! responsive while commands and network calls block. A run guard rejects a
//! second concurrent invocation of the same run type, and the thread
//! boundary contains panics so the finished event always fires.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::error;

use crate::events::{EventSink, MedicEvent};
use crate::issue::Issue;
use crate::pipeline::DiagnosticPipeline;
use crate::remediation::{RemediationEngine, RemediationOutcome};
use crate::report::{DiagnosticReport, ProbeReport};

#[derive(Error, Debug)]
pub enum MedicError {
    #[error("a {0} run is already in flight")]
    RunInFlight(&'static str),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Single-flight guard for one run type
#[derive(Default)]
pub struct RunGuard {
    in_flight: AtomicBool,
}

impl RunGuard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn try_acquire(self: &Arc<Self>) -> Option<RunPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunPermit {
                guard: Arc::clone(self),
            })
    }
}

/// Held for the lifetime of a run; released on drop, panics included
struct RunPermit {
    guard: Arc<RunGuard>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Run diagnostics on a dedicated worker thread.
///
/// Rejects the spawn when a diagnostic run is already in flight.
pub fn spawn_diagnostics(
    pipeline: DiagnosticPipeline,
    sink: Arc<dyn EventSink>,
    guard: &Arc<RunGuard>,
) -> Result<JoinHandle<(ProbeReport, DiagnosticReport)>, MedicError> {
    let permit = guard
        .try_acquire()
        .ok_or(MedicError::RunInFlight("diagnostic"))?;

    let handle = thread::Builder::new()
        .name("medic-diagnostics".to_string())
        .spawn(move || {
            let _permit = permit;
            match catch_unwind(AssertUnwindSafe(|| pipeline.run(sink.as_ref()))) {
                Ok(result) => result,
                Err(payload) => {
                    let detail = panic_detail(payload.as_ref());
                    error!("diagnostic run aborted: {}", detail);
                    sink.error(&format!("Diagnostic run aborted unexpectedly: {}", detail));

                    let issues = vec![Issue::ProbeError {
                        detail: detail.clone(),
                    }];
                    sink.emit(MedicEvent::DiagnosticsFinished {
                        issues: issues.clone(),
                    });

                    let mut findings = ProbeReport::new();
                    findings
                        .lines
                        .push(format!("[FAIL] Diagnostic run aborted unexpectedly: {}", detail));
                    findings.issues = issues.clone();
                    (findings, DiagnosticReport::new(issues, chrono::Utc::now()))
                }
            }
        })?;

    Ok(handle)
}

/// Run remediation on a dedicated worker thread.
///
/// Rejects the spawn when a remediation run is already in flight.
pub fn spawn_remediation(
    engine: RemediationEngine,
    issues: Vec<Issue>,
    sink: Arc<dyn EventSink>,
    guard: &Arc<RunGuard>,
) -> Result<JoinHandle<Vec<RemediationOutcome>>, MedicError> {
    let permit = guard
        .try_acquire()
        .ok_or(MedicError::RunInFlight("remediation"))?;

    let handle = thread::Builder::new()
        .name("medic-remediation".to_string())
        .spawn(move || {
            let _permit = permit;
            match catch_unwind(AssertUnwindSafe(|| engine.remediate(&issues, sink.as_ref()))) {
                Ok(outcomes) => outcomes,
                Err(payload) => {
                    let detail = panic_detail(payload.as_ref());
                    error!("remediation run aborted: {}", detail);
                    sink.error(&format!(
                        "Remediation run aborted unexpectedly: {}",
                        detail
                    ));
                    sink.emit(MedicEvent::RemediationFinished);
                    Vec::new()
                }
            }
        })?;

    Ok(handle)
}

/// Best-effort message from a panic payload
pub(crate) fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
