//! Medic Common - diagnostics and remediation core for the CodeGPT extension.
//!
//! Probes classify connectivity and installation problems into structured
//! issues, the pipeline aggregates them into a report, and the remediation
//! engine maps issue kinds to OS-level corrective actions with bounded
//! retry. Frontends subscribe to the event contract in [`events`]; the core
//! never references presentation types.

pub mod command_exec;
pub mod config;
pub mod connectivity_probe;
pub mod events;
pub mod extension_probe;
pub mod issue;
pub mod pipeline;
pub mod platform;
pub mod remediation;
pub mod report;
pub mod runner;

pub use config::MedicConfig;
pub use events::{ChannelSink, CollectingSink, EventSink, MedicEvent, NullSink};
pub use issue::{distinct_kinds, Issue, IssueKind};
pub use pipeline::DiagnosticPipeline;
pub use platform::{SystemCommands, WindowsCommands};
pub use remediation::{RemediationEngine, RemediationOutcome, RemediationStatus, MAX_RETRIES};
pub use report::{DiagnosticReport, ProbeReport, RECOMMENDED_ACTIONS};
pub use runner::{spawn_diagnostics, spawn_remediation, MedicError, RunGuard};
