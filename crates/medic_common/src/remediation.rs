//! Remediation engine.
//!
//! Maps issue kinds to corrective actions, executes them through the host
//! command surface with bounded retry, and reports per-kind outcomes. One
//! action runs per distinct kind, however many issues of that kind the
//! diagnostic run produced.

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::events::{EventSink, MedicEvent};
use crate::issue::{distinct_kinds, Issue, IssueKind};
use crate::platform::SystemCommands;

/// Maximum attempts per remediation action within one run
pub const MAX_RETRIES: u32 = 3;

/// Terminal state of one remediation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemediationStatus {
    /// The action applied and its commands exited zero
    Succeeded,
    /// Nothing to do; not a failure and no retry consumed
    NoOp { reason: String },
    /// Every attempt failed
    Failed { last_error: String },
}

/// Per-kind remediation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub kind: IssueKind,
    pub status: RemediationStatus,
    pub attempts: u32,
}

impl RemediationOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(
            self.status,
            RemediationStatus::Succeeded | RemediationStatus::NoOp { .. }
        )
    }
}

/// What applying an action accomplished
enum ActionEffect {
    Applied,
    Nothing(String),
}

pub struct RemediationEngine {
    commands: Arc<dyn SystemCommands>,
}

impl RemediationEngine {
    pub fn new(commands: Arc<dyn SystemCommands>) -> Self {
        Self { commands }
    }

    /// Apply corrective actions for the given issues.
    ///
    /// Kinds are processed in first-seen order. An action that exhausts its
    /// retry budget is recorded and never aborts the rest of the batch; the
    /// finished event fires regardless of outcomes.
    pub fn remediate(&self, issues: &[Issue], sink: &dyn EventSink) -> Vec<RemediationOutcome> {
        let mut outcomes = Vec::new();

        for kind in distinct_kinds(issues) {
            outcomes.push(self.remediate_kind(kind, sink));
        }

        sink.emit(MedicEvent::RemediationFinished);
        outcomes
    }

    fn remediate_kind(&self, kind: IssueKind, sink: &dyn EventSink) -> RemediationOutcome {
        let action = match kind {
            IssueKind::DnsFailure => "DNS cache flush",
            IssueKind::HttpFailure => "network adapter reconfiguration",
            IssueKind::GeneralConnectivity => "network stack reset",
            IssueKind::ExtensionNotInstalled | IssueKind::ProbeError => {
                sink.progress(&format!(
                    "No automated fix for {}; see the recommended actions",
                    kind
                ));
                return RemediationOutcome {
                    kind,
                    status: RemediationStatus::NoOp {
                        reason: "no automated remediation for this issue kind".to_string(),
                    },
                    attempts: 0,
                };
            }
        };

        info!("remediating {} via {}", kind, action);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = match kind {
                IssueKind::DnsFailure => self.flush_dns_cache(sink),
                IssueKind::HttpFailure => self.reconfigure_network_adapter(sink),
                IssueKind::GeneralConnectivity => self.reset_network_stack(sink),
                _ => unreachable!("unmapped kinds returned above"),
            };

            match result {
                Ok(ActionEffect::Applied) => {
                    return RemediationOutcome {
                        kind,
                        status: RemediationStatus::Succeeded,
                        attempts,
                    };
                }
                Ok(ActionEffect::Nothing(reason)) => {
                    return RemediationOutcome {
                        kind,
                        status: RemediationStatus::NoOp { reason },
                        attempts,
                    };
                }
                Err(e) => {
                    warn!("{} attempt {} failed: {}", action, attempts, e);
                    if attempts < MAX_RETRIES {
                        sink.progress(&format!(
                            "Retrying (attempt {}/{})...",
                            attempts, MAX_RETRIES
                        ));
                    } else {
                        sink.error(&format!(
                            "{} failed after {} attempts: {}",
                            action, MAX_RETRIES, e
                        ));
                        return RemediationOutcome {
                            kind,
                            status: RemediationStatus::Failed {
                                last_error: e.to_string(),
                            },
                            attempts,
                        };
                    }
                }
            }
        }
    }

    /// Flush the OS DNS cache
    fn flush_dns_cache(&self, sink: &dyn EventSink) -> Result<ActionEffect> {
        sink.progress("Flushing the DNS cache...");
        let result = self.commands.flush_dns();
        if !result.success() {
            bail!("DNS cache flush failed: {}", result.error_summary());
        }

        sink.progress("[OK] DNS cache flushed");
        Ok(ActionEffect::Applied)
    }

    /// Disable then re-enable the first enabled, non-virtual adapter
    fn reconfigure_network_adapter(&self, sink: &dyn EventSink) -> Result<ActionEffect> {
        sink.progress("Reconfiguring the network adapter...");

        let listing = self.commands.list_interfaces();
        if !listing.success() {
            bail!("interface listing failed: {}", listing.error_summary());
        }

        let adapter = match first_enabled_adapter(&listing.stdout) {
            Some(name) => name,
            None => {
                warn!("no enabled non-virtual adapter found");
                sink.progress("[WARN] No active network adapter found to reconfigure");
                return Ok(ActionEffect::Nothing(
                    "no suitable network adapter".to_string(),
                ));
            }
        };

        sink.progress(&format!("Disabling network adapter '{}'...", adapter));
        let down = self.commands.set_interface_enabled(&adapter, false);
        if !down.success() {
            bail!("disabling '{}' failed: {}", adapter, down.error_summary());
        }

        sink.progress(&format!("Enabling network adapter '{}'...", adapter));
        let up = self.commands.set_interface_enabled(&adapter, true);
        if !up.success() {
            bail!("enabling '{}' failed: {}", adapter, up.error_summary());
        }

        sink.progress("[OK] Network adapter reconfigured");
        Ok(ActionEffect::Applied)
    }

    /// Reset the IP stack and socket layer, then bounce the adapter
    fn reset_network_stack(&self, sink: &dyn EventSink) -> Result<ActionEffect> {
        sink.progress("Resetting the network stack...");

        let ip = self.commands.reset_ip_stack();
        if !ip.success() {
            bail!("IP stack reset failed: {}", ip.error_summary());
        }

        let winsock = self.commands.reset_winsock();
        if !winsock.success() {
            bail!("Winsock reset failed: {}", winsock.error_summary());
        }

        sink.progress("[OK] Network stack reset");

        // Follow-up bounce; a missing adapter does not undo the resets
        self.reconfigure_network_adapter(sink)?;
        Ok(ActionEffect::Applied)
    }
}

/// First enabled, non-virtual interface name from the interface table.
///
/// Expects rows of the shape
/// `Enabled        Connected      Dedicated        Wi-Fi`.
fn first_enabled_adapter(listing: &str) -> Option<String> {
    let row = Regex::new(r"^\s*Enabled\s+\S+\s+\S+\s+(.+?)\s*$").unwrap();

    listing.lines().find_map(|line| {
        let name = row.captures(line)?.get(1)?.as_str().to_string();
        if name.contains("Virtual") {
            None
        } else {
            Some(name)
        }
    })
}
