//! End-to-end diagnostic scenarios over fake probes.
//!
//! Covers the headline scenarios: missing extension, clean machine, single
//! DNS failure, and the event stream the frontend consumes.

use std::collections::HashSet;
use std::sync::Arc;

use medic_common::command_exec::{CommandResult, ExecutionStatus};
use medic_common::connectivity_probe::{ConnectivityProbe, HttpCheck, HttpChecker, NameResolver};
use medic_common::events::{CollectingSink, MedicEvent};
use medic_common::extension_probe::ExtensionProbe;
use medic_common::issue::{Issue, IssueKind};
use medic_common::pipeline::DiagnosticPipeline;
use medic_common::platform::SystemCommands;

const SERVICE_DOMAINS: &[&str] = &[
    "api.codegpt.co",
    "storage.codegpt.co",
    "api.github.com",
    "github.com",
];
const REFERENCE_DOMAINS: &[&str] = &["google.com", "microsoft.com"];

/// Command surface whose extension inventory is scripted
struct FakeCommands {
    inventory: String,
}

fn ok(stdout: &str) -> CommandResult {
    CommandResult {
        command: String::new(),
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
        duration_ms: 0,
        status: ExecutionStatus::Success,
    }
}

impl SystemCommands for FakeCommands {
    fn list_extensions(&self) -> CommandResult {
        ok(&self.inventory)
    }

    fn restart_extension_host(&self) -> CommandResult {
        ok("")
    }

    fn flush_dns(&self) -> CommandResult {
        ok("")
    }

    fn list_interfaces(&self) -> CommandResult {
        ok("")
    }

    fn set_interface_enabled(&self, _name: &str, _enabled: bool) -> CommandResult {
        ok("")
    }

    fn reset_ip_stack(&self) -> CommandResult {
        ok("")
    }

    fn reset_winsock(&self) -> CommandResult {
        ok("")
    }

    fn schedule_reboot(&self, _delay_secs: u32, _message: &str) -> CommandResult {
        ok("")
    }
}

struct FakeResolver {
    failing: HashSet<String>,
}

impl NameResolver for FakeResolver {
    fn resolve(&self, domain: &str) -> Result<(), String> {
        if self.failing.contains(domain) {
            Err("name or service not known".to_string())
        } else {
            Ok(())
        }
    }
}

struct AllOkHttp;

impl HttpChecker for AllOkHttp {
    fn check(&self, _domain: &str) -> HttpCheck {
        HttpCheck::Status(200)
    }
}

fn pipeline(inventory: &str, failing_dns: &[&str]) -> DiagnosticPipeline {
    let extension = ExtensionProbe::new(Arc::new(FakeCommands {
        inventory: inventory.to_string(),
    }));
    let connectivity = ConnectivityProbe::with_parts(
        Box::new(FakeResolver {
            failing: failing_dns.iter().map(|d| d.to_string()).collect(),
        }),
        Box::new(AllOkHttp),
        SERVICE_DOMAINS.iter().map(|d| d.to_string()).collect(),
        REFERENCE_DOMAINS.iter().map(|d| d.to_string()).collect(),
    );
    DiagnosticPipeline::with_probes(extension, connectivity)
}

const HEALTHY_INVENTORY: &str = "DanielSanMedium.dscodegpt@3.4.16\nms-python.python@2024.2.1\n";

#[test]
fn no_marker_in_inventory_yields_extension_not_installed() {
    let sink = CollectingSink::new();
    let (findings, report) = pipeline("ms-python.python@2024.2.1\n", &[]).run(&sink);

    assert!(findings
        .issues
        .iter()
        .any(|i| *i == Issue::ExtensionNotInstalled));
    assert!(report.has_issues());
}

#[test]
fn clean_machine_yields_zero_issues_and_all_success_narrative() {
    let sink = CollectingSink::new();
    let (findings, report) = pipeline(HEALTHY_INVENTORY, &[]).run(&sink);

    assert!(findings.issues.is_empty(), "issues: {:?}", findings.issues);
    assert!(!report.has_issues());
    assert!(report.recommended_actions.is_empty());
    assert!(findings
        .lines
        .iter()
        .all(|l| !l.starts_with("[FAIL]")), "narrative: {:?}", findings.lines);
    assert!(report.render().contains("No problems detected"));
}

#[test]
fn single_dns_failure_yields_exactly_that_issue() {
    let sink = CollectingSink::new();
    let (findings, _) = pipeline(HEALTHY_INVENTORY, &["storage.codegpt.co"]).run(&sink);

    assert_eq!(
        findings.issues,
        vec![Issue::DnsFailure {
            domain: "storage.codegpt.co".to_string()
        }]
    );
    assert!(findings
        .lines
        .iter()
        .any(|l| l.starts_with("[FAIL]") && l.contains("storage.codegpt.co")));
}

#[test]
fn no_issue_is_fabricated_for_a_healthy_domain() {
    let sink = CollectingSink::new();
    let (findings, _) = pipeline(HEALTHY_INVENTORY, &["api.codegpt.co"]).run(&sink);

    for issue in &findings.issues {
        match issue {
            Issue::DnsFailure { domain } | Issue::HttpFailure { domain } => {
                assert_eq!(domain, "api.codegpt.co");
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }
}

#[test]
fn event_stream_ends_with_a_single_finished_event() {
    let sink = CollectingSink::new();
    let (findings, _) = pipeline(HEALTHY_INVENTORY, &["github.com"]).run(&sink);

    let events = sink.events();
    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, MedicEvent::DiagnosticsFinished { .. }))
        .collect();
    assert_eq!(finished.len(), 1);
    assert!(matches!(
        events.last().unwrap(),
        MedicEvent::DiagnosticsFinished { .. }
    ));

    // Every narrative line was emitted as progress before the finish
    assert_eq!(sink.progress_lines(), findings.lines);
    assert_eq!(
        findings.issues.iter().map(Issue::kind).collect::<Vec<_>>(),
        vec![IssueKind::DnsFailure]
    );
}
