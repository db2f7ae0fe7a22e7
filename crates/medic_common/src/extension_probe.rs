//! Extension inventory probe.
//!
//! Asks the editor for its installed extensions and looks for the CodeGPT
//! marker. A missing or failing inventory tool is treated as "no extensions
//! installed", never as a fatal error.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::events::EventSink;
use crate::issue::Issue;
use crate::platform::SystemCommands;
use crate::report::ProbeReport;

/// Case-insensitive marker identifying the extension in inventory records
pub const EXTENSION_MARKER: &str = "codegpt";

pub struct ExtensionProbe {
    commands: Arc<dyn SystemCommands>,
}

impl ExtensionProbe {
    pub fn new(commands: Arc<dyn SystemCommands>) -> Self {
        Self { commands }
    }

    /// Installed extension records, one `id@version` per entry
    fn inventory(&self) -> Vec<String> {
        let result = self.commands.list_extensions();
        if !result.success() {
            warn!(
                "extension inventory unavailable: {}",
                result.error_summary()
            );
            return Vec::new();
        }

        result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    /// First inventory record containing the marker, version suffix stripped
    pub fn find_extension_id(&self) -> Option<String> {
        let marker = EXTENSION_MARKER;
        self.inventory()
            .iter()
            .find(|record| record.to_lowercase().contains(marker))
            .map(|record| record.split('@').next().unwrap_or(record).to_string())
    }

    /// Every inventory record containing the identifier
    pub fn list_installed(&self, id: &str) -> Vec<String> {
        self.inventory()
            .into_iter()
            .filter(|record| record.contains(id))
            .collect()
    }

    pub fn run(&self, sink: &dyn EventSink) -> ProbeReport {
        let mut report = ProbeReport::new();

        match self.find_extension_id() {
            Some(id) => {
                debug!("CodeGPT extension found: {}", id);
                let installed = self.list_installed(&id);
                if installed.is_empty() {
                    report.record(sink, "[FAIL] No CodeGPT extensions found".to_string());
                    report.issue(Issue::ExtensionNotInstalled);
                } else {
                    report.record(sink, "[OK] CodeGPT extensions installed:".to_string());
                    for record in &installed {
                        report.record(sink, format!("  - {}", record));
                    }
                }
            }
            None => {
                report.record(
                    sink,
                    "[FAIL] Could not find the CodeGPT extension".to_string(),
                );
                report.issue(Issue::ExtensionNotInstalled);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::{CommandResult, ExecutionStatus};
    use crate::events::CollectingSink;
    use crate::issue::IssueKind;

    struct FakeCommands {
        inventory: CommandResult,
    }

    impl FakeCommands {
        fn with_inventory(stdout: &str) -> Self {
            Self {
                inventory: ok_result("code --list-extensions --show-versions", stdout),
            }
        }

        fn tool_missing() -> Self {
            Self {
                inventory: CommandResult {
                    command: "code --list-extensions --show-versions".to_string(),
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: "OS error: program not found".to_string(),
                    duration_ms: 0,
                    status: ExecutionStatus::CommandNotFound,
                },
            }
        }
    }

    fn ok_result(command: &str, stdout: &str) -> CommandResult {
        CommandResult {
            command: command.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            duration_ms: 1,
            status: ExecutionStatus::Success,
        }
    }

    impl SystemCommands for FakeCommands {
        fn list_extensions(&self) -> CommandResult {
            self.inventory.clone()
        }

        fn restart_extension_host(&self) -> CommandResult {
            ok_result("code --command workbench.action.restartExtensionHost", "")
        }

        fn flush_dns(&self) -> CommandResult {
            ok_result("ipconfig /flushdns", "")
        }

        fn list_interfaces(&self) -> CommandResult {
            ok_result("netsh interface show interface", "")
        }

        fn set_interface_enabled(&self, _name: &str, _enabled: bool) -> CommandResult {
            ok_result("netsh interface set interface", "")
        }

        fn reset_ip_stack(&self) -> CommandResult {
            ok_result("netsh int ip reset", "")
        }

        fn reset_winsock(&self) -> CommandResult {
            ok_result("netsh winsock reset", "")
        }

        fn schedule_reboot(&self, _delay_secs: u32, _message: &str) -> CommandResult {
            ok_result("shutdown /r", "")
        }
    }

    const INVENTORY: &str = "ms-python.python@2024.2.1\nDanielSanMedium.dscodegpt@3.4.16\nrust-lang.rust-analyzer@0.3.1850\n";

    #[test]
    fn test_find_extension_id_strips_version() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::with_inventory(INVENTORY)));
        assert_eq!(
            probe.find_extension_id(),
            Some("DanielSanMedium.dscodegpt".to_string())
        );
    }

    #[test]
    fn test_find_extension_id_is_idempotent() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::with_inventory(INVENTORY)));
        assert_eq!(probe.find_extension_id(), probe.find_extension_id());
    }

    #[test]
    fn test_marker_match_is_case_insensitive() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::with_inventory(
            "Publisher.CodeGPT-Chat@1.0.0\n",
        )));
        assert_eq!(
            probe.find_extension_id(),
            Some("Publisher.CodeGPT-Chat".to_string())
        );
    }

    #[test]
    fn test_missing_tool_downgrades_to_not_found() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::tool_missing()));
        assert_eq!(probe.find_extension_id(), None);

        let sink = CollectingSink::new();
        let report = probe.run(&sink);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind(), IssueKind::ExtensionNotInstalled);
    }

    #[test]
    fn test_no_marker_emits_extension_not_installed() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::with_inventory(
            "ms-python.python@2024.2.1\n",
        )));
        let sink = CollectingSink::new();
        let report = probe.run(&sink);

        assert_eq!(report.issues, vec![Issue::ExtensionNotInstalled]);
        assert!(report.narrative().contains("Could not find"));
    }

    #[test]
    fn test_installed_extension_yields_success_narrative() {
        let probe = ExtensionProbe::new(Arc::new(FakeCommands::with_inventory(INVENTORY)));
        let sink = CollectingSink::new();
        let report = probe.run(&sink);

        assert!(report.issues.is_empty());
        assert!(report.narrative().contains("[OK] CodeGPT extensions installed"));
        assert!(report
            .narrative()
            .contains("DanielSanMedium.dscodegpt@3.4.16"));
        assert_eq!(sink.progress_lines().len(), report.lines.len());
    }
}
