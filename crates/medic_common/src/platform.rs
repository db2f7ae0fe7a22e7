//! Host command surface.
//!
//! Every OS command the probes and the remediation engine touch lives behind
//! [`SystemCommands`], one implementation per target platform. Business logic
//! references only the trait, so tests substitute canned results and a future
//! platform port swaps the implementation without touching the pipeline.

use crate::command_exec::{run_command, CommandResult};

/// OS command surface consumed by the core
pub trait SystemCommands: Send + Sync {
    /// List installed editor extensions, one `id@version` per line
    fn list_extensions(&self) -> CommandResult;

    /// Restart the editor's extension host
    fn restart_extension_host(&self) -> CommandResult;

    /// Flush the OS DNS cache
    fn flush_dns(&self) -> CommandResult;

    /// List network interfaces as a parseable table
    fn list_interfaces(&self) -> CommandResult;

    /// Set an interface's administrative state
    fn set_interface_enabled(&self, name: &str, enabled: bool) -> CommandResult;

    /// Reset the IP stack
    fn reset_ip_stack(&self) -> CommandResult;

    /// Reset the socket layer
    fn reset_winsock(&self) -> CommandResult;

    /// Schedule a host reboot after `delay_secs` with a user-visible message
    fn schedule_reboot(&self, delay_secs: u32, message: &str) -> CommandResult;
}

/// Windows command surface
pub struct WindowsCommands;

impl SystemCommands for WindowsCommands {
    fn list_extensions(&self) -> CommandResult {
        run_command("code", &["--list-extensions", "--show-versions"])
    }

    fn restart_extension_host(&self) -> CommandResult {
        run_command(
            "code",
            &["--command", "workbench.action.restartExtensionHost"],
        )
    }

    fn flush_dns(&self) -> CommandResult {
        run_command("ipconfig", &["/flushdns"])
    }

    fn list_interfaces(&self) -> CommandResult {
        run_command("netsh", &["interface", "show", "interface"])
    }

    fn set_interface_enabled(&self, name: &str, enabled: bool) -> CommandResult {
        let admin_state = if enabled {
            "admin=enabled"
        } else {
            "admin=disabled"
        };
        let name_arg = format!("name={}", name);
        run_command(
            "netsh",
            &["interface", "set", "interface", &name_arg, admin_state],
        )
    }

    fn reset_ip_stack(&self) -> CommandResult {
        run_command("netsh", &["int", "ip", "reset"])
    }

    fn reset_winsock(&self) -> CommandResult {
        run_command("netsh", &["winsock", "reset"])
    }

    fn schedule_reboot(&self, delay_secs: u32, message: &str) -> CommandResult {
        let delay = delay_secs.to_string();
        run_command("shutdown", &["/r", "/t", &delay, "/c", message])
    }
}
