//! Issue classification for diagnostic findings.
//!
//! Probes produce issues, the remediation engine consumes them by kind.
//! Matching is structural; no substring inspection anywhere.

use serde::{Deserialize, Serialize};

/// A classified failure condition detected during diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The CodeGPT extension is not present in the editor inventory
    ExtensionNotInstalled,
    /// DNS resolution failed for a service domain
    DnsFailure { domain: String },
    /// HTTPS reachability failed for a service domain
    HttpFailure { domain: String },
    /// A reference domain was unreachable - the machine likely has no internet
    GeneralConnectivity,
    /// A probe failed to execute at all
    ProbeError { detail: String },
}

/// Kind-level view of an issue, used for remediation dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ExtensionNotInstalled,
    DnsFailure,
    HttpFailure,
    GeneralConnectivity,
    ProbeError,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ExtensionNotInstalled => "extension not installed",
            IssueKind::DnsFailure => "DNS resolution failure",
            IssueKind::HttpFailure => "HTTP connectivity failure",
            IssueKind::GeneralConnectivity => "general network connectivity failure",
            IssueKind::ProbeError => "diagnostic probe failure",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Issue {
    pub fn kind(&self) -> IssueKind {
        match self {
            Issue::ExtensionNotInstalled => IssueKind::ExtensionNotInstalled,
            Issue::DnsFailure { .. } => IssueKind::DnsFailure,
            Issue::HttpFailure { .. } => IssueKind::HttpFailure,
            Issue::GeneralConnectivity => IssueKind::GeneralConnectivity,
            Issue::ProbeError { .. } => IssueKind::ProbeError,
        }
    }

    /// Human-readable description used in the diagnostic report
    pub fn describe(&self) -> String {
        match self {
            Issue::ExtensionNotInstalled => "CodeGPT extension is not installed".to_string(),
            Issue::DnsFailure { domain } => format!("DNS resolution problem with {}", domain),
            Issue::HttpFailure { domain } => format!("HTTP connectivity problem with {}", domain),
            Issue::GeneralConnectivity => {
                "General network connectivity problems detected".to_string()
            }
            Issue::ProbeError { detail } => format!("Diagnostic probe failed: {}", detail),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Distinct issue kinds in first-seen order.
///
/// The remediation engine triggers one action per kind, not per issue, so
/// two failing service domains still reconfigure the adapter only once.
pub fn distinct_kinds(issues: &[Issue]) -> Vec<IssueKind> {
    let mut kinds = Vec::new();
    for issue in issues {
        let kind = issue.kind();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let issue = Issue::DnsFailure {
            domain: "api.codegpt.co".to_string(),
        };
        assert_eq!(issue.kind(), IssueKind::DnsFailure);
        assert!(issue.describe().contains("api.codegpt.co"));
    }

    #[test]
    fn test_distinct_kinds_preserves_first_seen_order() {
        let issues = vec![
            Issue::HttpFailure {
                domain: "github.com".to_string(),
            },
            Issue::DnsFailure {
                domain: "api.codegpt.co".to_string(),
            },
            Issue::HttpFailure {
                domain: "api.github.com".to_string(),
            },
            Issue::GeneralConnectivity,
        ];

        let kinds = distinct_kinds(&issues);
        assert_eq!(
            kinds,
            vec![
                IssueKind::HttpFailure,
                IssueKind::DnsFailure,
                IssueKind::GeneralConnectivity,
            ]
        );
    }

    #[test]
    fn test_issue_serialization_is_tagged() {
        let issue = Issue::HttpFailure {
            domain: "storage.codegpt.co".to_string(),
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("http_failure"));
        assert!(json.contains("storage.codegpt.co"));

        let back: Issue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issue);
    }
}
