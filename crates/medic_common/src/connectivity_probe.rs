//! Network connectivity probe.
//!
//! Checks DNS resolution and HTTPS reachability for the service domains, then
//! HTTPS reachability for the reference landmarks. Resolution and transport
//! sit behind small traits so the probe runs against fakes in tests.

use anyhow::{Context, Result};
use std::net::ToSocketAddrs;
use std::time::Duration;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::events::EventSink;
use crate::issue::Issue;
use crate::report::ProbeReport;

/// Name resolution seam
pub trait NameResolver: Send + Sync {
    fn resolve(&self, domain: &str) -> std::result::Result<(), String>;
}

/// Resolver backed by the system's name lookup
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn resolve(&self, domain: &str) -> std::result::Result<(), String> {
        match (domain, 443u16).to_socket_addrs() {
            Ok(mut addrs) => {
                if addrs.next().is_some() {
                    Ok(())
                } else {
                    Err("resolver returned no addresses".to_string())
                }
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Outcome of an HTTPS reachability attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpCheck {
    /// The server answered with a status code
    Status(u16),
    /// The request never produced a response (timeout, refused, DNS, TLS)
    TransportError(String),
}

impl HttpCheck {
    /// Reachability classification. A 403 means the server answered and
    /// merely refused access, which is not a connectivity defect.
    pub fn reachable(&self) -> std::result::Result<(), String> {
        match self {
            HttpCheck::Status(status) if *status < 400 || *status == 403 => Ok(()),
            HttpCheck::Status(status) => Err(format!("HTTP status {}", status)),
            HttpCheck::TransportError(detail) => Err(detail.clone()),
        }
    }
}

/// HTTPS transport seam
pub trait HttpChecker: Send + Sync {
    fn check(&self, domain: &str) -> HttpCheck;
}

/// Checker backed by a blocking reqwest client with a per-request timeout
pub struct HttpsChecker {
    client: reqwest::blocking::Client,
}

impl HttpsChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTPS client")?;
        Ok(Self { client })
    }
}

impl HttpChecker for HttpsChecker {
    fn check(&self, domain: &str) -> HttpCheck {
        let url = format!("https://{}/", domain);
        match self.client.get(&url).send() {
            Ok(response) => HttpCheck::Status(response.status().as_u16()),
            Err(e) => HttpCheck::TransportError(e.to_string()),
        }
    }
}

pub struct ConnectivityProbe {
    resolver: Box<dyn NameResolver>,
    http: Box<dyn HttpChecker>,
    service_domains: Vec<String>,
    reference_domains: Vec<String>,
}

impl ConnectivityProbe {
    /// Probe over the system resolver and a real HTTPS client
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            resolver: Box::new(SystemResolver),
            http: Box::new(HttpsChecker::new(config.http_timeout())?),
            service_domains: config.service_domains.clone(),
            reference_domains: config.reference_domains.clone(),
        })
    }

    /// Probe over injected parts, for tests
    pub fn with_parts(
        resolver: Box<dyn NameResolver>,
        http: Box<dyn HttpChecker>,
        service_domains: Vec<String>,
        reference_domains: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            http,
            service_domains,
            reference_domains,
        }
    }

    /// Run every check: resolution phase, reachability phase, reference phase
    pub fn check_all(&self, sink: &dyn EventSink) -> ProbeReport {
        let mut report = ProbeReport::new();

        for domain in &self.service_domains {
            match self.resolver.resolve(domain) {
                Ok(()) => {
                    debug!("DNS ok for {}", domain);
                    report.record(sink, format!("[OK] DNS resolution succeeded for {}", domain));
                }
                Err(detail) => {
                    debug!("DNS failed for {}: {}", domain, detail);
                    report.record(sink, format!("[FAIL] DNS resolution failed for {}", domain));
                    report.issue(Issue::DnsFailure {
                        domain: domain.clone(),
                    });
                }
            }
        }

        for domain in &self.service_domains {
            match self.http.check(domain).reachable() {
                Ok(()) => {
                    report.record(sink, format!("[OK] HTTPS connection to {} succeeded", domain));
                }
                Err(detail) => {
                    report.record(
                        sink,
                        format!("[FAIL] HTTPS connection to {} failed: {}", domain, detail),
                    );
                    report.issue(Issue::HttpFailure {
                        domain: domain.clone(),
                    });
                }
            }
        }

        let mut general_issue_recorded = false;
        for domain in &self.reference_domains {
            match self.http.check(domain).reachable() {
                Ok(()) => {
                    report.record(
                        sink,
                        format!("[OK] Reference check against {} succeeded", domain),
                    );
                }
                Err(_) => {
                    report.record(
                        sink,
                        format!(
                            "[FAIL] Reference check against {} failed: possible general network problem",
                            domain
                        ),
                    );
                    // One issue per run, however many landmarks failed
                    if !general_issue_recorded {
                        report.issue(Issue::GeneralConnectivity);
                        general_issue_recorded = true;
                    }
                }
            }
        }

        report
    }
}
