//! Text and JSON renderings of a diagnostic report.

use anyhow::Result;
use envfile::EnvKeys;
use graphdiag_core::{DiagError, DiagnosticReport, ProbeOutcome};
use std::fmt::Write;

const RULE: &str = "==================================================";

const TROUBLESHOOTING: &[&str] = &[
    "1. Verify Neo4j is running:",
    "   neo4j status",
    "2. Check Neo4j logs:",
    "   tail -f /var/log/neo4j/neo4j.log",
    "3. Reset Neo4j password:",
    "   neo4j-admin set-initial-password <new-password>",
    "4. Check Neo4j configuration:",
    "   neo4j.conf - look for server.default_listen_address",
];

pub fn header(title: &str, uri: &str, user: &str, password: &str) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{}", title);
    let _ = writeln!(s, "{}", RULE);
    let _ = writeln!(s, "URI: {}", uri);
    let _ = writeln!(s, "User: {}", user);
    let pw = if password.is_empty() { "NOT SET".to_string() } else { "*".repeat(password.chars().count()) };
    let _ = writeln!(s, "Password: {}", pw);
    s
}

pub fn text(report: &DiagnosticReport, keys: &EnvKeys, verbose: bool) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Target: {} (reachable: {})", report.endpoint.address(), if report.reachable { "yes" } else { "no" });
    for r in &report.results {
        let c = &r.candidate;
        let _ = write!(s, "Testing {} ({}:{}) ... ", c.label, c.username, c.masked_password());
        match &r.outcome {
            ProbeOutcome::Success { .. } => {
                let _ = writeln!(s, "ok ({} ms)", r.duration_ms);
            }
            ProbeOutcome::Failure { error, summary } => {
                let _ = writeln!(s, "failed: {}", if verbose { error } else { summary });
            }
        }
    }
    for c in &report.smoke {
        let _ = writeln!(s, "[{}] {}: {}", if c.ok { "ok" } else { "FAIL" }, c.name, c.detail);
    }
    let _ = writeln!(s, "{}", RULE);
    match &report.verdict {
        Some(v) => {
            let _ = writeln!(s, "Working credentials: {} ({})", v.label, v.username);
            if report.should_update_env() {
                let _ = writeln!(s, "Update your env file with:");
                let _ = writeln!(s, "{}={}", keys.user, v.username);
                let _ = writeln!(s, "{}={}", keys.password, v.password);
            }
            if report.smoke.iter().any(|c| !c.ok) {
                let _ = writeln!(s, "Connected, but some checks failed");
            }
        }
        None => {
            let _ = writeln!(s, "No working credentials found ({} tried)", report.results.len());
            let _ = writeln!(s, "Troubleshooting recommendations:");
            for line in TROUBLESHOOTING {
                let _ = writeln!(s, "{}", line);
            }
        }
    }
    let _ = writeln!(s, "(took {} ms)", report.duration_ms);
    s
}

pub fn fatal_text(err: &DiagError) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "error: {}", err);
    let _ = writeln!(s, "Possible solutions:");
    for line in err.remediation() {
        let _ = writeln!(s, "   - {}", line);
    }
    s
}

pub fn json(report: &DiagnosticReport) -> Result<String> {
    let mut v = serde_json::to_value(report)?;
    v["succeeded"] = serde_json::Value::Bool(report.succeeded());
    Ok(serde_json::to_string(&v)?)
}

pub fn fatal_json(err: &DiagError) -> Result<String> {
    let obj = serde_json::json!({
        "succeeded": false,
        "error": err.to_string(),
        "remediation": err.remediation(),
    });
    Ok(serde_json::to_string(&obj)?)
}
