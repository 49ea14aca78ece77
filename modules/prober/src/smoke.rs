//! Post-connect checks on a live session: server components, write
//! permission with cleanup, and a count of nodes under the marker label.

use crate::client::{ClientError, GraphClient, GraphSession, QueryResult};
use graphdiag_core::{CredentialCandidate, Endpoint, SmokeCheck};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_LABEL: &str = "GraphdiagProbe";

const MARKER_ID: &str = "connection_test";

/// Keep only identifier characters so the label can be spliced into Cypher.
pub fn sanitize_label(label: &str) -> String {
    let clean: String = label.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    match clean.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => clean,
        _ => DEFAULT_LABEL.to_string(),
    }
}

fn check(name: &str, ok: bool, detail: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name: name.to_string(), ok, detail: detail.into() }
}

async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T, ClientError>>) -> Result<T, ClientError> {
    timeout(limit, call).await.unwrap_or(Err(ClientError::Timeout(limit)))
}

fn components_detail(result: &QueryResult) -> String {
    let parts: Vec<String> = result
        .rows
        .iter()
        .map(|r| {
            let name = r.get("name").and_then(Value::as_str).unwrap_or("unknown");
            let version = r
                .get("versions")
                .and_then(Value::as_array)
                .and_then(|v| v.first())
                .and_then(Value::as_str)
                .unwrap_or("?");
            format!("{}: {}", name, version)
        })
        .collect();
    if parts.is_empty() { "no components reported".to_string() } else { parts.join(", ") }
}

/// Run every check in order, each query bounded by `per_query`. A failing
/// check does not stop later ones and cleanup always follows the write attempt.
pub async fn run(session: &mut dyn GraphSession, label: &str, per_query: Duration) -> Vec<SmokeCheck> {
    let label = sanitize_label(label);
    let mut checks = Vec::with_capacity(4);

    let components = bounded(per_query, session.run("CALL dbms.components() YIELD name, versions RETURN name, versions")).await;
    checks.push(match components {
        Ok(r) => check("server_components", true, components_detail(&r)),
        Err(e) => check("server_components", false, e.to_string()),
    });

    let write = format!(
        "MERGE (t:{label} {{id: '{MARKER_ID}'}}) SET t.timestamp = datetime() RETURN t.id AS id"
    );
    checks.push(match bounded(per_query, session.run(&write)).await {
        Ok(r) if r.first().is_some() => check("write", true, "write test successful"),
        Ok(_) => check("write", false, "write returned no rows"),
        Err(e) => check("write", false, e.to_string()),
    });

    let cleanup = format!("MATCH (t:{label} {{id: '{MARKER_ID}'}}) DETACH DELETE t");
    checks.push(match bounded(per_query, session.run(&cleanup)).await {
        Ok(_) => check("cleanup", true, "cleanup completed"),
        Err(e) => check("cleanup", false, e.to_string()),
    });

    let count = format!(
        "MATCH (n) WHERE any(l IN labels(n) WHERE l STARTS WITH '{label}') RETURN count(n) AS count"
    );
    checks.push(match bounded(per_query, session.run(&count)).await {
        Ok(r) => {
            let n = r.first().and_then(|row| row.get("count")).and_then(Value::as_i64).unwrap_or(0);
            check("count", true, format!("found {} existing {} nodes", n, label))
        }
        Err(e) => check("count", false, e.to_string()),
    });

    for c in &checks {
        if c.ok { debug!(check = %c.name, detail = %c.detail, "smoke check ok") } else { warn!(check = %c.name, detail = %c.detail, "smoke check failed") }
    }
    checks
}

/// Open a session for `candidate`, run the checks, close it. The connect and
/// each query are bounded by `limit`.
pub async fn run_for(
    client: &dyn GraphClient,
    endpoint: &Endpoint,
    candidate: &CredentialCandidate,
    label: &str,
    limit: Duration,
) -> Vec<SmokeCheck> {
    match bounded(limit, client.connect(endpoint, &candidate.username, &candidate.password)).await {
        Ok(mut session) => {
            let checks = run(session.as_mut(), label, limit).await;
            session.close().await;
            checks
        }
        Err(e) => vec![check("connect", false, e.to_string())],
    }
}
