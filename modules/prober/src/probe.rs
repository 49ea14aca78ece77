//! Sequential credential probing with short-circuit on the first live session.

use crate::client::{ClientError, GraphClient};
use graphdiag_core::pacing::Pacer;
use graphdiag_core::{CredentialCandidate, DiagError, DiagnosticReport, Endpoint, ProbeOutcome, ProbeResult};
use reachability::Reachability;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::time::timeout_at;
use tracing::{debug, info, warn};

/// Confirms the session is live, not merely connected.
pub const LIVENESS_QUERY: &str = "RETURN 1 AS ok";

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Bound on connect + liveness query for one candidate.
    pub attempt_timeout: Duration,
    /// Gap between consecutive attempts.
    pub pacing: Duration,
    /// Bound on the TCP reachability check.
    pub reach_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            attempt_timeout: Duration::from_secs(10),
            pacing: Duration::from_millis(100),
            reach_timeout: reachability::DEFAULT_TIMEOUT,
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

/// Try one candidate on a fresh session. Never returns an error: every
/// collaborator failure becomes a `Failure` outcome. The session is closed
/// on every path that opened one.
pub async fn probe_one(client: &dyn GraphClient, endpoint: &Endpoint, candidate: &CredentialCandidate, attempt_timeout: Duration) -> ProbeOutcome {
    let deadline = tokio::time::Instant::now() + attempt_timeout;
    let mut session = match timeout_at(deadline, client.connect(endpoint, &candidate.username, &candidate.password)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return ProbeOutcome::failure(e.to_string()),
        Err(_) => return ProbeOutcome::failure(ClientError::Timeout(attempt_timeout).to_string()),
    };
    let outcome = match timeout_at(deadline, session.run(LIVENESS_QUERY)).await {
        Ok(Ok(result)) => match result.first() {
            Some(_) => ProbeOutcome::Success { detail: format!("{} succeeded", LIVENESS_QUERY) },
            None => ProbeOutcome::failure("Liveness query returned no rows"),
        },
        Ok(Err(e)) => ProbeOutcome::failure(e.to_string()),
        Err(_) => ProbeOutcome::failure(ClientError::Timeout(attempt_timeout).to_string()),
    };
    session.close().await;
    outcome
}

/// Probe candidates strictly in order and stop at the first success.
/// The returned report holds one result per candidate actually tried.
pub async fn probe(client: &dyn GraphClient, endpoint: &Endpoint, candidates: &[CredentialCandidate], opts: &ProbeOptions) -> DiagnosticReport {
    let started = Instant::now();
    let mut report = DiagnosticReport::new(endpoint.clone(), true);
    report.started_at = now_rfc3339();
    let mut pacer = Pacer::new(opts.pacing);

    for candidate in candidates {
        pacer.wait().await;
        debug!(label = %candidate.label, username = %candidate.username, "probing candidate");
        let attempt = Instant::now();
        let outcome = probe_one(client, endpoint, candidate, opts.attempt_timeout).await;
        let duration_ms = attempt.elapsed().as_millis() as u64;
        let hit = matches!(outcome, ProbeOutcome::Success { .. });
        if let ProbeOutcome::Failure { summary, .. } = &outcome {
            debug!(label = %candidate.label, %summary, "candidate failed");
        }
        report.results.push(ProbeResult { candidate: candidate.clone(), outcome, duration_ms });
        if hit {
            info!(label = %candidate.label, username = %candidate.username, "working credentials found");
            report.verdict = Some(candidate.clone());
            break;
        }
    }
    if report.verdict.is_none() {
        info!(tried = report.results.len(), "no candidate authenticated");
    }
    report.duration_ms = started.elapsed().as_millis() as u64;
    report
}

/// Parse, check reachability, then probe. Only parse, reachability and
/// driver problems come back as errors.
pub async fn diagnose(
    client: &dyn GraphClient,
    reach: &dyn Reachability,
    uri: &str,
    candidates: &[CredentialCandidate],
    opts: &ProbeOptions,
) -> Result<DiagnosticReport, DiagError> {
    let started = Instant::now();
    let endpoint = Endpoint::parse(uri)?;
    if !reach.check(&endpoint.host, endpoint.port, opts.reach_timeout).await {
        warn!(host = %endpoint.host, port = endpoint.port, "endpoint unreachable");
        return Err(DiagError::Unreachable { host: endpoint.host, port: endpoint.port });
    }
    client.ensure_available()?;
    let mut report = probe(client, &endpoint, candidates, opts).await;
    report.duration_ms = started.elapsed().as_millis() as u64;
    Ok(report)
}
