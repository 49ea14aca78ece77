//! Data model for a single diagnostic run. Nothing here outlives one invocation.

use crate::endpoint::Endpoint;
use crate::summary::summarize;
use serde::Serialize;
use std::fmt;

/// Where a candidate came from; decides whether the report suggests an env update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Configured,
    Default,
    Common,
    Wordlist,
    Manual,
}

/// One username/password pair to attempt.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialCandidate {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub label: String,
    pub source: CandidateSource,
}

impl CredentialCandidate {
    pub fn new(username: impl Into<String>, password: impl Into<String>, label: impl Into<String>, source: CandidateSource) -> Self {
        CredentialCandidate { username: username.into(), password: password.into(), label: label.into(), source }
    }

    /// `*` per character, or `empty`.
    pub fn masked_password(&self) -> String {
        if self.password.is_empty() {
            "empty".to_string()
        } else {
            "*".repeat(self.password.chars().count())
        }
    }

    pub fn is_configured(&self) -> bool {
        self.source == CandidateSource::Configured
    }
}

impl fmt::Debug for CredentialCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCandidate")
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("label", &self.label)
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success { detail: String },
    Failure { error: String, summary: String },
}

impl ProbeOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        let summary = summarize(&error);
        ProbeOutcome::Failure { error, summary }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub candidate: CredentialCandidate,
    pub outcome: ProbeOutcome,
    pub duration_ms: u64,
}

impl ProbeResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }

    pub fn error_summary(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Failure { summary, .. } => Some(summary),
            ProbeOutcome::Success { .. } => None,
        }
    }
}

/// Outcome of one post-connect check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeCheck {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub endpoint: Endpoint,
    pub reachable: bool,
    pub results: Vec<ProbeResult>,
    pub verdict: Option<CredentialCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub smoke: Vec<SmokeCheck>,
    pub started_at: String,
    pub duration_ms: u64,
}

impl DiagnosticReport {
    pub fn new(endpoint: Endpoint, reachable: bool) -> Self {
        DiagnosticReport {
            endpoint,
            reachable,
            results: Vec::new(),
            verdict: None,
            smoke: Vec::new(),
            started_at: String::new(),
            duration_ms: 0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.verdict.is_some() && self.smoke.iter().all(|c| c.ok)
    }

    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }

    /// True when the working credentials differ from the configured ones.
    pub fn should_update_env(&self) -> bool {
        self.verdict.as_ref().is_some_and(|v| !v.is_configured())
    }
}
