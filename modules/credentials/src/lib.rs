//! Ordered credential candidate lists: configured credentials first, then
//! known defaults, common passwords and optional wordlists.

use anyhow::{Context, Result};
use graphdiag_core::model::CandidateSource;
use graphdiag_core::CredentialCandidate;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_USER: &str = "neo4j";

/// Factory defaults tried after the configured credentials.
pub const DEFAULTS: &[(&str, &str, &str)] = &[
    ("neo4j", "neo4j", "Default neo4j/neo4j"),
    ("neo4j", "password", "Default neo4j/password"),
];

/// Passwords commonly left on desktop and development installs.
pub const COMMON_PASSWORDS: &[&str] = &["password", "admin", "123456", "test", "neo4jpassword", "desktop", ""];

pub fn configured(user: &str, password: &str) -> CredentialCandidate {
    CredentialCandidate::new(user, password, "Current credentials", CandidateSource::Configured)
}

pub fn common_label(password: &str) -> String {
    if password.is_empty() { "Empty password".to_string() } else { format!("Common '{}'", password) }
}

/// Builder for an immutable, ordered candidate list.
#[derive(Debug, Default, Clone)]
pub struct CandidateList {
    items: Vec<CredentialCandidate>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured credentials go first. An empty password means "not configured" and is skipped.
    pub fn with_configured(mut self, user: &str, password: &str) -> Self {
        if password.is_empty() {
            debug!(user, "no configured password, skipping current credentials");
        } else {
            self.items.push(configured(user, password));
        }
        self
    }

    pub fn with_defaults(mut self) -> Self {
        for (u, p, label) in DEFAULTS {
            self.items.push(CredentialCandidate::new(*u, *p, *label, CandidateSource::Default));
        }
        self
    }

    pub fn with_common_passwords(mut self, user: &str) -> Self {
        for p in COMMON_PASSWORDS {
            self.items.push(CredentialCandidate::new(user, *p, common_label(p), CandidateSource::Common));
        }
        self
    }

    /// Extra passwords, e.g. from config. Labelled like common ones.
    pub fn with_passwords<S: AsRef<str>>(mut self, user: &str, passwords: &[S]) -> Self {
        for p in passwords {
            let p = p.as_ref();
            self.items.push(CredentialCandidate::new(user, p, common_label(p), CandidateSource::Common));
        }
        self
    }

    /// One password per line; blank lines and `#` comments are ignored.
    pub fn with_wordlist(mut self, user: &str, content: &str) -> Self {
        for (n, line) in content.lines().enumerate() {
            let w = line.trim();
            if w.is_empty() || w.starts_with('#') { continue; }
            self.items.push(CredentialCandidate::new(user, w, format!("Wordlist line {}", n + 1), CandidateSource::Wordlist));
        }
        self
    }

    pub fn with_wordlist_file(self, user: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read wordlist {}", path.display()))?;
        let before = self.items.len();
        let list = self.with_wordlist(user, &content);
        let added = &list.items[before..];
        let unique = added.iter().map(|c| c.password.as_str()).collect::<HashSet<_>>().len();
        info!(path = %path.display(), entries = added.len(), unique, "loaded wordlist");
        Ok(list)
    }

    /// Finalize, dropping repeated username/password pairs (first one wins).
    pub fn build(self) -> Vec<CredentialCandidate> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.items.len());
        for c in self.items {
            if seen.insert((c.username.clone(), c.password.clone())) {
                out.push(c);
            }
        }
        out
    }
}
