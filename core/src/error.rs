//! Error taxonomy for a diagnostic run.
//!
//! Every variant ends a run early. Authentication failures are recorded per
//! candidate as probe outcomes and never show up here.

#[derive(Debug, thiserror::Error)]
pub enum DiagError {
    #[error("unsupported URI format: {uri}")]
    UnsupportedScheme { uri: String },

    #[error("invalid port in URI: {uri}")]
    InvalidPort { uri: String },

    #[error("missing host in URI: {uri}")]
    MissingHost { uri: String },

    #[error("cannot reach {host}:{port}")]
    Unreachable { host: String, port: u16 },

    #[error("graph database driver not available: {0}")]
    DriverUnavailable(String),

    #[error("no password configured")]
    MissingPassword,
}

impl DiagError {
    /// Human-readable next steps for the fatal paths.
    pub fn remediation(&self) -> Vec<&'static str> {
        match self {
            DiagError::UnsupportedScheme { .. } | DiagError::InvalidPort { .. } | DiagError::MissingHost { .. } => {
                vec!["Use a URI of the form bolt://host[:port] in NEO4J_URI"]
            }
            DiagError::Unreachable { .. } => vec![
                "Check if Neo4j is running",
                "Verify the host and port are correct",
                "Check firewall settings",
            ],
            DiagError::DriverUnavailable(_) => {
                vec!["Rebuild with the Bolt driver enabled: cargo install graphdiag --features bolt"]
            }
            DiagError::MissingPassword => vec![
                "Set NEO4J_PASSWORD or pass --password",
                "Run `graphdiag discover` to find working credentials",
            ],
        }
    }
}
