//! Core types shared by the graphdiag crates: endpoints, credential
//! candidates, probe results and the error taxonomy.

pub mod endpoint;
pub mod error;
pub mod model;
pub mod pacing;
pub mod summary;

pub use endpoint::{Endpoint, DEFAULT_PORT};
pub use error::DiagError;
pub use model::{CredentialCandidate, DiagnosticReport, ProbeOutcome, ProbeResult, SmokeCheck};
pub use summary::summarize;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
