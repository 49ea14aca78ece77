//! Credential probing against a graph database: try candidates in order on
//! isolated sessions, stop at the first that answers a liveness query.

#[cfg(feature = "bolt")]
pub mod bolt;
pub mod client;
pub mod probe;
pub mod smoke;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{default_client, ClientError, GraphClient, GraphSession, QueryResult, Record, UnavailableClient};
pub use probe::{diagnose, probe, probe_one, ProbeOptions, LIVENESS_QUERY};
