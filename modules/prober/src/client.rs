//! Graph client collaborator. The prober only needs connect / run / close,
//! so any driver (or a test fake) can stand behind these traits.

use async_trait::async_trait;
use graphdiag_core::{DiagError, Endpoint};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Query(String),

    #[error("Timed out after {0:?}. The server did not answer in time")]
    Timeout(Duration),

    #[error("Driver unavailable. {0}")]
    Unavailable(String),
}

/// One row, keyed by column name.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Record>,
}

impl QueryResult {
    pub fn new(rows: Vec<Record>) -> Self {
        QueryResult { rows }
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }
}

/// An authenticated session. Owned by exactly one probe attempt.
#[async_trait]
pub trait GraphSession: Send {
    async fn run(&mut self, cypher: &str) -> Result<QueryResult, ClientError>;

    async fn close(&mut self);
}

#[async_trait]
pub trait GraphClient: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint, username: &str, password: &str) -> Result<Box<dyn GraphSession>, ClientError>;

    /// Checked once per run before any candidate is tried.
    fn ensure_available(&self) -> Result<(), DiagError> {
        Ok(())
    }
}

/// Stand-in used when the binary is built without a driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClient;

const UNAVAILABLE: &str = "built without the bolt feature";

#[async_trait]
impl GraphClient for UnavailableClient {
    async fn connect(&self, _endpoint: &Endpoint, _username: &str, _password: &str) -> Result<Box<dyn GraphSession>, ClientError> {
        Err(ClientError::Unavailable(UNAVAILABLE.to_string()))
    }

    fn ensure_available(&self) -> Result<(), DiagError> {
        Err(DiagError::DriverUnavailable(UNAVAILABLE.to_string()))
    }
}

/// The driver compiled into this build.
pub fn default_client() -> Box<dyn GraphClient> {
    #[cfg(feature = "bolt")]
    {
        Box::new(crate::bolt::BoltClient::default())
    }
    #[cfg(not(feature = "bolt"))]
    {
        Box::new(UnavailableClient)
    }
}
