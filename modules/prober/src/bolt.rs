//! Bolt driver behind the graph client traits, one single-connection
//! pool per session so attempts never share state.

use crate::client::{ClientError, GraphClient, GraphSession, QueryResult, Record};
use async_trait::async_trait;
use graphdiag_core::Endpoint;
use neo4rs::{query, ConfigBuilder, Graph};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct BoltClient {
    /// Target database; the server default when unset.
    pub database: Option<String>,
}

pub struct BoltSession {
    graph: Option<Graph>,
}

fn classify(message: String) -> ClientError {
    let lower = message.to_lowercase();
    if lower.contains("unauthorized") || lower.contains("authentication") || lower.contains("credentials") {
        ClientError::Auth(message)
    } else {
        ClientError::Connect(message)
    }
}

#[async_trait]
impl GraphClient for BoltClient {
    async fn connect(&self, endpoint: &Endpoint, username: &str, password: &str) -> Result<Box<dyn GraphSession>, ClientError> {
        let mut builder = ConfigBuilder::default()
            .uri(endpoint.to_string())
            .user(username)
            .password(password)
            .max_connections(1);
        if let Some(db) = &self.database {
            builder = builder.db(db.as_str());
        }
        let config = builder.build().map_err(|e| ClientError::Connect(e.to_string()))?;
        let graph = Graph::connect(config).await.map_err(|e| classify(e.to_string()))?;
        debug!(endpoint = %endpoint, username, "bolt session opened");
        Ok(Box::new(BoltSession { graph: Some(graph) }))
    }
}

#[async_trait]
impl GraphSession for BoltSession {
    async fn run(&mut self, cypher: &str) -> Result<QueryResult, ClientError> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| ClientError::Query("session already closed".to_string()))?;
        let mut stream = graph.execute(query(cypher)).await.map_err(|e| classify(e.to_string()))?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(|e| ClientError::Query(e.to_string()))? {
            let record: Record = row.to().map_err(|e| ClientError::Query(e.to_string()))?;
            rows.push(record);
        }
        Ok(QueryResult::new(rows))
    }

    async fn close(&mut self) {
        // dropping the pool closes its only connection
        if self.graph.take().is_some() {
            debug!("bolt session closed");
        }
    }
}
