//! In-memory fakes for the collaborator traits.

use crate::client::{ClientError, GraphClient, GraphSession, QueryResult, Record};
use async_trait::async_trait;
use graphdiag_core::Endpoint;
use reachability::Reachability;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Canned = Vec<(String, Result<QueryResult, String>)>;

#[derive(Default)]
pub struct FakeClient {
    accepted: HashSet<(String, String)>,
    failing_queries: HashSet<(String, String)>,
    empty: bool,
    delay: Duration,
    query_delay: Duration,
    canned: Arc<Canned>,
    pub connects: Arc<AtomicUsize>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl FakeClient {
    pub fn accepting(pairs: &[(&str, &str)]) -> Self {
        FakeClient {
            accepted: pairs.iter().map(|(u, p)| (u.to_string(), p.to_string())).collect(),
            ..Default::default()
        }
    }

    /// Connect succeeds for this pair but every query fails.
    pub fn failing_queries_for(mut self, user: &str, password: &str) -> Self {
        self.failing_queries.insert((user.to_string(), password.to_string()));
        self
    }

    pub fn empty_results(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every query on an opened session stalls this long before answering.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Queries starting with `prefix` get this answer instead of the default row.
    pub fn respond(mut self, prefix: &str, answer: Result<QueryResult, String>) -> Self {
        Arc::make_mut(&mut self.canned).push((prefix.to_string(), answer));
        self
    }

    pub fn query_log(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

pub fn row(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

struct FakeSession {
    fail: bool,
    delay: Duration,
    empty: bool,
    canned: Arc<Canned>,
    closed: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl GraphClient for FakeClient {
    async fn connect(&self, _endpoint: &Endpoint, username: &str, password: &str) -> Result<Box<dyn GraphSession>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let key = (username.to_string(), password.to_string());
        let fail = self.failing_queries.contains(&key);
        if !fail && !self.accepted.contains(&key) {
            return Err(ClientError::Auth(
                "The client is unauthorized due to authentication failure. Neo.ClientError.Security.Unauthorized".to_string(),
            ));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            fail,
            delay: self.query_delay,
            empty: self.empty,
            canned: self.canned.clone(),
            closed: self.closed.clone(),
            queries: self.queries.clone(),
        }))
    }
}

#[async_trait]
impl GraphSession for FakeSession {
    async fn run(&mut self, cypher: &str) -> Result<QueryResult, ClientError> {
        self.queries.lock().unwrap().push(cypher.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ClientError::Query("Session expired. Reconnect and retry".to_string()));
        }
        let trimmed = cypher.trim_start();
        if let Some((_, answer)) = self.canned.iter().find(|(p, _)| trimmed.starts_with(p.as_str())) {
            return answer.clone().map_err(ClientError::Query);
        }
        if self.empty {
            return Ok(QueryResult::default());
        }
        Ok(QueryResult::new(vec![row(&[("ok", Value::from(1))])]))
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeReach {
    up: bool,
    pub calls: AtomicUsize,
}

impl FakeReach {
    pub fn up() -> Self {
        FakeReach { up: true, calls: AtomicUsize::new(0) }
    }

    pub fn down() -> Self {
        FakeReach { up: false, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Reachability for FakeReach {
    async fn check(&self, _host: &str, _port: u16, _timeout: Duration) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.up
    }
}
