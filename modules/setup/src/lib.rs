//! Interactive credential helper.
//!
//! The prompt loop is an explicit state machine. Input comes from a
//! [`Prompt`] and credential checks from a [`CredentialTester`], so the
//! whole flow can be driven from a script in tests.

pub mod terminal;

use async_trait::async_trait;
use envfile::EnvKeys;
use graphdiag_core::model::CandidateSource;
use graphdiag_core::{CredentialCandidate, Endpoint, ProbeOutcome};
use prober::GraphClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Line-oriented user input. `None` means end of input.
pub trait Prompt {
    fn line(&mut self, prompt: &str) -> Option<String>;
    fn secret(&mut self, prompt: &str) -> Option<String>;
    fn say(&mut self, message: &str);
}

#[async_trait]
pub trait CredentialTester: Send + Sync {
    async fn test(&self, candidate: &CredentialCandidate) -> ProbeOutcome;
}

/// Tests candidates with the regular prober, one isolated session each.
pub struct ProbeTester<'a> {
    pub client: &'a dyn GraphClient,
    pub endpoint: Endpoint,
    pub attempt_timeout: Duration,
}

#[async_trait]
impl CredentialTester for ProbeTester<'_> {
    async fn test(&self, candidate: &CredentialCandidate) -> ProbeOutcome {
        prober::probe_one(self.client, &self.endpoint, candidate, self.attempt_timeout).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    TestCurrent,
    AwaitChoice,
    ManualEntry,
    CommonPasswordSweep,
    ConfirmSave(CredentialCandidate),
    Done,
    Exit,
}

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub current_user: String,
    pub current_password: String,
    pub env_path: PathBuf,
    pub keys: EnvKeys,
    pub common_passwords: Vec<String>,
}

impl SetupConfig {
    pub fn new(current_user: impl Into<String>, current_password: impl Into<String>) -> Self {
        SetupConfig {
            current_user: current_user.into(),
            current_password: current_password.into(),
            env_path: PathBuf::from(envfile::DEFAULT_PATH),
            keys: EnvKeys::default(),
            common_passwords: credentials::COMMON_PASSWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOutcome {
    pub verified: Option<CredentialCandidate>,
    pub saved: bool,
}

impl SetupOutcome {
    pub fn succeeded(&self) -> bool {
        self.verified.is_some()
    }
}

pub struct Wizard<'a> {
    prompt: &'a mut dyn Prompt,
    tester: &'a dyn CredentialTester,
    config: SetupConfig,
    outcome: SetupOutcome,
}

fn failure_summary(outcome: &ProbeOutcome) -> &str {
    match outcome {
        ProbeOutcome::Failure { summary, .. } => summary,
        ProbeOutcome::Success { .. } => "",
    }
}

fn describe(password: &str) -> String {
    if password.is_empty() { "empty password".to_string() } else { format!("'{}'", password) }
}

impl<'a> Wizard<'a> {
    pub fn new(prompt: &'a mut dyn Prompt, tester: &'a dyn CredentialTester, config: SetupConfig) -> Self {
        Wizard { prompt, tester, config, outcome: SetupOutcome::default() }
    }

    pub async fn run(mut self) -> SetupOutcome {
        let mut state = State::TestCurrent;
        while !matches!(state, State::Done | State::Exit) {
            debug!(?state, "setup state");
            state = self.step(state).await;
        }
        self.outcome
    }

    /// Advance the machine by one state.
    pub async fn step(&mut self, state: State) -> State {
        match state {
            State::TestCurrent => self.test_current().await,
            State::AwaitChoice => self.await_choice(),
            State::ManualEntry => self.manual_entry().await,
            State::CommonPasswordSweep => self.sweep().await,
            State::ConfirmSave(candidate) => self.confirm_save(candidate),
            terminal @ (State::Done | State::Exit) => terminal,
        }
    }

    async fn test_current(&mut self) -> State {
        if self.config.current_password.is_empty() {
            return State::AwaitChoice;
        }
        self.prompt.say("Testing current credentials...");
        let candidate = credentials::configured(&self.config.current_user, &self.config.current_password);
        match self.tester.test(&candidate).await {
            ProbeOutcome::Success { .. } => {
                self.prompt.say("Current credentials work!");
                self.outcome.verified = Some(candidate);
                State::Done
            }
            failed => {
                self.prompt.say(&format!("Current credentials failed: {}", failure_summary(&failed)));
                State::AwaitChoice
            }
        }
    }

    fn await_choice(&mut self) -> State {
        self.prompt.say("Options:\n1. Enter credentials manually\n2. Try common passwords\n3. Exit");
        let Some(choice) = self.prompt.line("Choice (1-3): ") else {
            return State::Exit;
        };
        match choice.trim() {
            "1" => State::ManualEntry,
            "2" => State::CommonPasswordSweep,
            "3" => {
                self.prompt.say("Exiting...");
                State::Exit
            }
            _ => {
                self.prompt.say("Invalid choice");
                State::AwaitChoice
            }
        }
    }

    async fn manual_entry(&mut self) -> State {
        let Some(user) = self.prompt.line(&format!("Username [{}]: ", self.config.current_user)) else {
            return State::Exit;
        };
        let user = match user.trim() {
            "" => self.config.current_user.clone(),
            u => u.to_string(),
        };
        let Some(password) = self.prompt.secret("Password: ") else {
            return State::Exit;
        };
        self.prompt.say("Testing credentials...");
        let candidate = CredentialCandidate::new(user, password, "Manual entry", CandidateSource::Manual);
        match self.tester.test(&candidate).await {
            ProbeOutcome::Success { detail } => {
                self.prompt.say(&format!("SUCCESS! {}", detail));
                State::ConfirmSave(candidate)
            }
            failed => {
                self.prompt.say(&format!("Failed: {}", failure_summary(&failed)));
                State::AwaitChoice
            }
        }
    }

    async fn sweep(&mut self) -> State {
        let user = self.config.current_user.clone();
        for password in self.config.common_passwords.clone() {
            let desc = describe(&password);
            self.prompt.say(&format!("Trying {}...", desc));
            let label = credentials::common_label(&password);
            let candidate = CredentialCandidate::new(user.clone(), password, label, CandidateSource::Common);
            match self.tester.test(&candidate).await {
                ProbeOutcome::Success { .. } => {
                    self.prompt.say(&format!("SUCCESS with {}!", desc));
                    return State::ConfirmSave(candidate);
                }
                ProbeOutcome::Failure { .. } => self.prompt.say(&format!("Failed with {}", desc)),
            }
        }
        self.prompt.say("None of the common passwords worked");
        State::AwaitChoice
    }

    fn confirm_save(&mut self, candidate: CredentialCandidate) -> State {
        let answer = self.prompt.line("Update env file with these credentials? (y/n): ").unwrap_or_default();
        if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            match envfile::update_credentials(&self.config.env_path, &self.config.keys, &candidate.username, &candidate.password) {
                Ok(_) => {
                    self.prompt.say(&format!("Updated {} with new credentials", self.config.env_path.display()));
                    self.outcome.saved = true;
                }
                Err(e) => self.prompt.say(&e.to_string()),
            }
        }
        self.outcome.verified = Some(candidate);
        State::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        input: VecDeque<String>,
        output: Vec<String>,
    }

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Scripted { input: lines.iter().map(|s| s.to_string()).collect(), output: Vec::new() }
        }

        fn said(&self, needle: &str) -> bool {
            self.output.iter().any(|l| l.contains(needle))
        }
    }

    impl Prompt for Scripted {
        fn line(&mut self, _prompt: &str) -> Option<String> {
            self.input.pop_front()
        }

        fn secret(&mut self, _prompt: &str) -> Option<String> {
            self.input.pop_front()
        }

        fn say(&mut self, message: &str) {
            self.output.push(message.to_string());
        }
    }

    struct Accepts {
        user: &'static str,
        password: &'static str,
        tried: Mutex<Vec<String>>,
    }

    impl Accepts {
        fn new(user: &'static str, password: &'static str) -> Self {
            Accepts { user, password, tried: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl CredentialTester for Accepts {
        async fn test(&self, c: &CredentialCandidate) -> ProbeOutcome {
            self.tried.lock().unwrap().push(format!("{}/{}", c.username, c.password));
            if c.username == self.user && c.password == self.password {
                ProbeOutcome::Success { detail: "Connected successfully!".into() }
            } else {
                ProbeOutcome::failure("The client is unauthorized. Neo.ClientError")
            }
        }
    }

    #[tokio::test]
    async fn working_current_credentials_finish_immediately() {
        let mut p = Scripted::new(&[]);
        let t = Accepts::new("neo4j", "good");
        let out = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", "good")).run().await;
        assert!(out.succeeded());
        assert!(!out.saved);
        assert_eq!(t.tried.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_choice_then_exit() {
        let mut p = Scripted::new(&["9", "3"]);
        let t = Accepts::new("neo4j", "good");
        let out = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", "")).run().await;
        assert!(!out.succeeded());
        assert!(p.said("Invalid choice"));
        assert!(p.said("Exiting"));
        assert!(t.tried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn eof_exits() {
        let mut p = Scripted::new(&["1"]);
        let t = Accepts::new("neo4j", "good");
        let out = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", "stale")).run().await;
        assert_eq!(out, SetupOutcome::default());
        assert!(p.said("Current credentials failed: The client is unauthorized"));
    }

    #[tokio::test]
    async fn manual_entry_failure_returns_to_menu() {
        // manual with blank username keeps current, fails, then manual again succeeds, decline save
        let mut p = Scripted::new(&["1", "", "bad", "1", "admin", "good", "n"]);
        let t = Accepts::new("admin", "good");
        let out = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", "")).run().await;
        assert_eq!(out.verified.as_ref().unwrap().username, "admin");
        assert!(!out.saved);
        assert_eq!(*t.tried.lock().unwrap(), vec!["neo4j/bad".to_string(), "admin/good".to_string()]);
    }

    #[tokio::test]
    async fn sweep_success_saves_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env = dir.path().join(".env");
        std::fs::write(&env, "NEO4J_URI=bolt://localhost:7687\nNEO4J_USER=neo4j\n").unwrap();
        let mut config = SetupConfig::new("neo4j", "");
        config.env_path = env.clone();

        let mut p = Scripted::new(&["2", "yes"]);
        let t = Accepts::new("neo4j", "test");
        let out = Wizard::new(&mut p, &t, config).run().await;
        assert!(out.saved);
        assert_eq!(out.verified.unwrap().source, CandidateSource::Common);
        // password, admin, 123456, test
        assert_eq!(t.tried.lock().unwrap().len(), 4);
        assert_eq!(
            std::fs::read_to_string(&env).unwrap(),
            "NEO4J_URI=bolt://localhost:7687\nNEO4J_USER=neo4j\nNEO4J_PASSWORD=test\n"
        );
    }

    #[tokio::test]
    async fn exhausted_sweep_returns_to_menu() {
        let mut p = Scripted::new(&["2", "3"]);
        let t = Accepts::new("neo4j", "not-in-list");
        let out = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", "")).run().await;
        assert!(!out.succeeded());
        assert!(p.said("None of the common passwords worked"));
        assert_eq!(t.tried.lock().unwrap().len(), credentials::COMMON_PASSWORDS.len());
    }

    #[tokio::test]
    async fn save_failure_still_verified() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SetupConfig::new("neo4j", "");
        config.env_path = dir.path().join("missing.env");
        let mut p = Scripted::new(&["2", "y"]);
        let t = Accepts::new("neo4j", "password");
        let out = Wizard::new(&mut p, &t, config).run().await;
        assert!(out.succeeded());
        assert!(!out.saved);
        assert!(p.said("env file not found"));
    }

    #[tokio::test]
    async fn step_is_explicit() {
        let mut p = Scripted::new(&["2"]);
        let t = Accepts::new("neo4j", "x");
        let mut w = Wizard::new(&mut p, &t, SetupConfig::new("neo4j", ""));
        assert_eq!(w.step(State::TestCurrent).await, State::AwaitChoice);
        assert_eq!(w.step(State::AwaitChoice).await, State::CommonPasswordSweep);
        assert_eq!(w.step(State::Exit).await, State::Exit);
    }
}
