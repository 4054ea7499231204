use super::outcome::Outcome;
use super::session::Session;
use crate::backend::Backend;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{error, info, warn};

/// One independent check within a suite.
#[async_trait]
pub trait Scenario<B: Backend>: Send + Sync {
    fn name(&self) -> &str;

    /// Scenarios that must have verified before this one runs.
    fn depends_on(&self) -> &[&str] {
        &[]
    }

    async fn run(&self, session: &mut Session<B>) -> Outcome;
}

/// Ordered pipeline of scenarios over one session.
pub struct Suite<B: Backend> {
    name: String,
    scenarios: Vec<Box<dyn Scenario<B>>>,
}

impl<B: Backend> Suite<B> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    pub fn with(mut self, scenario: impl Scenario<B> + 'static) -> Self {
        self.scenarios.push(Box::new(scenario));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Run every scenario in order, then close the session.
    ///
    /// The session is closed whatever the outcomes. A scenario whose
    /// dependency did not verify is skipped with a reason naming it.
    pub async fn run(&self, mut session: Session<B>) -> SuiteReport {
        let mut report = SuiteReport::new(&self.name);

        if !session.backend.is_ready().await
            && let Err(e) = session.backend.launch().await
        {
            error!(suite = %self.name, error = %e, "Backend failed to launch");
            for scenario in &self.scenarios {
                report.push(ScenarioReport {
                    name: scenario.name().to_string(),
                    status: Status::Failed,
                    detail: Some(format!("backend launch failed: {}", e)),
                    elapsed_ms: 0,
                });
            }
            report.teardown_error = session.close().await.err().map(|e| e.to_string());
            return report;
        }

        let mut verified: HashSet<String> = HashSet::new();
        for scenario in &self.scenarios {
            let name = scenario.name();
            let started = Instant::now();

            let blocked = scenario
                .depends_on()
                .iter()
                .find(|dep| !verified.contains(**dep));
            let outcome = match blocked {
                Some(dep) => Outcome::Skipped(format!("depends on '{}', which did not verify", dep)),
                None => {
                    info!(scenario = name, "Running scenario");
                    scenario.run(&mut session).await
                }
            };

            match &outcome {
                Outcome::Verified => {
                    info!(scenario = name, "Verified");
                    verified.insert(name.to_string());
                }
                Outcome::Skipped(reason) => info!(scenario = name, %reason, "Skipped"),
                Outcome::Failed(e) => warn!(scenario = name, error = %e, "Failed"),
            }

            report.push(ScenarioReport::from_outcome(
                name,
                &outcome,
                started.elapsed().as_millis() as u64,
            ));
        }

        if let Err(e) = session.close().await {
            warn!(suite = %self.name, error = %e, "Closing session failed");
            report.teardown_error = Some(e.to_string());
        }
        report
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Verified,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    fn from_outcome(name: &str, outcome: &Outcome, elapsed_ms: u64) -> Self {
        let (status, detail) = match outcome {
            Outcome::Verified => (Status::Verified, None),
            Outcome::Skipped(reason) => (Status::Skipped, Some(reason.clone())),
            Outcome::Failed(e) => (Status::Failed, Some(e.to_string())),
        };
        Self {
            name: name.to_string(),
            status,
            detail,
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub scenarios: Vec<ScenarioReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
}

impl SuiteReport {
    fn new(suite: &str) -> Self {
        Self {
            suite: suite.to_string(),
            scenarios: Vec::new(),
            teardown_error: None,
        }
    }

    fn push(&mut self, scenario: ScenarioReport) {
        self.scenarios.push(scenario);
    }

    pub fn count(&self, status: Status) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    pub fn status_of(&self, name: &str) -> Option<Status> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }

    /// No scenario failed. Skips do not count against the suite.
    pub fn is_success(&self) -> bool {
        self.count(Status::Failed) == 0
    }
}
