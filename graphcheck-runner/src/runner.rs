//! Randomized scenario runner

use crate::context::ScenarioContext;
use crate::error::{RunnerError, ScenarioError};
use crate::report::{Outcome, RunReport, ScenarioRecord};
use crate::scenario::Scenario;
use chrono::Utc;
use graphcheck_config::ScenarioConfig;
use graphcheck_http::HttpClient;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Connecting,
    Running,
    Reporting,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Shuffle seed; drawn from OS entropy when absent
    pub seed: Option<u64>,
    /// Substring a scenario name must contain to be selected
    pub filter: Option<String>,
    pub strict: bool,
}

impl From<&ScenarioConfig> for RunnerOptions {
    fn from(config: &ScenarioConfig) -> Self {
        Self {
            seed: config.seed,
            filter: config.filter.clone(),
            strict: config.strict,
        }
    }
}

pub struct ScenarioRunner {
    client: Arc<dyn HttpClient>,
    scenarios: Vec<Box<dyn Scenario>>,
    options: RunnerOptions,
    state: RunnerState,
}

impl ScenarioRunner {
    pub fn new(
        client: Arc<dyn HttpClient>,
        scenarios: Vec<Box<dyn Scenario>>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            client,
            scenarios,
            options,
            state: RunnerState::Idle,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    fn transition(&mut self, next: RunnerState) {
        debug!("Runner state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Probe the target, run the selected scenarios in shuffled order and
    /// build the report. Only an unreachable target (or a filter selecting
    /// nothing) ends the run without a report.
    pub async fn run(&mut self) -> Result<RunReport, RunnerError> {
        let started_at = Utc::now();

        self.transition(RunnerState::Connecting);
        if let Err(e) = self.client.probe().await {
            error!("Target probe failed: {}", e);
            self.transition(RunnerState::Aborted);
            return Err(e.into());
        }

        self.transition(RunnerState::Running);
        let seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        let order = self.execution_order(seed);
        if order.is_empty() {
            self.transition(RunnerState::Aborted);
            return Err(RunnerError::NoScenarios {
                filter: self.options.filter.clone(),
            });
        }
        info!("Running {} scenarios with seed {}", order.len(), seed);

        let mut records = Vec::with_capacity(order.len());
        for index in order {
            let scenario = self.scenarios[index].as_ref();
            match run_scenario(self.client.clone(), scenario).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("Target became unreachable during {}: {}", scenario.name(), e);
                    self.transition(RunnerState::Aborted);
                    return Err(RunnerError::Unreachable(e.to_string()));
                }
            }
        }

        self.transition(RunnerState::Reporting);
        let report = RunReport::new(seed, self.options.strict, started_at, records);
        info!(
            "Run finished: {} passed, {} failed ({} expected)",
            report.counts.passed, report.counts.failed, report.counts.expected_failures
        );

        self.transition(RunnerState::Done);
        Ok(report)
    }

    /// Indices of the selected scenarios in execution order. A given seed
    /// always yields the same permutation.
    pub fn execution_order(&self, seed: u64) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .scenarios
            .iter()
            .enumerate()
            .filter(|(_, s)| match &self.options.filter {
                Some(filter) => s.name().contains(filter.as_str()),
                None => true,
            })
            .map(|(i, _)| i)
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        order
    }
}

/// Run one scenario in a fresh context. `Err` only when the target stopped
/// answering; every other failure ends up in the record.
async fn run_scenario(
    client: Arc<dyn HttpClient>,
    scenario: &dyn Scenario,
) -> Result<ScenarioRecord, ScenarioError> {
    let mut ctx = ScenarioContext::new(client);
    let started = Instant::now();
    debug!("Scenario {} starting", scenario.name());

    let result = match scenario.setup(&mut ctx).await {
        Ok(()) => scenario.run(&mut ctx).await,
        Err(e) if e.is_unreachable() => Err(e),
        Err(e) => Err(ScenarioError::Assertion(format!("setup: {}", e))),
    };

    let mut cleanup_warnings = Vec::new();
    if let Err(e) = scenario.cleanup(&mut ctx).await {
        warn!("Scenario {} cleanup failed: {}", scenario.name(), e);
        cleanup_warnings.push(e.to_string());
    }
    cleanup_warnings.extend(ctx.drain_cleanup().await);

    let (outcome, detail) = match result {
        Ok(()) => (Outcome::Passed, None),
        Err(e) if e.is_unreachable() => return Err(e),
        Err(e) => (Outcome::Failed, Some(e.to_string())),
    };

    match &detail {
        None => info!("PASS {}", scenario.name()),
        Some(detail) => info!("FAIL {} ({}): {}", scenario.name(), scenario.conformance(), detail),
    }

    Ok(ScenarioRecord {
        name: scenario.name().to_string(),
        resource: scenario.resource(),
        conformance: scenario.conformance(),
        outcome,
        detail,
        cleanup_warnings,
        duration: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{ensure, expect_status};
    use crate::error::ScenarioResult;
    use crate::scenario::Conformance;
    use async_trait::async_trait;
    use graphcheck_http::{HeaderMap, HttpError, HttpMethod, Payload, RawResponse};
    use graphcheck_model::ResourceKind;
    use std::sync::Mutex;

    /// Answers every request with a canned status and records the calls
    struct StubClient {
        reachable: bool,
        calls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn new(reachable: bool) -> Arc<Self> {
            Arc::new(Self {
                reachable,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn request(
            &self,
            method: HttpMethod,
            path: &str,
            _payload: Option<&Payload>,
        ) -> Result<RawResponse, HttpError> {
            if !self.reachable {
                return Err(HttpError::Unreachable {
                    url: path.to_string(),
                    reason: "connection refused".into(),
                });
            }
            self.calls.lock().unwrap().push(format!("{} {}", method, path));
            let status = if path.ends_with("missing") { 404 } else { 200 };
            Ok(RawResponse {
                status,
                headers: HeaderMap::new(),
                body: String::new(),
            })
        }
    }

    struct Probe {
        name: &'static str,
        path: &'static str,
        conformance: Conformance,
        track: Vec<&'static str>,
    }

    #[async_trait]
    impl Scenario for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn resource(&self) -> ResourceKind {
            ResourceKind::Category
        }

        fn conformance(&self) -> Conformance {
            self.conformance
        }

        fn description(&self) -> &str {
            "GET a path and expect 200"
        }

        async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
            for id in &self.track {
                ctx.track(ResourceKind::Category, *id);
            }
            let response = ctx.client().get(self.path).await?;
            expect_status(&response, 200)?;
            ensure(response.body.is_empty(), || "body not empty".into())
        }
    }

    fn probe(name: &'static str, path: &'static str, conformance: Conformance) -> Box<dyn Scenario> {
        Box::new(Probe {
            name,
            path,
            conformance,
            track: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_failures_are_recorded_and_run_continues() {
        let client = StubClient::new(true);
        let mut runner = ScenarioRunner::new(
            client.clone(),
            vec![
                probe("ok", "categories", Conformance::Compliant),
                probe("broken", "categories/missing", Conformance::Compliant),
                probe("documented", "todos/missing", Conformance::Documented),
            ],
            RunnerOptions {
                seed: Some(3),
                ..Default::default()
            },
        );

        let report = runner.run().await.unwrap();
        assert_eq!(runner.state(), RunnerState::Done);
        assert_eq!(report.seed, 3);
        assert_eq!(report.counts.total, 3);
        assert_eq!(report.counts.failed, 2);
        assert_eq!(report.counts.expected_failures, 1);
        assert_eq!(report.exit_code(), 1);

        let detail = report.record("broken").and_then(|r| r.detail.clone()).unwrap();
        assert!(detail.contains("expected status 200, got 404"), "{}", detail);
        // Probe plus one request per scenario
        assert_eq!(client.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_ledger_is_drained_newest_first() {
        let client = StubClient::new(true);
        let scenario = Box::new(Probe {
            name: "tracks",
            path: "categories/missing",
            conformance: Conformance::Compliant,
            track: vec!["5", "6"],
        });
        let mut runner = ScenarioRunner::new(client.clone(), vec![scenario], RunnerOptions::default());

        let report = runner.run().await.unwrap();
        assert_eq!(report.counts.failed, 1);
        let calls = client.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &["DELETE categories/6".to_string(), "DELETE categories/5".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_target_aborts_without_report() {
        let mut runner = ScenarioRunner::new(
            StubClient::new(false),
            vec![probe("ok", "categories", Conformance::Compliant)],
            RunnerOptions::default(),
        );
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, RunnerError::Unreachable(_)));
        assert_eq!(runner.state(), RunnerState::Aborted);
    }

    #[tokio::test]
    async fn test_filter_selecting_nothing_is_an_error() {
        let mut runner = ScenarioRunner::new(
            StubClient::new(true),
            vec![probe("todos_list", "todos", Conformance::Compliant)],
            RunnerOptions {
                filter: Some("projects".into()),
                ..Default::default()
            },
        );
        assert!(matches!(runner.run().await, Err(RunnerError::NoScenarios { .. })));
    }

    #[test]
    fn test_seed_gives_reproducible_order() {
        let scenarios = || -> Vec<Box<dyn Scenario>> {
            (0..12)
                .map(|_| probe("s", "todos", Conformance::Compliant))
                .collect()
        };
        let a = ScenarioRunner::new(StubClient::new(true), scenarios(), RunnerOptions::default());
        let b = ScenarioRunner::new(StubClient::new(true), scenarios(), RunnerOptions::default());

        assert_eq!(a.execution_order(99), b.execution_order(99));
        let mut sorted = a.execution_order(99);
        sorted.sort();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }
}
