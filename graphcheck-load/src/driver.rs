//! The create, update and delete phases of a load run

use crate::dataset::{Dataset, Phase, Sample, SampleSink};
use crate::error::{LoadError, LoadResult};
use crate::probe::UsageProbe;
use crate::summary::{LoadSummary, PhaseSummary};
use graphcheck_config::{LoadConfig, LoadKind};
use graphcheck_http::{HttpClient, HttpError, Payload, RawResponse};
use graphcheck_model::{parse_one, Draft, ResourceKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub kind: ResourceKind,
    /// N; each phase issues N+1 operations
    pub objects: usize,
    /// K; operation `i` is sampled when `i % K == 0`
    pub interval: usize,
    pub seed: Option<u64>,
}

impl From<&LoadConfig> for LoadOptions {
    fn from(config: &LoadConfig) -> Self {
        let kind = match config.kind {
            LoadKind::Todos => ResourceKind::Task,
            LoadKind::Categories => ResourceKind::Category,
            LoadKind::Projects => ResourceKind::Project,
        };
        Self {
            kind,
            objects: config.objects,
            interval: config.interval,
            seed: config.seed,
        }
    }
}

/// What a finished run hands back
#[derive(Debug)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub summary: LoadSummary,
}

/// State owned by one load run: tracked ids, per-phase totals, the sample
/// sink and the seeded RNG used for payloads and permutations.
pub struct LoadRun {
    client: Arc<dyn HttpClient>,
    probe: Box<dyn UsageProbe>,
    options: LoadOptions,
    seed: u64,
    rng: StdRng,
    tracked: Vec<String>,
    dataset: Dataset,
    phases: Vec<PhaseSummary>,
}

impl LoadRun {
    pub fn new(
        client: Arc<dyn HttpClient>,
        probe: Box<dyn UsageProbe>,
        options: LoadOptions,
    ) -> LoadResult<Self> {
        if options.objects == 0 || options.interval == 0 {
            return Err(LoadError::InvalidParameters(format!(
                "objects and interval must be positive (got {} and {})",
                options.objects, options.interval
            )));
        }
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        Ok(Self {
            client,
            probe,
            rng: StdRng::seed_from_u64(seed),
            seed,
            tracked: Vec::with_capacity(options.objects + 1),
            dataset: Dataset::new(),
            phases: Vec::with_capacity(Phase::ALL.len()),
            options,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Probe the target once, then run all three phases
    pub async fn run(mut self) -> LoadResult<LoadOutcome> {
        self.client.probe().await?;
        info!(
            "Load run on {}: {} objects, interval {}, seed {}",
            self.options.kind, self.options.objects, self.options.interval, self.seed
        );

        self.create_phase().await;
        self.update_phase().await;
        self.delete_phase().await;

        if !self.tracked.is_empty() {
            warn!("{} {} were not deleted", self.tracked.len(), self.options.kind);
        }
        let summary = LoadSummary {
            kind: self.options.kind,
            seed: self.seed,
            objects: self.options.objects,
            interval: self.options.interval,
            phases: self.phases,
            leftover: self.tracked.len(),
        };
        Ok(LoadOutcome {
            dataset: self.dataset,
            summary,
        })
    }

    async fn create_phase(&mut self) {
        let kind = self.options.kind;
        let mut totals = PhaseSummary::new(Phase::Add);
        for index in 0..=self.options.objects {
            let draft = Draft::random(kind, &mut self.rng);
            let payload = Payload::Json(draft.to_json());
            let (latency, result) = timed(self.client.post(&kind.collection_path(), &payload)).await;

            let ok = match result {
                Ok(response) if response.status == 201 => match parse_one(&response.body, kind) {
                    Ok(created) => {
                        self.tracked.push(created.id().to_string());
                        true
                    }
                    Err(e) => {
                        warn!("Create #{} returned an unreadable body: {}", index, e);
                        false
                    }
                },
                other => {
                    log_failure(Phase::Add, index, &other);
                    false
                }
            };
            self.account(&mut totals, index, latency, ok);
        }
        self.finish(totals);
    }

    async fn update_phase(&mut self) {
        let kind = self.options.kind;
        let mut order = self.tracked.clone();
        order.shuffle(&mut self.rng);

        let mut totals = PhaseSummary::new(Phase::Change);
        for (index, id) in order.iter().enumerate() {
            let draft = Draft::random(kind, &mut self.rng);
            let payload = Payload::Json(draft.to_json());
            let (latency, result) = timed(self.client.put(&kind.item_path(id), &payload)).await;

            let ok = matches!(&result, Ok(response) if response.is_success());
            if !ok {
                log_failure(Phase::Change, index, &result);
            }
            self.account(&mut totals, index, latency, ok);
        }
        self.finish(totals);
    }

    async fn delete_phase(&mut self) {
        let kind = self.options.kind;
        let mut order = std::mem::take(&mut self.tracked);
        order.shuffle(&mut self.rng);

        // Ids whose delete failed stay tracked, in the order they were tried
        let mut kept = Vec::new();
        let mut totals = PhaseSummary::new(Phase::Delete);
        for (index, id) in order.into_iter().enumerate() {
            let (latency, result) = timed(self.client.delete(&kind.item_path(&id))).await;

            let ok = matches!(&result, Ok(response) if response.is_success());
            if !ok {
                log_failure(Phase::Delete, index, &result);
                kept.push(id);
            }
            self.account(&mut totals, index, latency, ok);
        }
        self.tracked = kept;
        self.finish(totals);
    }

    /// Add one operation to the phase totals and sample it when due
    fn account(&mut self, totals: &mut PhaseSummary, index: usize, latency: Duration, ok: bool) {
        totals.operations += 1;
        totals.total += latency;
        if !ok {
            totals.failures += 1;
        }
        if index % self.options.interval == 0 {
            let sample = Sample {
                latency,
                cumulative: totals.total,
                usage: self.probe.sample(),
            };
            debug!("{} sample at {}: {:?}", totals.phase, index, sample);
            self.dataset.record(totals.phase, index, sample);
        }
    }

    fn finish(&mut self, totals: PhaseSummary) {
        info!(
            "{} phase: {} operations, {} failed, {:.3}s",
            totals.phase,
            totals.operations,
            totals.failures,
            totals.total.as_secs_f64()
        );
        self.phases.push(totals);
    }
}

async fn timed<F>(request: F) -> (Duration, Result<RawResponse, HttpError>)
where
    F: std::future::Future<Output = Result<RawResponse, HttpError>>,
{
    let started = Instant::now();
    let result = request.await;
    (started.elapsed(), result)
}

fn log_failure(phase: Phase, index: usize, result: &Result<RawResponse, HttpError>) {
    match result {
        Ok(response) => warn!("{} #{} answered {}", phase, index, response.status),
        Err(e) => warn!("{} #{} failed: {}", phase, index, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::UsageSample;
    use async_trait::async_trait;
    use graphcheck_http::{HeaderMap, HttpMethod};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FixedProbe;

    impl UsageProbe for FixedProbe {
        fn sample(&mut self) -> UsageSample {
            UsageSample {
                cpu_percent: 5.0,
                available_memory_mb: 1024.0,
            }
        }
    }

    /// In-memory collection; ids listed in `refuse_delete` answer 404
    #[derive(Default)]
    struct Collection {
        next_id: Mutex<u64>,
        live: Mutex<HashSet<String>>,
        refuse_delete: HashSet<String>,
        /// PUT and DELETE requests in the order they arrived
        writes: Mutex<Vec<String>>,
    }

    fn answer(status: u16, body: String) -> Result<RawResponse, HttpError> {
        Ok(RawResponse {
            status,
            headers: HeaderMap::new(),
            body,
        })
    }

    #[async_trait]
    impl HttpClient for Collection {
        async fn request(
            &self,
            method: HttpMethod,
            path: &str,
            payload: Option<&Payload>,
        ) -> Result<RawResponse, HttpError> {
            let id = path.rsplit('/').next().unwrap_or_default().to_string();
            if matches!(method, HttpMethod::Put | HttpMethod::Delete) {
                self.writes.lock().unwrap().push(format!("{} {}", method, path));
            }
            match method {
                HttpMethod::Get => answer(200, String::new()),
                HttpMethod::Post => {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    self.live.lock().unwrap().insert(next.to_string());
                    let Some(Payload::Json(body)) = payload else {
                        return answer(400, String::new());
                    };
                    answer(201, format!(r#"{{"id":"{}","title":{}}}"#, next, body["title"]))
                }
                HttpMethod::Put if self.live.lock().unwrap().contains(&id) => {
                    answer(200, String::new())
                }
                HttpMethod::Delete if !self.refuse_delete.contains(&id) => {
                    self.live.lock().unwrap().remove(&id);
                    answer(200, String::new())
                }
                _ => answer(404, String::new()),
            }
        }
    }

    fn options(objects: usize, interval: usize) -> LoadOptions {
        LoadOptions {
            kind: ResourceKind::Category,
            objects,
            interval,
            seed: Some(11),
        }
    }

    #[tokio::test]
    async fn test_phases_sample_every_kth_operation() {
        let service = Arc::new(Collection::default());
        let run = LoadRun::new(service.clone(), Box::new(FixedProbe), options(10, 5)).unwrap();
        let outcome = run.run().await.unwrap();

        // Indices 0, 5 and 10 out of 0..=10
        assert_eq!(outcome.dataset.indices().collect::<Vec<_>>(), vec![0, 5, 10]);
        for phase in Phase::ALL {
            let summary = outcome.summary.phase(phase).unwrap();
            assert_eq!(summary.operations, 11);
            assert_eq!(summary.failures, 0);
            assert_eq!(outcome.dataset.phase(phase).len(), 3);
        }
        assert_eq!(outcome.summary.leftover, 0);
        assert!(service.live.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cumulative_time_never_decreases() {
        let run = LoadRun::new(Arc::new(Collection::default()), Box::new(FixedProbe), options(20, 4)).unwrap();
        let outcome = run.run().await.unwrap();
        let add = outcome.dataset.phase(Phase::Add);
        assert_eq!(add.len(), 6);
        for pair in add.windows(2) {
            assert!(pair[1].1.cumulative >= pair[0].1.cumulative);
            assert!(pair[1].1.cumulative >= pair[1].1.latency);
        }
    }

    #[tokio::test]
    async fn test_failed_deletes_are_counted_and_kept() {
        let service = Arc::new(Collection {
            refuse_delete: ["2", "3"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        });
        let run = LoadRun::new(service, Box::new(FixedProbe), options(4, 2)).unwrap();
        let outcome = run.run().await.unwrap();

        let delete = outcome.summary.phase(Phase::Delete).unwrap();
        assert_eq!(delete.operations, 5);
        assert_eq!(delete.failures, 2);
        assert_eq!(outcome.summary.leftover, 2);
        assert_eq!(outcome.summary.total_failures(), 2);
    }

    async fn writes_for_seed(seed: u64) -> Vec<String> {
        let service = Arc::new(Collection::default());
        let options = LoadOptions {
            seed: Some(seed),
            ..options(12, 4)
        };
        let run = LoadRun::new(service.clone(), Box::new(FixedProbe), options).unwrap();
        assert_eq!(run.seed(), seed);
        run.run().await.unwrap();
        let writes = service.writes.lock().unwrap().clone();
        writes
    }

    #[tokio::test]
    async fn test_seed_fixes_the_permutations() {
        let first = writes_for_seed(11).await;
        let again = writes_for_seed(11).await;
        let other = writes_for_seed(12).await;

        // 13 updates then 13 deletes
        assert_eq!(first.len(), 26);
        assert!(first[..13].iter().all(|w| w.starts_with("PUT ")), "{:?}", first);
        assert!(first[13..].iter().all(|w| w.starts_with("DELETE ")), "{:?}", first);

        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_every_created_id_is_deleted_once() {
        let service = Arc::new(Collection::default());
        let run = LoadRun::new(service.clone(), Box::new(FixedProbe), options(30, 10)).unwrap();
        let outcome = run.run().await.unwrap();
        assert_eq!(outcome.summary.leftover, 0);

        let writes = service.writes.lock().unwrap();
        let mut deleted: Vec<&str> = writes
            .iter()
            .filter_map(|w| w.strip_prefix("DELETE categories/"))
            .collect();
        deleted.sort_by_key(|id| id.parse::<u64>().unwrap());
        let expected: Vec<String> = (1..=31).map(|id| id.to_string()).collect();
        assert_eq!(deleted, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = LoadRun::new(Arc::new(Collection::default()), Box::new(FixedProbe), options(10, 0));
        assert!(matches!(result, Err(LoadError::InvalidParameters(_))));
    }

    #[test]
    fn test_options_from_config_map_kind() {
        let config = LoadConfig::default();
        let options = LoadOptions::from(&config);
        assert_eq!(options.kind, ResourceKind::Category);
        assert_eq!(options.objects, 10_000);
        assert_eq!(options.interval, 500);
    }
}
