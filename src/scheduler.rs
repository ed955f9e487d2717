use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::aggregate::Aggregator;
use crate::dns::{DnsClient, SystemLookup};
use crate::probe::{run_local, run_remote};
use crate::query::{build_cloud_queries, build_local_queries, AdmissionQueue, QueryBatch};
use crate::transport::{BenchmarkConfig, Outcome, ProbeClass, ResolverConfig};

/// Bounded-concurrency fan-out of every probe, with one merge loop.
///
/// Cloud probes run first under a sliding window of `max_inflight`. Once
/// every cloud outcome is in, local probes run under `local_window`. In
/// both phases each outcome admits exactly one more probe, in build order.
pub struct Scheduler<C, L> {
	config: BenchmarkConfig,
	client: Arc<C>,
	lookup: Arc<L>,
}

impl<C: DnsClient, L: SystemLookup> Scheduler<C, L> {
	pub fn new(config: BenchmarkConfig, client: Arc<C>, lookup: Arc<L>) -> Self {
		Scheduler { config, client, lookup }
	}

	/// Probe every (domain, resolver) pair, plus the host resolver per domain
	/// when enabled. `on_outcome` sees each outcome as it arrives.
	///
	/// Returns all outcomes in arrival order.
	pub async fn run<F>(
		&self,
		domains: &[String],
		resolvers: &[ResolverConfig],
		mut on_outcome: F,
	) -> Vec<Outcome>
	where
		F: FnMut(ProbeClass, &Outcome),
	{
		let (cloud_tx, mut cloud_rx) = mpsc::unbounded_channel();
		let (local_tx, mut local_rx) = mpsc::unbounded_channel();
		let cloud = build_cloud_queries(domains, resolvers, &cloud_tx);
		let local = if self.config.include_local {
			build_local_queries(domains, &local_tx)
		} else {
			QueryBatch::default()
		};
		// Only probes hold senders from here on
		drop(cloud_tx);
		drop(local_tx);

		let mut tasks = JoinSet::new();
		let QueryBatch { probes: cloud_probes, admission: mut cloud_gates } = cloud;
		let QueryBatch { probes: local_probes, admission: mut local_gates } = local;
		let mut agg = Aggregator::new(cloud_probes.len(), local_probes.len());

		for probe in cloud_probes {
			let client = self.client.clone();
			let policy = self.config.retry;
			tasks.spawn(async move { run_remote(probe, client.as_ref(), policy).await });
		}
		for probe in local_probes {
			let lookup = self.lookup.clone();
			let policy = self.config.retry;
			tasks.spawn(async move { run_local(probe, lookup.as_ref(), policy).await });
		}

		let window = self.config.max_inflight.max(1);
		tracing::info!(probes = cloud_gates.total(), window, "starting cloud phase");
		cloud_gates.admit(window);

		let mut local_open = false;
		let mut cloud_closed = false;
		if agg.phase_complete(ProbeClass::Cloud) {
			self.open_local(&mut local_gates);
			local_open = true;
		}

		while !agg.is_complete() {
			tokio::select! {
				received = cloud_rx.recv(), if !cloud_closed && !agg.phase_complete(ProbeClass::Cloud) => {
					match received {
						Some(outcome) => {
							on_outcome(ProbeClass::Cloud, &outcome);
							agg.record(ProbeClass::Cloud, outcome);
							cloud_gates.admit_next();
						}
						None => {
							tracing::error!(
								missing = agg.remaining(ProbeClass::Cloud),
								"cloud probes exited without reporting"
							);
							cloud_closed = true;
						}
					}
					let cloud_done = cloud_closed || agg.phase_complete(ProbeClass::Cloud);
					if cloud_done && !local_open {
						self.open_local(&mut local_gates);
						local_open = true;
					}
				}
				received = local_rx.recv(), if local_open && !agg.phase_complete(ProbeClass::Local) => {
					match received {
						Some(outcome) => {
							on_outcome(ProbeClass::Local, &outcome);
							agg.record(ProbeClass::Local, outcome);
							local_gates.admit_next();
						}
						None => {
							tracing::error!(
								missing = agg.remaining(ProbeClass::Local),
								"local probes exited without reporting"
							);
							break;
						}
					}
				}
				else => break,
			}
		}

		for (class, gates) in [(ProbeClass::Cloud, &cloud_gates), (ProbeClass::Local, &local_gates)] {
			if gates.waiting() > 0 {
				tracing::warn!(?class, admitted = gates.admitted(), waiting = gates.waiting(), "probes never admitted");
			}
		}
		// Anything still gated reports a failure and exits
		drop(cloud_gates);
		drop(local_gates);
		while let Some(joined) = tasks.join_next().await {
			if let Err(e) = joined {
				tracing::error!(error = %e, "probe task failed");
			}
		}

		tracing::info!(outcomes = agg.len(), "all phases finished");
		agg.into_results()
	}

	fn open_local(&self, gates: &mut AdmissionQueue) {
		if gates.total() > 0 {
			tracing::info!(probes = gates.total(), window = self.config.local_window, "starting local phase");
		}
		gates.admit(self.config.local_window.max(1));
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::time::Duration;

	use super::*;
	use crate::testutil::{addr, domains, resolvers, Event, EventLog, ScriptedClient, ScriptedLookup};
	use crate::transport::{RetryPolicy, Target};

	fn config(max_inflight: usize) -> BenchmarkConfig {
		BenchmarkConfig {
			max_inflight,
			retry: RetryPolicy { timeout: Duration::from_millis(50), ..RetryPolicy::default() },
			..BenchmarkConfig::default()
		}
	}

	fn scheduler(
		config: BenchmarkConfig,
		client: ScriptedClient,
		lookup: ScriptedLookup,
	) -> (Scheduler<ScriptedClient, ScriptedLookup>, Arc<ScriptedClient>, Arc<ScriptedLookup>) {
		let client = Arc::new(client);
		let lookup = Arc::new(lookup);
		(Scheduler::new(config, client.clone(), lookup.clone()), client, lookup)
	}

	#[tokio::test]
	async fn test_every_probe_reports_once() {
		let events = EventLog::default();
		let (s, _, _) = scheduler(
			config(4),
			ScriptedClient::new(events.clone()),
			ScriptedLookup::new(events),
		);
		let ds = domains(5);
		let rs = resolvers(4);

		let mut seen = 0;
		let results = s.run(&ds, &rs, |_, _| seen += 1).await;
		assert_eq!(results.len(), 5 * 4 + 5);
		assert_eq!(seen, results.len());

		let mut pairs: HashMap<(String, Target), usize> = HashMap::new();
		for o in &results {
			*pairs.entry((o.domain.clone(), o.resolver.target)).or_default() += 1;
		}
		assert_eq!(pairs.len(), 25, "no pair lost");
		assert!(pairs.values().all(|&n| n == 1), "no pair duplicated");
	}

	#[tokio::test]
	async fn test_duplicate_domains_each_probed() {
		let events = EventLog::default();
		let (s, client, lookup) = scheduler(
			config(8),
			ScriptedClient::new(events.clone()),
			ScriptedLookup::new(events),
		);
		let ds = vec!["same.test".to_string(); 3];

		let results = s.run(&ds, &resolvers(2), |_, _| {}).await;
		assert_eq!(results.len(), 3 * 2 + 3);
		assert_eq!(client.calls(), 6);
		assert_eq!(lookup.calls(), 3);
	}

	#[tokio::test]
	async fn test_cloud_inflight_bounded() {
		let events = EventLog::default();
		let mut client = ScriptedClient::new(events.clone());
		client.delay = Duration::from_millis(10);
		let (s, client, _) = scheduler(config(3), client, ScriptedLookup::new(events));

		let results = s.run(&domains(4), &resolvers(3), |_, _| {}).await;
		assert_eq!(results.len(), 12 + 4);
		assert!(client.gauge.peak() <= 3, "peak {} exceeds window", client.gauge.peak());
		assert_eq!(client.gauge.peak(), 3);
	}

	#[tokio::test]
	async fn test_local_window_bounded() {
		let events = EventLog::default();
		let mut lookup = ScriptedLookup::new(events.clone());
		lookup.delay = Duration::from_millis(10);
		let mut cfg = config(40);
		cfg.local_window = 2;
		let (s, _, lookup) = scheduler(cfg, ScriptedClient::new(events), lookup);

		let results = s.run(&domains(6), &resolvers(1), |_, _| {}).await;
		assert_eq!(results.len(), 12);
		assert!(lookup.gauge.peak() <= 2);
	}

	#[tokio::test]
	async fn test_local_phase_after_cloud_phase() {
		let events = EventLog::default();
		let mut client = ScriptedClient::new(events.clone());
		client.delay = Duration::from_millis(5);
		client.flaky = 1;
		let (s, _, _) = scheduler(config(2), client, ScriptedLookup::new(events.clone()));

		let mut classes = Vec::new();
		s.run(&domains(3), &resolvers(3), |class, _| classes.push(class)).await;

		let log = events.lock().unwrap();
		let last_exchange = log.iter().rposition(|e| matches!(e, Event::ExchangeDone(..))).unwrap();
		let first_lookup = log.iter().position(|e| matches!(e, Event::LookupStart(_))).unwrap();
		assert!(last_exchange < first_lookup);

		let first_local = classes.iter().position(|c| *c == ProbeClass::Local).unwrap();
		assert_eq!(first_local, 9);
		assert!(classes[first_local..].iter().all(|c| *c == ProbeClass::Local));
	}

	#[tokio::test]
	async fn test_admission_follows_build_order() {
		let events = EventLog::default();
		let mut cfg = config(1);
		cfg.include_local = false;
		let (s, _, _) = scheduler(cfg, ScriptedClient::new(events.clone()), ScriptedLookup::new(events.clone()));

		s.run(&domains(2), &resolvers(3), |_, _| {}).await;

		let log = events.lock().unwrap();
		let expected: Vec<Event> = domains(2).into_iter()
			.flat_map(|d| (0..3).map(move |i| Event::ExchangeDone(d.clone(), addr(i))))
			.collect();
		assert_eq!(*log, expected);
	}

	#[tokio::test]
	async fn test_failures_still_counted() {
		let events = EventLog::default();
		let mut client = ScriptedClient::new(events.clone());
		client.dead.insert(addr(1));
		let mut lookup = ScriptedLookup::new(events);
		lookup.failing.insert("d0.test".to_string());
		let (s, _, _) = scheduler(config(5), client, lookup);

		let results = s.run(&domains(3), &resolvers(2), |_, _| {}).await;
		assert_eq!(results.len(), 3 * 2 + 3);
		let failed: Vec<&Outcome> = results.iter().filter(|o| !o.success).collect();
		assert_eq!(failed.len(), 3 + 1);
		assert!(failed.iter()
			.filter(|o| o.resolver.target == Target::Remote(addr(1)))
			.all(|o| o.failures == 6));
	}

	#[tokio::test]
	async fn test_without_local_phase() {
		let events = EventLog::default();
		let mut cfg = config(10);
		cfg.include_local = false;
		let (s, _, lookup) = scheduler(cfg, ScriptedClient::new(events.clone()), ScriptedLookup::new(events));

		let results = s.run(&domains(4), &resolvers(2), |_, _| {}).await;
		assert_eq!(results.len(), 8);
		assert_eq!(lookup.calls(), 0);
	}

	#[tokio::test]
	async fn test_no_resolvers_runs_local_only() {
		let events = EventLog::default();
		let (s, client, lookup) = scheduler(
			config(10),
			ScriptedClient::new(events.clone()),
			ScriptedLookup::new(events),
		);

		let results = s.run(&domains(4), &[], |_, _| {}).await;
		assert_eq!(results.len(), 4);
		assert_eq!(client.calls(), 0);
		assert_eq!(lookup.calls(), 4);
	}

	#[tokio::test]
	async fn test_empty_sample() {
		let events = EventLog::default();
		let (s, _, _) = scheduler(
			config(10),
			ScriptedClient::new(events.clone()),
			ScriptedLookup::new(events),
		);
		assert!(s.run(&[], &resolvers(3), |_, _| {}).await.is_empty());
	}

	#[tokio::test]
	async fn test_window_larger_than_batch() {
		let events = EventLog::default();
		let (s, client, _) = scheduler(
			config(1000),
			ScriptedClient::new(events.clone()),
			ScriptedLookup::new(events),
		);
		let results = s.run(&domains(2), &resolvers(2), |_, _| {}).await;
		assert_eq!(results.len(), 6);
		assert_eq!(client.calls(), 4);
	}
}
