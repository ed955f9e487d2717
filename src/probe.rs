use std::time::Instant;

use tokio::sync::mpsc;

use crate::dns::{DnsClient, SystemLookup};
use crate::query::Probe;
use crate::transport::{Outcome, ResolverConfig, RetryPolicy, Target};

/// Run one cloud probe to completion.
///
/// Waits for admission, then queries the resolver until it answers or the
/// failure count passes `policy.max_failures`. Sends exactly one outcome.
pub async fn run_remote<C: DnsClient>(probe: Probe, client: &C, policy: RetryPolicy) {
	let Probe { domain, resolver, gate, sink } = probe;
	let reporter = Reporter::new(sink, &resolver, &domain);
	let outcome = if gate.await.is_ok() {
		query_remote(client, resolver, domain, &policy).await
	} else {
		tracing::warn!(resolver = %resolver.target, domain, "admission gate dropped");
		Outcome::failed(resolver, domain, 0)
	};
	reporter.send(outcome);
}

/// Run one local-stack probe to completion.
///
/// Tries the host resolver up to `policy.local_attempts` times and records
/// the duration of the attempt that succeeded.
pub async fn run_local<L: SystemLookup>(probe: Probe, lookup: &L, policy: RetryPolicy) {
	let Probe { domain, resolver, gate, sink } = probe;
	let reporter = Reporter::new(sink, &resolver, &domain);
	let outcome = if gate.await.is_ok() {
		query_local(lookup, resolver, domain, &policy).await
	} else {
		tracing::warn!(resolver = %resolver.target, domain, "admission gate dropped");
		Outcome::failed(resolver, domain, 0)
	};
	reporter.send(outcome);
}

async fn query_remote<C: DnsClient>(
	client: &C,
	resolver: ResolverConfig,
	domain: String,
	policy: &RetryPolicy,
) -> Outcome {
	let Target::Remote(server) = resolver.target else {
		tracing::error!(domain, "cloud probe built for the system resolver");
		return Outcome::failed(resolver, domain, 0);
	};

	// TODO: exponential backoff once there is data on how often a retry
	// right after a timeout actually succeeds.
	let mut failures = 0;
	loop {
		match client.exchange(&domain, server, policy.timeout).await {
			Ok(rtt) => return Outcome::succeeded(resolver, domain, rtt, failures),
			Err(e) => {
				failures += 1;
				tracing::debug!(%server, domain, failures, error = %e, "attempt failed");
				if failures > policy.max_failures {
					return Outcome::failed(resolver, domain, failures);
				}
				if !policy.backoff.is_zero() {
					tokio::time::sleep(policy.backoff).await;
				}
			}
		}
	}
}

async fn query_local<L: SystemLookup>(
	lookup: &L,
	resolver: ResolverConfig,
	domain: String,
	policy: &RetryPolicy,
) -> Outcome {
	for attempt in 1..=policy.local_attempts {
		let start = Instant::now();
		match lookup.lookup_host(&domain).await {
			Ok(_) => return Outcome::succeeded(resolver, domain, start.elapsed(), attempt - 1),
			Err(e) => {
				tracing::debug!(domain, attempt, error = %e, "local lookup failed");
				if attempt < policy.local_attempts && !policy.backoff.is_zero() {
					tokio::time::sleep(policy.backoff).await;
				}
			}
		}
	}
	Outcome::failed(resolver, domain, policy.local_attempts)
}

/// Delivers a probe's outcome exactly once.
///
/// If the probe future is dropped or unwinds before reporting, a failed
/// outcome is sent in its place.
struct Reporter {
	sink: mpsc::UnboundedSender<Outcome>,
	fallback: Option<(ResolverConfig, String)>,
}

impl Reporter {
	fn new(sink: mpsc::UnboundedSender<Outcome>, resolver: &ResolverConfig, domain: &str) -> Self {
		Reporter { sink, fallback: Some((resolver.clone(), domain.to_string())) }
	}

	fn send(mut self, outcome: Outcome) {
		self.fallback = None;
		if let Err(mpsc::error::SendError(lost)) = self.sink.send(outcome) {
			tracing::warn!(resolver = %lost.resolver.target, domain = %lost.domain, "result sink closed");
		}
	}
}

impl Drop for Reporter {
	fn drop(&mut self) {
		if let Some((resolver, domain)) = self.fallback.take() {
			tracing::error!(resolver = %resolver.target, domain, "probe ended without reporting");
			let _ = self.sink.send(Outcome::failed(resolver, domain, 0));
		}
	}
}
