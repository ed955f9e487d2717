mod aggregate;
mod cli;
mod dns;
mod domains;
mod logging;
mod output;
mod probe;
mod query;
mod resolver;
mod sampler;
mod scheduler;
mod stats;
mod transport;

#[cfg(test)]
mod testutil;

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{Cli, SampleSource};
use crate::dns::{HostLookup, UdpDnsClient};
use crate::sampler::MAX_QUERIES;
use crate::scheduler::Scheduler;
use crate::transport::{BenchmarkConfig, ProbeClass, RetryPolicy};

#[tokio::main]
async fn main() -> Result<()> {
	logging::init_logging();
	let cli = Cli::parse();

	// Collect resolvers from flags and file, else the built-in table
	let mut resolvers = Vec::new();
	for r in &cli.resolvers {
		resolvers.push(resolver::parse_resolver(r)?);
	}
	if let Some(path) = &cli.resolver_file {
		resolvers.extend(resolver::read_resolver_file(path)?);
	}
	if resolvers.is_empty() {
		resolvers = resolver::default_resolvers();
	}

	let candidates = match (&cli.domain_file, cli.source) {
		(Some(path), _) => domains::read_domain_file(path)?,
		(None, SampleSource::Top) => domains::default_top_domains(),
		(None, SampleSource::Hosts) => domains::default_host_domains(),
	};

	if cli.queries > MAX_QUERIES {
		tracing::warn!(requested = cli.queries, max = MAX_QUERIES, "query count clamped");
	}
	let config = BenchmarkConfig {
		queries: cli.queries.min(MAX_QUERIES),
		max_inflight: cli.concurrency as usize,
		local_window: cli.local_window as usize,
		include_local: !cli.no_local,
		seed: cli.seed,
		retry: RetryPolicy {
			timeout: Duration::from_millis(cli.timeout),
			max_failures: cli.attempts,
			local_attempts: cli.local_attempts,
			backoff: Duration::from_millis(cli.backoff),
		},
	};

	output::print_banner(config.queries);
	output::print_config_summary(&resolvers, candidates.len(), &config);

	let mut rng = sampler::seeded_rng(config.seed);
	let sample = sampler::sample(&candidates, config.queries, &mut rng);

	let scheduler = Scheduler::new(config, Arc::new(UdpDnsClient), Arc::new(HostLookup));
	let mut local_announced = false;
	let outcomes = scheduler.run(&sample, &resolvers, |class, outcome| {
		if class == ProbeClass::Local && !local_announced {
			println!("Now running local resolver");
			local_announced = true;
		}
		println!("{}", output::format_outcome(outcome));
	}).await;

	let report = stats::build_report(&outcomes);
	output::print_results_table(&report);

	if !cli.no_pause {
		wait_for_enter()?;
	}
	Ok(())
}

/// Block until the user enters a blank line or stdin closes.
fn wait_for_enter() -> Result<()> {
	println!("\nPress ENTER to exit");
	for line in std::io::stdin().lock().lines() {
		let line = line.context("failed to read stdin")?;
		if line.trim().is_empty() {
			break;
		}
	}
	Ok(())
}
