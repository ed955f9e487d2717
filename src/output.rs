use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL};

use crate::stats::ReportRow;
use crate::transport::{BenchmarkConfig, Outcome, ResolverConfig};

/// Print the startup banner.
pub fn print_banner(queries: usize) {
	println!("\nCloud DNS Benchmark {}", env!("CARGO_PKG_VERSION"));
	println!("This program comes with ABSOLUTELY NO WARRANTY.");
	println!("\nStarting benchmarks, using {} random domains\n", queries);
}

/// Print a summary of the benchmark configuration before running.
pub fn print_config_summary(
	resolvers: &[ResolverConfig],
	candidate_count: usize,
	config: &BenchmarkConfig,
) {
	println!("DNS Benchmark Configuration");
	println!("===========================");
	println!("Resolvers:      {}", resolvers.len());
	println!("Candidates:     {}", candidate_count);
	println!("Queries:        {}", config.queries);
	println!("Concurrency:    {}", config.max_inflight);
	println!("Timeout:        {} ms", config.retry.timeout.as_millis());
	println!("Max failures:   {}", config.retry.max_failures);
	if !config.retry.backoff.is_zero() {
		println!("Backoff:        {} ms", config.retry.backoff.as_millis());
	}
	let local_label = if config.include_local { "yes" } else { "no" };
	println!("Local resolver: {}", local_label);
	if let Some(seed) = config.seed {
		println!("Seed:           {}", seed);
	}
	println!();
}

/// Format one outcome as a progress line.
pub fn format_outcome(outcome: &Outcome) -> String {
	match outcome.rtt {
		Some(rtt) if outcome.success => format!(
			"server: {:>15} host: {:>31}, time [{:>6}]ms",
			outcome.resolver.target, outcome.domain, rtt.as_millis(),
		),
		_ => format!(
			"server: {:>15} host: {:>31}, error [{} failures]",
			outcome.resolver.target, outcome.domain, outcome.failures,
		),
	}
}

/// Build the ranked results table.
pub fn results_table(rows: &[ReportRow]) -> Table {
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec![
		"Rank", "Resolver", "Address",
		"Min", "Max", "Avg", "Jitter",
		"OK", "Failed",
	]);

	for r in rows {
		table.add_row(vec![
			format!("{}", r.rank),
			r.label.clone(),
			r.target.to_string(),
			format!("{:.1} ms", r.latency.min_ms),
			format!("{:.1} ms", r.latency.max_ms),
			format!("{:.1} ms", r.latency.mean_ms),
			format!("{:.1} ms", r.latency.stddev_ms),
			r.successes.to_string(),
			r.failures.to_string(),
		]);
	}
	table
}

/// Print the benchmark results as a formatted table.
pub fn print_results_table(rows: &[ReportRow]) {
	println!("\nResults; ordered by lowest average response time");
	println!("=================================================\n");
	if rows.is_empty() {
		println!("No resolver answered any query.");
		return;
	}
	println!("{}", results_table(rows));
}
