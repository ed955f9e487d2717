use std::collections::BTreeMap;
use std::time::Duration;

use crate::transport::{Outcome, ResolverConfig, Target};

/// Latency summary for one resolver, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatencySummary {
	pub min_ms: f64,
	pub max_ms: f64,
	pub mean_ms: f64,
	pub stddev_ms: f64,
}

/// Every outcome seen for one resolver.
#[derive(Debug, Clone)]
pub struct ResolverRecord {
	pub resolver: ResolverConfig,
	/// Round-trip times of successful probes, in arrival order
	pub rtts: Vec<Duration>,
	pub failures: usize,
}

/// One ranked line of the final report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
	pub rank: usize,
	pub label: String,
	pub target: Target,
	pub latency: LatencySummary,
	pub successes: usize,
	pub failures: usize,
}

/// Convert a round-trip time to whole milliseconds.
///
/// This is the only place latency is truncated; everything downstream
/// works on these values as `f64`.
pub fn whole_millis(rtt: Duration) -> f64 {
	rtt.as_millis() as f64
}

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let sum: f64 = values.iter().sum();
	Some(sum / values.len() as f64)
}

/// Calculate the population standard deviation of a slice of values.
pub fn stddev(values: &[f64]) -> Option<f64> {
	let avg = mean(values)?;
	let variance = values.iter()
		.map(|v| (v - avg).powi(2))
		.sum::<f64>() / values.len() as f64;
	Some(variance.sqrt())
}

/// Summarize a set of latencies. None when there are no samples.
pub fn summarize(latencies_ms: &[f64]) -> Option<LatencySummary> {
	let mean_ms = mean(latencies_ms)?;
	let stddev_ms = stddev(latencies_ms)?;
	let min_ms = latencies_ms.iter().copied().fold(f64::INFINITY, f64::min);
	let max_ms = latencies_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	Some(LatencySummary { min_ms, max_ms, mean_ms, stddev_ms })
}

/// Group outcomes by resolver.
///
/// Failed outcomes only add to the failure count. Groups come back in
/// target order so later steps are deterministic.
pub fn group_by_resolver(outcomes: &[Outcome]) -> Vec<ResolverRecord> {
	let mut groups: BTreeMap<Target, ResolverRecord> = BTreeMap::new();
	for outcome in outcomes {
		let record = groups.entry(outcome.resolver.target)
			.or_insert_with(|| ResolverRecord {
				resolver: outcome.resolver.clone(),
				rtts: Vec::new(),
				failures: 0,
			});
		match (outcome.success, outcome.rtt) {
			(true, Some(rtt)) => record.rtts.push(rtt),
			_ => record.failures += 1,
		}
	}
	groups.into_values().collect()
}

/// Rank resolvers by mean latency, ascending.
///
/// Resolvers without a single success are left out.
pub fn build_report(outcomes: &[Outcome]) -> Vec<ReportRow> {
	let mut rows: Vec<ReportRow> = group_by_resolver(outcomes)
		.into_iter()
		.filter_map(|record| {
			let millis: Vec<f64> = record.rtts.iter().copied().map(whole_millis).collect();
			let latency = summarize(&millis)?;
			Some(ReportRow {
				rank: 0,
				label: record.resolver.label,
				target: record.resolver.target,
				latency,
				successes: millis.len(),
				failures: record.failures,
			})
		})
		.collect();

	// Stable sort: equal means keep target order
	rows.sort_by(|a, b| {
		a.latency.mean_ms.partial_cmp(&b.latency.mean_ms)
			.unwrap_or(std::cmp::Ordering::Equal)
	});
	for (i, row) in rows.iter_mut().enumerate() {
		row.rank = i + 1;
	}
	rows
}
