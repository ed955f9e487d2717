use crate::transport::{Outcome, ProbeClass};

/// The single merge point for both outcome streams.
///
/// Owned by the scheduler loop only, so appends and counter updates need
/// no locking.
#[derive(Debug)]
pub struct Aggregator {
	results: Vec<Outcome>,
	cloud_remaining: usize,
	local_remaining: usize,
}

impl Aggregator {
	pub fn new(cloud_total: usize, local_total: usize) -> Self {
		Aggregator {
			results: Vec::with_capacity(cloud_total + local_total),
			cloud_remaining: cloud_total,
			local_remaining: local_total,
		}
	}

	/// Append an outcome and count it against its class.
	///
	/// Outcomes beyond a class's total are still kept but logged, since they
	/// mean a probe reported twice.
	pub fn record(&mut self, class: ProbeClass, outcome: Outcome) {
		let remaining = match class {
			ProbeClass::Cloud => &mut self.cloud_remaining,
			ProbeClass::Local => &mut self.local_remaining,
		};
		match remaining.checked_sub(1) {
			Some(left) => *remaining = left,
			None => tracing::error!(?class, domain = %outcome.domain, "unexpected extra outcome"),
		}
		self.results.push(outcome);
	}

	pub fn remaining(&self, class: ProbeClass) -> usize {
		match class {
			ProbeClass::Cloud => self.cloud_remaining,
			ProbeClass::Local => self.local_remaining,
		}
	}

	pub fn phase_complete(&self, class: ProbeClass) -> bool {
		self.remaining(class) == 0
	}

	pub fn is_complete(&self) -> bool {
		self.cloud_remaining == 0 && self.local_remaining == 0
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn into_results(self) -> Vec<Outcome> {
		self.results
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transport::ResolverConfig;

	fn outcome(domain: &str) -> Outcome {
		Outcome::failed(ResolverConfig::system(), domain.to_string(), 5)
	}

	#[test]
	fn test_counts_per_class() {
		let mut agg = Aggregator::new(2, 1);
		assert!(!agg.is_complete());

		agg.record(ProbeClass::Cloud, outcome("a"));
		assert_eq!(agg.remaining(ProbeClass::Cloud), 1);
		agg.record(ProbeClass::Local, outcome("b"));
		assert!(agg.phase_complete(ProbeClass::Local));
		assert!(!agg.phase_complete(ProbeClass::Cloud));

		agg.record(ProbeClass::Cloud, outcome("c"));
		assert!(agg.is_complete());
		assert_eq!(agg.len(), 3);
	}

	#[test]
	fn test_keeps_arrival_order() {
		let mut agg = Aggregator::new(3, 0);
		for d in ["x", "y", "z"] {
			agg.record(ProbeClass::Cloud, outcome(d));
		}
		let domains: Vec<String> = agg.into_results().into_iter().map(|o| o.domain).collect();
		assert_eq!(domains, vec!["x", "y", "z"]);
	}

	#[test]
	fn test_extra_outcome_does_not_underflow() {
		let mut agg = Aggregator::new(0, 0);
		assert!(agg.is_complete());
		agg.record(ProbeClass::Local, outcome("late"));
		assert_eq!(agg.remaining(ProbeClass::Local), 0);
		assert_eq!(agg.len(), 1);
	}
}
