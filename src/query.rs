use std::collections::VecDeque;

use tokio::sync::{mpsc, oneshot};

use crate::transport::{Outcome, ResolverConfig};

/// A single probe: one domain against one resolver.
///
/// The probe must not touch the network until `gate` fires, and reports
/// its single outcome on `sink`.
#[derive(Debug)]
pub struct Probe {
	pub domain: String,
	pub resolver: ResolverConfig,
	pub gate: oneshot::Receiver<()>,
	pub sink: mpsc::UnboundedSender<Outcome>,
}

/// FIFO of admission signals, one per probe, in build order.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
	pending: VecDeque<oneshot::Sender<()>>,
	admitted: usize,
}

impl AdmissionQueue {
	/// Release the next waiting probe. Returns false once the queue is empty.
	pub fn admit_next(&mut self) -> bool {
		let Some(gate) = self.pending.pop_front() else {
			return false;
		};
		self.admitted += 1;
		if gate.send(()).is_err() {
			// Probe future already dropped; it reported a failure on the way out.
			tracing::warn!(position = self.admitted, "admitted a probe that is no longer waiting");
		}
		true
	}

	/// Release up to `n` probes, returning how many were released.
	pub fn admit(&mut self, n: usize) -> usize {
		let mut released = 0;
		while released < n && self.admit_next() {
			released += 1;
		}
		released
	}

	pub fn admitted(&self) -> usize {
		self.admitted
	}

	pub fn waiting(&self) -> usize {
		self.pending.len()
	}

	pub fn total(&self) -> usize {
		self.admitted + self.pending.len()
	}
}

/// Probes of one class together with their admission queue.
#[derive(Debug, Default)]
pub struct QueryBatch {
	pub probes: Vec<Probe>,
	pub admission: AdmissionQueue,
}

impl QueryBatch {
	fn push(&mut self, domain: &str, resolver: &ResolverConfig, sink: &mpsc::UnboundedSender<Outcome>) {
		let (tx, rx) = oneshot::channel();
		self.probes.push(Probe {
			domain: domain.to_string(),
			resolver: resolver.clone(),
			gate: rx,
			sink: sink.clone(),
		});
		self.admission.pending.push_back(tx);
	}
}

/// Expand domains x resolvers into cloud probes.
///
/// Domains form the outer loop and resolvers the inner one, so admission
/// walks every resolver for the first domain before moving on.
pub fn build_cloud_queries(
	domains: &[String],
	resolvers: &[ResolverConfig],
	sink: &mpsc::UnboundedSender<Outcome>,
) -> QueryBatch {
	let mut batch = QueryBatch::default();
	for domain in domains {
		for resolver in resolvers {
			batch.push(domain, resolver, sink);
		}
	}
	batch
}

/// One probe per domain against the host's own resolver.
pub fn build_local_queries(
	domains: &[String],
	sink: &mpsc::UnboundedSender<Outcome>,
) -> QueryBatch {
	let system = ResolverConfig::system();
	let mut batch = QueryBatch::default();
	for domain in domains {
		batch.push(domain, &system, sink);
	}
	batch
}
