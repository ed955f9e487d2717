use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Label shown for the host's own resolver.
pub const SYSTEM_LABEL: &str = "Current DNS";

/// Where a probe sends its query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
	/// An explicit resolver reached over UDP
	Remote(SocketAddr),
	/// Whatever the host is configured to use (getaddrinfo)
	System,
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Target::Remote(addr) => f.pad(&addr.ip().to_string()),
			Target::System => f.pad("system"),
		}
	}
}

/// Configuration for a single DNS resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
	pub label: String,
	pub target: Target,
}

impl ResolverConfig {
	pub fn remote(label: impl Into<String>, addr: SocketAddr) -> Self {
		ResolverConfig { label: label.into(), target: Target::Remote(addr) }
	}

	pub fn system() -> Self {
		ResolverConfig { label: SYSTEM_LABEL.to_string(), target: Target::System }
	}
}

/// The two probe populations. Each has its own sink, counter and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeClass {
	Cloud,
	Local,
}

/// Terminal result of one probe.
///
/// `failures` counts the attempts that got no answer. A failed remote
/// probe therefore carries `max_failures + 1`, a failed local probe
/// carries `local_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
	pub resolver: ResolverConfig,
	pub domain: String,
	pub rtt: Option<Duration>,
	pub failures: u32,
	pub success: bool,
}

impl Outcome {
	pub fn succeeded(resolver: ResolverConfig, domain: String, rtt: Duration, failures: u32) -> Self {
		Outcome { resolver, domain, rtt: Some(rtt), failures, success: true }
	}

	pub fn failed(resolver: ResolverConfig, domain: String, failures: u32) -> Self {
		Outcome { resolver, domain, rtt: None, failures, success: false }
	}
}

/// Retry behaviour shared by every probe in a run.
///
/// The per-attempt timeout and the failure ceiling are independent knobs.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub timeout: Duration,
	/// A remote probe gives up once its failure count exceeds this.
	pub max_failures: u32,
	/// Total lookups a local probe may try.
	pub local_attempts: u32,
	/// Pause between failed attempts. Zero retries immediately.
	pub backoff: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		RetryPolicy {
			timeout: Duration::from_secs(8),
			max_failures: 5,
			local_attempts: 5,
			backoff: Duration::ZERO,
		}
	}
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
	pub queries: usize,
	pub max_inflight: usize,
	pub local_window: usize,
	pub include_local: bool,
	pub seed: Option<u64>,
	pub retry: RetryPolicy,
}

impl Default for BenchmarkConfig {
	fn default() -> Self {
		BenchmarkConfig {
			queries: 20,
			max_inflight: 40,
			local_window: 3,
			include_local: true,
			seed: None,
			retry: RetryPolicy::default(),
		}
	}
}
