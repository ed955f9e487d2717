use clap::{Parser, ValueEnum};

/// Which built-in candidate list to sample domains from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleSource {
	/// Popular, widely cached domains
	Top,
	/// A broader mix of hosts across many TLDs
	Hosts,
}

/// Cloud DNS resolver benchmark
#[derive(Parser, Debug)]
#[command(name = "cloud-dns-bench", version)]
#[command(about = "Rank public DNS resolvers and the local resolver by mean lookup time")]
pub struct Cli {
	/// Number of random domains to test (max 200)
	#[arg(short = 'q', long = "queries", default_value = "20")]
	pub queries: usize,

	/// Number of simultaneous in-flight queries
	#[arg(short = 'r', long = "concurrency", default_value = "40",
		value_parser = clap::value_parser!(u32).range(1..))]
	pub concurrency: u32,

	/// Candidate list to sample from
	#[arg(long = "type", value_enum, default_value = "hosts")]
	pub source: SampleSource,

	/// File containing candidate domains (one per line), overrides --type
	#[arg(long = "domain-file")]
	pub domain_file: Option<String>,

	/// DNS resolver address (repeatable, e.g. 1.1.1.1, 1.1.1.1:53 or Label=1.1.1.1)
	#[arg(long = "resolver")]
	pub resolvers: Vec<String>,

	/// File containing resolver addresses (one per line)
	#[arg(short = 'f', long = "resolver-file")]
	pub resolver_file: Option<String>,

	/// Per-attempt query timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "8000")]
	pub timeout: u64,

	/// Failed attempts tolerated per cloud query before giving up
	#[arg(long = "attempts", default_value = "5")]
	pub attempts: u32,

	/// Lookup attempts per domain against the local resolver
	#[arg(long = "local-attempts", default_value = "5")]
	pub local_attempts: u32,

	/// Simultaneous lookups against the local resolver
	#[arg(long = "local-window", default_value = "3",
		value_parser = clap::value_parser!(u32).range(1..))]
	pub local_window: u32,

	/// Delay between failed attempts in milliseconds (0 retries immediately)
	#[arg(long = "backoff", default_value = "0")]
	pub backoff: u64,

	/// Skip benchmarking the host's configured resolver
	#[arg(long = "no-local")]
	pub no_local: bool,

	/// Random seed for a reproducible domain sample
	#[arg(short = 's', long = "seed")]
	pub seed: Option<u64>,

	/// Exit right after the report instead of waiting for ENTER
	#[arg(long = "no-pause")]
	pub no_pause: bool,
}
