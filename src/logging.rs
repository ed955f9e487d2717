use tracing_subscriber::EnvFilter;

/// Set up diagnostic logging on stderr.
///
/// Defaults to warnings only so the report on stdout stays readable. Use
/// the RUST_LOG environment variable to override, e.g.
///   RUST_LOG=info                       -- phase transitions
///   RUST_LOG=cloud_dns_bench::probe=debug -- every failed attempt
pub fn init_logging() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.compact()
		.try_init()
		.ok();
}
