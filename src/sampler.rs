use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on the number of sampled domains per run.
pub const MAX_QUERIES: usize = 200;

/// Build the sampling RNG.
///
/// A fixed seed reproduces a run; otherwise the seed comes from the wall
/// clock.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
	let seed = seed.unwrap_or_else(|| {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_nanos() as u64)
			.unwrap_or_default()
	});
	StdRng::seed_from_u64(seed)
}

/// Pick `count` domains uniformly at random, with replacement.
///
/// `count` is clamped to [`MAX_QUERIES`]. An empty candidate list or a zero
/// count yields an empty sample.
pub fn sample<R: Rng + ?Sized>(candidates: &[String], count: usize, rng: &mut R) -> Vec<String> {
	if candidates.is_empty() {
		return Vec::new();
	}
	(0..count.min(MAX_QUERIES))
		.map(|_| candidates[rng.gen_range(0..candidates.len())].clone())
		.collect()
}
