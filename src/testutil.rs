//! Scripted stand-ins for the network collaborators.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::dns::{DnsClient, ExchangeError, SystemLookup};
use crate::resolver::parse_resolver;
use crate::transport::ResolverConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	ExchangeDone(String, SocketAddr),
	LookupStart(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Tracks how many calls are running at once.
#[derive(Debug, Default)]
pub struct Gauge {
	current: AtomicUsize,
	peak: AtomicUsize,
}

impl Gauge {
	fn enter(&self) {
		let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
		self.peak.fetch_max(now, Ordering::SeqCst);
	}

	fn leave(&self) {
		self.current.fetch_sub(1, Ordering::SeqCst);
	}

	pub fn peak(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}
}

#[derive(Debug)]
pub struct ScriptedClient {
	pub rtt: HashMap<SocketAddr, Duration>,
	pub dead: HashSet<SocketAddr>,
	/// Failures every live (domain, server) pair sees before answering.
	pub flaky: u32,
	pub delay: Duration,
	pub calls: AtomicUsize,
	pub gauge: Gauge,
	pub events: EventLog,
	attempts: Mutex<HashMap<(String, SocketAddr), u32>>,
}

impl ScriptedClient {
	pub fn new(events: EventLog) -> Self {
		ScriptedClient {
			rtt: HashMap::new(),
			dead: HashSet::new(),
			flaky: 0,
			delay: Duration::ZERO,
			calls: AtomicUsize::new(0),
			gauge: Gauge::default(),
			events,
			attempts: Mutex::new(HashMap::new()),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl DnsClient for ScriptedClient {
	async fn exchange(
		&self,
		domain: &str,
		server: SocketAddr,
		timeout: Duration,
	) -> Result<Duration, ExchangeError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.gauge.enter();
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		let seen = {
			let mut attempts = self.attempts.lock().unwrap();
			let n = attempts.entry((domain.to_string(), server)).or_insert(0);
			*n += 1;
			*n
		};
		self.gauge.leave();
		self.events.lock().unwrap().push(Event::ExchangeDone(domain.to_string(), server));

		if self.dead.contains(&server) || seen <= self.flaky {
			return Err(ExchangeError::Timeout(timeout));
		}
		Ok(self.rtt.get(&server).copied().unwrap_or(Duration::from_millis(10)))
	}
}

#[derive(Debug)]
pub struct ScriptedLookup {
	pub failing: HashSet<String>,
	pub delay: Duration,
	pub calls: AtomicUsize,
	pub gauge: Gauge,
	pub events: EventLog,
}

impl ScriptedLookup {
	pub fn new(events: EventLog) -> Self {
		ScriptedLookup {
			failing: HashSet::new(),
			delay: Duration::ZERO,
			calls: AtomicUsize::new(0),
			gauge: Gauge::default(),
			events,
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl SystemLookup for ScriptedLookup {
	async fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ExchangeError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.events.lock().unwrap().push(Event::LookupStart(domain.to_string()));
		self.gauge.enter();
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		self.gauge.leave();
		if self.failing.contains(domain) {
			return Err(ExchangeError::NoAddresses);
		}
		Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
	}
}

pub fn domains(n: usize) -> Vec<String> {
	(0..n).map(|i| format!("d{}.test", i)).collect()
}

pub fn resolvers(n: usize) -> Vec<ResolverConfig> {
	(0..n).map(|i| parse_resolver(&format!("192.0.2.{}", i + 1)).unwrap()).collect()
}

pub fn addr(i: usize) -> SocketAddr {
	format!("192.0.2.{}:53", i + 1).parse().unwrap()
}
