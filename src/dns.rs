use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{Name, RecordType};
use thiserror::Error;
use tokio::net::UdpSocket;

/// Why a single query attempt produced no answer.
#[derive(Debug, Error)]
pub enum ExchangeError {
	#[error("no response within {0:?}")]
	Timeout(Duration),
	#[error("socket error: {0}")]
	Io(#[from] std::io::Error),
	#[error("cannot encode query for '{domain}': {reason}")]
	Encode { domain: String, reason: String },
	#[error("unusable response: {0}")]
	Decode(String),
	#[error("lookup returned no addresses")]
	NoAddresses,
}

/// Performs one A-record exchange with an explicit resolver.
///
/// Returns the round-trip time of the answer. Any response counts,
/// whatever its rcode.
pub trait DnsClient: Send + Sync + 'static {
	fn exchange(
		&self,
		domain: &str,
		server: SocketAddr,
		timeout: Duration,
	) -> impl Future<Output = Result<Duration, ExchangeError>> + Send;
}

/// Resolves a name through the host's configured resolver.
pub trait SystemLookup: Send + Sync + 'static {
	fn lookup_host(
		&self,
		domain: &str,
	) -> impl Future<Output = Result<Vec<IpAddr>, ExchangeError>> + Send;
}

/// Build an A query with recursion desired.
///
/// Returns the serialized query bytes ready to send over UDP.
pub fn build_query(domain: &str, txid: u16) -> Result<Vec<u8>, ExchangeError> {
	let encode_err = |reason: String| ExchangeError::Encode {
		domain: domain.to_string(),
		reason,
	};
	let name = Name::from_ascii(domain).map_err(|e| encode_err(e.to_string()))?;

	let mut message = Message::new();
	message.set_id(txid);
	message.set_recursion_desired(true);
	message.add_query(Query::query(name, RecordType::A));

	message.to_vec().map_err(|e| encode_err(e.to_string()))
}

/// Parse a DNS response, validating the transaction ID and extracting the rcode.
pub fn parse_response(bytes: &[u8], expected_txid: u16) -> Result<ResponseCode, ExchangeError> {
	let message = Message::from_vec(bytes)
		.map_err(|e| ExchangeError::Decode(e.to_string()))?;

	if message.id() != expected_txid {
		return Err(ExchangeError::Decode(format!(
			"txid mismatch: expected {}, got {}",
			expected_txid, message.id()
		)));
	}
	if message.message_type() != MessageType::Response {
		return Err(ExchangeError::Decode("received a query instead of a response".into()));
	}
	Ok(message.response_code())
}

/// Plain DNS over UDP.
///
/// Binds a dedicated socket per exchange so concurrent probes against the
/// same resolver never read each other's answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpDnsClient;

impl DnsClient for UdpDnsClient {
	async fn exchange(
		&self,
		domain: &str,
		server: SocketAddr,
		timeout: Duration,
	) -> Result<Duration, ExchangeError> {
		let txid: u16 = rand::random();
		let query = build_query(domain, txid)?;

		let bind_addr: SocketAddr = if server.is_ipv4() {
			(Ipv4Addr::UNSPECIFIED, 0).into()
		} else {
			(Ipv6Addr::UNSPECIFIED, 0).into()
		};
		let socket = UdpSocket::bind(bind_addr).await?;

		// Time send+recv only
		let start = Instant::now();
		socket.send_to(&query, server).await?;

		// 4096 bytes covers EDNS-sized answers
		let mut buf = vec![0u8; 4096];
		loop {
			let remaining = timeout
				.checked_sub(start.elapsed())
				.filter(|d| !d.is_zero())
				.ok_or(ExchangeError::Timeout(timeout))?;
			let (len, src) = tokio::time::timeout(remaining, socket.recv_from(&mut buf))
				.await
				.map_err(|_| ExchangeError::Timeout(timeout))??;
			if src.ip() != server.ip() {
				continue;
			}
			match parse_response(&buf[..len], txid) {
				Ok(rcode) => {
					let rtt = start.elapsed();
					tracing::trace!(%server, domain, %rcode, ?rtt, "response");
					return Ok(rtt);
				}
				Err(e) => {
					tracing::trace!(%server, domain, error = %e, "discarding datagram");
				}
			}
		}
	}
}

/// The host's getaddrinfo, with whatever timeout and retry policy it has.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLookup;

impl SystemLookup for HostLookup {
	async fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>, ExchangeError> {
		let addrs: Vec<IpAddr> = tokio::net::lookup_host((domain, 0))
			.await?
			.map(|addr| addr.ip())
			.collect();
		if addrs.is_empty() {
			return Err(ExchangeError::NoAddresses);
		}
		Ok(addrs)
	}
}
