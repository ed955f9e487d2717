use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{anyhow, Context, Result};

use crate::transport::ResolverConfig;

/// Port every public resolver in the default table listens on.
pub const DNS_PORT: u16 = 53;

/// Parse a resolver address string into a ResolverConfig.
///
/// Supports formats:
///   "1.1.1.1"              -- IPv4, default port 53
///   "1.1.1.1:53"           -- IPv4 with explicit port
///   "2606:4700::1111"      -- bare IPv6, default port 53
///   "[2606:4700::1111]:53" -- bracketed IPv6 with port
///   "Label=1.1.1.1"        -- any of the above with a display label
pub fn parse_resolver(input: &str) -> Result<ResolverConfig> {
	let trimmed = input.trim();
	let (label, address) = match trimmed.split_once('=') {
		Some((label, address)) => (Some(label.trim()), address.trim()),
		None => (None, trimmed),
	};
	if address.is_empty() {
		return Err(anyhow!("empty resolver address"));
	}

	let addr: SocketAddr = if address.starts_with('[') {
		address.parse()
			.map_err(|e| anyhow!("invalid bracketed IPv6 address '{}': {}", address, e))?
	} else if address.contains("::") || address.matches(':').count() > 1 {
		let ip = address.parse()
			.map_err(|e| anyhow!("invalid IPv6 address '{}': {}", address, e))?;
		SocketAddr::new(ip, DNS_PORT)
	} else if let Ok(addr) = address.parse::<SocketAddr>() {
		addr
	} else {
		let ip = address.parse()
			.map_err(|e| anyhow!("invalid IP address '{}': {}", address, e))?;
		SocketAddr::new(ip, DNS_PORT)
	};

	let label = match label {
		Some(l) if !l.is_empty() => l.to_string(),
		_ => addr.ip().to_string(),
	};
	Ok(ResolverConfig::remote(label, addr))
}

/// Read resolver addresses from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped.
pub fn read_resolver_file(path: &str) -> Result<Vec<ResolverConfig>> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read resolver file '{}'", path))?;
	content.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.map(|line| parse_resolver(line)
			.with_context(|| format!("in resolver file '{}'", path)))
		.collect()
}

const DEFAULT_RESOLVERS: &[(&str, [u8; 4])] = &[
	("Google DNS #1", [8, 8, 8, 8]),
	("Google DNS #2", [8, 8, 4, 4]),
	("OpenDNS #1", [208, 67, 222, 222]),
	("OpenDNS #2", [208, 67, 222, 220]),
	("OpenDNS #3", [208, 67, 220, 220]),
	("OpenDNS #4", [208, 67, 220, 222]),
	("DNS Advantage #1", [156, 154, 70, 1]),
	("DNS Advantage #2", [156, 154, 71, 1]),
	("Comodo SecureDNS #1", [8, 26, 56, 26]),
	("Comodo SecureDNS #2", [8, 20, 247, 20]),
	("Norton #1", [198, 153, 192, 50]),
	("Norton #2", [198, 153, 194, 50]),
	("DynDNS #1", [216, 146, 35, 35]),
	("DynDNS #2", [216, 146, 36, 36]),
	("FreeDNS #1", [37, 235, 1, 174]),
	("FreeDNS #2", [37, 235, 1, 177]),
	("Level3 DNS #1", [209, 244, 0, 3]),
	("Level3 DNS #2", [209, 244, 0, 4]),
	("Verisign #1", [64, 6, 64, 6]),
	("Verisign #2", [64, 6, 65, 6]),
	("OpenNIC #1", [107, 150, 40, 234]),
	("OpenNIC #2", [50, 116, 23, 211]),
	("SafeDNS #1", [195, 46, 39, 39]),
	("SafeDNS #2", [195, 46, 39, 40]),
	("DNS.Watch #1", [84, 200, 69, 80]),
	("DNS.Watch #2", [84, 200, 70, 40]),
	("Norton ConnectSafe #1", [199, 85, 126, 10]),
	("Norton ConnectSafe #2", [199, 85, 127, 10]),
	("Censurfridns #1", [89, 233, 43, 71]),
	("Censurfridns #2", [91, 239, 100, 100]),
	("GreenTeam DNS #1", [81, 218, 119, 11]),
	("GreenTeam DNS #2", [209, 88, 198, 133]),
	("Alternate DNS #1", [198, 101, 242, 72]),
	("Alternate DNS #2", [23, 253, 163, 53]),
	("Yandex.DNS #1", [77, 88, 8, 8]),
	("Yandex.DNS #2", [77, 88, 8, 1]),
	("Hurricane Electric", [74, 82, 42, 42]),
	("puntCAT", [109, 69, 8, 51]),
];

/// Return the built-in table of public resolvers.
pub fn default_resolvers() -> Vec<ResolverConfig> {
	DEFAULT_RESOLVERS.iter()
		.map(|&(label, octets)| {
			let ip = IpAddr::V4(Ipv4Addr::from(octets));
			ResolverConfig::remote(label, SocketAddr::new(ip, DNS_PORT))
		})
		.collect()
}
