use anyhow::{Context, Result};

/// Return popular domains likely to sit in every resolver's cache.
pub fn default_top_domains() -> Vec<String> {
	vec![
		"google.com",
		"youtube.com",
		"facebook.com",
		"amazon.com",
		"wikipedia.org",
		"twitter.com",
		"reddit.com",
		"netflix.com",
		"microsoft.com",
		"apple.com",
		"instagram.com",
		"linkedin.com",
		"yahoo.com",
		"bing.com",
		"live.com",
		"office.com",
		"github.com",
		"stackoverflow.com",
		"twitch.tv",
		"ebay.com",
		"paypal.com",
		"cloudflare.com",
		"adobe.com",
		"zoom.us",
		"dropbox.com",
		"spotify.com",
		"wordpress.org",
		"pinterest.com",
		"imdb.com",
		"cnn.com",
		"bbc.co.uk",
		"nytimes.com",
		"theguardian.com",
		"baidu.com",
		"qq.com",
		"yandex.ru",
		"whatsapp.com",
		"tiktok.com",
		"duckduckgo.com",
		"mozilla.org",
	].into_iter().map(String::from).collect()
}

/// Return a broader list of real hosts across many TLDs.
///
/// Most of these are unlikely to be cached everywhere, so they exercise
/// actual recursion rather than cache hits.
pub fn default_host_domains() -> Vec<String> {
	vec![
		// Government and institutional
		"archives.gov",
		"usgs.gov",
		"noaa.gov",
		"energy.gov",
		"census.gov",
		"nist.gov",
		"loc.gov",
		"si.edu",
		"caltech.edu",
		"mit.edu",
		"stanford.edu",
		"cornell.edu",
		// International research
		"cern.ch",
		"csiro.au",
		"ethz.ch",
		"mpg.de",
		"cnrs.fr",
		"nrc.ca",
		"anu.edu.au",
		"cam.ac.uk",
		"tudelft.nl",
		"inria.fr",
		// Country-code TLDs
		"ibge.gov.br",
		"kb.se",
		"onb.ac.at",
		"nationaalarchief.nl",
		"riksarkivet.no",
		"arkisto.fi",
		"nla.gov.au",
		"ndl.go.jp",
		"keio.ac.jp",
		"snu.ac.kr",
		"iitb.ac.in",
		"natlib.govt.nz",
		"ubc.ca",
		"unam.mx",
		"usp.br",
		"uct.ac.za",
		"tu-berlin.de",
		"kuleuven.be",
		"tcd.ie",
		"ulisboa.pt",
		"ku.dk",
		// Tech and less common TLDs
		"pkg.dev",
		"dart.dev",
		"web.app",
		"crates.io",
		"lobste.rs",
		"httpbin.org",
		"arxiv.org",
		"jstor.org",
		"archive.org",
		"gutenberg.org",
		"openlibrary.org",
		"icann.org",
		"iana.org",
		"ietf.org",
		"verisign.com",
		// Regional broadcasters
		"rtve.es",
		"yle.fi",
		"dr.dk",
		"nrk.no",
		"svt.se",
		"rtp.pt",
		"rte.ie",
		"srf.ch",
		"orf.at",
		"vrt.be",
	].into_iter().map(String::from).collect()
}

/// Read domains from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped.
pub fn read_domain_file(path: &str) -> Result<Vec<String>> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read domain file '{}'", path))?;
	let domains: Vec<String> = content.lines()
		.map(|line| line.trim().to_string())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.collect();
	Ok(domains)
}
