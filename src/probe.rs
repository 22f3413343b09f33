use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::error::ProbeError;
use crate::parser::ConnectionTarget;
use crate::probe_result::ProbeResult;

pub const DNS: &str = "dns";
pub const GEO: &str = "geo";
pub const TCP: &str = "tcp";
pub const HTTP: &str = "http";

const GEO_API: &str = "http://ip-api.com/json";

/// Well-known endpoints for the reachability check. Any response from any of
/// them counts.
const HTTP_TEST_URLS: [&str; 2] = [
    "http://www.gstatic.com/generate_204",
    "https://www.cloudflare.com/cdn-cgi/trace",
];

/// Resolves the target host. Success requires at least one address within the
/// timeout; an empty answer is a failure, a resolver error is an error.
pub async fn dns(target: &ConnectionTarget, probe_timeout: Duration) -> ProbeResult {
    let start = Instant::now();
    match timeout(probe_timeout, resolve(&target.host, target.port)).await {
        Ok(Ok(Some(ip))) => {
            let elapsed = start.elapsed().as_millis() as u64;
            ProbeResult::success(DNS, Some(elapsed), format!("resolved to {ip} in {elapsed}ms"))
        }
        Ok(Ok(None)) => ProbeResult::failure(DNS, "resolver returned no records"),
        Ok(Err(e)) => ProbeResult::error(DNS, format!("resolver error: {e}")),
        Err(_) => ProbeResult::failure(DNS, ProbeError::Timeout(probe_timeout).to_string()),
    }
}

async fn resolve(host: &str, port: u16) -> std::io::Result<Option<IpAddr>> {
    let mut addrs = lookup_host((host, port)).await?;
    Ok(addrs.next().map(|a| a.ip()))
}

#[derive(Debug, Deserialize)]
struct GeoInfo {
    country: Option<String>,
    city: Option<String>,
    isp: Option<String>,
}

/// Looks up where the resolved IP lives. Best-effort: whatever the outcome,
/// the probes after it still run.
pub async fn geolocate(target: &ConnectionTarget, probe_timeout: Duration) -> ProbeResult {
    let start = Instant::now();
    match timeout(probe_timeout, lookup_location(&target.host, target.port)).await {
        Ok(Ok(info)) => {
            let elapsed = start.elapsed().as_millis() as u64;
            ProbeResult::success(
                GEO,
                Some(elapsed),
                format!(
                    "location: {}, {} ({})",
                    info.country.as_deref().unwrap_or("N/A"),
                    info.city.as_deref().unwrap_or("N/A"),
                    info.isp.as_deref().unwrap_or("N/A"),
                ),
            )
        }
        Ok(Err(e @ ProbeError::Service(_))) => ProbeResult::error(GEO, e.to_string()),
        Ok(Err(e)) => ProbeResult::failure(GEO, e.to_string()),
        Err(_) => ProbeResult::failure(GEO, ProbeError::Timeout(probe_timeout).to_string()),
    }
}

async fn lookup_location(host: &str, port: u16) -> Result<GeoInfo, ProbeError> {
    let ip = resolve(host, port)
        .await?
        .ok_or_else(|| ProbeError::Service("no resolved address to geolocate".into()))?;

    let response = reqwest::get(format!("{GEO_API}/{ip}")).await?;
    if !response.status().is_success() {
        return Err(ProbeError::Service(format!(
            "geolocation API returned {}",
            response.status()
        )));
    }

    let info = response
        .json::<GeoInfo>()
        .await
        .map_err(|e| ProbeError::Service(format!("bad geolocation payload: {e}")))?;
    Ok(info)
}

/// Raw TCP connect to host:port. The stream is dropped as soon as the
/// handshake completes.
pub async fn tcp_connect(target: &ConnectionTarget, probe_timeout: Duration) -> ProbeResult {
    let start = Instant::now();
    match timeout(
        probe_timeout,
        TcpStream::connect((target.host.as_str(), target.port)),
    )
    .await
    {
        Ok(Ok(stream)) => {
            drop(stream);
            let elapsed = start.elapsed().as_millis() as u64;
            ProbeResult::success(
                TCP,
                Some(elapsed),
                format!("connected to {} in {elapsed}ms", target.endpoint()),
            )
        }
        Ok(Err(e)) => ProbeResult::failure(TCP, format!("connection failed: {e}")),
        Err(_) => ProbeResult::failure(TCP, ProbeError::Timeout(probe_timeout).to_string()),
    }
}

/// Checks general HTTP reachability against the well-known endpoints. Any
/// response counts; the status code is reported but does not gate success.
pub async fn http_reachability(probe_timeout: Duration) -> ProbeResult {
    let client = match reqwest::Client::builder().timeout(probe_timeout).build() {
        Ok(client) => client,
        Err(e) => return ProbeResult::error(HTTP, format!("client setup failed: {e}")),
    };

    let mut reached = 0usize;
    let mut latency = None;
    let mut notes = Vec::with_capacity(HTTP_TEST_URLS.len());

    for url in HTTP_TEST_URLS {
        let start = Instant::now();
        match client.get(url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_millis() as u64;
                reached += 1;
                latency.get_or_insert(elapsed);
                notes.push(format!(
                    "{} {} in {elapsed}ms",
                    endpoint_host(url),
                    response.status().as_u16()
                ));
            }
            Err(e) => {
                debug!("http check against {url} failed: {e}");
                notes.push(format!("{} unreachable", endpoint_host(url)));
            }
        }
    }

    let message = format!(
        "{reached}/{} endpoints responded: {}",
        HTTP_TEST_URLS.len(),
        notes.join(", ")
    );
    if reached > 0 {
        ProbeResult::success(HTTP, latency, message)
    } else {
        ProbeResult::failure(HTTP, message)
    }
}

fn endpoint_host(url: &str) -> &str {
    let trimmed = url
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    trimmed.split('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_vless_uri;
    use crate::probe_result::ProbeStatus;

    fn target(host: &str, port: u16) -> ConnectionTarget {
        parse_vless_uri(&format!("vless://abc@{host}:{port}")).unwrap()
    }

    #[tokio::test]
    async fn tcp_probe_succeeds_against_live_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = tcp_connect(&target("127.0.0.1", port), Duration::from_secs(5)).await;
        assert_eq!(result.status, ProbeStatus::Success);
        assert!(result.latency_ms.is_some());
    }

    #[tokio::test]
    async fn tcp_probe_fails_against_closed_port() {
        // Grab a port the OS considers free, then release it before connecting.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = tcp_connect(&target("127.0.0.1", port), Duration::from_secs(5)).await;
        assert_eq!(result.status, ProbeStatus::Failure);
    }

    #[tokio::test]
    async fn tcp_probe_timeout_is_a_failure_not_a_hang() {
        // TEST-NET-1, guaranteed unroutable; either a fast unreachable error
        // or the timeout, both of which must land as a failure.
        let started = Instant::now();
        let result = tcp_connect(&target("192.0.2.1", 81), Duration::from_millis(200)).await;
        assert_eq!(result.status, ProbeStatus::Failure);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn dns_probe_resolves_localhost() {
        let result = dns(&target("localhost", 443), Duration::from_secs(5)).await;
        assert_eq!(result.status, ProbeStatus::Success);
        assert!(result.message.contains("resolved to"));
    }

    #[tokio::test]
    async fn dns_probe_reports_unresolvable_host() {
        let result = dns(&target("host.invalid", 443), Duration::from_secs(5)).await;
        assert_ne!(result.status, ProbeStatus::Success);
    }

    #[test]
    fn endpoint_host_strips_scheme_and_path() {
        assert_eq!(
            endpoint_host("http://www.gstatic.com/generate_204"),
            "www.gstatic.com"
        );
        assert_eq!(
            endpoint_host("https://www.cloudflare.com/cdn-cgi/trace"),
            "www.cloudflare.com"
        );
    }
}
