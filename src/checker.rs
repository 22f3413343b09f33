use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::parser::ConnectionTarget;
use crate::probe;
use crate::probe_result::Summary;

/// Runs the full probe sequence against one target.
///
/// Probes run sequentially in a fixed order (DNS, geolocation, TCP, HTTP) and
/// every probe contributes a result regardless of the outcome of the ones
/// before it.
pub async fn run_check(target: &ConnectionTarget, timeout: Duration) -> Summary {
    let start = Instant::now();

    let results = vec![
        probe::dns(target, timeout).await,
        probe::geolocate(target, timeout).await,
        probe::tcp_connect(target, timeout).await,
        probe::http_reachability(timeout).await,
    ];

    let summary = Summary::new(target, results);
    info!(
        "check of {} completed in {:.2}s - {} probes passed ({})",
        summary.server,
        start.elapsed().as_secs_f64(),
        summary.success_rate,
        if summary.is_success() { "OK" } else { "FAILED" }
    );
    summary
}
