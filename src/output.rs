use anyhow::Result;
use async_trait::async_trait;

use crate::probe_result::{ProbeStatus, Summary};
use crate::reporter::CheckReporter;

pub struct ConsoleReporter;

#[async_trait]
impl CheckReporter for ConsoleReporter {
    async fn report(&self, summary: &Summary) -> Result<()> {
        display_summary(summary);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

pub fn display_summary(summary: &Summary) {
    println!("\n=== VLESS Check Results ===");
    println!("Server: {} ({})", summary.server, summary.name);
    println!(
        "Time:   {}",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", "=".repeat(72));
    println!("{:<8} {:<10} {:<10} {}", "Probe", "Status", "Latency", "Detail");

    for probe in &summary.probes {
        let status = match probe.status {
            ProbeStatus::Success => "✓ PASS",
            ProbeStatus::Failure => "✗ FAIL",
            ProbeStatus::Error => "✗ ERROR",
        };
        let latency = probe
            .latency_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<10} {:<10} {}",
            probe.name.to_uppercase(),
            status,
            latency,
            probe.message
        );
    }

    println!("{}", "=".repeat(72));
    println!(
        "Overall: {} ({} probes passed)",
        if summary.is_success() { "OK" } else { "FAILED" },
        summary.success_rate
    );
}
