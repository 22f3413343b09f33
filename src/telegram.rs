use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use frankenstein::AsyncTelegramApi;
use frankenstein::ParseMode;
use frankenstein::client_reqwest::Bot;
use frankenstein::methods::SendMessageParams;
use frankenstein::types::ChatId;
use tracing::{error, info};

use crate::probe_result::Summary;
use crate::reporter::CheckReporter;

/// Pause between sends so a long recipient list does not trip flood limits.
const SEND_GAP: Duration = Duration::from_secs(1);

pub struct TelegramReporter {
    bot: Bot,
    chat_ids: Vec<String>,
}

impl TelegramReporter {
    pub fn new(token: &str, chat_ids: &[String]) -> Self {
        Self {
            bot: Bot::new(token),
            chat_ids: chat_ids
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl CheckReporter for TelegramReporter {
    /// Delivers the report to every configured chat. A failed send is logged
    /// and the remaining chats are still attempted.
    async fn report(&self, summary: &Summary) -> Result<()> {
        let text = format_report(summary);
        let mut delivered = 0usize;

        for chat_id in &self.chat_ids {
            let chat: ChatId = match chat_id.parse::<i64>() {
                Ok(numeric) => numeric.into(),
                Err(_) => chat_id.clone().into(),
            };
            let params = SendMessageParams::builder()
                .chat_id(chat)
                .text(text.clone())
                .parse_mode(ParseMode::Html)
                .build();

            match self.bot.send_message(&params).await {
                Ok(_) => delivered += 1,
                Err(e) => error!("delivery to chat {} failed: {}", chat_id, e),
            }
            tokio::time::sleep(SEND_GAP).await;
        }

        info!(
            "report delivered to {}/{} chats",
            delivered,
            self.chat_ids.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

pub fn format_report(summary: &Summary) -> String {
    let status_emoji = if summary.is_success() { "✅" } else { "❌" };
    let overall = if summary.is_success() { "OK" } else { "FAILED" };

    let mut report = String::from("🔍 <b>VLESS Check Report</b>\n\n");
    report.push_str(&format!("{status_emoji} <b>Status:</b> {overall}\n"));
    report.push_str(&format!("📊 <b>Success:</b> {}\n", summary.success_rate));
    report.push_str(&format!(
        "🕐 <b>Time:</b> {}\n",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("🌐 <b>Server:</b> {}\n\n", summary.server));

    for probe in &summary.probes {
        let emoji = if probe.status.is_success() {
            "✅"
        } else {
            "❌"
        };
        // First line only, detailed messages stay readable on a phone.
        let detail = probe.message.lines().next().unwrap_or("");
        report.push_str(&format!(
            "{emoji} <b>{}:</b> {detail}\n",
            probe.name.to_uppercase()
        ));
    }

    report
}
