use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Serve the check over HTTP
    Web,
    /// Push one report to the configured Telegram chats
    Telegram,
    /// Run the check once and exit with a status code
    Check,
}

#[derive(Parser, Debug)]
#[command(name = "vlessprobe")]
#[command(about = "Checks a VLESS server for DNS, geolocation, TCP and HTTP reachability")]
pub struct Config {
    /// VLESS connection string to check
    #[arg(short = 'c', long, env = "VLESS_CONFIG")]
    pub vless_config: String,

    /// Delivery mode
    #[arg(short, long, env = "MODE", value_enum, default_value = "web")]
    pub mode: Mode,

    /// Telegram bot token (telegram mode only)
    #[arg(long, env = "BOT_TOKEN")]
    pub bot_token: Option<String>,

    /// Comma-separated Telegram chat ids (telegram mode only)
    #[arg(long, env = "CHAT_IDS", value_delimiter = ',')]
    pub chat_ids: Vec<String>,

    /// Web server port
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Timeout for each probe in seconds
    #[arg(short = 'T', long, default_value = "10")]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Mode invariants, enforced at startup before any probe runs.
    pub fn validate(&self) -> Result<()> {
        if self.mode == Mode::Telegram {
            if self.bot_token.as_deref().unwrap_or("").is_empty() {
                bail!("telegram mode requires a bot token");
            }
            if self.chat_ids.iter().all(|c| c.trim().is_empty()) {
                bail!("telegram mode requires at least one chat id");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: Mode) -> Config {
        Config {
            vless_config: "vless://abc@example.com:443".into(),
            mode,
            bot_token: None,
            chat_ids: Vec::new(),
            port: 8000,
            timeout: 10,
            verbose: false,
        }
    }

    #[test]
    fn web_and_check_modes_need_no_credentials() {
        assert!(config(Mode::Web).validate().is_ok());
        assert!(config(Mode::Check).validate().is_ok());
    }

    #[test]
    fn telegram_mode_without_token_is_fatal() {
        let mut cfg = config(Mode::Telegram);
        cfg.chat_ids = vec!["12345".into()];
        assert!(cfg.validate().is_err());

        cfg.bot_token = Some(String::new());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn telegram_mode_without_chat_ids_is_fatal() {
        let mut cfg = config(Mode::Telegram);
        cfg.bot_token = Some("123:token".into());
        assert!(cfg.validate().is_err());

        cfg.chat_ids = vec!["  ".into()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn telegram_mode_with_credentials_is_accepted() {
        let mut cfg = config(Mode::Telegram);
        cfg.bot_token = Some("123:token".into());
        cfg.chat_ids = vec!["12345".into(), "-100987".into()];
        assert!(cfg.validate().is_ok());
    }
}
