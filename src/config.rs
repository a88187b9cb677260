use std::env;

pub struct Config;

impl Config {
    pub fn telegram_bot_token() -> Option<String> {
        env::var("TELEGRAM_BOT_TOKEN").ok().filter(|t| !t.is_empty())
    }

    pub fn telegram_base_url() -> String {
        env::var("TELEGRAM_BASE_URL").unwrap_or_else(|_| "https://api.telegram.org/bot".to_string())
    }

    pub fn database_url() -> String {
        env::var("DATABASE_URL").expect("No DATABASE_URL environment variable found")
    }

    pub fn database_pool_size() -> u32 {
        Self::parse_var("DATABASE_POOL_SIZE", 5)
    }

    pub fn rss_base_url() -> String {
        env::var("RSS_BASE_URL").unwrap_or_default()
    }

    pub fn poll_interval_seconds() -> u64 {
        Self::parse_var("POLL_INTERVAL_SECONDS", 300)
    }

    pub fn request_timeout_in_seconds() -> u64 {
        Self::parse_var("REQUEST_TIMEOUT_SECONDS", 30)
    }

    fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
        match env::var(name) {
            Ok(value) => value.parse().unwrap_or(default),
            Err(_) => default,
        }
    }
}
