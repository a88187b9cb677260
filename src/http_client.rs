use crate::config::Config;
use isahc::config::RedirectPolicy;
use isahc::prelude::*;
use isahc::HttpClient;
use std::sync::OnceLock;
use std::time::Duration;

static CLIENT: OnceLock<HttpClient> = OnceLock::new();

static USER_AGENT: &str = concat!("feed_courier/", env!("CARGO_PKG_VERSION"));

/// Shared client for feed fetches and Telegram API calls. Feed hosts
/// commonly reject requests without a user agent, so one is always sent.
pub fn client() -> &'static HttpClient {
    CLIENT.get_or_init(init_client)
}

fn init_client() -> HttpClient {
    HttpClient::builder()
        .redirect_policy(RedirectPolicy::Limit(10))
        .timeout(request_timeout())
        .default_header("User-Agent", USER_AGENT)
        .build()
        .unwrap()
}

fn request_timeout() -> Duration {
    Duration::from_secs(Config::request_timeout_in_seconds())
}

#[cfg(test)]
mod tests {
    use mockito::{mock, Matcher};

    #[test]
    fn it_identifies_itself_to_feed_hosts() {
        let m = mock("GET", "/ua")
            .match_header("user-agent", Matcher::Regex("^feed_courier/".to_string()))
            .with_status(200)
            .create();

        let response = super::client()
            .get(format!("{}/ua", mockito::server_url()))
            .unwrap();

        assert!(response.status().is_success());
        m.assert();
    }
}
