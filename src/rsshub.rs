use crate::config::Config;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://rsshub.app";

// Older deployments configured the base URL with the route already attached.
const LEGACY_ROUTE_SUFFIXES: [&str; 5] = [
    "/youtube/user",
    "/youtube/channel",
    "/youtube/live",
    "/twitter/user",
    "/x/user",
];

pub fn twitter_user_url(handle: &str) -> String {
    build_url(&format!("/twitter/user/{}", handle))
}

pub fn youtube_user_url(channel_name: &str) -> String {
    build_url(&format!("/youtube/user/{}", channel_name))
}

fn build_url(route: &str) -> String {
    let base_url = normalize_base_url(&Config::rss_base_url());
    let route = if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{}", route)
    };

    format!("{}{}", base_url, route)
}

/// Normalizes a configured proxy base URL: defaults the protocol to https,
/// strips trailing slashes and legacy route suffixes, and falls back to the
/// public RSSHub instance when the value is empty or unparseable.
pub fn normalize_base_url(raw_base_url: &str) -> String {
    let trimmed = raw_base_url.trim();

    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    let lowercased = trimmed.to_lowercase();
    let with_protocol = if lowercased.starts_with("http://") || lowercased.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&with_protocol) {
        Ok(url) => {
            let mut path = url.path().trim_end_matches('/').to_string();

            for suffix in LEGACY_ROUTE_SUFFIXES {
                if path.to_lowercase().ends_with(suffix) {
                    path.truncate(path.len() - suffix.len());
                    break;
                }
            }

            if path == "/" {
                path.clear();
            }

            format!("{}{}", url.origin().ascii_serialization(), path)
        }
        Err(_) => DEFAULT_BASE_URL.to_string(),
    }
}
