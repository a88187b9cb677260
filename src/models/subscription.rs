use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A single chat-to-feed subscription. Stored as JSON under the
/// `subscriptions` key, field names kept camelCase for compatibility with
/// records written by earlier deployments.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "type", default)]
    pub kind: Option<SubscriptionKind>,
    pub channel_name: String,
    pub rss_url: String,
    pub chat_id: i64,
    #[serde(default)]
    pub thread_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    Rss,
    X,
    Youtube,
}

impl Subscription {
    /// Identity used for existence checks when adding or forwarding.
    pub fn matches_target(&self, rss_url: &str, chat_id: i64, thread_id: Option<i32>) -> bool {
        self.rss_url == rss_url && self.chat_id == chat_id && self.thread_id == thread_id
    }

    /// Legacy records have no stored type; infer it from the feed URL.
    pub fn effective_kind(&self) -> SubscriptionKind {
        self.kind
            .unwrap_or_else(|| SubscriptionKind::infer_from_url(&self.rss_url))
    }
}

impl SubscriptionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "rss" => Some(SubscriptionKind::Rss),
            "x" => Some(SubscriptionKind::X),
            "youtube" => Some(SubscriptionKind::Youtube),
            _ => None,
        }
    }

    pub fn infer_from_url(rss_url: &str) -> Self {
        let route = extract_pathname(rss_url);

        if route.contains("/twitter/") || route.contains("/x/") {
            SubscriptionKind::X
        } else if route.contains("/youtube/") {
            SubscriptionKind::Youtube
        } else {
            SubscriptionKind::Rss
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionKind::Rss => "rss",
            SubscriptionKind::X => "x",
            SubscriptionKind::Youtube => "youtube",
        };

        write!(f, "{}", name)
    }
}

fn extract_pathname(url_or_path: &str) -> String {
    let value = url_or_path.trim().to_lowercase();

    if value.is_empty() {
        return value;
    }

    match Url::parse(&value) {
        Ok(url) => url.path().to_lowercase(),
        Err(_) => value,
    }
}
