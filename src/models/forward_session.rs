use crate::models::SubscriptionKind;
use serde::{Deserialize, Serialize};

/// A pending `/forward_to` interaction, stored under `fwd_session:<uuid>`
/// with a TTL. Consumed and deleted by the callback handler.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardSession {
    pub target_chat_id: i64,
    #[serde(default)]
    pub target_thread_id: Option<i32>,
    pub source_chat_id: i64,
    #[serde(default)]
    pub source_thread_id: Option<i32>,
    pub sub_map: Vec<SessionSubscription>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSubscription {
    #[serde(rename = "type")]
    pub kind: SubscriptionKind,
    pub channel_name: String,
    pub rss_url: String,
}
