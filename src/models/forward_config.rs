use serde::{Deserialize, Serialize};

/// Per-chat forwarding settings, stored under `forward_config:<chat_id>`.
/// When `only_forward` is set, notifications go to the target chat only.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardConfig {
    pub target_chat_id: i64,
    #[serde(default)]
    pub only_forward: bool,
}

#[cfg(test)]
mod tests {
    use super::ForwardConfig;

    #[test]
    fn it_defaults_only_forward_to_false() {
        let config: ForwardConfig = serde_json::from_str(r#"{"targetChatId":-100}"#).unwrap();

        assert_eq!(config.target_chat_id, -100);
        assert!(!config.only_forward);
    }
}
