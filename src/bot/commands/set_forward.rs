use super::Command;
use crate::db;
use crate::db::forwarding;
use crate::models::ForwardConfig;
use diesel::PgConnection;
use frankenstein::Message;

static COMMAND: &str = "/set_forward";

static USAGE: &str = "Usage: /set_forward <target_chat_id> [only_forward: true/false]\nExample: /set_forward -100123456789 true";

pub struct SetForward {}

impl SetForward {
    fn set_forward(
        &self,
        db_connection: &mut PgConnection,
        message: &Message,
        argument: &str,
    ) -> String {
        let parts: Vec<&str> = argument.split_whitespace().collect();

        if parts.is_empty() {
            return USAGE.to_string();
        }

        let target_chat_id: i64 = match parts[0].parse() {
            Ok(chat_id) => chat_id,
            Err(_) => return "⚠️ Invalid Target Chat ID.".to_string(),
        };

        let only_forward = parts
            .get(1)
            .map(|value| value.to_lowercase() == "true")
            .unwrap_or(false);

        let config = ForwardConfig {
            target_chat_id,
            only_forward,
        };

        match forwarding::set_config(db_connection, message.chat.id, &config) {
            Ok(()) => format!(
                "✅ Forwarding configured.\nTarget: {}\nOnly Forward: {}",
                target_chat_id, only_forward
            ),
            Err(error) => {
                log::error!("Failed to store the forward config: {:?}", error);

                "Something went wrong with the bot's storage".to_string()
            }
        }
    }

    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for SetForward {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String {
        match &message.text {
            Some(text) => {
                let argument = self.parse_argument(text);
                self.set_forward(db_connection, message, &argument)
            }
            None => USAGE.to_string(),
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
