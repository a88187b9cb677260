use super::Command;
use crate::db;
use crate::db::subscriptions;
use crate::models::Subscription;
use diesel::PgConnection;
use frankenstein::Message;

static COMMAND: &str = "/list";

pub struct ListSubscriptions {}

impl ListSubscriptions {
    fn list_subscriptions(&self, db_connection: &mut PgConnection, message: &Message) -> String {
        match subscriptions::for_chat(db_connection, message.chat.id, message.message_thread_id) {
            Ok(subscriptions) => Self::render(&subscriptions),
            Err(error) => {
                log::error!("Failed to load subscriptions: {:?}", error);

                "Something went wrong with the bot's storage".to_string()
            }
        }
    }

    fn render(subscriptions: &[Subscription]) -> String {
        if subscriptions.is_empty() {
            return "📭 No active subscriptions.".to_string();
        }

        let list = subscriptions
            .iter()
            .map(|sub| format!("- [{}] {}", sub.effective_kind(), sub.channel_name))
            .collect::<Vec<String>>()
            .join("\n");

        format!("📋 <b>Subscriptions:</b>\n{}", list)
    }

    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for ListSubscriptions {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String {
        self.list_subscriptions(db_connection, message)
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
