use super::Command;
use crate::db;
use frankenstein::Message;

static COMMAND: &str = "/id";

pub struct ChatInfo {}

impl ChatInfo {
    fn chat_info(&self, message: &Message) -> String {
        let mut response = format!(
            "🆔 <b>Chat Info</b>\n\n<b>Chat ID:</b> <code>{}</code>",
            message.chat.id
        );

        if let Some(thread_id) = message.message_thread_id {
            response.push_str(&format!("\n<b>Thread ID:</b> <code>{}</code>", thread_id));
        }

        response
    }

    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for ChatInfo {
    fn response(&self, _db_connection: &mut db::PooledConnection, message: &Message) -> String {
        self.chat_info(message)
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
