use super::Command;
use crate::bot::telegram_client::Api;
use crate::db;
use frankenstein::ChatType;
use frankenstein::Message;

static UNKNOWN_COMMAND_PRIVATE: &str = "Unknown command. Use /help to show available commands";

static COMMAND: &str = "";

pub struct UnknownCommand {}

impl UnknownCommand {
    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for UnknownCommand {
    fn response(&self, _db_connection: &mut db::PooledConnection, _message: &Message) -> String {
        "".to_string()
    }

    // Only private chats get a reply; in groups an unknown slash command
    // is most likely addressed to another bot. No connection is fetched
    // since the reply is static.
    fn execute(&self, api: &Api, message: &Message) {
        log::info!(
            "{} wrote: {}",
            message.chat.id,
            message.text.as_deref().unwrap_or_default()
        );

        let text = match message.chat.type_field {
            ChatType::Private => UNKNOWN_COMMAND_PRIVATE.to_string(),
            _ => "".to_string(),
        };

        if !text.is_empty() {
            self.reply_to_message(api, message, text);
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
