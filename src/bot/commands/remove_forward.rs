use super::Command;
use crate::db;
use crate::db::forwarding;
use frankenstein::Message;

static COMMAND: &str = "/del_forward";

pub struct RemoveForward {}

impl RemoveForward {
    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for RemoveForward {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String {
        match forwarding::delete_config(db_connection, message.chat.id) {
            Ok(()) => "✅ Forwarding configuration removed.".to_string(),
            Err(error) => {
                log::error!("Failed to delete the forward config: {:?}", error);

                "Something went wrong with the bot's storage".to_string()
            }
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
