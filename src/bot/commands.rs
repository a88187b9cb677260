use crate::bot::telegram_client::Api;
use crate::bot::telegram_client::OutgoingMessage;
use crate::db;
use frankenstein::Message;

pub mod add_subscription;
pub mod chat_info;
pub mod forward_to;
pub mod help;
pub mod list_subscriptions;
pub mod remove_forward;
pub mod remove_subscription;
pub mod set_forward;
pub mod start;
pub mod unknown_command;

pub trait Command {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String;

    fn execute(&self, api: &Api, message: &Message) {
        log::info!(
            "{} wrote: {}",
            message.chat.id,
            message.text.as_deref().unwrap_or_default()
        );

        let text = match self.fetch_db_connection() {
            Ok(mut connection) => self.response(&mut connection, message),
            Err(error_message) => error_message,
        };

        self.reply_to_message(api, message, text);
    }

    fn reply_to_message(&self, api: &Api, message: &Message, text: String) {
        let outgoing = OutgoingMessage::builder()
            .chat_id(message.chat.id)
            .text(text)
            .message_thread_id(message.message_thread_id)
            .build();

        if let Err(error) = api.reply_with_text_message(&outgoing) {
            log::error!("Failed to reply to update {:?}", error);
        }
    }

    fn command(&self) -> &str;

    fn parse_argument(&self, full_command: &str) -> String {
        full_command.replace(self.command(), "").trim().to_string()
    }

    fn fetch_db_connection(&self) -> Result<db::PooledConnection, String> {
        match db::pool().get() {
            Ok(connection) => Ok(connection),
            Err(err) => {
                log::error!("Failed to fetch a connection from the pool {:?}", err);

                Err("Failed to process your command. Please try again later".to_string())
            }
        }
    }
}
