use super::Command;
use crate::bot::telegram_client::{Api, OutgoingMessage};
use crate::db;
use crate::db::{forwarding, subscriptions};
use crate::models::{ForwardSession, SessionSubscription, Subscription};
use diesel::PgConnection;
use frankenstein::InlineKeyboardButton;
use frankenstein::InlineKeyboardMarkup;
use frankenstein::Message;
use frankenstein::ReplyMarkup;

static COMMAND: &str = "/forward_to";

static USAGE: &str = "Usage: /forward_to <target_chat_id> [target_thread_id]";

pub struct ForwardTo {}

enum Outcome {
    Text(String),
    Picker {
        text: String,
        keyboard: ReplyMarkup,
    },
}

impl ForwardTo {
    fn forward_to(
        &self,
        db_connection: &mut PgConnection,
        message: &Message,
        argument: &str,
    ) -> Outcome {
        let parts: Vec<&str> = argument.split_whitespace().collect();

        if parts.is_empty() {
            return Outcome::Text(USAGE.to_string());
        }

        let target_chat_id: i64 = match parts[0].parse() {
            Ok(chat_id) => chat_id,
            Err(_) => return Outcome::Text("⚠️ Invalid Target Chat ID.".to_string()),
        };

        let target_thread_id: Option<i32> = match parts.get(1) {
            Some(value) => match value.parse() {
                Ok(thread_id) => Some(thread_id),
                Err(_) => return Outcome::Text("⚠️ Invalid Target Thread ID.".to_string()),
            },
            None => None,
        };

        let current_subscriptions = match subscriptions::for_chat(
            db_connection,
            message.chat.id,
            message.message_thread_id,
        ) {
            Ok(subscriptions) => subscriptions,
            Err(error) => {
                log::error!("Failed to load subscriptions: {:?}", error);

                return Outcome::Text("Something went wrong with the bot's storage".to_string());
            }
        };

        if current_subscriptions.is_empty() {
            return Outcome::Text("⚠️ No subscriptions found in this chat to forward.".to_string());
        }

        let session = ForwardSession {
            target_chat_id,
            target_thread_id,
            source_chat_id: message.chat.id,
            source_thread_id: message.message_thread_id,
            sub_map: current_subscriptions
                .iter()
                .map(|sub| SessionSubscription {
                    kind: sub.effective_kind(),
                    channel_name: sub.channel_name.clone(),
                    rss_url: sub.rss_url.clone(),
                })
                .collect(),
        };

        let session_id = match forwarding::create_session(db_connection, &session) {
            Ok(session_id) => session_id,
            Err(error) => {
                log::error!("Failed to store the forward session: {:?}", error);

                return Outcome::Text("Something went wrong with the bot's storage".to_string());
            }
        };

        Outcome::Picker {
            text: Self::render_prompt(target_chat_id, target_thread_id),
            keyboard: Self::build_keyboard(&session_id, &current_subscriptions),
        }
    }

    fn render_prompt(target_chat_id: i64, target_thread_id: Option<i32>) -> String {
        let thread_line = target_thread_id
            .map(|thread_id| format!("<b>Target Thread ID:</b> <code>{}</code>\n", thread_id))
            .unwrap_or_default();

        format!(
            "📤 <b>Forward Subscriptions</b>\n\n<b>Target Chat ID:</b> <code>{}</code>\n{}\nSelect the subscriptions you want to copy to the target chat:",
            target_chat_id, thread_line
        )
    }

    /// One row per subscription, preceded by a forward-all row. Button
    /// payloads carry the session id and the subscription's index into the
    /// session's sub_map.
    fn build_keyboard(session_id: &str, subscriptions: &[Subscription]) -> ReplyMarkup {
        let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

        keyboard.push(vec![InlineKeyboardButton::builder()
            .text("🚀 Forward All")
            .callback_data(format!("fwd:{}:ALL", session_id))
            .build()]);

        for (index, subscription) in subscriptions.iter().enumerate() {
            keyboard.push(vec![InlineKeyboardButton::builder()
                .text(format!(
                    "📺 [{}] {}",
                    subscription.effective_kind(),
                    subscription.channel_name
                ))
                .callback_data(format!("fwd:{}:{}", session_id, index))
                .build()]);
        }

        let inline_keyboard = InlineKeyboardMarkup::builder()
            .inline_keyboard(keyboard)
            .build();

        ReplyMarkup::InlineKeyboardMarkup(inline_keyboard)
    }

    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for ForwardTo {
    // Unused; execute below builds the reply itself.
    fn response(&self, _db_connection: &mut db::PooledConnection, _message: &Message) -> String {
        "".to_string()
    }

    // The reply carries an inline keyboard, so the default text-only
    // execute path doesn't fit.
    fn execute(&self, api: &Api, message: &Message) {
        log::info!(
            "{} wrote: {}",
            message.chat.id,
            message.text.as_deref().unwrap_or_default()
        );

        let outcome = match self.fetch_db_connection() {
            Ok(mut connection) => {
                let argument = self.parse_argument(message.text.as_deref().unwrap_or_default());
                self.forward_to(&mut connection, message, &argument)
            }
            Err(error_message) => Outcome::Text(error_message),
        };

        match outcome {
            Outcome::Text(text) => self.reply_to_message(api, message, text),
            Outcome::Picker { text, keyboard } => {
                let outgoing = OutgoingMessage::builder()
                    .chat_id(message.chat.id)
                    .text(text)
                    .message_thread_id(message.message_thread_id)
                    .reply_markup(keyboard)
                    .build();

                if let Err(error) = api.reply_with_text_message(&outgoing) {
                    log::error!("Failed to send the forward picker {:?}", error);
                }
            }
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }
}

#[cfg(test)]
mod forward_to_tests {
    use super::ForwardTo;
    use crate::models::{Subscription, SubscriptionKind};
    use frankenstein::ReplyMarkup;

    fn subscription(name: &str) -> Subscription {
        Subscription {
            kind: Some(SubscriptionKind::X),
            channel_name: name.to_string(),
            rss_url: format!("https://rsshub.app/twitter/user/{}", name),
            chat_id: 1,
            thread_id: None,
        }
    }

    #[test]
    fn it_renders_the_prompt_with_an_optional_thread_id() {
        let prompt = ForwardTo::render_prompt(-100, None);
        assert!(prompt.contains("<b>Target Chat ID:</b> <code>-100</code>"));
        assert!(!prompt.contains("Thread"));

        let threaded = ForwardTo::render_prompt(-100, Some(5));
        assert!(threaded.contains("<b>Target Thread ID:</b> <code>5</code>"));
    }

    #[test]
    fn it_builds_one_button_row_per_subscription() {
        let subscriptions = vec![subscription("a"), subscription("b")];

        let markup = ForwardTo::build_keyboard("session-1", &subscriptions);

        let ReplyMarkup::InlineKeyboardMarkup(keyboard) = markup else {
            panic!("expected an inline keyboard");
        };

        assert_eq!(keyboard.inline_keyboard.len(), 3);
        assert_eq!(
            keyboard.inline_keyboard[0][0].callback_data,
            Some("fwd:session-1:ALL".to_string())
        );
        assert_eq!(
            keyboard.inline_keyboard[2][0].callback_data,
            Some("fwd:session-1:1".to_string())
        );
        assert_eq!(keyboard.inline_keyboard[2][0].text, "📺 [x] b");
    }
}
