use super::Command;
use crate::db;
use crate::db::subscriptions;
use crate::models::SubscriptionKind;
use diesel::PgConnection;
use frankenstein::Message;

static COMMAND: &str = "/del";
static COMMAND_ALIAS: &str = "/remove";

static USAGE: &str =
    "Usage: /del <channel_name>\nOr: /del <type> <channel_name> (type: rss, x, youtube)";

pub struct RemoveSubscription {}

impl RemoveSubscription {
    fn remove_subscription(
        &self,
        db_connection: &mut PgConnection,
        message: &Message,
        argument: &str,
    ) -> String {
        let parts: Vec<&str> = argument.split_whitespace().collect();

        // A recognized type in the first position narrows the match; any
        // other first token is the channel name itself.
        let (kind, channel_name) = match parts.as_slice() {
            [] => return USAGE.to_string(),
            [name] => (None, *name),
            [maybe_type, name, ..] => match SubscriptionKind::parse(maybe_type) {
                Some(kind) => (Some(kind), *name),
                None => (None, parts[0]),
            },
        };

        let removed = match subscriptions::remove(
            db_connection,
            message.chat.id,
            message.message_thread_id,
            kind,
            channel_name,
        ) {
            Ok(removed) => removed,
            Err(error) => {
                log::error!("Failed to remove a subscription: {:?}", error);

                return "Something went wrong with the bot's storage".to_string();
            }
        };

        let type_prefix = kind.map(|kind| format!("{} ", kind)).unwrap_or_default();

        if removed > 0 {
            format!("🗑️ Removed {}{} from watchlist.", type_prefix, channel_name)
        } else {
            format!(
                "⚠️ Subscription for {}{} not found.",
                type_prefix, channel_name
            )
        }
    }

    pub fn command() -> &'static str {
        COMMAND
    }

    pub fn command_alias() -> &'static str {
        COMMAND_ALIAS
    }
}

impl Command for RemoveSubscription {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String {
        match &message.text {
            Some(text) => {
                let argument = self.parse_argument(text);
                self.remove_subscription(db_connection, message, &argument)
            }
            None => USAGE.to_string(),
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }

    // Strip whichever spelling the user typed.
    fn parse_argument(&self, full_command: &str) -> String {
        full_command
            .replace(COMMAND_ALIAS, "")
            .replace(COMMAND, "")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod remove_subscription_tests {
    use super::RemoveSubscription;
    use crate::bot::commands::Command;
    use crate::db;
    use crate::db::subscriptions;
    use crate::models::{Subscription, SubscriptionKind};
    use diesel::connection::Connection;
    use diesel::result::Error;
    use frankenstein::{Chat, ChatType, Message};

    fn create_message() -> Message {
        let chat = Chat::builder().id(42).type_field(ChatType::Private).build();

        Message::builder()
            .message_id(1)
            .date(1_u64)
            .chat(chat)
            .build()
    }

    #[test]
    fn it_strips_both_command_spellings() {
        let command = RemoveSubscription {};

        assert_eq!(command.parse_argument("/del nitter"), "nitter");
        assert_eq!(command.parse_argument("/remove x nitter"), "x nitter");
    }

    #[test]
    #[ignore]
    fn it_removes_a_subscription_by_name() {
        let mut connection = db::pool().get().unwrap();
        let message = create_message();

        connection.test_transaction::<_, Error, _>(|connection| {
            subscriptions::add(
                connection,
                Subscription {
                    kind: Some(SubscriptionKind::X),
                    channel_name: "nitter".to_string(),
                    rss_url: "https://rsshub.app/twitter/user/nitter".to_string(),
                    chat_id: 42,
                    thread_id: None,
                },
            )?;

            let result = RemoveSubscription {}.remove_subscription(connection, &message, "nitter");

            assert_eq!(result, "🗑️ Removed nitter from watchlist.");
            assert!(subscriptions::for_chat(connection, 42, None)?.is_empty());

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn it_reports_missing_subscriptions() {
        let mut connection = db::pool().get().unwrap();
        let message = create_message();

        connection.test_transaction::<_, Error, _>(|connection| {
            let result =
                RemoveSubscription {}.remove_subscription(connection, &message, "rss nowhere");

            assert_eq!(result, "⚠️ Subscription for rss nowhere not found.");

            Ok(())
        });
    }
}
