use super::Command;
use crate::db;
use crate::db::subscriptions;
use crate::models::{Subscription, SubscriptionKind};
use crate::rsshub;
use diesel::PgConnection;
use frankenstein::Message;
use url::Url;

static COMMAND: &str = "/add";

static USAGE: &str = "Usage:\n/add rss <url>\n/add x <username>\n/add youtube <channel_name>";

pub struct AddSubscription {}

impl AddSubscription {
    fn add_subscription(
        &self,
        db_connection: &mut PgConnection,
        message: &Message,
        argument: &str,
    ) -> String {
        let parts: Vec<&str> = argument.split_whitespace().collect();

        if parts.len() < 2 {
            return USAGE.to_string();
        }

        let kind = match SubscriptionKind::parse(parts[0]) {
            Some(kind) => kind,
            None => return "Unknown type. Use rss, x, or youtube.".to_string(),
        };
        let arg = parts[1];

        let (channel_name, rss_url) = match kind {
            SubscriptionKind::Rss => (Self::rss_channel_name(arg), arg.to_string()),
            SubscriptionKind::X => (arg.to_string(), rsshub::twitter_user_url(arg)),
            SubscriptionKind::Youtube => (arg.to_string(), rsshub::youtube_user_url(arg)),
        };

        let subscription = Subscription {
            kind: Some(kind),
            channel_name: channel_name.clone(),
            rss_url,
            chat_id: message.chat.id,
            thread_id: message.message_thread_id,
        };

        match subscriptions::add(db_connection, subscription) {
            Ok(true) => format!("✅ Added {} subscription: {}", kind, channel_name),
            Ok(false) => "⚠️ Subscription already exists.".to_string(),
            Err(error) => {
                log::error!("Failed to add a subscription: {:?}", error);

                "Something went wrong with the bot's storage".to_string()
            }
        }
    }

    // The displayed name of a plain feed is its host plus path; feeds that
    // fail to parse keep the raw value.
    fn rss_channel_name(rss_url: &str) -> String {
        match Url::parse(rss_url) {
            Ok(url) => {
                let host = url.host_str().unwrap_or_default().to_string();

                if url.path().len() > 1 {
                    format!("{}{}", host, url.path())
                } else {
                    host
                }
            }
            Err(_) => rss_url.to_string(),
        }
    }

    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for AddSubscription {
    fn response(&self, db_connection: &mut db::PooledConnection, message: &Message) -> String {
        match &message.text {
            Some(text) => {
                let argument = self.parse_argument(text);
                self.add_subscription(db_connection, message, &argument)
            }
            None => USAGE.to_string(),
        }
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
