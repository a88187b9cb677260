use super::Command;
use crate::db;
use frankenstein::Message;

static COMMAND: &str = "/start";

pub struct Start {}

impl Start {
    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for Start {
    fn response(&self, _db_connection: &mut db::PooledConnection, _message: &Message) -> String {
        "👋 <b>RSS & Social Monitor Bot</b>\n\n\
         I can monitor RSS feeds, X (Twitter), and YouTube channels for you.\n\n\
         <b>Commands:</b>\n\
         /add rss &lt;url&gt; - Add RSS feed\n\
         /add x &lt;username&gt; - Add X user\n\
         /del [type] &lt;name&gt; - Remove subscription\n\
         /list - List subscriptions\n\
         /set_forward - Configure forwarding\n\
         /help - Show help"
            .to_string()
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
