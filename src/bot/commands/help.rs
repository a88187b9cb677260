use super::Command;
use crate::db;
use frankenstein::Message;

static COMMAND: &str = "/help";

pub struct Help {}

impl Help {
    pub fn command() -> &'static str {
        COMMAND
    }
}

impl Command for Help {
    fn response(&self, _db_connection: &mut db::PooledConnection, _message: &Message) -> String {
        "📖 <b>Help Guide</b>\n\n\
         <b>1. Add Subscription</b>\n\
         Use <code>/add &lt;type&gt; &lt;arg&gt;</code>\n\
         - RSS: <code>/add rss https://example.com/feed.xml</code>\n\
         - X (Twitter): <code>/add x username</code>\n\
         - YouTube: <code>/add youtube username</code>\n\n\
         <b>2. Forwarding Settings</b>\n\
         Configure message forwarding to another channel/group:\n\
         <code>/set_forward &lt;target_chat_id&gt; [only_forward: true/false]</code>\n\
         Example: <code>/set_forward -100123456789 true</code> (Sends ONLY to target)\n\
         To remove: <code>/del_forward</code>\n\n\
         <b>3. Manage Subscriptions</b>\n\
         - List: <code>/list</code>\n\
         - Remove: <code>/del [type] &lt;name&gt;</code>\n\
         - ID Info: <code>/id</code>"
            .to_string()
    }

    fn command(&self) -> &str {
        Self::command()
    }
}
