use crate::bot::commands::add_subscription::AddSubscription;
use crate::bot::commands::chat_info::ChatInfo;
use crate::bot::commands::forward_to::ForwardTo;
use crate::bot::commands::help::Help;
use crate::bot::commands::list_subscriptions::ListSubscriptions;
use crate::bot::commands::remove_forward::RemoveForward;
use crate::bot::commands::remove_subscription::RemoveSubscription;
use crate::bot::commands::set_forward::SetForward;
use crate::bot::commands::start::Start;
use crate::bot::commands::unknown_command::UnknownCommand;
use crate::bot::commands::Command;
use crate::bot::forward_callback;
use crate::bot::telegram_client::Api;
use crate::config::Config;
use frankenstein::Message;
use frankenstein::Update;
use frankenstein::UpdateContent;
use std::thread;
use std::time::Duration;

const IDLE_INTERVAL: Duration = Duration::from_millis(500);

pub fn start_bot() {
    let token = match Config::telegram_bot_token() {
        Some(token) => token,
        None => {
            log::error!("TELEGRAM_BOT_TOKEN is not set");
            return;
        }
    };

    let mut api = Api::new(&token);

    log::info!("Starting a bot loop");

    loop {
        match api.next_update() {
            Some(update) => process_update(&api, update),
            None => thread::sleep(IDLE_INTERVAL),
        }
    }
}

fn process_update(api: &Api, update: Update) {
    match update.content {
        UpdateContent::Message(message) => process_message(api, &message),
        UpdateContent::CallbackQuery(callback) => forward_callback::execute(api, &callback),
        _ => (),
    }
}

fn process_message(api: &Api, message: &Message) {
    let text = match &message.text {
        Some(text) => text.trim(),
        None => return,
    };

    if !text.starts_with('/') {
        return;
    }

    // `/command@botname argument` is how groups address a specific bot.
    let token = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();

    match token {
        command if command == Start::command() => Start {}.execute(api, message),
        command if command == Help::command() => Help {}.execute(api, message),
        command if command == ChatInfo::command() => ChatInfo {}.execute(api, message),
        command if command == AddSubscription::command() => {
            AddSubscription {}.execute(api, message)
        }
        command if command == SetForward::command() => SetForward {}.execute(api, message),
        command if command == RemoveForward::command() => RemoveForward {}.execute(api, message),
        command
            if command == RemoveSubscription::command()
                || command == RemoveSubscription::command_alias() =>
        {
            RemoveSubscription {}.execute(api, message)
        }
        command if command == ListSubscriptions::command() => {
            ListSubscriptions {}.execute(api, message)
        }
        command if command == ForwardTo::command() => ForwardTo {}.execute(api, message),
        _ => UnknownCommand {}.execute(api, message),
    };
}
