use crate::bot::telegram_client::{Api, OutgoingMessage};
use crate::db;
use crate::db::{forwarding, subscriptions};
use crate::models::{ForwardSession, SessionSubscription, Subscription};
use diesel::PgConnection;
use frankenstein::CallbackQuery;
use frankenstein::MaybeInaccessibleMessage;

/// Handles a press on the `/forward_to` picker. The payload carries the
/// session id and either `ALL` or an index into the session's sub_map.
pub fn execute(api: &Api, callback: &CallbackQuery) {
    let data = match &callback.data {
        Some(data) if data.starts_with("fwd:") => data.clone(),
        _ => return,
    };

    let parts: Vec<&str> = data.split(':').collect();
    if parts.len() < 3 {
        api.answer_callback(&callback.id, "❌ Invalid callback data.");
        return;
    }

    let session_id = parts[1];
    let action = parts[2];

    let chat_id = match &callback.message {
        Some(MaybeInaccessibleMessage::Message(message)) => message.chat.id,
        Some(MaybeInaccessibleMessage::InaccessibleMessage(message)) => message.chat.id,
        None => return,
    };

    let mut connection = match db::pool().get() {
        Ok(connection) => connection,
        Err(error) => {
            log::error!("Failed to fetch a connection from the pool {:?}", error);
            api.answer_callback(&callback.id, "❌ Please try again later.");
            return;
        }
    };

    let session = match forwarding::find_session(&mut connection, session_id) {
        Ok(Some(session)) => session,
        Ok(None) => {
            api.answer_callback(&callback.id, "❌ Session expired or invalid.");
            return;
        }
        Err(error) => {
            log::error!("Failed to load forward session {}: {:?}", session_id, error);
            api.answer_callback(&callback.id, "❌ Please try again later.");
            return;
        }
    };

    // Picker buttons only work in the chat that created the session.
    if session.source_chat_id != chat_id {
        api.answer_callback(&callback.id, "❌ This button is not for this chat.");
        return;
    }

    let selected = select_subscriptions(&session, action);

    if selected.is_empty() {
        api.answer_callback(&callback.id, "⚠️ No channel selected.");
        return;
    }

    match forward_selected(&mut connection, &session, &selected) {
        Ok(0) => api.answer_callback(&callback.id, "⚠️ Channels already exist in target."),
        Ok(added_count) => {
            api.answer_callback(&callback.id, &format!("✅ Forwarded {} subscriptions!", added_count));

            let confirmation = OutgoingMessage::builder()
                .chat_id(session.source_chat_id)
                .text(format!(
                    "✅ Successfully forwarded {} subscriptions to target.",
                    added_count
                ))
                .message_thread_id(session.source_thread_id)
                .build();

            if let Err(error) = api.reply_with_text_message(&confirmation) {
                log::error!("Failed to confirm the forward {:?}", error);
            }

            if let Err(error) = forwarding::delete_session(&mut connection, session_id) {
                log::error!("Failed to delete forward session {}: {:?}", session_id, error);
            }
        }
        Err(error) => {
            log::error!("Failed to forward subscriptions: {:?}", error);
            api.answer_callback(&callback.id, "❌ Please try again later.");
        }
    }
}

fn select_subscriptions<'a>(
    session: &'a ForwardSession,
    action: &str,
) -> Vec<&'a SessionSubscription> {
    if action == "ALL" {
        return session.sub_map.iter().collect();
    }

    match action.parse::<usize>() {
        Ok(index) => session.sub_map.get(index).into_iter().collect(),
        Err(_) => vec![],
    }
}

/// Copies the selected subscriptions to the session's target, skipping
/// ones the target already has. Returns how many were added.
fn forward_selected(
    conn: &mut PgConnection,
    session: &ForwardSession,
    selected: &[&SessionSubscription],
) -> Result<usize, diesel::result::Error> {
    let mut added_count = 0;

    for subscription in selected {
        let added = subscriptions::add(
            conn,
            Subscription {
                kind: Some(subscription.kind),
                channel_name: subscription.channel_name.clone(),
                rss_url: subscription.rss_url.clone(),
                chat_id: session.target_chat_id,
                thread_id: session.target_thread_id,
            },
        )?;

        if added {
            added_count += 1;
        }
    }

    Ok(added_count)
}
