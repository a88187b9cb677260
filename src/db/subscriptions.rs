use crate::db::kv;
use crate::models::{Subscription, SubscriptionKind};
use diesel::result::Error;
use diesel::PgConnection;

const SUBSCRIPTIONS_KEY: &str = "subscriptions";

pub fn all(conn: &mut PgConnection) -> Result<Vec<Subscription>, Error> {
    match kv::get(conn, SUBSCRIPTIONS_KEY)? {
        Some(data) => match serde_json::from_str(&data) {
            Ok(subscriptions) => Ok(subscriptions),
            Err(error) => {
                log::error!("Failed to parse the subscription list: {}", error);

                Ok(vec![])
            }
        },
        None => Ok(vec![]),
    }
}

pub fn save_all(conn: &mut PgConnection, subscriptions: &[Subscription]) -> Result<(), Error> {
    let data = serde_json::to_string(subscriptions).expect("subscriptions are serializable");

    kv::put(conn, SUBSCRIPTIONS_KEY, &data)
}

pub fn for_chat(
    conn: &mut PgConnection,
    chat_id: i64,
    thread_id: Option<i32>,
) -> Result<Vec<Subscription>, Error> {
    let subscriptions = all(conn)?
        .into_iter()
        .filter(|sub| sub.chat_id == chat_id && sub.thread_id == thread_id)
        .collect();

    Ok(subscriptions)
}

/// Adds a subscription unless one with the same (rss_url, chat_id, thread_id)
/// identity already exists. Returns whether anything was added.
pub fn add(conn: &mut PgConnection, subscription: Subscription) -> Result<bool, Error> {
    let mut subscriptions = all(conn)?;

    let exists = subscriptions.iter().any(|sub| {
        sub.matches_target(
            &subscription.rss_url,
            subscription.chat_id,
            subscription.thread_id,
        )
    });

    if exists {
        return Ok(false);
    }

    subscriptions.push(subscription);
    save_all(conn, &subscriptions)?;

    Ok(true)
}

/// Removes the chat's subscriptions matching the channel name and, when
/// given, the kind. Returns the number of removed records.
pub fn remove(
    conn: &mut PgConnection,
    chat_id: i64,
    thread_id: Option<i32>,
    kind: Option<SubscriptionKind>,
    channel_name: &str,
) -> Result<usize, Error> {
    let subscriptions = all(conn)?;
    let total = subscriptions.len();

    let remaining: Vec<Subscription> = subscriptions
        .into_iter()
        .filter(|sub| {
            if sub.chat_id != chat_id || sub.thread_id != thread_id {
                return true;
            }

            if sub.channel_name != channel_name {
                return true;
            }

            match kind {
                Some(kind) => sub.effective_kind() != kind,
                None => false,
            }
        })
        .collect();

    let removed = total - remaining.len();

    if removed > 0 {
        save_all(conn, &remaining)?;
    }

    Ok(removed)
}
