use crate::db::kv;
use crate::models::{ForwardConfig, ForwardSession};
use chrono::Duration;
use diesel::result::Error;
use diesel::PgConnection;
use uuid::Uuid;

const SESSION_TTL_SECONDS: i64 = 3600;

fn config_key(chat_id: i64) -> String {
    format!("forward_config:{}", chat_id)
}

fn session_key(session_id: &str) -> String {
    format!("fwd_session:{}", session_id)
}

pub fn find_config(conn: &mut PgConnection, chat_id: i64) -> Result<Option<ForwardConfig>, Error> {
    match kv::get(conn, &config_key(chat_id))? {
        Some(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(Some(config)),
            Err(error) => {
                log::error!("Failed to parse forward config for {}: {}", chat_id, error);

                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn set_config(
    conn: &mut PgConnection,
    chat_id: i64,
    config: &ForwardConfig,
) -> Result<(), Error> {
    let data = serde_json::to_string(config).expect("forward config is serializable");

    kv::put(conn, &config_key(chat_id), &data)
}

pub fn delete_config(conn: &mut PgConnection, chat_id: i64) -> Result<(), Error> {
    kv::delete(conn, &config_key(chat_id))
}

/// Stores a forwarding session with a one-hour TTL and returns its id.
pub fn create_session(conn: &mut PgConnection, session: &ForwardSession) -> Result<String, Error> {
    let session_id = Uuid::new_v4().to_string();
    let data = serde_json::to_string(session).expect("forward session is serializable");

    kv::put_with_ttl(
        conn,
        &session_key(&session_id),
        &data,
        Duration::seconds(SESSION_TTL_SECONDS),
    )?;

    Ok(session_id)
}

pub fn find_session(
    conn: &mut PgConnection,
    session_id: &str,
) -> Result<Option<ForwardSession>, Error> {
    match kv::get(conn, &session_key(session_id))? {
        Some(data) => match serde_json::from_str(&data) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                log::error!("Failed to parse forward session {}: {}", session_id, error);

                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn delete_session(conn: &mut PgConnection, session_id: &str) -> Result<(), Error> {
    kv::delete(conn, &session_key(session_id))
}
