use crate::db::kv;
use diesel::result::Error;
use diesel::PgConnection;
use sha2::{Digest, Sha256};

/// Upper bound on stored dedup keys per feed; the oldest entries are
/// evicted first when the history grows past it.
pub const SENT_HISTORY_LIMIT: usize = 2000;

/// Store key for a feed's seen-set. The feed URL goes through SHA-256 so
/// arbitrary URLs map to fixed-size keys; the weak item fingerprint hash is
/// never used here.
pub fn seen_key(rss_url: &str) -> String {
    let digest = Sha256::digest(rss_url.as_bytes());

    format!("sent_guids:{:x}", digest)
}

/// Loads the feed's delivered-item history in insertion order. Absent or
/// unparseable history reads as empty.
pub fn load(conn: &mut PgConnection, rss_url: &str) -> Result<Vec<String>, Error> {
    match kv::get(conn, &seen_key(rss_url))? {
        Some(data) => match serde_json::from_str(&data) {
            Ok(keys) => Ok(keys),
            Err(error) => {
                log::error!("Failed to parse seen history for {}: {}", rss_url, error);

                Ok(vec![])
            }
        },
        None => Ok(vec![]),
    }
}

pub fn persist(conn: &mut PgConnection, rss_url: &str, keys: &[String]) -> Result<(), Error> {
    let bounded = truncate_history(keys);
    let data = serde_json::to_string(&bounded).expect("seen history is serializable");

    kv::put(conn, &seen_key(rss_url), &data)
}

/// Keeps the most recent `SENT_HISTORY_LIMIT` entries.
pub fn truncate_history(keys: &[String]) -> &[String] {
    if keys.len() > SENT_HISTORY_LIMIT {
        &keys[keys.len() - SENT_HISTORY_LIMIT..]
    } else {
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::{truncate_history, SENT_HISTORY_LIMIT};

    #[test]
    fn it_builds_store_keys_from_a_sha256_of_the_feed_url() {
        let key = super::seen_key("https://example.com/feed.xml");

        assert!(key.starts_with("sent_guids:"));
        // SHA-256 hex digest is always 64 chars, regardless of URL length.
        assert_eq!(key.len(), "sent_guids:".len() + 64);
        assert_ne!(key, super::seen_key("https://example.com/feed.xml/"));
    }

    #[test]
    fn it_keeps_short_histories_untouched() {
        let keys = vec!["fp:1".to_string(), "fp:2".to_string()];

        assert_eq!(truncate_history(&keys), keys.as_slice());
    }

    #[test]
    fn it_evicts_the_oldest_entries_beyond_the_limit() {
        let keys: Vec<String> = (0..SENT_HISTORY_LIMIT + 5)
            .map(|i| format!("fp:{}", i))
            .collect();

        let bounded = truncate_history(&keys);

        assert_eq!(bounded.len(), SENT_HISTORY_LIMIT);
        assert_eq!(bounded.first().unwrap(), "fp:5");
        assert_eq!(bounded.last().unwrap(), &format!("fp:{}", SENT_HISTORY_LIMIT + 4));
    }
}
