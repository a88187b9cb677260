use crate::sync::reader::FetchedFeedItem;
use std::collections::HashSet;
use url::form_urlencoded::Serializer;
use url::Url;

/// Query parameters that carry tracking noise and change between feed
/// republishes of the same article.
const TRACKING_PARAMS: [&str; 12] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_name",
    "utm_id",
    "fbclid",
    "gclid",
    "igshid",
    "spm",
    "from",
];

/// djb2-style rolling hash over UTF-16 code units, matching the values
/// already stored in seen-sets written by earlier deployments. Weak by
/// design: a collision suppresses a notification, nothing worse.
pub fn simple_hash(input: &str) -> String {
    let mut hash: u32 = 5381;

    for unit in input.encode_utf16() {
        hash = (hash << 5).wrapping_add(hash) ^ u32::from(unit);
    }

    format!("{:x}", hash)
}

/// Reduces a link to a comparison identity: tracking parameters and
/// fragments dropped, trailing slashes stripped, origin lowercased. The
/// result is not a fetchable URL. Unparseable input comes back lowercased
/// and trimmed instead of failing.
pub fn normalize_url_for_dedup(raw_url: &str) -> String {
    let value = raw_url.trim();

    if value.is_empty() {
        return String::new();
    }

    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(_) => return value.to_lowercase(),
    };

    let kept_pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !TRACKING_PARAMS.contains(&name.to_lowercase().as_str()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let query = if kept_pairs.is_empty() {
        String::new()
    } else {
        let mut serializer = Serializer::new(String::new());

        for (name, value) in &kept_pairs {
            serializer.append_pair(name, value);
        }

        format!("?{}", serializer.finish())
    };

    let path = url.path().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    format!(
        "{}{}{}",
        url.origin().ascii_serialization().to_lowercase(),
        path,
        query
    )
}

/// Content-based item identity. Prefers title + normalized link (stable
/// across republishes); falls back to id + publication date for feeds
/// lacking both. Empty when the item has nothing to hash.
pub fn build_item_fingerprint(item: &FetchedFeedItem) -> String {
    let title = item.title.trim().to_lowercase();
    let id = item.guid.trim().to_lowercase();
    let normalized_link = normalize_url_for_dedup(&item.link);
    let pub_date = item.pub_date.trim().to_lowercase();

    if title.is_empty() && id.is_empty() && normalized_link.is_empty() && pub_date.is_empty() {
        return String::new();
    }

    let base = if !title.is_empty() || !normalized_link.is_empty() {
        format!("{}|{}", title, normalized_link)
    } else {
        format!("{}|{}", id, pub_date)
    };

    simple_hash(&base)
}

/// The key stored and compared to decide whether an item was delivered.
/// `None` means the item carries nothing identifying and must be skipped.
pub fn dedup_key(item: &FetchedFeedItem) -> Option<String> {
    let fingerprint = build_item_fingerprint(item);

    if !fingerprint.is_empty() {
        return Some(format!("fp:{}", fingerprint));
    }

    let id = item.guid.trim();
    if !id.is_empty() {
        return Some(format!("id:{}", id));
    }

    let link = item.link.trim();
    if !link.is_empty() {
        return Some(format!("link:{}", link));
    }

    // Fallback keys interpolate the raw title and date; earlier deployments
    // stored them untrimmed and the stored encoding must keep matching.
    if !item.title.is_empty() {
        return Some(format!("fallback:{}|{}", item.title, item.pub_date));
    }

    None
}

/// Membership check against the stored history. Seen-sets written by older
/// versions hold bare guids and links without a prefix; those encodings
/// stay recognized so history is never redelivered after an upgrade.
pub fn is_seen(seen: &HashSet<String>, item: &FetchedFeedItem, dedup_key: &str) -> bool {
    if seen.contains(dedup_key) {
        return true;
    }

    let id = item.guid.trim();
    if !id.is_empty() && (seen.contains(id) || seen.contains(&format!("id:{}", id))) {
        return true;
    }

    let link = item.link.trim();
    if !link.is_empty() && (seen.contains(link) || seen.contains(&format!("link:{}", link))) {
        return true;
    }

    let fingerprint = build_item_fingerprint(item);

    !fingerprint.is_empty() && seen.contains(&format!("fp:{}", fingerprint))
}
