use crate::sync::reader::{FeedReaderError, FetchedFeed, FetchedFeedItem, ReadFeed};
use rss::Channel;

pub struct RssReader {}

impl ReadFeed for RssReader {
    fn read_from_str(&self, body: &str) -> Result<FetchedFeed, FeedReaderError> {
        match Channel::read_from(body.as_bytes()) {
            Ok(channel) => Ok(FetchedFeed::from(channel)),
            Err(err) => {
                let msg = format!("{}", err);

                Err(FeedReaderError { msg })
            }
        }
    }
}

impl From<Channel> for FetchedFeed {
    fn from(channel: Channel) -> Self {
        let items = channel
            .items()
            .iter()
            .map(|item| {
                let link = item.link().map(str::trim).unwrap_or_default().to_string();
                // RSS items without a guid are identified by their link.
                let guid = match item.guid() {
                    Some(guid) if !guid.value().trim().is_empty() => {
                        guid.value().trim().to_string()
                    }
                    _ => link.clone(),
                };

                FetchedFeedItem {
                    title: item.title().map(str::trim).unwrap_or_default().to_string(),
                    link,
                    guid,
                    pub_date: item
                        .pub_date()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                }
            })
            .collect::<Vec<FetchedFeedItem>>();

        FetchedFeed {
            title: channel.title().trim().to_string(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FetchedFeed;
    use rss::Channel;
    use std::fs;
    use std::str::FromStr;

    #[test]
    fn it_converts_an_rss_channel_to_a_fetched_feed() {
        let xml_feed = fs::read_to_string("./tests/support/rss_feed_example.xml").unwrap();
        let channel = Channel::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = channel.into();

        assert_eq!(fetched_feed.title, "Example News".to_string());
        assert_eq!(fetched_feed.items.len(), 3);

        let first = &fetched_feed.items[0];
        assert_eq!(first.title, "First article");
        assert_eq!(first.link, "https://example.com/articles/1");
        assert_eq!(first.guid, "example-guid-1");
        assert_eq!(first.pub_date, "Mon, 06 Sep 2021 12:00:00 GMT");
    }

    #[test]
    fn it_falls_back_to_the_link_when_the_guid_is_missing() {
        let xml_feed = fs::read_to_string("./tests/support/rss_feed_example.xml").unwrap();
        let channel = Channel::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = channel.into();

        let second = &fetched_feed.items[1];
        assert_eq!(second.guid, "https://example.com/articles/2");
    }

    #[test]
    fn it_keeps_items_with_missing_fields_as_empty_strings() {
        let xml_feed = fs::read_to_string("./tests/support/rss_feed_example.xml").unwrap();
        let channel = Channel::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = channel.into();

        let third = &fetched_feed.items[2];
        assert_eq!(third.link, "");
        assert_eq!(third.pub_date, "");
    }
}
