use crate::sync::reader::{FeedReaderError, FetchedFeed, FetchedFeedItem, ReadFeed};
use atom_syndication::{Feed as AtomFeed, Link};
use std::str::FromStr;

pub struct AtomReader {}

impl ReadFeed for AtomReader {
    fn read_from_str(&self, body: &str) -> Result<FetchedFeed, FeedReaderError> {
        match AtomFeed::from_str(body) {
            Ok(atom_feed) => Ok(FetchedFeed::from(atom_feed)),
            Err(err) => {
                let msg = format!("{}", err);

                Err(FeedReaderError { msg })
            }
        }
    }
}

impl From<AtomFeed> for FetchedFeed {
    fn from(feed: AtomFeed) -> Self {
        let items = feed
            .entries()
            .iter()
            .map(|entry| {
                // Entries carry several links (self, enclosure, ...); the
                // alternate link is the one pointing at the content.
                let link = select_link(entry.links())
                    .map(|link| link.href().trim().to_string())
                    .unwrap_or_default();

                let pub_date = match entry.published() {
                    Some(date) => date.to_rfc3339(),
                    None => entry.updated().to_rfc3339(),
                };

                FetchedFeedItem {
                    title: entry.title().trim().to_string(),
                    link,
                    guid: entry.id().trim().to_string(),
                    pub_date,
                }
            })
            .collect::<Vec<FetchedFeedItem>>();

        FetchedFeed {
            title: feed.title().trim().to_string(),
            items,
        }
    }
}

fn select_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|link| link.rel().eq_ignore_ascii_case("alternate"))
        .or_else(|| links.first())
}

#[cfg(test)]
mod tests {
    use super::FetchedFeed;
    use atom_syndication::Feed as AtomFeed;
    use std::fs;
    use std::str::FromStr;

    #[test]
    fn it_converts_an_atom_feed_to_a_fetched_feed() {
        let xml_feed = fs::read_to_string("./tests/support/atom_feed_example.xml").unwrap();
        let feed = AtomFeed::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = feed.into();

        assert_eq!(fetched_feed.title, "Example Atom Feed".to_string());
        assert_eq!(fetched_feed.items.len(), 2);

        let first = &fetched_feed.items[0];
        assert_eq!(first.title, "Atom entry with several links");
        assert_eq!(first.guid, "urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a");
        assert_eq!(first.pub_date, "2021-09-06T12:00:00+00:00");
    }

    #[test]
    fn it_prefers_the_alternate_link() {
        let xml_feed = fs::read_to_string("./tests/support/atom_feed_example.xml").unwrap();
        let feed = AtomFeed::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = feed.into();

        // The entry lists a rel=self link first; alternate must win.
        assert_eq!(
            fetched_feed.items[0].link,
            "https://example.org/2021/09/06/entry"
        );
    }

    #[test]
    fn it_falls_back_to_the_updated_date_when_published_is_absent() {
        let xml_feed = fs::read_to_string("./tests/support/atom_feed_example.xml").unwrap();
        let feed = AtomFeed::from_str(&xml_feed).unwrap();

        let fetched_feed: FetchedFeed = feed.into();

        assert_eq!(fetched_feed.items[1].pub_date, "2021-09-07T08:30:00+00:00");
    }
}
