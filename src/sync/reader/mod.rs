pub mod atom;
pub mod rss;

use self::atom::AtomReader;
use self::rss::RssReader;
use crate::http_client;
use isahc::prelude::*;

#[derive(Debug)]
pub struct FeedReaderError {
    pub msg: String,
}

/// A feed item reduced to the fields the dedup engine works with. All
/// values are trimmed strings; absent fields become empty strings.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FetchedFeedItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub pub_date: String,
}

#[derive(Debug, Eq, PartialEq)]
pub struct FetchedFeed {
    pub title: String,
    pub items: Vec<FetchedFeedItem>,
}

pub trait ReadFeed {
    fn read_from_str(&self, body: &str) -> Result<FetchedFeed, FeedReaderError>;
}

pub fn read_url(url: &str) -> Result<String, FeedReaderError> {
    match http_client::client().get(url) {
        Ok(mut response) => match response.text() {
            Ok(body) => Ok(body),
            Err(error) => {
                let msg = format!("{:?}", error);

                Err(FeedReaderError { msg })
            }
        },
        Err(error) => {
            let msg = format!("{:?}", error);

            Err(FeedReaderError { msg })
        }
    }
}

/// Parses a feed of unknown format, trying RSS 2.0 first and Atom second.
pub fn parse_feed(body: &str) -> Result<FetchedFeed, FeedReaderError> {
    match (RssReader {}).read_from_str(body) {
        Ok(feed) => Ok(feed),
        Err(rss_error) => match (AtomReader {}).read_from_str(body) {
            Ok(feed) => Ok(feed),
            Err(atom_error) => {
                let msg = format!(
                    "unrecognized feed format: rss: {} atom: {}",
                    rss_error.msg, atom_error.msg
                );

                Err(FeedReaderError { msg })
            }
        },
    }
}

pub fn fetch_feed(url: &str) -> Result<FetchedFeed, FeedReaderError> {
    let body = read_url(url)?;

    parse_feed(&body)
}
