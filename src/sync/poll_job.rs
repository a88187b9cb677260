use crate::bot::telegram_client::{Api, OutgoingMessage};
use crate::config::Config;
use crate::db;
use crate::db::{forwarding, seen_items, subscriptions};
use crate::models::{ForwardConfig, Subscription};
use crate::sync::fingerprint;
use crate::sync::reader;
use crate::sync::reader::{FeedReaderError, FetchedFeedItem};
use crate::sync::send_budget::SendBudget;
use diesel::PgConnection;
use std::collections::{HashMap, HashSet};

/// One scheduled run of the feed engine: group subscriptions by feed,
/// fetch each feed once, deliver unseen items to every resolved target
/// under a shared send budget, and persist the per-feed seen history.
pub struct PollJob {}

#[derive(Debug)]
pub struct PollJobError {
    pub msg: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct DeliveryTarget {
    pub chat_id: i64,
    pub thread_id: Option<i32>,
}

enum FeedOutcome {
    Completed,
    BudgetExhausted,
}

impl From<diesel::result::Error> for PollJobError {
    fn from(error: diesel::result::Error) -> Self {
        let msg = format!("{:?}", error);

        PollJobError { msg }
    }
}

impl From<diesel::r2d2::PoolError> for PollJobError {
    fn from(error: diesel::r2d2::PoolError) -> Self {
        let msg = format!("{:?}", error);

        PollJobError { msg }
    }
}

impl From<FeedReaderError> for PollJobError {
    fn from(error: FeedReaderError) -> Self {
        PollJobError { msg: error.msg }
    }
}

impl Default for PollJob {
    fn default() -> Self {
        Self::new()
    }
}

impl PollJob {
    pub fn new() -> Self {
        PollJob {}
    }

    pub fn execute(&self) -> Result<(), PollJobError> {
        // A missing credential makes every send impossible; skip the whole
        // run instead of fetching feeds we could not deliver.
        let token = match Config::telegram_bot_token() {
            Some(token) => token,
            None => {
                log::error!("TELEGRAM_BOT_TOKEN is missing; aborting the feed check run");

                return Err(PollJobError {
                    msg: "TELEGRAM_BOT_TOKEN is missing".to_string(),
                });
            }
        };

        let api = Api::new(&token);
        let mut connection = db::pool().get()?;

        self.run(&mut connection, &api)
    }

    fn run(&self, conn: &mut PgConnection, api: &Api) -> Result<(), PollJobError> {
        let all_subscriptions = subscriptions::all(conn)?;

        if all_subscriptions.is_empty() {
            log::info!("No subscriptions found");

            return Ok(());
        }

        let groups = group_by_feed(all_subscriptions);

        // One budget and one forward-config cache for the entire tick.
        let mut budget = SendBudget::per_run();
        let mut config_cache: HashMap<i64, Option<ForwardConfig>> = HashMap::new();

        for (rss_url, subscribers) in groups {
            match self.check_feed(conn, api, &rss_url, &subscribers, &mut budget, &mut config_cache)
            {
                Ok(FeedOutcome::Completed) => (),
                Ok(FeedOutcome::BudgetExhausted) => {
                    log::warn!(
                        "Send budget exhausted for this run; remaining feeds continue next tick"
                    );

                    break;
                }
                // One broken feed must not stop the others.
                Err(error) => log::error!("Error checking {}: {}", rss_url, error.msg),
            }
        }

        Ok(())
    }

    fn check_feed(
        &self,
        conn: &mut PgConnection,
        api: &Api,
        rss_url: &str,
        subscribers: &[Subscription],
        budget: &mut SendBudget,
        config_cache: &mut HashMap<i64, Option<ForwardConfig>>,
    ) -> Result<FeedOutcome, PollJobError> {
        let subscribers = unique_subscribers(subscribers);

        let mut history = seen_items::load(conn, rss_url)?;
        let mut seen: HashSet<String> = history.iter().cloned().collect();

        log::info!(
            "Checking feed: {} ({} history items loaded)",
            rss_url,
            history.len()
        );

        let feed = reader::fetch_feed(rss_url)?;

        let mut delivered_new_items = false;
        let mut budget_exhausted = false;

        for item in &feed.items {
            if budget.is_exhausted() {
                budget_exhausted = true;
                break;
            }

            // Items carrying nothing identifying are skipped outright.
            let dedup_key = match fingerprint::dedup_key(item) {
                Some(key) => key,
                None => continue,
            };

            if fingerprint::is_seen(&seen, item, &dedup_key) {
                continue;
            }

            log::info!("New item found for {}: {}", feed.title, item.title);

            for subscription in &subscribers {
                self.cache_forward_config(conn, config_cache, subscription.chat_id)?;
            }

            let targets = resolve_targets(&subscribers, config_cache);

            // Partial deliveries of one item across its targets are worse
            // than deferring the item wholesale.
            if !budget.can_afford(targets.len()) {
                log::warn!(
                    "Skip item due to send budget. Remaining={}, required={}, feed={}",
                    budget.remaining(),
                    targets.len(),
                    rss_url
                );
                budget_exhausted = true;
                break;
            }

            let text = render_new_item_message(item, &source_name(&subscribers, &feed.title));

            let mut success_count = 0;
            for target in &targets {
                let message = OutgoingMessage::builder()
                    .chat_id(target.chat_id)
                    .text(text.clone())
                    .message_thread_id(target.thread_id)
                    .build();

                if api.deliver(&message, budget) {
                    success_count += 1;
                }
            }

            if success_count > 0 {
                seen.insert(dedup_key.clone());
                history.push(dedup_key);
                delivered_new_items = true;
            } else {
                // Leave the item unseen so the next tick retries it.
                log::warn!("All sends failed for item: {} ({})", item.title, rss_url);
            }
        }

        if delivered_new_items {
            seen_items::persist(conn, rss_url, &history)?;
        }

        if budget_exhausted {
            Ok(FeedOutcome::BudgetExhausted)
        } else {
            Ok(FeedOutcome::Completed)
        }
    }

    fn cache_forward_config(
        &self,
        conn: &mut PgConnection,
        config_cache: &mut HashMap<i64, Option<ForwardConfig>>,
        chat_id: i64,
    ) -> Result<(), PollJobError> {
        if !config_cache.contains_key(&chat_id) {
            let config = forwarding::find_config(conn, chat_id)?;
            config_cache.insert(chat_id, config);
        }

        Ok(())
    }
}

/// Groups subscriptions by feed URL, preserving the order in which feeds
/// first appear in the subscription list.
fn group_by_feed(all_subscriptions: Vec<Subscription>) -> Vec<(String, Vec<Subscription>)> {
    let mut groups: Vec<(String, Vec<Subscription>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for subscription in all_subscriptions {
        match index.get(&subscription.rss_url) {
            Some(position) => groups[*position].1.push(subscription),
            None => {
                index.insert(subscription.rss_url.clone(), groups.len());
                groups.push((subscription.rss_url.clone(), vec![subscription]));
            }
        }
    }

    groups
}

/// Drops duplicate subscribers within one feed group, keeping the first
/// record per (chat_id, thread_id).
fn unique_subscribers(subscribers: &[Subscription]) -> Vec<Subscription> {
    let mut keys: HashSet<(i64, Option<i32>)> = HashSet::new();
    let mut unique = Vec::new();

    for subscription in subscribers {
        if keys.insert((subscription.chat_id, subscription.thread_id)) {
            unique.push(subscription.clone());
        }
    }

    unique
}

/// Expands subscribers into delivery targets, honoring per-chat forward
/// configs: the forward target always receives the item (top-level chat),
/// and the subscriber itself receives it too unless `only_forward` is set.
/// The result is deduplicated by (chat_id, thread_id) in insertion order.
fn resolve_targets(
    subscribers: &[Subscription],
    config_cache: &HashMap<i64, Option<ForwardConfig>>,
) -> Vec<DeliveryTarget> {
    let mut keys: HashSet<(i64, Option<i32>)> = HashSet::new();
    let mut targets = Vec::new();

    let mut push = |targets: &mut Vec<DeliveryTarget>, target: DeliveryTarget| {
        if keys.insert((target.chat_id, target.thread_id)) {
            targets.push(target);
        }
    };

    for subscription in subscribers {
        let config = config_cache
            .get(&subscription.chat_id)
            .and_then(|cached| cached.as_ref());

        let own_target = DeliveryTarget {
            chat_id: subscription.chat_id,
            thread_id: subscription.thread_id,
        };

        match config {
            Some(config) => {
                push(
                    &mut targets,
                    DeliveryTarget {
                        chat_id: config.target_chat_id,
                        thread_id: None,
                    },
                );

                if !config.only_forward {
                    push(&mut targets, own_target);
                }
            }
            None => push(&mut targets, own_target),
        }
    }

    targets
}

/// The item's attributed source: the first subscriber's channel name when
/// present, the feed's own title otherwise.
fn source_name(subscribers: &[Subscription], feed_title: &str) -> String {
    subscribers
        .first()
        .map(|subscription| subscription.channel_name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(feed_title)
        .to_string()
}

fn render_new_item_message(item: &FetchedFeedItem, source_name: &str) -> String {
    format!(
        "🔴 <b>New Update!</b>\n\n<b>Title:</b> {}\n<b>Source:</b> {}\n<b>Link:</b> {}\n<b>Date:</b> {}",
        item.title, source_name, item.link, item.pub_date
    )
}

#[cfg(test)]
mod tests {
    use super::{
        group_by_feed, render_new_item_message, resolve_targets, source_name, unique_subscribers,
        DeliveryTarget, PollJob,
    };
    use crate::bot::telegram_client::Api;
    use crate::db;
    use crate::models::{ForwardConfig, Subscription, SubscriptionKind};
    use crate::sync::reader::FetchedFeedItem;
    use crate::sync::send_budget::{SendBudget, MAX_SENDS_PER_RUN};
    use diesel::connection::Connection;
    use diesel::result::Error;
    use mockito::mock;
    use std::collections::HashMap;
    use std::fs;

    fn subscription(chat_id: i64, thread_id: Option<i32>, rss_url: &str) -> Subscription {
        Subscription {
            kind: Some(SubscriptionKind::Rss),
            channel_name: "channel".to_string(),
            rss_url: rss_url.to_string(),
            chat_id,
            thread_id,
        }
    }

    #[test]
    fn it_groups_feeds_in_first_appearance_order() {
        let groups = group_by_feed(vec![
            subscription(1, None, "https://b.example/feed"),
            subscription(2, None, "https://a.example/feed"),
            subscription(3, None, "https://b.example/feed"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "https://b.example/feed");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "https://a.example/feed");
    }

    #[test]
    fn it_deduplicates_subscribers_by_chat_and_thread() {
        let subscribers = vec![
            subscription(1, None, "https://a.example/feed"),
            subscription(1, None, "https://a.example/feed"),
            subscription(1, Some(7), "https://a.example/feed"),
        ];

        let unique = unique_subscribers(&subscribers);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].thread_id, None);
        assert_eq!(unique[1].thread_id, Some(7));
    }

    #[test]
    fn it_targets_the_subscriber_when_no_forward_config_exists() {
        let subscribers = vec![subscription(1, Some(3), "https://a.example/feed")];
        let mut cache = HashMap::new();
        cache.insert(1, None);

        let targets = resolve_targets(&subscribers, &cache);

        assert_eq!(
            targets,
            vec![DeliveryTarget {
                chat_id: 1,
                thread_id: Some(3)
            }]
        );
    }

    #[test]
    fn it_sends_only_to_the_forward_target_when_only_forward_is_set() {
        let subscribers = vec![subscription(1, None, "https://a.example/feed")];
        let mut cache = HashMap::new();
        cache.insert(
            1,
            Some(ForwardConfig {
                target_chat_id: 2,
                only_forward: true,
            }),
        );

        let targets = resolve_targets(&subscribers, &cache);

        assert_eq!(
            targets,
            vec![DeliveryTarget {
                chat_id: 2,
                thread_id: None
            }]
        );
    }

    #[test]
    fn it_sends_to_both_targets_when_only_forward_is_not_set() {
        let subscribers = vec![subscription(1, Some(9), "https://a.example/feed")];
        let mut cache = HashMap::new();
        cache.insert(
            1,
            Some(ForwardConfig {
                target_chat_id: 2,
                only_forward: false,
            }),
        );

        let targets = resolve_targets(&subscribers, &cache);

        assert_eq!(
            targets,
            vec![
                DeliveryTarget {
                    chat_id: 2,
                    thread_id: None
                },
                DeliveryTarget {
                    chat_id: 1,
                    thread_id: Some(9)
                },
            ]
        );
    }

    #[test]
    fn it_deduplicates_targets_across_subscribers() {
        // Two chats forwarding into the same target chat.
        let subscribers = vec![
            subscription(1, None, "https://a.example/feed"),
            subscription(3, None, "https://a.example/feed"),
        ];
        let mut cache = HashMap::new();
        for chat_id in [1, 3] {
            cache.insert(
                chat_id,
                Some(ForwardConfig {
                    target_chat_id: 2,
                    only_forward: true,
                }),
            );
        }

        let targets = resolve_targets(&subscribers, &cache);

        assert_eq!(
            targets,
            vec![DeliveryTarget {
                chat_id: 2,
                thread_id: None
            }]
        );
    }

    #[test]
    fn it_attributes_the_source_to_the_first_subscriber() {
        let subscribers = vec![subscription(1, None, "https://a.example/feed")];

        assert_eq!(source_name(&subscribers, "Feed Title"), "channel");
        assert_eq!(source_name(&[], "Feed Title"), "Feed Title");

        let mut unnamed = subscribers.clone();
        unnamed[0].channel_name = String::new();
        assert_eq!(source_name(&unnamed, "Feed Title"), "Feed Title");
    }

    #[test]
    #[ignore]
    fn it_sends_nothing_on_a_second_run_with_no_new_items() {
        let mut connection = db::pool().get().unwrap();

        connection.test_transaction::<_, Error, _>(|conn| {
            let feed_body = fs::read_to_string("./tests/support/rss_feed_example.xml").unwrap();
            let _feed_mock = mock("GET", "/feed.xml")
                .with_status(200)
                .with_body(feed_body)
                .expect(2)
                .create();
            // All three fixture items carry a dedup identity, so the first
            // run delivers exactly three messages and the second none.
            let send_mock = mock("POST", "/bottest-token/sendMessage")
                .with_status(200)
                .with_body(
                    r#"{"ok":true,"result":{"message_id":1,"date":0,"chat":{"id":1,"type":"private"}}}"#,
                )
                .expect(3)
                .create();

            let api = Api::with_api_url(format!("{}/bottest-token", mockito::server_url()));
            let rss_url = format!("{}/feed.xml", mockito::server_url());
            let subscribers = vec![subscription(1, None, &rss_url)];
            let job = PollJob::new();

            let mut cache = HashMap::new();
            let mut budget = SendBudget::per_run();
            job.check_feed(conn, &api, &rss_url, &subscribers, &mut budget, &mut cache)
                .unwrap();

            assert_eq!(budget.remaining(), MAX_SENDS_PER_RUN - 3);

            let mut budget = SendBudget::per_run();
            job.check_feed(conn, &api, &rss_url, &subscribers, &mut budget, &mut cache)
                .unwrap();

            assert_eq!(budget.remaining(), MAX_SENDS_PER_RUN);
            send_mock.assert();

            Ok(())
        });
    }

    #[test]
    fn it_renders_the_notification_template() {
        let item = FetchedFeedItem {
            title: "Hello".to_string(),
            link: "https://a.example/1".to_string(),
            guid: "1".to_string(),
            pub_date: "Mon, 06 Sep 2021 12:00:00 GMT".to_string(),
        };

        let text = render_new_item_message(&item, "channel");

        assert_eq!(
            text,
            "🔴 <b>New Update!</b>\n\n<b>Title:</b> Hello\n<b>Source:</b> channel\n<b>Link:</b> https://a.example/1\n<b>Date:</b> Mon, 06 Sep 2021 12:00:00 GMT"
        );
    }
}
