//! User summary: one profile view assembled from four reads.
//!
//! Counts come from the envelope count field when the server sends an
//! envelope, otherwise from the list length. Any failed read fails the
//! whole summary; no partial profile is ever returned.

use serde::Serialize;
use serde_json::Value;

use crate::client::ForumClient;
use crate::identity::UserIdentity;
use crate::payload::Payload;
use crate::ForumResult;

const SUBSCRIPTION_COUNT_KEY: &str = "subscription_count";
const SUBSCRIPTION_LIST_KEY: &str = "subscriptions";
const OWN_POST_COUNT_KEY: &str = "request_count";
const MESSAGE_COUNT_KEY: &str = "message_count";

/// Raw payloads the counts were read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySources {
    pub subscriptions: Payload,
    pub own_posts: Payload,
    pub feed: Payload,
    pub inbox: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub display_name: String,
    pub subscription_count: u64,
    pub published_post_count: u64,
    pub feed_post_count: u64,
    pub received_reply_count: u64,
    pub subscriptions: Vec<Value>,
    pub sources: SummarySources,
}

impl UserSummary {
    /// Build a summary from already-fetched payloads.
    pub fn from_sources(user: &UserIdentity, sources: SummarySources) -> Self {
        Self {
            user_id: user.as_str().to_string(),
            display_name: user.display_name(),
            subscription_count: sources.subscriptions.count(SUBSCRIPTION_COUNT_KEY),
            published_post_count: sources.own_posts.count(OWN_POST_COUNT_KEY),
            feed_post_count: sources.feed.count(MESSAGE_COUNT_KEY),
            received_reply_count: sources.inbox.count(MESSAGE_COUNT_KEY),
            subscriptions: sources.subscriptions.entries(SUBSCRIPTION_LIST_KEY).to_vec(),
            sources,
        }
    }

    /// Fetch subscriptions, own posts, feed and inbox for `user`, in that order.
    pub fn fetch(client: &ForumClient, user: &UserIdentity) -> ForumResult<Self> {
        let sources = SummarySources {
            subscriptions: client.list_subscriptions(user)?,
            own_posts: client.list_own_posts(user)?,
            feed: client.list_feed(user)?,
            inbox: client.list_inbox_replies(user)?,
        };
        Ok(Self::from_sources(user, sources))
    }

    /// Subscribed topic names, skipping anything that is not a string.
    pub fn topic_names(&self) -> Vec<&str> {
        self.subscriptions.iter().filter_map(Value::as_str).collect()
    }
}
