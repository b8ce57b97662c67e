//! Feed consistency guard: may this user reply to that post?
//!
//! A reply is only submitted when the target post is visible in the
//! replier's feed at call time, i.e. reachable through an active
//! subscription. The feed is fetched fresh for every check and nothing is
//! cached between check and use. The check is advisory: the server still has
//! the final word on whether the reply is accepted.
//!
//! Failures fetching the feed close the gate (`allowed = false`).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::ForumClient;
use crate::constants::{truncate_safe, CANDIDATE_PREVIEW_CHARS, ELLIPSIS, PUBLISHER_FIELDS, REPLY_PREVIEW_CHARS};
use crate::id_gen;
use crate::identity::UserIdentity;
use crate::payload::{self, Payload};

/// Feed envelope key holding the post list.
const FEED_LIST_KEY: &str = "requests";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplyCheck {
    pub allowed: bool,
    pub topic: String,
    pub preview: String,
}

impl ReplyCheck {
    fn denied() -> Self {
        Self::default()
    }
}

/// A post as seen from the feed, for reply pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPost {
    pub id: String,
    pub topic: String,
    pub content: String,
    pub publisher: String,
}

impl FeedPost {
    fn from_entry(entry: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: payload::post_id(entry)?,
            topic: text_field(entry, "topic"),
            content: text_field(entry, "content"),
            publisher: payload::field_str(entry, PUBLISHER_FIELDS).unwrap_or_default(),
        })
    }

    /// `[topic] content preview - by 1a2b3c4d...`
    pub fn label(&self) -> String {
        let preview = if self.content.chars().count() > CANDIDATE_PREVIEW_CHARS {
            format!("{}{}", truncate_safe(&self.content, CANDIDATE_PREVIEW_CHARS), ELLIPSIS)
        } else {
            self.content.clone()
        };
        format!("[{}] {} - by {}{}", self.topic, preview, id_gen::short_id(&self.publisher), ELLIPSIS)
    }
}

fn text_field(entry: &Map<String, Value>, key: &str) -> String {
    entry.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Preview shown when a reply is allowed: 50 chars and a trailing `...`.
pub fn reply_preview(content: &str) -> String {
    format!("{}{}", truncate_safe(content, REPLY_PREVIEW_CHARS), ELLIPSIS)
}

/// Post entries of a feed payload (bare list or `requests` envelope).
pub fn feed_entries(feed: &Payload) -> impl Iterator<Item = &Map<String, Value>> {
    feed.entries(FEED_LIST_KEY).iter().filter_map(Value::as_object)
}

/// Pure matching step: search a feed snapshot for `post_id`.
pub fn check_feed(feed: &Payload, post_id: &str) -> ReplyCheck {
    feed_entries(feed)
        .find(|entry| payload::post_id(entry).as_deref() == Some(post_id))
        .map(|entry| ReplyCheck {
            allowed: true,
            topic: text_field(entry, "topic"),
            preview: reply_preview(&text_field(entry, "content")),
        })
        .unwrap_or_else(ReplyCheck::denied)
}

pub struct FeedGuard<'a> {
    client: &'a ForumClient,
}

impl<'a> FeedGuard<'a> {
    pub fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    /// Fetch `user`'s feed now and look for `post_id` in it.
    pub fn can_reply(&self, user: &UserIdentity, post_id: &str) -> ReplyCheck {
        match self.client.list_feed(user) {
            Ok(feed) => {
                let check = check_feed(&feed, post_id);
                tracing::debug!(user = %user, post_id, allowed = check.allowed, "Reply check");
                check
            }
            Err(e) => {
                tracing::warn!(user = %user, post_id, error = %e, "Feed fetch failed, reply check denied");
                ReplyCheck::denied()
            }
        }
    }

    /// Posts in `user`'s feed that can be replied to. Empty on fetch failure.
    pub fn reply_candidates(&self, user: &UserIdentity) -> Vec<FeedPost> {
        match self.client.list_feed(user) {
            Ok(feed) => feed_entries(&feed).filter_map(FeedPost::from_entry).collect(),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Feed fetch failed, no reply candidates");
                Vec::new()
            }
        }
    }
}
