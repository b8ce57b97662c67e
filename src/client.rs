//! Service client: one typed call per forum capability.
//!
//! Every operation is a pure translation of (identity, parameters) into a
//! Transport call; the parsed payload is handed back untouched.

use serde_json::{json, Value};

use crate::identity::UserIdentity;
use crate::payload::Payload;
use crate::transport::{ApiPath, Method, Transport};
use crate::ForumResult;

#[derive(Debug, Clone)]
pub struct ForumClient {
    transport: Transport,
}

impl ForumClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn subscribe(&self, user: &UserIdentity, topic: &str) -> ForumResult<Payload> {
        let body = json!({"user_id": user.as_str(), "topic": topic});
        self.post(&["topics", "subscribe"], &body)
    }

    pub fn unsubscribe(&self, user: &UserIdentity, topic: &str) -> ForumResult<Payload> {
        let body = json!({"user_id": user.as_str(), "topic": topic});
        self.post(&["topics", "unsubscribe"], &body)
    }

    pub fn list_topics(&self) -> ForumResult<Payload> {
        self.get(&["topics"])
    }

    /// Publish a post ("request"). `title` is left out of the body when absent.
    pub fn publish_post(
        &self,
        user: &UserIdentity,
        topic: &str,
        content: &str,
        title: Option<&str>,
    ) -> ForumResult<Payload> {
        let mut body = json!({
            "user_id": user.as_str(),
            "topic": topic,
            "content": content,
        });
        if let Some(t) = title {
            body["title"] = Value::String(t.to_string());
        }
        self.post(&["requests", "publish"], &body)
    }

    /// Publish a reply ("response"). Callers go through the feed guard first.
    pub fn publish_reply(&self, user: &UserIdentity, post_id: &str, content: &str) -> ForumResult<Payload> {
        let body = json!({
            "user_id": user.as_str(),
            "request_id": post_id,
            "content": content,
        });
        self.post(&["responses", "publish"], &body)
    }

    pub fn list_own_posts(&self, user: &UserIdentity) -> ForumResult<Payload> {
        self.get(&["users", user.as_str(), "requests"])
    }

    pub fn list_inbox_replies(&self, user: &UserIdentity) -> ForumResult<Payload> {
        self.get(&["users", user.as_str(), "received", "responses"])
    }

    pub fn list_feed(&self, user: &UserIdentity) -> ForumResult<Payload> {
        self.get(&["users", user.as_str(), "received", "requests"])
    }

    pub fn list_subscriptions(&self, user: &UserIdentity) -> ForumResult<Payload> {
        self.get(&["users", user.as_str(), "subscriptions"])
    }

    pub fn get_stats(&self) -> ForumResult<Payload> {
        self.get(&["stats"])
    }

    fn get(&self, segments: &[&str]) -> ForumResult<Payload> {
        self.transport
            .execute(Method::Get, &ApiPath::new(segments.iter().copied()), None)
    }

    fn post(&self, segments: &[&str], body: &Value) -> ForumResult<Payload> {
        self.transport
            .execute(Method::Post, &ApiPath::new(segments.iter().copied()), Some(body))
    }
}
