//! Forum façade: identity resolution, input checks and the feed guard in
//! front of the service client. Both front-ends go through this type.

use serde::Serialize;

use crate::client::ForumClient;
use crate::config::ClientConfig;
use crate::guard::{FeedGuard, FeedPost, ReplyCheck};
use crate::identity::{build_resolver, IdentityPolicy, IdentityRecord, IdentityResolver, UserIdentity};
use crate::payload::Payload;
use crate::storage::identity_store::IdentityStore;
use crate::summary::UserSummary;
use crate::transport::Transport;
use crate::{ForumError, ForumResult};

/// Outcome of an accepted reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyReceipt {
    pub post_id: String,
    pub topic: String,
    pub preview: String,
    pub result: Payload,
}

pub struct Forum {
    resolver: Box<dyn IdentityResolver>,
    client: ForumClient,
}

impl Forum {
    pub fn new(resolver: Box<dyn IdentityResolver>, client: ForumClient) -> Self {
        Self { resolver, client }
    }

    /// Wire a forum from configuration. `policy` overrides the configured one.
    pub fn open(config: &ClientConfig, policy: Option<IdentityPolicy>, store: &IdentityStore) -> ForumResult<Self> {
        let transport = Transport::new(config.transport_config()?);
        let resolver = build_resolver(policy.unwrap_or(config.identity_policy), store)?;
        tracing::debug!(
            base_url = %transport.base_url(),
            policy = resolver.policy().as_str(),
            "Forum client ready"
        );
        Ok(Self::new(resolver, ForumClient::new(transport)))
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.resolver.policy()
    }

    pub fn client(&self) -> &ForumClient {
        &self.client
    }

    /// The identity a call with `caller` would act as.
    pub fn whoami(&self, caller: Option<&str>) -> ForumResult<UserIdentity> {
        self.resolver.resolve(caller)
    }

    /// First-seen metadata of `user`, if the identity policy keeps any.
    pub fn identity_record(&self, user: &UserIdentity) -> Option<IdentityRecord> {
        self.resolver.record(user)
    }

    pub fn subscribe(&self, caller: Option<&str>, topic: &str) -> ForumResult<Payload> {
        let topic = required("topic", topic)?;
        let user = self.resolver.resolve(caller)?;
        let result = self.client.subscribe(&user, topic)?;
        tracing::info!(user = %user, topic, "Subscribed");
        Ok(result)
    }

    pub fn unsubscribe(&self, caller: Option<&str>, topic: &str) -> ForumResult<Payload> {
        let topic = required("topic", topic)?;
        let user = self.resolver.resolve(caller)?;
        let result = self.client.unsubscribe(&user, topic)?;
        tracing::info!(user = %user, topic, "Unsubscribed");
        Ok(result)
    }

    pub fn topics(&self) -> ForumResult<Payload> {
        self.client.list_topics()
    }

    /// A blank title is treated as no title.
    pub fn publish_post(
        &self,
        caller: Option<&str>,
        topic: &str,
        content: &str,
        title: Option<&str>,
    ) -> ForumResult<Payload> {
        let topic = required("topic", topic)?;
        let content = required("content", content)?;
        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let user = self.resolver.resolve(caller)?;
        let result = self.client.publish_post(&user, topic, content, title)?;
        tracing::info!(user = %user, topic, "Post published");
        Ok(result)
    }

    /// Reply to `post_id`, only if it is in the caller's feed right now.
    /// A rejected reply never reaches the publish endpoint.
    pub fn reply(&self, caller: Option<&str>, post_id: &str, content: &str) -> ForumResult<ReplyReceipt> {
        let post_id = required("post id", post_id)?;
        let content = required("content", content)?;
        let user = self.resolver.resolve(caller)?;

        let check = FeedGuard::new(&self.client).can_reply(&user, post_id);
        if !check.allowed {
            tracing::info!(user = %user, post_id, "Reply rejected, post not in feed");
            return Err(ForumError::GuardRejection { post_id: post_id.to_string() });
        }

        let result = self.client.publish_reply(&user, post_id, content)?;
        tracing::info!(user = %user, post_id, topic = %check.topic, "Reply published");
        Ok(ReplyReceipt {
            post_id: post_id.to_string(),
            topic: check.topic,
            preview: check.preview,
            result,
        })
    }

    pub fn check_reply(&self, caller: Option<&str>, post_id: &str) -> ForumResult<ReplyCheck> {
        let post_id = required("post id", post_id)?;
        let user = self.resolver.resolve(caller)?;
        Ok(FeedGuard::new(&self.client).can_reply(&user, post_id))
    }

    pub fn reply_candidates(&self, caller: Option<&str>) -> ForumResult<Vec<FeedPost>> {
        let user = self.resolver.resolve(caller)?;
        Ok(FeedGuard::new(&self.client).reply_candidates(&user))
    }

    pub fn my_posts(&self, caller: Option<&str>) -> ForumResult<Payload> {
        let user = self.resolver.resolve(caller)?;
        self.client.list_own_posts(&user)
    }

    pub fn inbox(&self, caller: Option<&str>) -> ForumResult<Payload> {
        let user = self.resolver.resolve(caller)?;
        self.client.list_inbox_replies(&user)
    }

    pub fn feed(&self, caller: Option<&str>) -> ForumResult<Payload> {
        let user = self.resolver.resolve(caller)?;
        self.client.list_feed(&user)
    }

    pub fn subscriptions(&self, caller: Option<&str>) -> ForumResult<Payload> {
        let user = self.resolver.resolve(caller)?;
        self.client.list_subscriptions(&user)
    }

    pub fn user_summary(&self, caller: Option<&str>) -> ForumResult<UserSummary> {
        let user = self.resolver.resolve(caller)?;
        UserSummary::fetch(&self.client, &user)
    }

    pub fn stats(&self) -> ForumResult<Payload> {
        self.client.get_stats()
    }

    /// Connection check against the stats endpoint.
    pub fn ping(&self) -> ForumResult<Payload> {
        match self.client.get_stats() {
            Ok(stats) => {
                tracing::info!(base_url = %self.client.transport().base_url(), "Forum reachable");
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(base_url = %self.client.transport().base_url(), error = %e, "Forum unreachable");
                Err(e)
            }
        }
    }
}

/// Trimmed, non-empty argument or a `Validation` error.
fn required<'a>(field: &str, value: &'a str) -> ForumResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForumError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
