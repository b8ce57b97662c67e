//! Shared test utilities: scripted connector, in-memory forum server.
//!
//! Available only under `#[cfg(test)]`.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use url::Url;

use crate::client::ForumClient;
use crate::transport::{
    AttemptFailure, Connection, Connector, Method, RawResponse, Request, Transport, TransportConfig,
};

pub fn test_base_url() -> Url {
    Url::parse("http://forum.test").unwrap()
}

// ============================================================================
// ScriptedConnector
// ============================================================================

/// What the next attempt does.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// `connect()` itself fails.
    Refuse,
    /// Connection opens, `send()` fails.
    Fail(AttemptFailure),
    /// Connection opens, a response comes back.
    Respond(RawResponse),
}

impl Outcome {
    pub fn refuse() -> Self {
        Self::Refuse
    }

    pub fn fail(failure: AttemptFailure) -> Self {
        Self::Fail(failure)
    }

    pub fn respond(status: u16, body: &str) -> Self {
        Self::Respond(RawResponse { status, body: body.to_string() })
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Plays back a fixed list of outcomes, one per attempt.
/// Once the script runs dry every attempt answers `200 {}`.
#[derive(Default)]
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Outcome>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    connects: AtomicU32,
    releases: Arc<AtomicU32>,
}

struct ScriptedConnection {
    outcome: Outcome,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    releases: Arc<AtomicU32>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, _timeout: Duration) -> Result<Box<dyn Connection>, AttemptFailure> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Outcome::respond(200, "{}"));
        if let Outcome::Refuse = outcome {
            // No connection was handed out, count it as released too.
            self.releases.fetch_add(1, Ordering::SeqCst);
            return Err(AttemptFailure::retryable("connection refused"));
        }
        Ok(Box::new(ScriptedConnection {
            outcome,
            seen: self.seen.clone(),
            releases: self.releases.clone(),
        }))
    }
}

impl Connection for ScriptedConnection {
    fn send(&mut self, request: &Request<'_>) -> Result<RawResponse, AttemptFailure> {
        self.seen.lock().unwrap().push(SeenRequest {
            method: request.method,
            url: request.url.to_string(),
            body: request.body.cloned(),
        });
        match &self.outcome {
            Outcome::Respond(r) => Ok(r.clone()),
            Outcome::Fail(f) => Err(f.clone()),
            Outcome::Refuse => Err(AttemptFailure::retryable("connection refused")),
        }
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// FakeForum: in-memory server behind the Connector seam
// ============================================================================

#[derive(Debug, Clone)]
struct StoredPost {
    id: String,
    topic: String,
    title: Option<String>,
    content: String,
    author: String,
    created_at: String,
}

#[derive(Debug, Clone)]
struct StoredReply {
    id: String,
    post_id: String,
    content: String,
    author: String,
    created_at: String,
}

#[derive(Debug, Default)]
struct ForumState {
    subscriptions: HashMap<String, BTreeSet<String>>,
    topics: BTreeSet<String>,
    posts: Vec<StoredPost>,
    replies: Vec<StoredReply>,
    next_id: u64,
}

/// Shape the fake server answers list endpoints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `{"status": "success", "..._count": n, "requests": [...]}` with `request_id`.
    Envelope,
    /// Bare JSON array with `id` / `user_id`.
    Bare,
}

pub struct FakeForum {
    state: Arc<Mutex<ForumState>>,
    shape: ListShape,
    offline: Arc<AtomicBool>,
    reply_publishes: Arc<AtomicU32>,
    requests: Arc<AtomicU32>,
}

struct FakeConnection {
    state: Arc<Mutex<ForumState>>,
    shape: ListShape,
    reply_publishes: Arc<AtomicU32>,
    requests: Arc<AtomicU32>,
}

impl FakeForum {
    pub fn new(shape: ListShape) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::default(),
            shape,
            offline: Arc::new(AtomicBool::new(false)),
            reply_publishes: Arc::new(AtomicU32::new(0)),
            requests: Arc::new(AtomicU32::new(0)),
        })
    }

    /// A client wired to this server with zero backoff.
    pub fn client(self: &Arc<Self>) -> ForumClient {
        let mut config = TransportConfig::new(test_base_url());
        config.retry_backoff = Duration::ZERO;
        ForumClient::new(Transport::with_connector(config, self.clone()))
    }

    /// Refuse every connection from now on.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn reply_publishes(&self) -> u32 {
        self.reply_publishes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Connector for FakeForum {
    fn connect(&self, _timeout: Duration) -> Result<Box<dyn Connection>, AttemptFailure> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AttemptFailure::retryable("connection refused"));
        }
        Ok(Box::new(FakeConnection {
            state: self.state.clone(),
            shape: self.shape,
            reply_publishes: self.reply_publishes.clone(),
            requests: self.requests.clone(),
        }))
    }
}

fn ok(body: Value) -> Result<RawResponse, AttemptFailure> {
    Ok(RawResponse { status: 200, body: body.to_string() })
}

fn status(code: u16, detail: &str) -> Result<RawResponse, AttemptFailure> {
    Ok(RawResponse { status: code, body: json!({ "detail": detail }).to_string() })
}

fn body_str<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a str> {
    body?.get(key)?.as_str()
}

impl Connection for FakeConnection {
    fn send(&mut self, request: &Request<'_>) -> Result<RawResponse, AttemptFailure> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let segments: Vec<&str> = request
            .url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        let body = request.body;

        match (request.method, segments.as_slice()) {
            (Method::Post, ["topics", "subscribe"]) => {
                let (Some(user), Some(topic)) = (body_str(body, "user_id"), body_str(body, "topic")) else {
                    return status(422, "user_id and topic required");
                };
                state.topics.insert(topic.to_string());
                let added = state
                    .subscriptions
                    .entry(user.to_string())
                    .or_default()
                    .insert(topic.to_string());
                let message = if added { "subscribed" } else { "already subscribed" };
                ok(json!({"status": "success", "message": message, "topic": topic}))
            }
            (Method::Post, ["topics", "unsubscribe"]) => {
                let (Some(user), Some(topic)) = (body_str(body, "user_id"), body_str(body, "topic")) else {
                    return status(422, "user_id and topic required");
                };
                let removed = state
                    .subscriptions
                    .get_mut(user)
                    .map(|s| s.remove(topic))
                    .unwrap_or(false);
                let message = if removed { "unsubscribed" } else { "not subscribed" };
                ok(json!({"status": "success", "message": message, "topic": topic}))
            }
            (Method::Get, ["topics"]) => {
                let topics: Vec<&String> = state.topics.iter().collect();
                ok(json!({"status": "success", "topics": topics}))
            }
            (Method::Post, ["requests", "publish"]) => {
                let (Some(user), Some(topic), Some(content)) = (
                    body_str(body, "user_id"),
                    body_str(body, "topic"),
                    body_str(body, "content"),
                ) else {
                    return status(422, "user_id, topic and content required");
                };
                state.next_id += 1;
                let id = format!("req-{}", state.next_id);
                let post = StoredPost {
                    id: id.clone(),
                    topic: topic.to_string(),
                    title: body_str(body, "title").map(str::to_string),
                    content: content.to_string(),
                    author: user.to_string(),
                    created_at: crate::time_utils::now_rfc3339(),
                };
                state.topics.insert(post.topic.clone());
                state.posts.push(post);
                ok(json!({"status": "success", "request_id": id}))
            }
            (Method::Post, ["responses", "publish"]) => {
                self.reply_publishes.fetch_add(1, Ordering::SeqCst);
                let (Some(user), Some(post_id), Some(content)) = (
                    body_str(body, "user_id"),
                    body_str(body, "request_id"),
                    body_str(body, "content"),
                ) else {
                    return status(422, "user_id, request_id and content required");
                };
                if !state.posts.iter().any(|p| p.id == post_id) {
                    return status(404, "request not found");
                }
                state.next_id += 1;
                let id = format!("resp-{}", state.next_id);
                state.replies.push(StoredReply {
                    id: id.clone(),
                    post_id: post_id.to_string(),
                    content: content.to_string(),
                    author: user.to_string(),
                    created_at: crate::time_utils::now_rfc3339(),
                });
                ok(json!({"status": "success", "response_id": id}))
            }
            (Method::Get, ["users", user, "requests"]) => {
                let posts: Vec<Value> = state
                    .posts
                    .iter()
                    .filter(|p| p.author == *user)
                    .map(|p| self.post_json(p))
                    .collect();
                self.list(user, "request_count", "requests", posts)
            }
            (Method::Get, ["users", user, "received", "requests"]) => {
                let topics = state.subscriptions.get(*user).cloned().unwrap_or_default();
                let posts: Vec<Value> = state
                    .posts
                    .iter()
                    .filter(|p| topics.contains(&p.topic))
                    .map(|p| self.post_json(p))
                    .collect();
                self.list(user, "message_count", "requests", posts)
            }
            (Method::Get, ["users", user, "received", "responses"]) => {
                let own: BTreeSet<&str> = state
                    .posts
                    .iter()
                    .filter(|p| p.author == *user)
                    .map(|p| p.id.as_str())
                    .collect();
                let replies: Vec<Value> = state
                    .replies
                    .iter()
                    .filter(|r| own.contains(r.post_id.as_str()))
                    .map(|r| {
                        json!({
                            "id": r.id,
                            "request_id": r.post_id,
                            "content": r.content,
                            "user_id": r.author,
                            "created_at": r.created_at,
                        })
                    })
                    .collect();
                self.list(user, "message_count", "responses", replies)
            }
            (Method::Get, ["users", user, "subscriptions"]) => {
                let subs: Vec<Value> = state
                    .subscriptions
                    .get(*user)
                    .map(|s| s.iter().map(|t| json!(t)).collect())
                    .unwrap_or_default();
                self.list(user, "subscription_count", "subscriptions", subs)
            }
            (Method::Get, ["stats"]) => ok(json!({
                "total_users": state.subscriptions.len(),
                "total_topics": state.topics.len(),
                "total_requests": state.posts.len(),
                "total_responses": state.replies.len(),
            })),
            _ => status(404, "Not Found"),
        }
    }
}

impl FakeConnection {
    fn post_json(&self, p: &StoredPost) -> Value {
        match self.shape {
            ListShape::Envelope => json!({
                "request_id": p.id,
                "topic": p.topic,
                "title": p.title,
                "content": p.content,
                "publisher_user_id": p.author,
                "created_at": p.created_at,
                "status": "open",
            }),
            ListShape::Bare => json!({
                "id": p.id,
                "topic": p.topic,
                "title": p.title,
                "content": p.content,
                "user_id": p.author,
                "created_at": p.created_at,
                "status": "open",
            }),
        }
    }

    fn list(&self, user: &str, count_key: &str, list_key: &str, items: Vec<Value>) -> Result<RawResponse, AttemptFailure> {
        match self.shape {
            ListShape::Bare => ok(Value::Array(items)),
            ListShape::Envelope => {
                let mut envelope = serde_json::Map::new();
                envelope.insert("status".into(), json!("success"));
                envelope.insert("user_id".into(), json!(user));
                envelope.insert(count_key.into(), json!(items.len()));
                envelope.insert(list_key.into(), Value::Array(items));
                ok(Value::Object(envelope))
            }
        }
    }
}
