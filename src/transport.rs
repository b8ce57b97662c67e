//! Transport: one logical forum operation, bounded retry, fresh connection per attempt.
//!
//! Retry policy:
//!   - up to `max_attempts` attempts (default 3)
//!   - retried: connect failure, DNS failure, timeout, transport I/O error
//!   - never retried: a well-formed non-2xx response (→ `ForumError::Remote`)
//!   - fixed backoff between attempts (default 1s)
//!
//! Connections are owned values scoped to a single attempt: they are dropped
//! (and their sockets closed) on every exit path, so a broken keep-alive
//! socket can never leak into the next attempt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::constants::{MAX_ATTEMPTS, REQUEST_TIMEOUT, RETRY_BACKOFF};
use crate::payload::Payload;
use crate::{ForumError, ForumResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Request path as raw segments. Each segment is percent-encoded on resolve,
/// so caller-supplied ids always stay a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Append the segments to the base URL path.
    pub fn resolve(&self, base: &Url) -> ForumResult<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ForumError::Config(format!("Base URL cannot carry a path: {}", base)))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// A single request as handed to a connection.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub url: &'a Url,
    pub body: Option<&'a Value>,
}

/// A complete HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete an exchange (no well-formed response was obtained).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub retryable: bool,
    pub message: String,
}

impl AttemptFailure {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self { retryable: true, message: message.into() }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self { retryable: false, message: message.into() }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An open connection, good for exactly one attempt.
pub trait Connection {
    fn send(&mut self, request: &Request<'_>) -> Result<RawResponse, AttemptFailure>;
}

/// Opens a fresh connection per attempt.
pub trait Connector: Send + Sync {
    fn connect(&self, timeout: Duration) -> Result<Box<dyn Connection>, AttemptFailure>;
}

// ─── ureq backend ───

/// Production connector: a brand-new `ureq::Agent` (own pool) per attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqConnector;

struct UreqConnection {
    agent: ureq::Agent,
}

impl Connector for UreqConnector {
    fn connect(&self, timeout: Duration) -> Result<Box<dyn Connection>, AttemptFailure> {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Ok(Box::new(UreqConnection {
            agent: ureq::Agent::new_with_config(config),
        }))
    }
}

impl Connection for UreqConnection {
    fn send(&mut self, request: &Request<'_>) -> Result<RawResponse, AttemptFailure> {
        let url = request.url.as_str();
        let result = match (request.method, request.body) {
            (Method::Get, _) => self.agent.get(url).header("accept", "application/json").call(),
            (Method::Post, Some(body)) => self
                .agent
                .post(url)
                .header("accept", "application/json")
                .send_json(body),
            (Method::Post, None) => self.agent.post(url).send_empty(),
        };
        let mut response = result.map_err(classify_ureq_error)?;
        let status = response.status().as_u16();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            // The status line alone settles a rejection; it must not turn retryable.
            Err(e) if !(200..300).contains(&status) => {
                tracing::debug!(status, error = %e, "Error body unreadable, dropped");
                String::new()
            }
            Err(e) => return Err(classify_ureq_error(e)),
        };
        Ok(RawResponse { status, body })
    }
}

fn classify_ureq_error(e: ureq::Error) -> AttemptFailure {
    let retryable = matches!(
        e,
        ureq::Error::Io(_)
            | ureq::Error::Timeout(_)
            | ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
    );
    let message = e.to_string();
    if retryable {
        AttemptFailure::retryable(message)
    } else {
        AttemptFailure::fatal(message)
    }
}

// ─── Transport ───

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: REQUEST_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            retry_backoff: RETRY_BACKOFF,
        }
    }
}

#[derive(Clone)]
pub struct Transport {
    config: TransportConfig,
    connector: Arc<dyn Connector>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self::with_connector(config, Arc::new(UreqConnector))
    }

    pub fn with_connector(config: TransportConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Run one logical operation and parse the body.
    pub fn execute(&self, method: Method, path: &ApiPath, body: Option<&Value>) -> ForumResult<Payload> {
        let url = path.resolve(&self.config.base_url)?;
        let request = Request { method, url: &url, body };
        let max = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            tracing::debug!(method = method.as_str(), path = %path, attempt, "Forum request");
            match self.attempt(&request) {
                Ok(response) if response.is_success() => {
                    return Ok(Payload::from_body(&response.body));
                }
                Ok(response) => {
                    tracing::warn!(
                        method = method.as_str(),
                        path = %path,
                        status = response.status,
                        "Forum request rejected"
                    );
                    return Err(ForumError::Remote {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        method = method.as_str(),
                        path = %path,
                        attempt,
                        max,
                        retryable = failure.retryable,
                        error = %failure,
                        "Forum request failed"
                    );
                    if !failure.retryable || attempt >= max {
                        return Err(ForumError::Transport {
                            attempts: attempt,
                            cause: failure.message,
                        });
                    }
                    std::thread::sleep(self.config.retry_backoff);
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt on its own connection; the connection drops on return.
    fn attempt(&self, request: &Request<'_>) -> Result<RawResponse, AttemptFailure> {
        let mut conn = self.connector.connect(self.config.timeout)?;
        conn.send(request)
    }
}
