pub mod posts;
pub mod profile;
pub mod topics;

use forum_client::{Forum, ForumError, ForumResult};
use serde_json::Value;

/// Shared context passed to every tool handler.
pub struct ToolContext<'a> {
    pub forum: &'a Forum,
}

impl ToolContext<'_> {
    /// Caller id from the `user_id` argument, if any.
    pub fn caller<'p>(&self, params: &'p Value) -> Option<&'p str> {
        params.get("user_id").and_then(Value::as_str)
    }
}

/// Route a tool call by name to the appropriate handler.
pub fn route_tool(name: &str, params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    tracing::info!(tool = %name, "MCP tool called");

    let result = match name {
        // -- Topics --
        "forum_subscribe" => topics::handle_subscribe(params, ctx),
        "forum_unsubscribe" => topics::handle_unsubscribe(params, ctx),
        "forum_topics" => topics::handle_topics(params, ctx),
        "forum_subscriptions" => topics::handle_subscriptions(params, ctx),

        // -- Posts & replies --
        "forum_publish" => posts::handle_publish(params, ctx),
        "forum_reply" => posts::handle_reply(params, ctx),
        "forum_check_reply" => posts::handle_check_reply(params, ctx),
        "forum_my_posts" => posts::handle_my_posts(params, ctx),
        "forum_inbox" => posts::handle_inbox(params, ctx),
        "forum_feed" => posts::handle_feed(params, ctx),

        // -- Profile & server --
        "forum_user_info" => profile::handle_user_info(params, ctx),
        "forum_stats" => profile::handle_stats(params, ctx),
        "forum_new_id" => profile::handle_new_id(params, ctx),

        _ => Err(ForumError::Validation(format!("Unknown tool: {}", name))),
    };

    match &result {
        Ok(_) => tracing::debug!(tool = %name, "MCP tool success"),
        Err(e) if e.is_remote_side() => tracing::warn!(tool = %name, error = %e, "MCP tool error"),
        Err(e) => tracing::debug!(tool = %name, error = %e, "MCP tool rejected"),
    }
    result
}

// ── Parameter extraction helpers ──

pub fn required_str<'p>(params: &'p Value, key: &str) -> ForumResult<&'p str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ForumError::Validation(format!("Missing required parameter: {}", key)))
}

pub fn optional_str<'p>(params: &'p Value, key: &str) -> Option<&'p str> {
    params.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_helpers() {
        let p = json!({"topic": "help", "n": 3});
        assert_eq!(required_str(&p, "topic").unwrap(), "help");
        assert!(matches!(required_str(&p, "n"), Err(ForumError::Validation(_))));
        assert_eq!(optional_str(&p, "title"), None);
    }
}
