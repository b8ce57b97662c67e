use forum_client::ForumResult;
use serde_json::Value;

use super::{required_str, ToolContext};

pub fn handle_subscribe(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let topic = required_str(params, "topic")?;
    Ok(ctx.forum.subscribe(ctx.caller(params), topic)?.into_value())
}

pub fn handle_unsubscribe(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let topic = required_str(params, "topic")?;
    Ok(ctx.forum.unsubscribe(ctx.caller(params), topic)?.into_value())
}

pub fn handle_topics(_params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    Ok(ctx.forum.topics()?.into_value())
}

pub fn handle_subscriptions(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    Ok(ctx.forum.subscriptions(ctx.caller(params))?.into_value())
}
