use forum_client::present::{self, RecordKind};
use forum_client::ForumResult;
use serde_json::Value;

use super::{optional_str, required_str, ToolContext};

pub fn handle_publish(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let topic = required_str(params, "topic")?;
    let content = required_str(params, "content")?;
    let title = optional_str(params, "title");
    Ok(ctx
        .forum
        .publish_post(ctx.caller(params), topic, content, title)?
        .into_value())
}

/// Guarded reply: rejected unless the post is in the caller's feed.
pub fn handle_reply(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let post_id = required_str(params, "post_id")?;
    let content = required_str(params, "content")?;
    let receipt = ctx.forum.reply(ctx.caller(params), post_id, content)?;
    Ok(serde_json::to_value(receipt)?)
}

pub fn handle_check_reply(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let post_id = required_str(params, "post_id")?;
    let check = ctx.forum.check_reply(ctx.caller(params), post_id)?;
    Ok(serde_json::to_value(check)?)
}

pub fn handle_my_posts(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let posts = ctx.forum.my_posts(ctx.caller(params))?;
    Ok(Value::String(present::display(&posts, RecordKind::OwnPost, "No posts published yet")))
}

pub fn handle_inbox(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let replies = ctx.forum.inbox(ctx.caller(params))?;
    Ok(Value::String(present::display(&replies, RecordKind::Reply, "No replies received yet")))
}

pub fn handle_feed(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let feed = ctx.forum.feed(ctx.caller(params))?;
    Ok(Value::String(present::display(&feed, RecordKind::FeedPost, "Your feed is empty")))
}
