use forum_client::identity::UserIdentity;
use forum_client::ForumResult;
use serde_json::{json, Value};

use super::ToolContext;

pub fn handle_user_info(params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let summary = ctx.forum.user_summary(ctx.caller(params))?;
    Ok(serde_json::to_value(summary)?)
}

pub fn handle_stats(_params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    Ok(ctx.forum.stats()?.into_value())
}

/// Registers a fresh identity; later calls may pass it as `user_id`.
pub fn handle_new_id(_params: &Value, ctx: &ToolContext) -> ForumResult<Value> {
    let fresh = UserIdentity::generate();
    let user = ctx.forum.whoami(Some(fresh.as_str()))?;
    let created_at = ctx.forum.identity_record(&user).map(|r| r.created_at);
    Ok(json!({
        "user_id": user.as_str(),
        "display_name": user.display_name(),
        "created_at": created_at,
    }))
}
