use std::time::Duration;

// === Transport ===
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

// === Feed guard ===
pub const REPLY_PREVIEW_CHARS: usize = 50;
pub const CANDIDATE_PREVIEW_CHARS: usize = 30;
pub const ELLIPSIS: &str = "...";
/// Accepted post identifier fields, in lookup order.
pub const POST_ID_FIELDS: &[&str] = &["id", "request_id"];
/// Accepted post author fields, in lookup order.
pub const PUBLISHER_FIELDS: &[&str] = &["user_id", "publisher_user_id"];

// === Identity ===
pub const SHORT_ID_CHARS: usize = 8;
pub const DISPLAY_NAME_PREFIX: &str = "user_";
pub const UNKNOWN_USER: &str = "unknown user";

// === Files & environment ===
pub const IDENTITY_FILE: &str = "identity.json";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "forum-client.log";
pub const ENV_DATA_DIR: &str = "FORUM_CLIENT_DATA_DIR";
pub const ENV_BASE_URL: &str = "FORUM_BASE_URL";
pub const ENV_IDENTITY_POLICY: &str = "FORUM_IDENTITY_POLICY";

/// First `max_chars` Unicode scalar values of `s`, never splitting a char.
pub fn truncate_safe(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_safe_multibyte() {
        assert_eq!(truncate_safe("héllo", 2), "hé");
        assert_eq!(truncate_safe("需要帮助", 3), "需要帮");
        assert_eq!(truncate_safe("abc", 10), "abc");
        assert_eq!(truncate_safe("", 5), "");
    }
}
