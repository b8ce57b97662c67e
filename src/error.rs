use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForumError {
    /// Network failure that survived every retry attempt.
    #[error("Transport error after {attempts} attempt(s): {cause}")]
    Transport { attempts: u32, cause: String },

    /// Server answered with a non-2xx status. Never retried.
    #[error("Remote error (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    /// Required argument missing or blank, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Reply target is not visible in the replier's feed.
    #[error("Post '{post_id}' is not in a topic you follow, or does not exist")]
    GuardRejection { post_id: String },

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForumError {
    /// True for failures that came back from the server or the network,
    /// as opposed to ones raised locally before any request was sent.
    pub fn is_remote_side(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Remote { .. })
    }
}

pub type ForumResult<T> = Result<T, ForumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejection_names_post() {
        let e = ForumError::GuardRejection { post_id: "p-42".into() };
        assert!(e.to_string().contains("p-42"));
        assert!(!e.is_remote_side());
    }

    #[test]
    fn test_remote_side_classification() {
        assert!(ForumError::Remote { status: 404, body: "nope".into() }.is_remote_side());
        assert!(ForumError::Transport { attempts: 3, cause: "refused".into() }.is_remote_side());
        assert!(!ForumError::Validation("topic".into()).is_remote_side());
    }
}
