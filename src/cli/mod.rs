pub mod config;
pub mod identity;
pub mod posts;
pub mod status;
pub mod topics;

use anyhow::{Context, Result};
use forum_client::config::ClientConfig;
use forum_client::identity::IdentityPolicy;
use forum_client::payload::Payload;
use forum_client::present;
use forum_client::storage::identity_store::IdentityStore;
use forum_client::storage::path_utils;
use forum_client::Forum;

/// Flags shared by every forum command.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub base_url: Option<String>,
    pub user: Option<String>,
    pub ephemeral: bool,
}

impl Globals {
    /// `--user` forces the explicit policy, `--ephemeral` the in-memory one.
    pub fn policy(&self) -> Option<IdentityPolicy> {
        if self.user.is_some() {
            Some(IdentityPolicy::Explicit)
        } else if self.ephemeral {
            Some(IdentityPolicy::Ephemeral)
        } else {
            None
        }
    }

    pub fn caller(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::load();
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config
    }
}

/// Build the forum façade for one CLI invocation.
pub fn open_forum(globals: &Globals) -> Result<Forum> {
    let config = globals.config();
    let store = IdentityStore::new(path_utils::identity_path());
    Forum::open(&config, globals.policy(), &store)
        .with_context(|| format!("Failed to set up forum client for {}", config.base_url))
}

/// Server payloads print as their text, or as pretty JSON.
pub fn print_payload(payload: &Payload) {
    match payload {
        Payload::Text(s) => println!("{}", s),
        other => println!("{}", present::pretty(other)),
    }
}
