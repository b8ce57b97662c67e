use std::path::PathBuf;

use crate::constants::{CONFIG_FILE, ENV_DATA_DIR, IDENTITY_FILE, LOG_FILE};

/// Retourne le repertoire de donnees cross-platform.
/// Linux: ~/.config/forum-client/
/// macOS: ~/Library/Application Support/forum-client/
/// Windows: %APPDATA%/forum-client/
/// `FORUM_CLIENT_DATA_DIR` remplace le tout (tests, installations portables).
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("forum-client")
}

/// Identite persistante: {data_dir}/identity.json
pub fn identity_path() -> PathBuf {
    data_dir().join(IDENTITY_FILE)
}

/// Configuration client: {data_dir}/config.json
pub fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE)
}

/// Journal du serveur MCP: {data_dir}/forum-client.log
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE)
}
