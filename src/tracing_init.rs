//! Shared tracing initialization.
//!
//! CLI commands log to stderr. The MCP server owns stdout for the protocol,
//! so it appends to `{data_dir}/forum-client.log` instead.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::storage::path_utils;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing to stderr. `RUST_LOG` overrides the `info` default.
pub fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize tracing to `{data_dir}/forum-client.log` (append mode).
/// Falls back to stderr when the file cannot be opened.
pub fn init_file_tracing() {
    let log_path = path_utils::log_path();
    match open_log(&log_path) {
        Ok(log_file) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(log_file))
                .with_target(true)
                .with_ansi(false)
                .init();
        }
        Err(e) => {
            init_stderr_tracing();
            tracing::warn!(path = %log_path.display(), error = %e, "Cannot open log file, logging to stderr");
        }
    }
}

fn open_log(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_creates_dirs_and_appends() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("forum-client.log");
        writeln!(open_log(&path).unwrap(), "one").unwrap();
        writeln!(open_log(&path).unwrap(), "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
