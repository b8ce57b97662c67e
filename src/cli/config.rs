use anyhow::{Context, Result};
use forum_client::config::ClientConfig;
use forum_client::storage::path_utils;

/// `config show`: effective configuration (file, env overrides, defaults).
pub fn run_show() -> Result<()> {
    let config = ClientConfig::load();
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("\n# file: {}", path_utils::config_path().display());
    Ok(())
}

/// `config get <key>`: display a single config value.
pub fn run_get(key: &str) -> Result<()> {
    let config = ClientConfig::load();
    let value = config.get(key)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// `config set <key> <value>`: set a value in `{data_dir}/config.json`.
///
/// Value is parsed as JSON (number, string), falling back to a plain string.
/// Environment overrides are not written back to the file.
pub fn run_set(key: &str, value: &str) -> Result<()> {
    let path = path_utils::config_path();
    let mut config = ClientConfig::load_from(&path);
    let parsed = config.set(key, value)?;
    config
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} = {}", key, serde_json::to_string(&parsed)?);
    Ok(())
}
