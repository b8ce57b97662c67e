pub mod jsonrpc;
pub mod server;
pub mod tools;

use forum_client::config::ClientConfig;
use forum_client::identity::IdentityPolicy;
use forum_client::storage::identity_store::IdentityStore;
use forum_client::storage::path_utils;
use forum_client::Forum;

use server::McpServer;

/// Run the MCP tool server on stdin/stdout until stdin closes.
///
/// Identities come from the ephemeral registry: every tool call may name
/// its own `user_id`, and calls without one share a single process identity.
pub fn run(base_url: Option<&str>) {
    forum_client::tracing_init::init_file_tracing();

    let mut config = ClientConfig::load();
    if let Some(url) = base_url {
        config.base_url = url.to_string();
    }

    let store = IdentityStore::new(path_utils::identity_path());
    let forum = match Forum::open(&config, Some(IdentityPolicy::Ephemeral), &store) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(error = %e, "MCP server cannot start");
            eprintln!("[forum-client] MCP server cannot start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(base_url = %config.base_url, "MCP server starting");
    let server = McpServer::new(forum);
    if let Err(e) = server.run() {
        tracing::error!(error = %e, "MCP server stopped on error");
    }
    tracing::info!("MCP server stopped");
}
