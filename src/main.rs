mod cli;
mod mcp;

use clap::{Parser, Subcommand};

use cli::Globals;

#[derive(Parser)]
#[command(name = "forum-client", version, about = "Forum client: topics, posts and replies from the terminal")]
struct App {
    /// Forum server URL (overrides config and FORUM_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Act as this user id (explicit identity policy)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Use a throwaway identity for this run
    #[arg(long, global = true, conflicts_with = "user")]
    ephemeral: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity commands act as
    Whoami,
    /// Generate a fresh user id
    NewId,
    /// List all topics
    Topics,
    /// Join a topic
    Subscribe { topic: String },
    /// Leave a topic
    Unsubscribe { topic: String },
    /// Publish a post into a topic
    Post {
        topic: String,
        content: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Reply to a post in your feed
    Reply { post_id: String, content: String },
    /// Check whether a post can be replied to
    Check { post_id: String },
    /// List posts you can reply to
    Candidates,
    /// List posts you published
    MyPosts,
    /// List replies to your posts
    Inbox,
    /// List posts from topics you follow
    Feed,
    /// List topics you follow
    Subscriptions,
    /// Profile summary
    Info {
        /// Also print the raw server payloads
        #[arg(long)]
        raw: bool,
    },
    /// Forum-wide statistics
    Stats,
    /// Test the connection to the forum server
    Ping,
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run MCP server (JSON-RPC on stdin/stdout)
    Mcp,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the effective configuration
    Show,
    /// Get a config value
    Get {
        /// Config key (base_url, timeout_secs, max_attempts, retry_backoff_ms, identity_policy)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Value (JSON: 42, "string", or a bare string)
        value: String,
    },
}

fn main() {
    let app = App::parse();
    let globals = Globals {
        base_url: app.base_url,
        user: app.user,
        ephemeral: app.ephemeral,
    };

    // MCP: stdout is the protocol channel, logs go to a file
    if let Commands::Mcp = app.command {
        mcp::run(globals.base_url.as_deref());
        return;
    }

    forum_client::tracing_init::init_stderr_tracing();

    let result = match app.command {
        Commands::Whoami => cli::identity::whoami(&globals),
        Commands::NewId => cli::identity::new_id(),
        Commands::Topics => cli::topics::list(&globals),
        Commands::Subscribe { topic } => cli::topics::subscribe(&globals, &topic),
        Commands::Unsubscribe { topic } => cli::topics::unsubscribe(&globals, &topic),
        Commands::Post { topic, content, title } => {
            cli::posts::publish(&globals, &topic, &content, title.as_deref())
        }
        Commands::Reply { post_id, content } => cli::posts::reply(&globals, &post_id, &content),
        Commands::Check { post_id } => cli::posts::check(&globals, &post_id),
        Commands::Candidates => cli::posts::candidates(&globals),
        Commands::MyPosts => cli::posts::my_posts(&globals),
        Commands::Inbox => cli::posts::inbox(&globals),
        Commands::Feed => cli::posts::feed(&globals),
        Commands::Subscriptions => cli::topics::subscriptions(&globals),
        Commands::Info { raw } => cli::status::info(&globals, raw),
        Commands::Stats => cli::status::stats(&globals),
        Commands::Ping => cli::status::ping(&globals),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::run_show(),
            ConfigAction::Get { key } => cli::config::run_get(&key),
            ConfigAction::Set { key, value } => cli::config::run_set(&key, &value),
        },
        Commands::Mcp => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
