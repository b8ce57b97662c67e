use anyhow::{Context, Result};
use forum_client::present;

use super::{open_forum, print_payload, Globals};

/// `info`: profile summary built from four reads.
/// `raw` also prints the payloads the counts came from.
pub fn info(globals: &Globals, raw: bool) -> Result<()> {
    let forum = open_forum(globals)?;
    let summary = forum
        .user_summary(globals.caller())
        .context("Failed to load user info")?;

    println!("Forum Profile");
    println!("=============");
    println!("User ID:       {}", summary.user_id);
    println!("Display name:  {}", summary.display_name);
    println!();
    println!("Topics joined: {:>5}", summary.subscription_count);
    println!("Posts:         {:>5}", summary.published_post_count);
    println!("Feed posts:    {:>5}", summary.feed_post_count);
    println!("Replies:       {:>5}", summary.received_reply_count);
    let topics = summary.topic_names();
    if !topics.is_empty() {
        println!();
        println!("Subscribed: {}", topics.join(", "));
    }
    if raw {
        println!();
        println!("{}", present::pretty(&summary.sources));
    }
    Ok(())
}

pub fn stats(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let stats = forum.stats().context("Failed to load stats")?;
    print_payload(&stats);
    Ok(())
}

/// `ping`: connection check.
pub fn ping(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let base_url = forum.client().transport().base_url().to_string();
    let stats = forum
        .ping()
        .with_context(|| format!("Cannot reach forum at {}", base_url))?;
    println!("Connected to {}", base_url);
    print_payload(&stats);
    Ok(())
}
