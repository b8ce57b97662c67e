use anyhow::{Context, Result};
use forum_client::present::{self, RecordKind};

use super::{open_forum, print_payload, Globals};

pub fn publish(globals: &Globals, topic: &str, content: &str, title: Option<&str>) -> Result<()> {
    let forum = open_forum(globals)?;
    let result = forum
        .publish_post(globals.caller(), topic, content, title)
        .context("Failed to publish post")?;
    println!("Post published");
    print_payload(&result);
    Ok(())
}

pub fn reply(globals: &Globals, post_id: &str, content: &str) -> Result<()> {
    let forum = open_forum(globals)?;
    let receipt = forum
        .reply(globals.caller(), post_id, content)
        .context("Failed to publish reply")?;
    println!("Replying in topic '{}'", receipt.topic);
    println!("Preview: {}", receipt.preview);
    print_payload(&receipt.result);
    Ok(())
}

/// `check <post-id>`: dry run of the reply guard.
pub fn check(globals: &Globals, post_id: &str) -> Result<()> {
    let forum = open_forum(globals)?;
    let check = forum.check_reply(globals.caller(), post_id)?;
    if check.allowed {
        println!("Topic:   {}", check.topic);
        println!("Preview: {}", check.preview);
    } else {
        println!(
            "Post '{}' is not in a topic you follow, or does not exist",
            post_id.trim()
        );
    }
    Ok(())
}

/// `candidates`: posts in the feed that can be replied to.
pub fn candidates(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let posts = forum.reply_candidates(globals.caller())?;
    if posts.is_empty() {
        println!("No posts to reply to. Join a topic first.");
        return Ok(());
    }
    for post in &posts {
        println!("{:<12} {}", post.id, post.label());
    }
    println!("\nTotal: {} posts", posts.len());
    Ok(())
}

pub fn my_posts(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let posts = forum.my_posts(globals.caller()).context("Failed to list your posts")?;
    println!("{}", present::display(&posts, RecordKind::OwnPost, "You have not published any posts yet"));
    Ok(())
}

pub fn inbox(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let replies = forum.inbox(globals.caller()).context("Failed to list replies")?;
    println!("{}", present::display(&replies, RecordKind::Reply, "No replies received yet"));
    Ok(())
}

pub fn feed(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let feed = forum.feed(globals.caller()).context("Failed to load your feed")?;
    println!("{}", present::display(&feed, RecordKind::FeedPost, "Your feed is empty"));
    Ok(())
}
