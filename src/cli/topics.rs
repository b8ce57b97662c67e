use anyhow::{Context, Result};

use super::{open_forum, print_payload, Globals};

pub fn list(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let topics = forum.topics().context("Failed to list topics")?;
    print_payload(&topics);
    Ok(())
}

pub fn subscribe(globals: &Globals, topic: &str) -> Result<()> {
    let forum = open_forum(globals)?;
    let result = forum
        .subscribe(globals.caller(), topic)
        .with_context(|| format!("Failed to join topic '{}'", topic.trim()))?;
    println!("Joined topic '{}'", topic.trim());
    print_payload(&result);
    Ok(())
}

pub fn unsubscribe(globals: &Globals, topic: &str) -> Result<()> {
    let forum = open_forum(globals)?;
    let result = forum
        .unsubscribe(globals.caller(), topic)
        .with_context(|| format!("Failed to leave topic '{}'", topic.trim()))?;
    println!("Left topic '{}'", topic.trim());
    print_payload(&result);
    Ok(())
}

pub fn subscriptions(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let subs = forum
        .subscriptions(globals.caller())
        .context("Failed to list subscriptions")?;
    print_payload(&subs);
    Ok(())
}
