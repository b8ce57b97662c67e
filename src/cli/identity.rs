use anyhow::Result;
use forum_client::identity::UserIdentity;
use forum_client::time_utils;

use super::{open_forum, Globals};

/// `whoami`: the identity commands act as.
pub fn whoami(globals: &Globals) -> Result<()> {
    let forum = open_forum(globals)?;
    let user = forum.whoami(globals.caller())?;
    println!("User ID:      {}", user);
    println!("Display name: {}", user.display_name());
    println!("Policy:       {}", forum.policy().as_str());
    if let Some(record) = forum.identity_record(&user) {
        let created = time_utils::parse_rfc3339(&record.created_at)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or(record.created_at);
        println!("Created:      {}", created);
    }
    Ok(())
}

/// `new-id`: print a fresh identity. Nothing is stored.
pub fn new_id() -> Result<()> {
    let user = UserIdentity::generate();
    println!("{}", user);
    eprintln!("Display name: {} (use it with --user)", user.display_name());
    Ok(())
}
