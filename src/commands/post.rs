use anyhow::Context;

use crate::feed::FeedDraft;
use crate::store::Store;

pub(crate) fn cmd_post(store: &Store, channel: &str, draft: FeedDraft) -> anyhow::Result<()> {
    let feed = store
        .post_feed(channel, draft)
        .with_context(|| format!("failed to post to {channel}"))?;
    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}
