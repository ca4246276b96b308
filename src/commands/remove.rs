use anyhow::Context;

use crate::store::Store;

pub(crate) fn cmd_remove(store: &Store, channel: &str, id: u64) -> anyhow::Result<()> {
    let removed = store
        .remove_feed(channel, id)
        .with_context(|| format!("failed to remove item {id} from {channel}"))?;
    println!("Removed {} ({})", removed.id, removed.title);
    Ok(())
}
