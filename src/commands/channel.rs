use anyhow::ensure;

use crate::store::Store;

pub(crate) fn cmd_channel_add(store: &Store, name: &str) -> anyhow::Result<()> {
    let channel = store.create_channel(name)?;
    println!("Created channel {}", channel.name);
    Ok(())
}

pub(crate) fn cmd_channel_ls(store: &Store) -> anyhow::Result<()> {
    let channels = store.list_channels()?;
    ensure!(!channels.is_empty(), "No channels yet");
    for channel in channels {
        println!("{}", channel.name);
    }
    Ok(())
}
