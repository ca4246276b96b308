use crate::store::Store;

pub(crate) fn cmd_rss(store: &Store, channel: &str, limit: usize) -> anyhow::Result<()> {
    let xml = store.render_rss(channel, limit)?;
    println!("{xml}");
    Ok(())
}
