use rss::{Channel, Guid, Item};

use super::Feed;

pub fn item(feed: &Feed) -> Item {
    let mut guid = Guid::default();
    guid.set_value(feed.id.to_string());
    guid.set_permalink(false);

    let mut item = Item::default();
    item.set_title(feed.title.clone());
    item.set_link(feed.url.clone());
    item.set_description(feed.description.clone());
    if !feed.author.is_empty() {
        item.set_author(feed.author.clone());
    }
    item.set_pub_date(feed.created_at.to_rfc2822());
    item.set_guid(guid);
    item
}

/// Render a channel and its items as an RSS 2.0 document. Items keep the
/// order they are given in.
pub fn render_channel(name: &str, feeds: &[Feed]) -> String {
    let mut channel = Channel::default();
    channel.set_title(name);
    channel.set_link("");
    channel.set_description(format!("Items posted to {name}"));
    channel.set_items(feeds.iter().map(Feed::to_syndication_item).collect::<Vec<_>>());
    channel.to_string()
}
