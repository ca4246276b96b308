use std::path::Path;
use std::sync::Arc;

use bucketdb::Database;
use chrono::Utc;

use crate::channel::{Channel, ChannelStore};
use crate::error::{Result, StoreError};
use crate::feed::{Feed, FeedContent, FeedDraft};
use crate::idgen::IdGenerator;

/// Everything a client can ask of the feed store.
///
/// Cloning shares the same database and id generator. The generator stops
/// once the last clone is dropped.
#[derive(Clone)]
pub(crate) struct Store {
    channels: ChannelStore,
    ids: Arc<IdGenerator>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::open(path)?;
        Self::with_database(db)
    }

    pub fn with_database(db: Database) -> Result<Self> {
        let ids = IdGenerator::start(db.clone())?;
        Ok(Self {
            channels: ChannelStore::new(db),
            ids: Arc::new(ids),
        })
    }

    pub fn create_channel(&self, name: &str) -> Result<Channel> {
        self.channels.create(name)
    }

    pub fn list_channels(&self) -> Result<Vec<Channel>> {
        self.channels.list_all()
    }

    fn require_channel(&self, name: &str) -> Result<Channel> {
        self.channels
            .lookup(name)?
            .ok_or_else(|| StoreError::NotFound(format!("channel {name}")))
    }

    /// Validate, dedup, stamp and store a new item.
    ///
    /// The cheap hash lookup runs before an id is drawn so that obvious
    /// duplicates do not burn ids. `add_feed` repeats the check inside its
    /// own transaction for posts that race past this one.
    pub fn post_feed(&self, channel_name: &str, draft: FeedDraft) -> Result<Feed> {
        let channel = self.require_channel(channel_name)?;
        if !draft.is_valid() {
            return Err(StoreError::InvalidInput(
                "a feed needs a title, url and description".to_string(),
            ));
        }
        if self.channels.has_feed(&channel, &draft)? {
            return Err(StoreError::AlreadyExists("feed".to_string()));
        }

        let id = self.ids.next_id()?;
        let feed = draft.into_feed(id, &channel.name, Utc::now());
        self.channels.add_feed(&channel, &feed)?;
        Ok(feed)
    }

    pub fn list_feeds(&self, channel_name: &str, offset: usize, limit: usize) -> Result<Vec<Feed>> {
        let channel = self.require_channel(channel_name)?;
        self.channels.get_feeds(&channel, offset, limit)
    }

    /// The newest `limit` items of a channel as an RSS document.
    pub fn render_rss(&self, channel_name: &str, limit: usize) -> Result<String> {
        let feeds = self.list_feeds(channel_name, 0, limit)?;
        Ok(crate::feed::rss::render_channel(channel_name, &feeds))
    }

    /// Remove one item by id and return what was removed.
    pub fn remove_feed(&self, channel_name: &str, id: u64) -> Result<Feed> {
        let channel = self.require_channel(channel_name)?;
        let feed = self
            .channels
            .get_feed(&channel, id)?
            .ok_or_else(|| StoreError::NotFound(format!("feed {id}")))?;
        self.channels.remove_feed(&channel, &feed)?;
        Ok(feed)
    }
}
