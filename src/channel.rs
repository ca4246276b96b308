use bucketdb::Database;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::feed::{Feed, FeedContent};
use crate::keys;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
}

/// Channel records plus the items stored under each channel.
///
/// Every method runs in its own read-write transaction, reads included.
#[derive(Clone)]
pub(crate) struct ChannelStore {
    db: Database,
}

impl ChannelStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) fn create(&self, name: &str) -> Result<Channel> {
        if name.is_empty() {
            return Err(StoreError::InvalidInput(
                "channel name must not be empty".to_string(),
            ));
        }
        let channel = Channel {
            name: name.to_string(),
        };
        let key = keys::channel_key(name);
        let record = serde_json::to_vec(&channel)?;

        self.db.update(|tx| -> Result<()> {
            let mut channels = tx.bucket(keys::CHANNELS_BUCKET)?;
            if channels.contains(&key)? {
                return Err(StoreError::AlreadyExists(format!("channel {name}")));
            }
            channels.put(&key, &record)?;
            Ok(())
        })?;

        info!(channel = name, "created channel");
        Ok(channel)
    }

    /// `Ok(None)` when no channel has that name.
    pub(crate) fn lookup(&self, name: &str) -> Result<Option<Channel>> {
        let key = keys::channel_key(name);
        self.db.update(|tx| -> Result<Option<Channel>> {
            let channels = tx.bucket(keys::CHANNELS_BUCKET)?;
            match channels.get(&key)? {
                Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
                None => Ok(None),
            }
        })
    }

    /// All channels in name order.
    pub(crate) fn list_all(&self) -> Result<Vec<Channel>> {
        self.db.update(|tx| -> Result<Vec<Channel>> {
            let channels = tx.bucket(keys::CHANNELS_BUCKET)?;
            let mut out = Vec::new();
            for entry in channels.scan_prefix(keys::CHANNEL_PREFIX.as_bytes())? {
                let (_, raw) = entry?;
                out.push(serde_json::from_slice(&raw)?);
            }
            Ok(out)
        })
    }

    /// Store `feed` together with its hash index entry.
    ///
    /// The hash is checked again inside the write transaction, so of two
    /// racing posts with the same content only the first one lands.
    pub(crate) fn add_feed(&self, channel: &Channel, feed: &Feed) -> Result<()> {
        let bucket = keys::channel_bucket(&channel.name);
        let id_key = keys::item_id_key(feed.id);
        let hash_key = keys::item_hash_key(&feed.calc_hash());
        let record = serde_json::to_vec(feed)?;

        self.db.update(|tx| -> Result<()> {
            let mut items = tx.bucket(&bucket)?;
            if items.contains(&hash_key)? {
                return Err(StoreError::AlreadyExists("feed".to_string()));
            }
            items.put(&id_key, &record)?;
            items.put(&hash_key, feed.id.to_string().as_bytes())?;
            Ok(())
        })?;

        debug!(channel = %channel.name, id = feed.id, "stored feed");
        Ok(())
    }

    /// Whether an item with the same content hash is already in `channel`.
    pub(crate) fn has_feed(&self, channel: &Channel, feed: &impl FeedContent) -> Result<bool> {
        let bucket = keys::channel_bucket(&channel.name);
        let hash_key = keys::item_hash_key(&feed.calc_hash());
        self.db
            .update(|tx| -> Result<bool> { Ok(tx.bucket(&bucket)?.contains(&hash_key)?) })
    }

    /// Delete the item and its hash entry. Missing keys are fine.
    pub(crate) fn remove_feed(&self, channel: &Channel, feed: &Feed) -> Result<()> {
        let bucket = keys::channel_bucket(&channel.name);
        let id_key = keys::item_id_key(feed.id);
        let hash_key = keys::item_hash_key(&feed.calc_hash());

        self.db.update(|tx| -> Result<()> {
            let mut items = tx.bucket(&bucket)?;
            items.delete(&id_key)?;
            items.delete(&hash_key)?;
            Ok(())
        })?;

        debug!(channel = %channel.name, id = feed.id, "removed feed");
        Ok(())
    }

    /// Point read of one item.
    pub(crate) fn get_feed(&self, channel: &Channel, id: u64) -> Result<Option<Feed>> {
        let bucket = keys::channel_bucket(&channel.name);
        let id_key = keys::item_id_key(id);
        self.db.update(|tx| -> Result<Option<Feed>> {
            match tx.bucket(&bucket)?.get(&id_key)? {
                Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
                None => Ok(None),
            }
        })
    }

    /// Items of `channel`, newest first, skipping `offset` and returning at
    /// most `limit`.
    pub(crate) fn get_feeds(
        &self,
        channel: &Channel,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Feed>> {
        let bucket = keys::channel_bucket(&channel.name);
        self.db.update(|tx| -> Result<Vec<Feed>> {
            let items = tx.bucket(&bucket)?;
            let mut feeds = Vec::new();
            for entry in items
                .scan_prefix(keys::ITEM_ID_PREFIX)?
                .skip(offset)
                .take(limit)
            {
                let (_, raw) = entry?;
                feeds.push(serde_json::from_slice(&raw)?);
            }
            Ok(feeds)
        })
    }
}
