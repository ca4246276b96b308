pub mod rss;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The fields that decide whether two items are the same post.
pub(crate) trait FeedContent {
    fn title(&self) -> &str;
    fn url(&self) -> &str;
    fn description(&self) -> &str;

    /// Fingerprint of title, description and url; equal content means an
    /// equal hash no matter who wrote it or when.
    fn calc_hash(&self) -> String {
        content_hash(self.title(), self.description(), self.url())
    }

    fn is_valid(&self) -> bool {
        !self.title().is_empty() && !self.url().is_empty() && !self.description().is_empty()
    }
}

pub(crate) fn content_hash(title: &str, description: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{title}|{description}|{url}").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// An item as submitted by a client. It carries no server-assigned fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedDraft {
    pub title: String,
    pub url: String,
    #[serde(alias = "desc")]
    pub description: String,
    pub author: String,
}

impl FeedDraft {
    pub(crate) fn into_feed(self, id: u64, channel: &str, created_at: DateTime<Utc>) -> Feed {
        let hash = self.calc_hash();
        Feed {
            title: self.title,
            url: self.url,
            created_at,
            description: self.description,
            author: self.author,
            hash,
            channel: channel.to_string(),
            id,
        }
    }
}

impl FeedContent for FeedDraft {
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn description(&self) -> &str {
        &self.description
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub url: String,
    #[serde(alias = "create_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "desc")]
    pub description: String,
    #[serde(default)]
    pub author: String,
    pub hash: String,
    pub channel: String,
    pub id: u64,
}

impl Feed {
    pub(crate) fn to_syndication_item(&self) -> ::rss::Item {
        rss::item(self)
    }
}

impl FeedContent for Feed {
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn description(&self) -> &str {
        &self.description
    }
}
