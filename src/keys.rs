//! Bucket names and key encodings.
//!
//! | bucket           | key                          | value               |
//! |------------------|------------------------------|---------------------|
//! | `settings`       | `id`                         | decimal counter     |
//! | `channels`       | `channel:<name>`             | JSON channel        |
//! | `channel:<name>` | `item:id:<be i64 of -id>`    | JSON feed           |
//! | `channel:<name>` | `item:hash:<hex digest>`     | decimal feed id     |
//!
//! Item keys hold the negated id so a forward scan returns the newest
//! (highest id) item first.

pub(crate) const SETTINGS_BUCKET: &str = "settings";
pub(crate) const CHANNELS_BUCKET: &str = "channels";

pub(crate) const ID_KEY: &[u8] = b"id";

pub(crate) const CHANNEL_PREFIX: &str = "channel:";
pub(crate) const ITEM_ID_PREFIX: &[u8] = b"item:id:";
const ITEM_HASH_PREFIX: &[u8] = b"item:hash:";

/// Key of a channel record inside the `channels` bucket.
pub(crate) fn channel_key(name: &str) -> Vec<u8> {
    format!("{CHANNEL_PREFIX}{name}").into_bytes()
}

/// Name of the bucket holding a channel's items.
pub(crate) fn channel_bucket(name: &str) -> String {
    format!("{CHANNEL_PREFIX}{name}")
}

pub(crate) fn item_id_key(id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(ITEM_ID_PREFIX.len() + 8);
    key.extend_from_slice(ITEM_ID_PREFIX);
    key.extend_from_slice(&(id as i64).wrapping_neg().to_be_bytes());
    key
}

pub(crate) fn item_hash_key(hash: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(ITEM_HASH_PREFIX.len() + hash.len());
    key.extend_from_slice(ITEM_HASH_PREFIX);
    key.extend_from_slice(hash.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_keys_sort_newest_first() {
        let mut keys = vec![item_id_key(1001), item_id_key(1003), item_id_key(1002)];
        keys.sort();
        assert_eq!(
            keys,
            vec![item_id_key(1003), item_id_key(1002), item_id_key(1001)]
        );
    }

    #[test]
    fn test_item_key_layout() {
        let key = item_id_key(1001);
        assert!(key.starts_with(b"item:id:"));
        assert_eq!(&key[8..], &(-1001_i64).to_be_bytes());
    }

    #[test]
    fn test_hash_key_is_not_an_id_key() {
        let key = item_hash_key("abc123");
        assert_eq!(key, b"item:hash:abc123".to_vec());
        assert!(!key.starts_with(ITEM_ID_PREFIX));
    }

    #[test]
    fn test_channel_key_and_bucket() {
        assert_eq!(channel_key("news"), b"channel:news".to_vec());
        assert_eq!(channel_bucket("news"), "channel:news");
    }
}
