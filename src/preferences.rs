//! Locally persisted agent preferences.
//!
//! Two bounded, most-recent-first lists stored as JSON arrays:
//!
//! - `recentEmojis`: emojis picked in the composer
//! - `savedStickers`: favorite stickers, identified by the SHA-256 of their
//!   content because sticker URLs may be re-issued with different content

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::models::CatalogSticker;
use crate::traits::{KeyValueStore, MediaFetcher};

pub const RECENT_EMOJIS_KEY: &str = "recentEmojis";
pub const MAX_RECENT_EMOJIS: usize = 30;
pub const SAVED_STICKERS_KEY: &str = "savedStickers";
pub const MAX_SAVED_STICKERS: usize = 100;

/// Largest sticker file accepted for upload.
pub const MAX_STICKER_BYTES: usize = 10 * 1024 * 1024;
const STICKER_MIMES: [&str; 3] = ["image/webp", "image/png", "image/jpeg"];
const STICKER_EXTENSIONS: [&str; 4] = ["webp", "png", "jpg", "jpeg"];

fn load_list<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(source) => {
            warn!(
                "{}",
                StorageError::Corrupt {
                    key: key.to_string(),
                    source
                }
            );
            Vec::new()
        }
    }
}

fn save_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    list: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(list).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Recently used emojis.
#[derive(Clone)]
pub struct RecentEmojis {
    store: Arc<dyn KeyValueStore>,
}

impl RecentEmojis {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        load_list(self.store.as_ref(), RECENT_EMOJIS_KEY)
    }

    /// Move `emoji` to the front, dropping the oldest past the bound.
    pub fn add(&self, emoji: &str) -> Result<Vec<String>, StorageError> {
        let mut recents = self.list();
        recents.retain(|e| e != emoji);
        recents.insert(0, emoji.to_string());
        recents.truncate(MAX_RECENT_EMOJIS);
        save_list(self.store.as_ref(), RECENT_EMOJIS_KEY, &recents)?;
        Ok(recents)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(RECENT_EMOJIS_KEY)
    }
}

/// A favorited sticker as persisted under `savedStickers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteSticker {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Lowercase hex SHA-256 of the sticker bytes.
    pub hash: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub added_at: i64,
}

/// Lowercase hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Favorite stickers keyed by content hash.
#[derive(Clone)]
pub struct FavoriteStickers {
    store: Arc<dyn KeyValueStore>,
}

impl FavoriteStickers {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Favorites, most recently added first.
    pub fn list(&self) -> Vec<FavoriteSticker> {
        load_list(self.store.as_ref(), SAVED_STICKERS_KEY)
    }

    async fn hash_of(fetcher: &dyn MediaFetcher, url: &str) -> Option<String> {
        match fetcher.fetch(url).await {
            Ok(data) => Some(content_hash(&data)),
            Err(e) => {
                warn!("Could not hash sticker {}: {}", url, e);
                None
            }
        }
    }

    /// Fetch and hash the sticker, then prepend it.
    ///
    /// Returns `false` without touching storage when the content cannot be
    /// fetched or a favorite with the same hash already exists.
    pub async fn add(
        &self,
        fetcher: &dyn MediaFetcher,
        url: &str,
        name: Option<&str>,
        now_ms: i64,
    ) -> Result<bool, StorageError> {
        let Some(hash) = Self::hash_of(fetcher, url).await else {
            return Ok(false);
        };
        let mut stickers = self.list();
        if stickers.iter().any(|s| s.hash == hash) {
            debug!("Sticker {} already saved", url);
            return Ok(false);
        }
        stickers.insert(
            0,
            FavoriteSticker {
                url: url.to_string(),
                name: name.map(str::to_string),
                hash,
                added_at: now_ms,
            },
        );
        stickers.truncate(MAX_SAVED_STICKERS);
        save_list(self.store.as_ref(), SAVED_STICKERS_KEY, &stickers)?;
        Ok(true)
    }

    pub fn remove(&self, url: &str) -> Result<(), StorageError> {
        let mut stickers = self.list();
        stickers.retain(|s| s.url != url);
        save_list(self.store.as_ref(), SAVED_STICKERS_KEY, &stickers)
    }

    /// Whether the content at `url` is a favorite. Compares by URL when the
    /// content cannot be fetched.
    pub async fn contains(&self, fetcher: &dyn MediaFetcher, url: &str) -> bool {
        let stickers = self.list();
        match Self::hash_of(fetcher, url).await {
            Some(hash) => stickers.iter().any(|s| s.hash == hash),
            None => stickers.iter().any(|s| s.url == url),
        }
    }

    /// Favorites among the server catalog, most recently favorited first.
    ///
    /// The catalog is deduplicated by URL before the (hash-based) lookup.
    pub async fn filter_catalog(
        &self,
        fetcher: &dyn MediaFetcher,
        catalog: Vec<CatalogSticker>,
    ) -> Vec<CatalogSticker> {
        let mut seen = HashSet::new();
        let mut favorites = Vec::new();
        for sticker in catalog {
            if !seen.insert(sticker.url.clone()) {
                continue;
            }
            if self.contains(fetcher, &sticker.url).await {
                favorites.push(sticker);
            }
        }

        let saved = self.list();
        let rank = |url: &str| {
            saved
                .iter()
                .position(|s| s.url == url)
                .unwrap_or(usize::MAX)
        };
        favorites.sort_by_key(|s| rank(&s.url));
        favorites
    }
}

/// Why a sticker file was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickerRejection {
    UnsupportedType,
    TooLarge,
}

impl StickerRejection {
    pub fn message(&self) -> &'static str {
        match self {
            StickerRejection::UnsupportedType => "Selecione .webp, .png ou .jpeg",
            StickerRejection::TooLarge => "Arquivo deve ter menos de 10MB",
        }
    }
}

/// Accepts webp, png and jpeg files (by MIME type or extension) up to
/// [`MAX_STICKER_BYTES`].
pub fn validate_sticker_upload(
    filename: &str,
    mime: Option<&str>,
    size: usize,
) -> Result<(), StickerRejection> {
    let by_mime = mime.map_or(false, |m| STICKER_MIMES.contains(&m));
    let by_extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .map_or(false, |ext| STICKER_EXTENSIONS.contains(&ext.as_str()));
    if !by_mime && !by_extension {
        return Err(StickerRejection::UnsupportedType);
    }
    if size > MAX_STICKER_BYTES {
        return Err(StickerRejection::TooLarge);
    }
    Ok(())
}

/// MIME type for a sticker file name.
pub fn sticker_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "image/webp",
    }
}
