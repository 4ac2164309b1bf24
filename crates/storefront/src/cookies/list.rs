//! Bounded, deduplicated lists persisted in a single cookie.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use cookie::{Cookie, SameSite};
use lunette_core::{ListEvent, ListItem, ListKind, dedup_truncate};
use thiserror::Error;
use tracing::{debug, warn};

use super::{CookieError, CookieJar};
use crate::notifier::ViewNotifier;

/// How long a decoded cookie value may be reused without re-parsing.
const READ_CACHE_TTL: Duration = Duration::from_secs(1);

/// Where new entries go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrdering {
    /// Append new entries; adding an existing entry is a no-op.
    Append,
    /// Move (or insert) the entry to the front; the oldest entry falls off
    /// the end when the list is full.
    MostRecentFirst,
}

/// Cookie name, attributes and list policy for one cookie-backed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieListConfig {
    /// Cookie name.
    pub name: &'static str,
    /// Which list this is, for change events.
    pub kind: ListKind,
    /// Maximum number of entries; `None` is unbounded.
    pub capacity: Option<usize>,
    /// Insertion policy.
    pub ordering: ListOrdering,
    /// Cookie lifetime.
    pub max_age: Duration,
    /// Whether the cookie carries the `Secure` attribute.
    pub secure: bool,
}

impl CookieListConfig {
    fn build_cookie(&self, value: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);

        Cookie::build((self.name, value))
            .path("/")
            .max_age(cookie::time::Duration::seconds(max_age))
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .build()
    }
}

/// Result of [`CookieListStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// The entry was stored (or moved to the front).
    Added,
    /// The entry was already in an append-ordered list; nothing changed.
    AlreadyPresent,
    /// The append-ordered list is at capacity; nothing changed.
    Full,
}

/// Why a cookie payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid percent-encoding: {0}")]
    Percent(#[from] std::string::FromUtf8Error),
    #[error("invalid list JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a cookie value into a list.
///
/// The value is percent-decoded and parsed as a JSON array of `T`.
///
/// # Errors
///
/// Returns an error if the value is not valid percent-encoded UTF-8, or is
/// not a JSON array whose elements all parse as `T`.
pub fn decode_list<T: ListItem>(raw: &str) -> Result<Vec<T>, DecodeError> {
    let json = urlencoding::decode(raw)?;
    Ok(serde_json::from_str(&json)?)
}

struct CachedRead<T> {
    raw: String,
    read_at: Instant,
    items: Vec<T>,
}

/// A bounded, deduplicated list kept in one cookie.
///
/// Every write rewrites the whole cookie. Two writers sharing a jar in the
/// same tick overwrite each other; the last one wins.
pub struct CookieListStore<T: ListItem> {
    jar: Arc<dyn CookieJar>,
    config: CookieListConfig,
    notifier: Option<ViewNotifier>,
    cache: Mutex<Option<CachedRead<T>>>,
    _item: PhantomData<fn() -> T>,
}

impl<T: ListItem> CookieListStore<T> {
    /// Create a store over `jar`.
    #[must_use]
    pub fn new(jar: Arc<dyn CookieJar>, config: CookieListConfig) -> Self {
        Self {
            jar,
            config,
            notifier: None,
            cache: Mutex::new(None),
            _item: PhantomData,
        }
    }

    /// Publish a change event on every successful write.
    #[must_use]
    pub fn with_notifier(mut self, notifier: ViewNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// The list's configuration.
    #[must_use]
    pub const fn config(&self) -> &CookieListConfig {
        &self.config
    }

    /// Current entries.
    ///
    /// A missing or malformed cookie reads as an empty list; the next
    /// successful write repairs it.
    pub fn read(&self) -> Vec<T> {
        let Some(raw) = self.jar.get(self.config.name) else {
            return Vec::new();
        };

        if let Some(items) = self.cached(&raw) {
            return items;
        }

        let items = match decode_list::<T>(&raw) {
            Ok(items) => dedup_truncate(items, self.config.capacity),
            Err(e) => {
                warn!(cookie = self.config.name, error = %e, "Discarding malformed list cookie");
                Vec::new()
            }
        };

        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedRead {
            raw,
            read_at: Instant::now(),
            items: items.clone(),
        });

        items
    }

    fn cached(&self, raw: &str) -> Option<Vec<T>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.as_ref()?;

        if cached.raw == raw && cached.read_at.elapsed() < READ_CACHE_TTL {
            debug!(cookie = self.config.name, "List cookie cache hit");
            Some(cached.items.clone())
        } else {
            None
        }
    }

    fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Replace the stored list.
    ///
    /// Duplicates are dropped (first occurrence wins) and the list is cut to
    /// capacity before encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoded cookie is too large for browsers to
    /// keep. The stored list is left unchanged.
    pub fn write(&self, items: Vec<T>) -> Result<(), CookieError> {
        let items = dedup_truncate(items, self.config.capacity);

        let json = serde_json::to_string(&items).map_err(|source| CookieError::Encode {
            name: self.config.name.to_string(),
            source,
        })?;
        let cookie = self
            .config
            .build_cookie(urlencoding::encode(&json).into_owned());

        self.jar.set(cookie)?;
        self.invalidate();

        debug!(cookie = self.config.name, count = items.len(), "List cookie written");
        if let Some(notifier) = &self.notifier {
            notifier.publish(ListEvent::with_count(self.config.kind, items.len()));
        }

        Ok(())
    }

    /// Add an entry according to the list's ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting cookie cannot be stored.
    pub fn add(&self, item: T) -> Result<AddOutcome, CookieError> {
        let mut items = self.read();

        match self.config.ordering {
            ListOrdering::Append => {
                if items.iter().any(|existing| existing.key() == item.key()) {
                    return Ok(AddOutcome::AlreadyPresent);
                }
                if self.config.capacity.is_some_and(|cap| items.len() >= cap) {
                    return Ok(AddOutcome::Full);
                }
                items.push(item);
            }
            ListOrdering::MostRecentFirst => {
                items.retain(|existing| existing.key() != item.key());
                items.insert(0, item);
            }
        }

        self.write(items)?;
        Ok(AddOutcome::Added)
    }

    /// Remove the entry with the given key, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting cookie cannot be stored.
    pub fn remove(&self, key: &str) -> Result<(), CookieError> {
        let mut items = self.read();
        items.retain(|existing| existing.key() != key);
        self.write(items)
    }

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be stored.
    pub fn clear(&self) -> Result<(), CookieError> {
        self.write(Vec::new())
    }

    /// Whether an entry with the given key is stored.
    pub fn contains(&self, key: &str) -> bool {
        self.read().iter().any(|item| item.key() == key)
    }

    /// Number of stored entries.
    pub fn count(&self) -> usize {
        self.read().len()
    }
}
