//! Recently viewed products.
//!
//! Most recent first, at most `RECENTLY_VIEWED_CAPACITY` entries. Viewing a
//! product again moves it back to the front. The cookie is always `Secure`.

use std::sync::Arc;
use std::time::Duration;

use lunette_core::{ListKind, RecentlyViewedProduct};

use super::{CookieJar, CookieListConfig, CookieListStore, ListOrdering, RECENTLY_VIEWED_COOKIE};

/// Default number of recently viewed products kept.
pub const DEFAULT_CAPACITY: usize = 8;

/// Recently viewed cookie lifetime (30 days).
pub const RECENTLY_VIEWED_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Cookie-backed recently viewed list.
pub type RecentlyViewedList = CookieListStore<RecentlyViewedProduct>;

/// Cookie configuration for the recently viewed list.
#[must_use]
pub const fn config(capacity: usize) -> CookieListConfig {
    CookieListConfig {
        name: RECENTLY_VIEWED_COOKIE,
        kind: ListKind::RecentlyViewed,
        capacity: Some(capacity),
        ordering: ListOrdering::MostRecentFirst,
        max_age: RECENTLY_VIEWED_MAX_AGE,
        secure: true,
    }
}

/// Recently viewed list over `jar`.
#[must_use]
pub fn recently_viewed_list(jar: Arc<dyn CookieJar>, capacity: usize) -> RecentlyViewedList {
    CookieListStore::new(jar, config(capacity))
}
