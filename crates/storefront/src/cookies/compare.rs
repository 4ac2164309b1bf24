//! Product comparison list.
//!
//! Bare product ids in append order, bounded by `COMPARE_CAPACITY`.

use std::sync::Arc;
use std::time::Duration;

use lunette_core::{ListKind, ProductId};

use super::{COMPARE_COOKIE, CookieJar, CookieListConfig, CookieListStore, ListOrdering};
use crate::notifier::ViewNotifier;

/// Default number of products that can be compared at once.
pub const DEFAULT_CAPACITY: usize = 10;

/// Compare cookie lifetime (30 days).
pub const COMPARE_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Cookie-backed compare list.
pub type CompareList = CookieListStore<ProductId>;

/// Cookie configuration for the compare list.
#[must_use]
pub const fn config(capacity: usize, secure: bool) -> CookieListConfig {
    CookieListConfig {
        name: COMPARE_COOKIE,
        kind: ListKind::Compare,
        capacity: Some(capacity),
        ordering: ListOrdering::Append,
        max_age: COMPARE_MAX_AGE,
        secure,
    }
}

/// Compare list over `jar`, announcing changes on `notifier`.
#[must_use]
pub fn compare_list(
    jar: Arc<dyn CookieJar>,
    capacity: usize,
    secure: bool,
    notifier: ViewNotifier,
) -> CompareList {
    CookieListStore::new(jar, config(capacity, secure)).with_notifier(notifier)
}
