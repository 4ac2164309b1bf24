//! Cookie inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # Decode a compare cookie value copied from the browser
//! lunette-cli cookie decode --kind compare '%5B%22prod_1%22%5D'
//!
//! # Decode a recently viewed cookie value
//! lunette-cli cookie decode --kind recently-viewed '%5B%7B%22id%22...'
//! ```

use lunette_core::{ListItem, ProductId, RecentlyViewedProduct, dedup_truncate};
use lunette_storefront::config::ListConfig;
use lunette_storefront::cookies::{COMPARE_COOKIE, DecodeError, RECENTLY_VIEWED_COOKIE, decode_list};

/// Which list cookie a value belongs to.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CookieKind {
    /// `_medusa_compare_ids`
    Compare,
    /// `_medusa_recently_viewed_products`
    RecentlyViewed,
}

/// Decode a list cookie value and log its entries.
///
/// Reports how many entries the storefront would actually keep after
/// dropping duplicates and applying `capacity` (the storefront default when
/// not given).
///
/// # Errors
///
/// Returns an error if the value is not a valid list cookie.
pub fn decode(kind: CookieKind, value: &str, capacity: Option<usize>) -> Result<(), DecodeError> {
    let defaults = ListConfig::default();

    match kind {
        CookieKind::Compare => report::<ProductId>(
            COMPARE_COOKIE,
            value,
            capacity.unwrap_or(defaults.compare_capacity),
        ),
        CookieKind::RecentlyViewed => report::<RecentlyViewedProduct>(
            RECENTLY_VIEWED_COOKIE,
            value,
            capacity.unwrap_or(defaults.recently_viewed_capacity),
        ),
    }
}

fn report<T: ListItem + std::fmt::Debug>(
    name: &str,
    value: &str,
    capacity: usize,
) -> Result<(), DecodeError> {
    let raw: Vec<T> = decode_list(value)?;
    let raw_count = raw.len();
    let kept = dedup_truncate(raw, Some(capacity));

    tracing::info!(cookie = name, stored = raw_count, kept = kept.len(), "Decoded list cookie");
    for (position, item) in kept.iter().enumerate() {
        tracing::info!(position, key = item.key(), "{item:?}");
    }

    Ok(())
}
