//! List entries stored in compare, liked and recently-viewed lists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::ProductId;

/// An entry that can be stored in a deduplicated list.
///
/// Two entries with the same [`key`](ListItem::key) are the same entry; a
/// list never holds both.
pub trait ListItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identity of the entry within its list.
    fn key(&self) -> &str;
}

impl ListItem for ProductId {
    fn key(&self) -> &str {
        self.as_str()
    }
}

/// Lightweight product record kept in the recently-viewed list.
///
/// Carries just enough to render a thumbnail strip without another catalog
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyViewedProduct {
    /// Product ID.
    pub id: ProductId,
    /// URL handle of the product page.
    pub handle: String,
    /// Thumbnail URL, if the product has one.
    pub thumbnail: Option<String>,
    /// Product title.
    pub title: String,
}

impl ListItem for RecentlyViewedProduct {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// Remove duplicate entries (keeping the first occurrence) and truncate.
///
/// Order of the surviving entries is preserved. `capacity` of `None` means
/// the list is unbounded.
#[must_use]
pub fn dedup_truncate<T: ListItem>(items: Vec<T>, capacity: Option<usize>) -> Vec<T> {
    let limit = capacity.unwrap_or(usize::MAX);
    let mut seen = HashSet::with_capacity(items.len());

    items
        .into_iter()
        .filter(|item| seen.insert(item.key().to_owned()))
        .take(limit)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<ProductId> {
        values.iter().copied().map(ProductId::from).collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let result = dedup_truncate(ids(&["a", "b", "a", "c", "b"]), None);
        assert_eq!(result, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_truncate_applies_after_dedup() {
        let result = dedup_truncate(ids(&["a", "a", "b", "c", "d"]), Some(3));
        assert_eq!(result, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_zero_capacity_empties_list() {
        assert!(dedup_truncate(ids(&["a", "b"]), Some(0)).is_empty());
    }

    #[test]
    fn test_recently_viewed_json_shape() {
        let product = RecentlyViewedProduct {
            id: ProductId::new("prod_1"),
            handle: "aviator-gold".to_string(),
            thumbnail: None,
            title: "Aviator Gold".to_string(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "prod_1",
                "handle": "aviator-gold",
                "thumbnail": null,
                "title": "Aviator Gold"
            })
        );
    }
}
