//! List change events.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Which list a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Product comparison list.
    Compare,
    /// Liked (wish) list.
    Liked,
    /// Recently viewed products.
    RecentlyViewed,
}

impl ListKind {
    /// Name of the event dispatched when this list changes.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Compare => "compareUpdated",
            Self::Liked => "likedUpdated",
            Self::RecentlyViewed => "recentlyViewedUpdated",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A list changed.
///
/// Cookie-backed lists know their new length at write time and report it in
/// `count`. Remote lists only learn that the server accepted a mutation, so
/// their events carry no count; consumers re-read the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEvent {
    /// List that changed.
    pub kind: ListKind,
    /// Number of entries after the change, when known.
    pub count: Option<usize>,
}

impl ListEvent {
    /// Event for a list whose new length is known.
    #[must_use]
    pub const fn with_count(kind: ListKind, count: usize) -> Self {
        Self {
            kind,
            count: Some(count),
        }
    }

    /// Event for a list that changed remotely.
    #[must_use]
    pub const fn changed(kind: ListKind) -> Self {
        Self { kind, count: None }
    }
}
