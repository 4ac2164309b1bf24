//! Core types for Lunette.
//!
//! This module provides type-safe wrappers for the list-state domain.

pub mod event;
pub mod id;
pub mod identity;
pub mod list;
pub mod wire;

pub use event::{ListEvent, ListKind};
pub use id::*;
pub use identity::{GuestId, GuestIdError, Identity};
pub use list::{ListItem, RecentlyViewedProduct, dedup_truncate};
pub use wire::{CustomerEnvelope, CustomerSummary, LikedIdsResponse, MutationResponse};
