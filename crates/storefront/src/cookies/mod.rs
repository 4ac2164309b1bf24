//! Cookie-persisted list state.
//!
//! # Architecture
//!
//! - [`CookieJar`] abstracts where cookies come from and go to. Handlers use
//!   a request-scoped jar built from the `Cookie` header; tests and the CLI
//!   use [`MemoryCookieJar`].
//! - [`CookieListStore`] keeps a bounded, deduplicated list in one cookie as
//!   percent-encoded JSON.
//! - [`compare`] and [`recently_viewed`] configure the two cookie-backed
//!   lists the storefront keeps.
//!
//! # Cookies
//!
//! | name | payload |
//! |------|---------|
//! | `_medusa_compare_ids` | `["prod_1","prod_2"]` |
//! | `_medusa_recently_viewed_products` | `[{"id","handle","thumbnail","title"}]` |
//! | `_medusa_guest_customer_id` | `guest_<millis>_<base36>` |
//! | `_medusa_jwt` | bearer token, set by the auth flow |

pub mod compare;
mod jar;
mod list;
pub mod recently_viewed;

pub use compare::CompareList;
pub use jar::{CookieJar, MAX_COOKIE_BYTES, MemoryCookieJar, RequestCookieJar};
pub use list::{
    AddOutcome, CookieListConfig, CookieListStore, DecodeError, ListOrdering, decode_list,
};
pub use recently_viewed::RecentlyViewedList;

use thiserror::Error;

/// Name of the auth token cookie set by the commerce backend's login flow.
pub const AUTH_TOKEN_COOKIE: &str = "_medusa_jwt";

/// Name of the compare list cookie.
pub const COMPARE_COOKIE: &str = "_medusa_compare_ids";

/// Name of the recently viewed list cookie.
pub const RECENTLY_VIEWED_COOKIE: &str = "_medusa_recently_viewed_products";

/// Name of the guest id cookie.
pub const GUEST_ID_COOKIE: &str = "_medusa_guest_customer_id";

/// Errors that can occur when storing a cookie.
#[derive(Debug, Error)]
pub enum CookieError {
    /// The serialized cookie exceeds what browsers accept.
    #[error("cookie {name} is {size} bytes, limit is {MAX_COOKIE_BYTES}")]
    TooLarge {
        /// Cookie name.
        name: String,
        /// Serialized size in bytes.
        size: usize,
    },

    /// The list could not be serialized.
    #[error("cookie {name} could not be encoded: {source}")]
    Encode {
        /// Cookie name.
        name: String,
        /// Underlying serializer error.
        source: serde_json::Error,
    },
}
