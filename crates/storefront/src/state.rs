//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::cookies::{CompareList, CookieJar, RecentlyViewedList, compare, recently_viewed};
use crate::identity::IdentityResolver;
use crate::liked::{LikedCache, LikedProducts, liked_cache};
use crate::medusa::{MedusaClient, MedusaError};
use crate::notifier::ViewNotifier;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds process-wide resources only; the
/// list stores themselves are built per request around that request's
/// cookie jar.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    medusa: MedusaClient,
    liked_cache: LikedCache,
    notifier: ViewNotifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, MedusaError> {
        let medusa = MedusaClient::new(&config.medusa)?;
        let liked_cache = liked_cache(config.lists.liked_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                medusa,
                liked_cache,
                notifier: ViewNotifier::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn medusa(&self) -> &MedusaClient {
        &self.inner.medusa
    }

    /// Get a reference to the list change notifier.
    #[must_use]
    pub fn notifier(&self) -> &ViewNotifier {
        &self.inner.notifier
    }

    /// Compare list over `jar`.
    #[must_use]
    pub fn compare_list(&self, jar: Arc<dyn CookieJar>) -> CompareList {
        let config = self.config();
        compare::compare_list(
            jar,
            config.lists.compare_capacity,
            config.secure_cookies(),
            self.notifier().clone(),
        )
    }

    /// Recently viewed list over `jar`.
    #[must_use]
    pub fn recently_viewed(&self, jar: Arc<dyn CookieJar>) -> RecentlyViewedList {
        recently_viewed::recently_viewed_list(jar, self.config().lists.recently_viewed_capacity)
    }

    /// Identity resolver over `jar`.
    #[must_use]
    pub fn identity_resolver(&self, jar: Arc<dyn CookieJar>) -> IdentityResolver {
        IdentityResolver::new(
            jar,
            Arc::new(self.medusa().clone()),
            self.config().secure_cookies(),
        )
    }

    /// Liked products of the shopper behind `jar`.
    #[must_use]
    pub fn liked_products(&self, jar: Arc<dyn CookieJar>) -> LikedProducts {
        LikedProducts::new(
            self.identity_resolver(jar),
            Arc::new(self.medusa().clone()),
            self.inner.liked_cache.clone(),
            self.notifier().clone(),
        )
    }
}
