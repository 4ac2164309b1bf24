//! Liked products, stored on the commerce backend.
//!
//! Unlike compare and recently-viewed, liked state has no cookie copy: the
//! backend is the only source of truth and every read goes through
//! [`LikedProducts::list_liked_ids`].
//!
//! # Failure policy
//!
//! Every failure (identity, transport, backend status, `success: false`) is
//! logged and reported to the caller as `false` or an empty list. A failed
//! like must never break the page that asked for it.
//!
//! Local state changes only after the backend confirms: the id cache is
//! invalidated and a `likedUpdated` event is published once the mutation
//! succeeded, never before. Overlapping mutations for the same product are
//! not sequenced; whichever response lands last decides what the next read
//! returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lunette_core::{Identity, LikedIdsResponse, ListEvent, ListKind, MutationResponse, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument, warn};

use crate::identity::IdentityResolver;
use crate::medusa::MedusaError;
use crate::notifier::ViewNotifier;

/// Owners tracked at once by the liked-id cache.
const MAX_CACHED_OWNERS: u64 = 10_000;

/// Cached liked-id lists, keyed by identity string.
///
/// Every owner has a version that confirmed mutations bump. A fetch only
/// fills the cache if the version it started under is still current, so a
/// read that was in flight during a mutation cannot put the older list back.
#[derive(Clone)]
pub struct LikedCache {
    ids: Cache<String, Arc<Vec<ProductId>>>,
    versions: Cache<String, Arc<AtomicU64>>,
}

/// Version of one owner's entry, taken before a fetch.
struct Snapshot {
    counter: Arc<AtomicU64>,
    seen: u64,
}

/// Build the shared liked-id cache.
#[must_use]
pub fn liked_cache(ttl: Duration) -> LikedCache {
    LikedCache {
        ids: Cache::builder()
            .max_capacity(MAX_CACHED_OWNERS)
            .time_to_live(ttl)
            .build(),
        versions: Cache::builder()
            .max_capacity(MAX_CACHED_OWNERS)
            .time_to_idle(ttl.saturating_mul(2))
            .build(),
    }
}

impl LikedCache {
    async fn counter(&self, owner: &str) -> Arc<AtomicU64> {
        self.versions
            .get_with(owner.to_string(), async { Arc::new(AtomicU64::new(0)) })
            .await
    }

    async fn get(&self, owner: &str) -> Option<Arc<Vec<ProductId>>> {
        self.ids.get(owner).await
    }

    async fn snapshot(&self, owner: &str) -> Snapshot {
        let counter = self.counter(owner).await;
        let seen = counter.load(Ordering::SeqCst);
        Snapshot { counter, seen }
    }

    async fn is_current(&self, owner: &str, snapshot: &Snapshot) -> bool {
        // An evicted and recreated counter is a different Arc
        let counter = self.counter(owner).await;
        Arc::ptr_eq(&counter, &snapshot.counter) && counter.load(Ordering::SeqCst) == snapshot.seen
    }

    /// Store `ids` unless `owner` was mutated since `snapshot` was taken.
    async fn fill(&self, owner: &str, ids: Vec<ProductId>, snapshot: &Snapshot) {
        if !self.is_current(owner, snapshot).await {
            debug!(owner, "Liked ids changed during fetch, not caching");
            return;
        }

        self.ids.insert(owner.to_string(), Arc::new(ids)).await;

        // A mutation may have landed between the check and the insert
        if !self.is_current(owner, snapshot).await {
            self.ids.invalidate(owner).await;
        }
    }

    /// Drop `owner`'s entry after a confirmed mutation.
    async fn invalidate(&self, owner: &str) {
        self.counter(owner).await.fetch_add(1, Ordering::SeqCst);
        self.ids.invalidate(owner).await;
    }
}

/// Backend operations on the liked set of one owner id.
#[async_trait]
pub trait LikedBackend: Send + Sync {
    /// Every liked product id of `owner`.
    async fn liked_ids(&self, owner: &str) -> Result<LikedIdsResponse, MedusaError>;

    /// Add `product_id` to `owner`'s liked set.
    async fn like(&self, owner: &str, product_id: &ProductId)
    -> Result<MutationResponse, MedusaError>;

    /// Remove `product_id` from `owner`'s liked set.
    async fn unlike(
        &self,
        owner: &str,
        product_id: &ProductId,
    ) -> Result<MutationResponse, MedusaError>;
}

/// Turn an application-level `success: false` into an error.
fn ensure_success(response: MutationResponse) -> Result<(), MedusaError> {
    if response.success {
        Ok(())
    } else {
        Err(MedusaError::Rejected(
            response
                .message
                .unwrap_or_else(|| "backend reported failure".to_string()),
        ))
    }
}

/// Which mutation to send.
#[derive(Debug, Clone, Copy)]
enum Mutation {
    Like,
    Unlike,
}

/// Liked products of the current shopper.
#[derive(Clone)]
pub struct LikedProducts {
    identity: IdentityResolver,
    backend: Arc<dyn LikedBackend>,
    cache: LikedCache,
    notifier: ViewNotifier,
}

impl LikedProducts {
    /// Create a liked-products store.
    #[must_use]
    pub fn new(
        identity: IdentityResolver,
        backend: Arc<dyn LikedBackend>,
        cache: LikedCache,
        notifier: ViewNotifier,
    ) -> Self {
        Self {
            identity,
            backend,
            cache,
            notifier,
        }
    }

    async fn resolve(&self) -> Option<Identity> {
        match self.identity.resolve().await {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "Could not resolve shopper identity");
                None
            }
        }
    }

    /// Like a product. Returns whether the backend confirmed it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_liked(&self, product_id: &ProductId) -> bool {
        self.mutate(Mutation::Like, product_id).await
    }

    /// Unlike a product. Returns whether the backend confirmed it.
    ///
    /// Confirmation is the `success` flag of the response body; a `200` with
    /// `success: false` is a failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_liked(&self, product_id: &ProductId) -> bool {
        self.mutate(Mutation::Unlike, product_id).await
    }

    async fn mutate(&self, mutation: Mutation, product_id: &ProductId) -> bool {
        let Some(identity) = self.resolve().await else {
            return false;
        };
        let owner = identity.as_str();

        let result = match mutation {
            Mutation::Like => self.backend.like(owner, product_id).await,
            Mutation::Unlike => self.backend.unlike(owner, product_id).await,
        }
        .and_then(ensure_success);

        match result {
            Ok(()) => {
                self.cache.invalidate(owner).await;
                self.notifier.publish(ListEvent::changed(ListKind::Liked));
                debug!(?mutation, owner, "Liked products updated");
                true
            }
            Err(e) => {
                warn!(?mutation, owner, error = %e, "Liked products update failed");
                false
            }
        }
    }

    /// Every liked product id of the current shopper.
    ///
    /// Empty if the identity cannot be resolved or the backend fails.
    #[instrument(skip(self))]
    pub async fn list_liked_ids(&self) -> Vec<ProductId> {
        let Some(identity) = self.resolve().await else {
            return Vec::new();
        };
        let owner = identity.as_str();

        if let Some(ids) = self.cache.get(owner).await {
            debug!(owner, "Cache hit for liked ids");
            return ids.as_ref().clone();
        }

        let snapshot = self.cache.snapshot(owner).await;
        match self.backend.liked_ids(owner).await {
            Ok(response) => {
                self.cache
                    .fill(owner, response.product_ids.clone(), &snapshot)
                    .await;
                response.product_ids
            }
            Err(e) => {
                warn!(owner, error = %e, "Failed to fetch liked ids");
                Vec::new()
            }
        }
    }

    /// Whether the current shopper likes `product_id`.
    pub async fn is_liked(&self, product_id: &ProductId) -> bool {
        self.list_liked_ids().await.contains(product_id)
    }
}
