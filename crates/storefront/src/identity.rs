//! Shopper identity resolution.
//!
//! Remote list state is scoped by an id string. A shopper with a valid auth
//! token cookie is scoped by their customer id; everyone else gets a guest id
//! that is minted once and kept in a cookie for a year.
//!
//! Signing in switches the scope from the guest id to the customer id.
//! Nothing is merged: state stored under the guest id stays there.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use lunette_core::{CustomerSummary, GuestId, GuestIdError, Identity};
use rand::Rng;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cookies::{AUTH_TOKEN_COOKIE, CookieError, CookieJar, GUEST_ID_COOKIE};
use crate::medusa::MedusaError;

/// Guest id cookie lifetime (one year).
pub const GUEST_ID_MAX_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Looks up the customer an auth token belongs to.
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    /// The signed-in customer for `token`.
    async fn current_customer(&self, token: &SecretString)
    -> Result<CustomerSummary, MedusaError>;
}

/// Errors that can occur while resolving an identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The guest id cookie could not be stored.
    #[error("failed to persist guest id: {0}")]
    Persist(#[from] CookieError),

    /// A freshly generated guest id was rejected.
    #[error("invalid guest id: {0}")]
    InvalidGuestId(#[from] GuestIdError),
}

/// Generate a new guest id of the form `guest_<millis>_<base36>`.
///
/// # Errors
///
/// Returns an error if the generated suffix does not validate, which only
/// happens if [`GuestId::SUFFIX_LENGTH`] is misconfigured.
pub fn generate_guest_id(now: DateTime<Utc>, rng: &mut impl Rng) -> Result<GuestId, GuestIdError> {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let suffix: String = (0..GuestId::SUFFIX_LENGTH)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();

    GuestId::from_parts(millis, &suffix)
}

/// Resolves the identity remote list calls are scoped to.
#[derive(Clone)]
pub struct IdentityResolver {
    jar: Arc<dyn CookieJar>,
    customers: Arc<dyn CustomerLookup>,
    secure: bool,
}

impl IdentityResolver {
    /// Create a resolver reading cookies from `jar`.
    ///
    /// `secure` controls the `Secure` attribute of a newly minted guest
    /// cookie.
    #[must_use]
    pub fn new(jar: Arc<dyn CookieJar>, customers: Arc<dyn CustomerLookup>, secure: bool) -> Self {
        Self {
            jar,
            customers,
            secure,
        }
    }

    /// Resolve the current identity.
    ///
    /// A present auth token is checked against the backend; if the check
    /// fails (expired token, backend down) the shopper is treated as a
    /// guest.
    ///
    /// # Errors
    ///
    /// Returns an error if a guest id has to be minted and cannot be stored.
    pub async fn resolve(&self) -> Result<Identity, IdentityError> {
        if let Some(token) = self.jar.get(AUTH_TOKEN_COOKIE).filter(|t| !t.is_empty()) {
            match self
                .customers
                .current_customer(&SecretString::from(token))
                .await
            {
                Ok(customer) => {
                    debug!(customer_id = %customer.id, "Resolved signed-in customer");
                    return Ok(Identity::Customer(customer.id));
                }
                Err(e) => {
                    warn!(error = %e, "Auth token check failed, falling back to guest id");
                }
            }
        }

        Ok(Identity::Guest(self.guest_id()?))
    }

    /// The persisted guest id, minting and storing one if none exists.
    ///
    /// A cookie that does not parse as a [`GuestId`] is replaced. The
    /// accepted form is `guest_<digits>_<lowercase base36>` with a suffix of
    /// at most [`GuestId::MAX_SUFFIX_LENGTH`] characters. Widening it is safe;
    /// narrowing it moves existing guests to a fresh id and away from their
    /// liked set on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if a new guest id cannot be stored.
    pub fn guest_id(&self) -> Result<GuestId, IdentityError> {
        if let Some(raw) = self.jar.get(GUEST_ID_COOKIE) {
            match GuestId::parse(&raw) {
                Ok(id) => return Ok(id),
                Err(e) => warn!(error = %e, "Replacing malformed guest id cookie"),
            }
        }

        let id = generate_guest_id(Utc::now(), &mut rand::rng())?;
        self.jar.set(self.guest_cookie(&id))?;
        debug!(guest_id = %id, "Minted guest id");

        Ok(id)
    }

    fn guest_cookie(&self, id: &GuestId) -> Cookie<'static> {
        let max_age = i64::try_from(GUEST_ID_MAX_AGE.as_secs()).unwrap_or(i64::MAX);

        Cookie::build((GUEST_ID_COOKIE, id.to_string()))
            .path("/")
            .max_age(cookie::time::Duration::seconds(max_age))
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lunette_core::CustomerId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cookies::MemoryCookieJar;

    /// Customer lookup answering from a fixed token, counting calls.
    #[derive(Default)]
    struct FakeCustomers {
        valid_token: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CustomerLookup for FakeCustomers {
        async fn current_customer(
            &self,
            token: &SecretString,
        ) -> Result<CustomerSummary, MedusaError> {
            use secrecy::ExposeSecret;

            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.valid_token == Some(token.expose_secret()) {
                Ok(CustomerSummary {
                    id: CustomerId::new("cus_1"),
                    email: None,
                })
            } else {
                Err(MedusaError::Api {
                    status: 401,
                    message: "Unauthorized".to_string(),
                })
            }
        }
    }

    fn resolver(jar: Arc<MemoryCookieJar>, customers: Arc<FakeCustomers>) -> IdentityResolver {
        IdentityResolver::new(jar, customers, false)
    }

    #[test]
    fn test_generated_guest_id_format() {
        let now = DateTime::from_timestamp_millis(1_718_000_000_123).unwrap();
        let id = generate_guest_id(now, &mut StdRng::seed_from_u64(7)).unwrap();

        assert!(id.as_str().starts_with("guest_1718000000123_"));
        assert_eq!(id.created_at_millis(), 1_718_000_000_123);
        assert_eq!(
            id.as_str().len(),
            "guest_1718000000123_".len() + GuestId::SUFFIX_LENGTH
        );
        assert!(GuestId::parse(id.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_guest_id_minted_once_and_stable() {
        let jar = Arc::new(MemoryCookieJar::new());
        let resolver = resolver(jar.clone(), Arc::new(FakeCustomers::default()));

        let first = resolver.resolve().await.unwrap();
        let second = resolver.resolve().await.unwrap();

        assert!(first.is_guest());
        assert_eq!(first, second);
        assert_eq!(jar.get(GUEST_ID_COOKIE).as_deref(), Some(first.as_str()));
    }

    #[tokio::test]
    async fn test_guest_cookie_attributes() {
        let jar = Arc::new(MemoryCookieJar::new());
        resolver(jar.clone(), Arc::new(FakeCustomers::default()))
            .guest_id()
            .unwrap();

        let cookie = jar.cookie(GUEST_ID_COOKIE).unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::days(365)));
    }

    #[tokio::test]
    async fn test_valid_token_resolves_customer_without_guest_cookie() {
        let jar = Arc::new(MemoryCookieJar::with_values([(AUTH_TOKEN_COOKIE, "good")]));
        let customers = Arc::new(FakeCustomers {
            valid_token: Some("good"),
            ..FakeCustomers::default()
        });

        let identity = resolver(jar.clone(), customers).resolve().await.unwrap();

        assert_eq!(identity, Identity::Customer(CustomerId::new("cus_1")));
        assert_eq!(jar.get(GUEST_ID_COOKIE), None);
    }

    #[tokio::test]
    async fn test_rejected_token_falls_back_to_existing_guest() {
        let jar = Arc::new(MemoryCookieJar::with_values([
            (AUTH_TOKEN_COOKIE, "expired"),
            (GUEST_ID_COOKIE, "guest_1718000000000_abc123"),
        ]));
        let customers = Arc::new(FakeCustomers::default());

        let identity = resolver(jar, customers.clone()).resolve().await.unwrap();

        assert_eq!(identity.as_str(), "guest_1718000000000_abc123");
        assert_eq!(customers.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_token_skips_customer_lookup() {
        let customers = Arc::new(FakeCustomers::default());
        resolver(Arc::new(MemoryCookieJar::new()), customers.clone())
            .resolve()
            .await
            .unwrap();

        assert_eq!(customers.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_guest_cookie_is_replaced() {
        let jar = Arc::new(MemoryCookieJar::with_values([(GUEST_ID_COOKIE, "tampered")]));
        let id = resolver(jar.clone(), Arc::new(FakeCustomers::default()))
            .guest_id()
            .unwrap();

        assert_ne!(id.as_str(), "tampered");
        assert_eq!(jar.get(GUEST_ID_COOKIE).as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_guest_cookie_format_boundaries() {
        let longest = format!("guest_1718000000000_{}", "z9".repeat(8));
        for kept in ["guest_1718000000000_abc123", "guest_0_0", longest.as_str()] {
            let jar = Arc::new(MemoryCookieJar::with_values([(GUEST_ID_COOKIE, kept)]));
            let id = resolver(jar, Arc::new(FakeCustomers::default()))
                .guest_id()
                .unwrap();
            assert_eq!(id.as_str(), kept);
        }

        let overlong = format!("{longest}a");
        for replaced in [
            "guest_1718000000000_ABC123",
            "guest_1718000000000_abc-123",
            "guest__abc123",
            overlong.as_str(),
        ] {
            let jar = Arc::new(MemoryCookieJar::with_values([(GUEST_ID_COOKIE, replaced)]));
            let id = resolver(jar, Arc::new(FakeCustomers::default()))
                .guest_id()
                .unwrap();
            assert_ne!(id.as_str(), replaced);
        }
    }
}
