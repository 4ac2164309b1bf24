//! Cookie jar implementations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::http::{HeaderMap, HeaderName, header};
use cookie::Cookie;

use super::CookieError;

/// Largest `Set-Cookie` value (name, value and attributes) browsers keep.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Read/write access to the shopper's cookies.
///
/// Values are returned exactly as stored; list stores do their own
/// percent-encoding.
pub trait CookieJar: Send + Sync {
    /// Current value of the named cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Store a cookie, replacing any cookie with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::TooLarge`] if the serialized cookie exceeds
    /// [`MAX_COOKIE_BYTES`]; the previous value is kept.
    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError>;
}

fn check_size(cookie: &Cookie<'_>) -> Result<(), CookieError> {
    let size = cookie.to_string().len();
    if size > MAX_COOKIE_BYTES {
        return Err(CookieError::TooLarge {
            name: cookie.name().to_string(),
            size,
        });
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MemoryCookieJar
// =============================================================================

/// In-memory cookie jar.
///
/// Keeps the full cookie (attributes included) so tests can assert on
/// `Max-Age`, `SameSite` and `Secure`.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a jar holding the given `name -> value` pairs.
    #[must_use]
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cookies = values
            .into_iter()
            .map(|(name, value)| {
                let name = name.into();
                (name.clone(), Cookie::new(name, value.into()))
            })
            .collect();

        Self {
            cookies: Mutex::new(cookies),
        }
    }

    /// Full stored cookie, including attributes.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        lock(&self.cookies).get(name).cloned()
    }

    /// Overwrite a cookie value without size checks, as a browser extension
    /// or another tab might.
    pub fn insert_raw(&self, name: &str, value: &str) {
        lock(&self.cookies).insert(
            name.to_string(),
            Cookie::new(name.to_string(), value.to_string()),
        );
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.cookies)
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        check_size(&cookie)?;
        lock(&self.cookies).insert(cookie.name().to_string(), cookie);
        Ok(())
    }
}

// =============================================================================
// RequestCookieJar
// =============================================================================

/// Cookie jar scoped to one HTTP request.
///
/// Reads come from the request's `Cookie` header(s). Writes are visible to
/// later reads in the same request and are collected so the handler can
/// return them as `Set-Cookie` headers.
#[derive(Debug, Default)]
pub struct RequestCookieJar {
    state: Mutex<RequestJarState>,
}

#[derive(Debug, Default)]
struct RequestJarState {
    values: HashMap<String, String>,
    pending: Vec<Cookie<'static>>,
}

impl RequestCookieJar {
    /// Build a jar from request headers.
    ///
    /// Unparsable cookie pairs are skipped.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value.to_string()))
            .filter_map(Result::ok)
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();

        Self {
            state: Mutex::new(RequestJarState {
                values,
                pending: Vec::new(),
            }),
        }
    }

    /// `Set-Cookie` headers for every cookie written during this request.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<(HeaderName, String)> {
        lock(&self.state)
            .pending
            .iter()
            .map(|cookie| (header::SET_COOKIE, cookie.to_string()))
            .collect()
    }
}

impl CookieJar for RequestCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.state).values.get(name).cloned()
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        check_size(&cookie)?;

        let mut state = lock(&self.state);
        state
            .values
            .insert(cookie.name().to_string(), cookie.value().to_string());
        // Only the last write per name reaches the browser
        state.pending.retain(|existing| existing.name() != cookie.name());
        state.pending.push(cookie);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_request_jar_reads_all_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
        headers.append(header::COOKIE, HeaderValue::from_static("c=3"));

        let jar = RequestCookieJar::from_headers(&headers);
        assert_eq!(jar.get("a").as_deref(), Some("1"));
        assert_eq!(jar.get("b").as_deref(), Some("2"));
        assert_eq!(jar.get("c").as_deref(), Some("3"));
        assert_eq!(jar.get("d"), None);
    }

    #[test]
    fn test_request_jar_write_is_visible_and_collected_once() {
        let jar = RequestCookieJar::from_headers(&HeaderMap::new());
        jar.set(Cookie::new("list", "one")).unwrap();
        jar.set(Cookie::build(("list", "two")).path("/").build())
            .unwrap();

        assert_eq!(jar.get("list").as_deref(), Some("two"));

        let headers = jar.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, header::SET_COOKIE);
        assert_eq!(headers[0].1, "list=two; Path=/");
    }

    #[test]
    fn test_oversized_cookie_is_rejected_and_previous_value_kept() {
        let jar = MemoryCookieJar::with_values([("big", "small")]);
        let result = jar.set(Cookie::new("big", "x".repeat(MAX_COOKIE_BYTES)));

        assert!(matches!(result, Err(CookieError::TooLarge { .. })));
        assert_eq!(jar.get("big").as_deref(), Some("small"));
    }
}
