//! Shopper identity used to scope server-held list state.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// Errors that can occur when parsing a [`GuestId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GuestIdError {
    /// The input does not start with `guest_`.
    #[error("guest id must start with '{}'", GuestId::PREFIX)]
    MissingPrefix,
    /// The timestamp segment is missing or not a number.
    #[error("guest id timestamp must be a decimal number")]
    InvalidTimestamp,
    /// The random segment is missing, too long, or not base36.
    #[error("guest id suffix must be 1-{max} lowercase base36 characters")]
    InvalidSuffix {
        /// Maximum allowed suffix length.
        max: usize,
    },
}

/// Identifier for an anonymous shopper.
///
/// ## Format
///
/// `guest_<unix-millis>_<base36>`, e.g. `guest_1718000000000_k3j9x0a1b`.
/// The suffix is lowercase and at most [`GuestId::MAX_SUFFIX_LENGTH`] long.
/// Ids already handed out must keep parsing, since the backend keys liked
/// products on them.
///
/// ## Examples
///
/// ```
/// use lunette_core::GuestId;
///
/// let id = GuestId::from_parts(1_718_000_000_000, "k3j9x0a1b").unwrap();
/// assert_eq!(id.as_str(), "guest_1718000000000_k3j9x0a1b");
/// assert_eq!(id.created_at_millis(), 1_718_000_000_000);
///
/// assert!(GuestId::parse("cus_123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuestId(String);

impl GuestId {
    /// Prefix shared by all guest ids.
    pub const PREFIX: &'static str = "guest_";

    /// Length of freshly generated random suffixes.
    pub const SUFFIX_LENGTH: usize = 9;

    /// Longest suffix accepted when parsing.
    pub const MAX_SUFFIX_LENGTH: usize = 16;

    /// Build a guest id from a creation timestamp and a random suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is empty, too long, or not base36.
    pub fn from_parts(created_at_millis: u64, suffix: &str) -> Result<Self, GuestIdError> {
        validate_suffix(suffix)?;
        Ok(Self(format!("{}{created_at_millis}_{suffix}", Self::PREFIX)))
    }

    /// Parse a guest id read back from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not of the form
    /// `guest_<digits>_<base36>`.
    pub fn parse(s: &str) -> Result<Self, GuestIdError> {
        let rest = s
            .strip_prefix(Self::PREFIX)
            .ok_or(GuestIdError::MissingPrefix)?;
        let (timestamp, suffix) = rest
            .split_once('_')
            .ok_or(GuestIdError::InvalidTimestamp)?;

        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GuestIdError::InvalidTimestamp);
        }
        validate_suffix(suffix)?;

        Ok(Self(s.to_owned()))
    }

    /// Returns the guest id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time embedded in the id, in milliseconds since the epoch.
    #[must_use]
    pub fn created_at_millis(&self) -> u64 {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| rest.split('_').next())
            .and_then(|ts| ts.parse().ok())
            .unwrap_or(0)
    }
}

fn validate_suffix(suffix: &str) -> Result<(), GuestIdError> {
    let valid = !suffix.is_empty()
        && suffix.len() <= GuestId::MAX_SUFFIX_LENGTH
        && suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase());

    if valid {
        Ok(())
    } else {
        Err(GuestIdError::InvalidSuffix {
            max: GuestId::MAX_SUFFIX_LENGTH,
        })
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GuestId {
    type Err = GuestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GuestId {
    type Error = GuestIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GuestId> for String {
    fn from(id: GuestId) -> Self {
        id.0
    }
}

/// The key under which a shopper's remote list state is stored.
///
/// Scoping is purely by the id string: a guest who later signs in gets a
/// different key and their guest-scoped state is not carried over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Signed-in customer, resolved from the auth token.
    Customer(CustomerId),
    /// Anonymous shopper with a cookie-persisted guest id.
    Guest(GuestId),
}

impl Identity {
    /// The id value used to scope remote requests.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer(id) => id.as_str(),
            Self::Guest(id) => id.as_str(),
        }
    }

    /// Whether this is an anonymous shopper.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = GuestId::parse("guest_1718000000000_abc123xyz").unwrap();
        assert_eq!(id.created_at_millis(), 1_718_000_000_000);
    }

    #[test]
    fn test_parse_missing_prefix() {
        assert_eq!(
            GuestId::parse("cus_1718000000000_abc"),
            Err(GuestIdError::MissingPrefix)
        );
    }

    #[test]
    fn test_parse_bad_timestamp() {
        assert_eq!(
            GuestId::parse("guest_17x8_abc"),
            Err(GuestIdError::InvalidTimestamp)
        );
        assert_eq!(
            GuestId::parse("guest_abc"),
            Err(GuestIdError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_parse_bad_suffix() {
        assert!(matches!(
            GuestId::parse("guest_1718_"),
            Err(GuestIdError::InvalidSuffix { .. })
        ));
        assert!(matches!(
            GuestId::parse("guest_1718_ABC"),
            Err(GuestIdError::InvalidSuffix { .. })
        ));
        assert!(matches!(
            GuestId::parse(&format!("guest_1718_{}", "a".repeat(17))),
            Err(GuestIdError::InvalidSuffix { .. })
        ));
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let parsed: Result<GuestId, _> = serde_json::from_str("\"not-a-guest\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_identity_scoping_value() {
        let customer = Identity::Customer(CustomerId::new("cus_1"));
        let guest = Identity::Guest(GuestId::from_parts(5, "zz").unwrap());

        assert_eq!(customer.as_str(), "cus_1");
        assert!(!customer.is_guest());
        assert_eq!(guest.to_string(), "guest_5_zz");
        assert!(guest.is_guest());
    }
}
