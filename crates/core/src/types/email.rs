//! Customer email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an address was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@domain.tld")]
    Malformed,
}

/// A normalised email address, the login key for customer and admin
/// accounts.
///
/// Parsing trims and lowercases, so `Ada@Example.com` and `ada@example.com`
/// name the same account. The check is deliberately shallow: one `@`, a
/// non-empty mailbox, a dotted domain and no whitespace.
///
/// ```
/// use jewelbox_core::Email;
///
/// assert_eq!(Email::parse(" Ada@Example.com ").unwrap().as_str(), "ada@example.com");
/// assert!(Email::parse("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is blank, too long, or not
    /// shaped like `mailbox@domain.tld`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !is_well_formed(s) {
            return Err(EmailError::Malformed);
        }
        Ok(Self(s.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_well_formed(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((mailbox, domain)) = s.split_once('@') else {
        return false;
    };
    !mailbox.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, rest)| !host.is_empty() && !rest.is_empty() && !rest.ends_with('.'))
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

// Stored as TEXT; rows are only ever written through `parse`.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<String as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for ok in [
            "buyer@jewelbox.in",
            "first.last+rings@mail.example.co.uk",
            "a@b.c",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in [
            "no-at-symbol",
            "@jewelbox.in",
            "buyer@",
            "buyer@localhost",
            "buyer@.in",
            "buyer@jewelbox.",
            "two@@jewelbox.in",
            "spaced out@jewelbox.in",
        ] {
            assert_eq!(Email::parse(bad), Err(EmailError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_blank_and_oversized_input() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        let long = format!("{}@jewelbox.in", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_case_and_whitespace_do_not_make_a_new_account() {
        let email = Email::parse("  Ada.Lovelace@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ada.lovelace@example.com");
        assert_eq!(email, Email::parse("ada.lovelace@example.com").unwrap());
    }

    #[test]
    fn test_deserialize_validates_and_normalizes() {
        let parsed: Email = serde_json::from_str("\"Buyer@Shop.IN\"").unwrap();
        assert_eq!(parsed.to_string(), "buyer@shop.in");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"buyer@shop.in\"");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
