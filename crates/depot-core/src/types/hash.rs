//! The content digest type used as the deduplication key.
//!
//! A [`ContentHash`] is the lowercase hex encoding of a SHA-256 digest.
//! It identifies content by its bytes alone: two uploads with identical
//! payloads always carry the same hash, regardless of filename or headers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// A hex-encoded SHA-256 content digest.
///
/// Always 64 lowercase hex characters; [`ContentHash::parse`] rejects
/// anything else, so a constructed value can be trusted as a valid key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a hex string into a content hash, normalizing to lowercase.
    pub fn parse(s: impl Into<String>) -> AppResult<Self> {
        let s: String = s.into();
        if s.len() != HASH_HEX_LEN {
            return Err(AppError::validation(format!(
                "Content hash must be {HASH_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AppError::validation(
                "Content hash contains non-hex characters",
            ));
        }
        Ok(Self(s.to_lowercase()))
    }

    /// Build a content hash from a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Return the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two hex characters, used by backends to bound directory fan-out.
    pub fn shard_prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Return the inner hex string (consuming self).
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for ContentHash {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ContentHash {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ContentHash {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self(raw))
    }
}
