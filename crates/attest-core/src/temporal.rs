//! # Timezone-Aware Instants
//!
//! Defines `Timestamp`, the instant carried by every assertion and by the
//! bounds of a signing key's validity window.
//!
//! ## Parsing Profiles
//!
//! - [`Timestamp::parse()`] accepts the RFC 3339 profile with any explicit
//!   offset (`Z`, `+00:00`, `+05:30`, `-04:00`). The offset is preserved.
//! - [`Timestamp::parse_utc()`] additionally requires the `Z` suffix. It
//!   backs the `utc-only` validator profile.
//!
//! Date-only strings, missing offsets, and anything else outside RFC 3339
//! are rejected at construction. The accepted syntax is the strict internet
//! profile: uppercase `T` and `Z`, a `+hh:mm`/`-hh:mm` offset, optional
//! fractional seconds, and no leap second `60`.
//!
//! ## Comparison Semantics
//!
//! Equality, ordering, and hashing are by instant. `2024-01-01T05:00:00+05:00`
//! and `2024-01-01T00:00:00Z` compare equal.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An RFC 3339 instant with its original offset.
///
/// # Construction
///
/// - [`Timestamp::parse()`]: from an RFC 3339 string, any offset.
/// - [`Timestamp::parse_utc()`]: from an RFC 3339 string, `Z` only.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`.
///
/// Deserialization goes through [`Timestamp::parse()`]; serialization writes
/// [`Timestamp::to_rfc3339()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Wrap a `DateTime<Utc>`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.fixed_offset())
    }

    /// Parse an RFC 3339 date-time carrying any timezone offset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if the string is not valid
    /// RFC 3339 (including a missing offset).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        check_rfc3339_syntax(s).map_err(|reason| CoreError::InvalidTimestamp {
            value: s.to_string(),
            reason: reason.to_string(),
        })?;
        DateTime::parse_from_rfc3339(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse an RFC 3339 date-time, accepting only the `Z` suffix.
    ///
    /// Explicit offsets are rejected even when they are `+00:00`.
    pub fn parse_utc(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp {
                value: s.to_string(),
                reason: "timestamp must use Z suffix (UTC only)".to_string(),
            });
        }
        Self::parse(s)
    }

    /// The same instant, converted to UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// The offset the timestamp was written in.
    pub fn offset(&self) -> FixedOffset {
        *self.0.offset()
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as RFC 3339 in the original offset (`Z` for UTC).
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Reject the spellings chrono tolerates but RFC 3339's internet profile
/// does not: a separator other than `T`, a lowercase `z`, a missing offset
/// colon, and leap second `60`.
fn check_rfc3339_syntax(s: &str) -> Result<(), &'static str> {
    let b = s.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        b.get(range)
            .is_some_and(|d| d.iter().all(u8::is_ascii_digit))
    };

    if !(digits(0..4)
        && b.get(4) == Some(&b'-')
        && digits(5..7)
        && b.get(7) == Some(&b'-')
        && digits(8..10))
    {
        return Err("date must be YYYY-MM-DD");
    }
    if b.get(10) != Some(&b'T') {
        return Err("date and time must be separated by an uppercase 'T'");
    }
    if !(digits(11..13)
        && b.get(13) == Some(&b':')
        && digits(14..16)
        && b.get(16) == Some(&b':')
        && digits(17..19))
    {
        return Err("time must be hh:mm:ss");
    }
    if b[17] >= b'6' {
        return Err("second out of range");
    }

    let mut rest = &b[19..];
    if let Some(fraction) = rest.strip_prefix(b".") {
        let len = fraction.iter().take_while(|c| c.is_ascii_digit()).count();
        if len == 0 {
            return Err("fractional seconds must have at least one digit");
        }
        rest = &fraction[len..];
    }
    match rest {
        b"Z" => Ok(()),
        [sign, h1, h2, b':', m1, m2]
            if matches!(*sign, b'+' | b'-')
                && [h1, h2, m1, m2].iter().all(|c| c.is_ascii_digit()) =>
        {
            Ok(())
        }
        _ => Err("offset must be an uppercase 'Z' or +hh:mm / -hh:mm"),
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl std::str::FromStr for Timestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
