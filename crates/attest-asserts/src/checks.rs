//! # Field Checkers
//!
//! Pure functions that extract one field from a [`HeaderMap`] and either
//! return its typed value or fail with the matching [`AssertionError`].
//! They are independent of assertion kind; every builder composes them
//! explicitly and returns on the first failure.
//!
//! Every checker starts with the mandatory-presence check, so an absent
//! numeric or date header reports `MissingField`, not a parse error.

use attest_core::{HeaderMap, Timestamp};

use crate::config::TimestampProfile;
use crate::error::AssertionError;

/// Bit width for unsigned integer headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitWidth {
    /// 8-bit.
    U8,
    /// 16-bit.
    U16,
    /// 32-bit.
    U32,
    /// 64-bit.
    U64,
}

impl BitWidth {
    /// Number of bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Largest representable value.
    pub fn max(self) -> u64 {
        match self {
            Self::U8 => u64::from(u8::MAX),
            Self::U16 => u64::from(u16::MAX),
            Self::U32 => u64::from(u32::MAX),
            Self::U64 => u64::MAX,
        }
    }
}

/// Require `name` to be present and non-empty.
pub fn check_mandatory<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AssertionError> {
    match headers.get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AssertionError::MissingField {
            field: name.to_string(),
        }),
    }
}

/// Require `name` to be a base-10 unsigned integer that fits `width`.
///
/// Only ASCII digits are accepted: no sign, no whitespace, no separators.
/// Leading zeros are allowed.
pub fn check_uint(headers: &HeaderMap, name: &str, width: BitWidth) -> Result<u64, AssertionError> {
    let value = check_mandatory(headers, name)?;
    let invalid = || AssertionError::InvalidInteger {
        field: name.to_string(),
        value: value.to_string(),
        bits: width.bits(),
    };

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let parsed: u64 = value.parse().map_err(|_| invalid())?;
    if parsed > width.max() {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Require `name` to be an RFC 3339 date-time with a timezone offset.
pub fn check_rfc3339_date(headers: &HeaderMap, name: &str) -> Result<Timestamp, AssertionError> {
    check_timestamp(headers, name, TimestampProfile::Rfc3339)
}

/// Require `name` to be a date-time accepted by `profile`.
pub fn check_timestamp(
    headers: &HeaderMap,
    name: &str,
    profile: TimestampProfile,
) -> Result<Timestamp, AssertionError> {
    let value = check_mandatory(headers, name)?;
    let parsed = match profile {
        TimestampProfile::Rfc3339 => Timestamp::parse(value),
        TimestampProfile::UtcOnly => Timestamp::parse_utc(value),
    };
    parsed.map_err(|e| AssertionError::InvalidTimestamp {
        field: name.to_string(),
        value: value.to_string(),
        reason: match e {
            attest_core::CoreError::InvalidTimestamp { reason, .. } => reason,
            other => other.to_string(),
        },
    })
}
