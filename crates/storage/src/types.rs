//! Common types used across record store operations.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

/// Store-assigned record identifier.
///
/// Identifiers are always positive. The wrapper makes it a compile-time
/// error to pass an arbitrary integer where a persisted record's identifier
/// is expected, and rules out the zero/negative values that the compact
/// verification token format rejects.
///
/// # Examples
///
/// ```
/// use pases_storage::RecordId;
///
/// let id = RecordId::new(42).expect("positive");
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// assert!(RecordId::new(0).is_none());
/// assert!(RecordId::new(-7).is_none());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(NonZeroU64);

impl RecordId {
    /// Largest identifier representable in the signed 64-bit store column.
    pub const MAX: i64 = i64::MAX;

    /// Creates an identifier, returning `None` unless `value > 0`.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        u64::try_from(value).ok().and_then(NonZeroU64::new).map(Self)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        // Constructed only from positive i64 values, so the cast is lossless.
        self.0.get() as i64
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.get()
    }
}

impl TryFrom<i64> for RecordId {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert!(RecordId::new(0).is_none());
        assert!(RecordId::new(-1).is_none());
        assert!(RecordId::new(i64::MIN).is_none());
        assert_eq!(RecordId::try_from(-3), Err(-3));
    }

    #[test]
    fn test_accepts_full_positive_range() {
        assert_eq!(RecordId::new(1).unwrap().get(), 1);
        assert_eq!(RecordId::new(RecordId::MAX).unwrap().get(), i64::MAX);
    }

    #[test]
    fn test_serde_as_plain_integer() {
        let id = RecordId::new(45).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "45");
        let back: RecordId = serde_json::from_str("45").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RecordId>("0").is_err());
    }
}
