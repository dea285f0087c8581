//! Persisted record types.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// Record category.
///
/// Branches differ in which container fields are required and how the
/// container descriptor is derived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// International shipments, identified by container serial.
    Internacional,
    /// Domestic shipments, identified by ISO equipment code and carrier.
    Nacional,
}

impl Branch {
    /// Returns the canonical lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internacional => "internacional",
            Self::Nacional => "nacional",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a branch name is neither `internacional` nor `nacional`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown branch '{0}': expected 'internacional' or 'nacional'")]
pub struct UnknownBranch(pub String);

impl FromStr for Branch {
    type Err = UnknownBranch;

    /// Parses a branch name, trimming whitespace and ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("internacional") {
            Ok(Self::Internacional)
        } else if trimmed.eq_ignore_ascii_case("nacional") {
            Ok(Self::Nacional)
        } else {
            Err(UnknownBranch(trimmed.to_owned()))
        }
    }
}

/// A normalized record that has not been persisted yet.
///
/// Produced by the normalization engine and handed to
/// [`RecordStore::insert`](crate::records::RecordStore::insert). It carries no
/// identifier; the store assigns one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// When the pass was emitted (UTC).
    pub emitted_at: DateTime<Utc>,
    /// Vessel name.
    pub vessel: String,
    /// Voyage code.
    pub voyage: String,
    /// Client name.
    pub client: String,
    /// Booking reference.
    pub booking: String,
    /// Record category.
    pub branch: Branch,
    /// Resolved container descriptor.
    pub container: String,
    /// Discharge port as supplied.
    pub discharge_port: String,
    /// Last day the container is exempt from retention charges.
    pub retention_free_until: NaiveDate,
    /// Number of free days granted.
    pub free_days: u32,
    /// Carrier, recorded only for domestic records.
    pub carrier: Option<String>,
    /// Terminal title resolved from the discharge port.
    pub terminal_title: String,
    /// Principal that signed the record.
    pub signing_user: String,
    /// When the record was created (UTC).
    pub created_at: DateTime<Utc>,
}

impl NewRecord {
    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn into_record(self, id: RecordId) -> Record {
        Record {
            id,
            emitted_at: self.emitted_at,
            vessel: self.vessel,
            voyage: self.voyage,
            client: self.client,
            booking: self.booking,
            branch: self.branch,
            container: self.container,
            discharge_port: self.discharge_port,
            retention_free_until: self.retention_free_until,
            free_days: self.free_days,
            carrier: self.carrier,
            terminal_title: self.terminal_title,
            signing_user: self.signing_user,
            created_at: self.created_at,
        }
    }
}

/// A persisted record.
///
/// Records are immutable once stored and are only read back by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// When the pass was emitted (UTC).
    pub emitted_at: DateTime<Utc>,
    /// Vessel name.
    pub vessel: String,
    /// Voyage code.
    pub voyage: String,
    /// Client name.
    pub client: String,
    /// Booking reference.
    pub booking: String,
    /// Record category.
    pub branch: Branch,
    /// Resolved container descriptor.
    pub container: String,
    /// Discharge port as supplied.
    pub discharge_port: String,
    /// Last day the container is exempt from retention charges.
    pub retention_free_until: NaiveDate,
    /// Number of free days granted.
    pub free_days: u32,
    /// Carrier, recorded only for domestic records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Terminal title resolved from the discharge port.
    pub terminal_title: String,
    /// Principal that signed the record.
    pub signing_user: String,
    /// When the record was created (UTC).
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_parse_case_insensitive() {
        assert_eq!("internacional".parse::<Branch>().unwrap(), Branch::Internacional);
        assert_eq!("  NACIONAL ".parse::<Branch>().unwrap(), Branch::Nacional);
        assert_eq!("Internacional".parse::<Branch>().unwrap(), Branch::Internacional);
    }

    #[test]
    fn test_branch_parse_rejects_unknown() {
        assert_eq!("".parse::<Branch>(), Err(UnknownBranch(String::new())));
        assert!("regional".parse::<Branch>().is_err());
        assert!("nacional-x".parse::<Branch>().is_err());
    }

    #[test]
    fn test_branch_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Branch::Nacional).unwrap(), "\"nacional\"");
        let parsed: Branch = serde_json::from_str("\"internacional\"").unwrap();
        assert_eq!(parsed, Branch::Internacional);
    }

    #[test]
    fn test_into_record_keeps_fields() {
        let now = Utc::now();
        let new = NewRecord {
            emitted_at: now,
            vessel: "NAVE 1".into(),
            voyage: "VJ1".into(),
            client: "CLIENTE 1".into(),
            booking: "BK1".into(),
            branch: Branch::Internacional,
            container: "ABCU1234567".into(),
            discharge_port: "Balboa".into(),
            retention_free_until: NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(),
            free_days: 3,
            carrier: None,
            terminal_title: "TERMINAL PACIFICO - BALBOA".into(),
            signing_user: "tester".into(),
            created_at: now,
        };
        let record = new.clone().into_record(RecordId::new(7).unwrap());
        assert_eq!(record.id.get(), 7);
        assert_eq!(record.booking, new.booking);
        assert_eq!(record.retention_free_until, new.retention_free_until);
        assert!(record.carrier.is_none());
    }
}
