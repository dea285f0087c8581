//! Untrusted record-creation input.

use chrono::NaiveDate;

/// Raw record-creation fields, as received from the caller.
///
/// Nothing here is validated or trimmed yet; [`normalize`](crate::normalize)
/// does both. The acting principal is deliberately absent: it comes from the
/// authenticated bearer token, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateRecordInput {
    /// Vessel name.
    pub vessel: String,
    /// Voyage code.
    pub voyage: String,
    /// Client name.
    pub client: String,
    /// Booking reference.
    pub booking: String,
    /// Branch name, matched case-insensitively.
    pub branch: String,
    /// Container serial, required for international records.
    pub container_serial: String,
    /// ISO equipment code, required for domestic records.
    pub iso_code: String,
    /// Date the container actually arrived.
    pub real_date: NaiveDate,
    /// Free days granted; absent means zero.
    pub free_days: Option<i64>,
    /// Carrier, required for domestic records.
    pub carrier: String,
    /// Discharge port.
    pub discharge_port: String,
}
