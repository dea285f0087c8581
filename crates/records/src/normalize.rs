//! Record normalization rules.
//!
//! [`normalize`] is a pure function: it validates a [`CreateRecordInput`],
//! resolves the branch-specific container descriptor and derives the computed
//! fields. It performs no I/O, so a rejected input never reaches the store.
//!
//! # Validation order
//!
//! Checks short-circuit; the first failure wins.
//!
//! 1. Acting subject present, else [`RecordError::Unauthorized`]
//! 2. Vessel, voyage and client present
//! 3. Booking and discharge port present
//! 4. Free days, when given, not negative
//! 5. Branch resolution
//!
//! Steps 2 through 5 fail with [`RecordError::InvalidInput`].

use chrono::{DateTime, Days, NaiveDate, Utc};
use pases_storage::records::{Branch, NewRecord};

use crate::{
    error::{RecordError, Result},
    input::CreateRecordInput,
    terminal::terminal_title,
};

/// Container descriptor and carrier resolved from the branch rules.
#[derive(Debug, PartialEq, Eq)]
struct Resolved {
    branch: Branch,
    container: String,
    carrier: Option<String>,
}

/// Validates `input` and builds the record to persist.
///
/// `now` becomes both the emission and creation timestamp.
///
/// # Errors
///
/// Returns [`RecordError::Unauthorized`] if `acting_subject` is blank, and
/// [`RecordError::InvalidInput`] for any other rule violation.
pub fn normalize(
    input: &CreateRecordInput,
    acting_subject: &str,
    now: DateTime<Utc>,
) -> Result<NewRecord> {
    let signing_user = acting_subject.trim();
    if signing_user.is_empty() {
        return Err(RecordError::Unauthorized);
    }

    let vessel = required(&input.vessel, "vessel")?;
    let voyage = required(&input.voyage, "voyage")?;
    let client = required(&input.client, "client")?;
    let booking = required(&input.booking, "booking")?;
    let discharge_port = required(&input.discharge_port, "discharge port")?;

    let free_days = match input.free_days {
        None => 0,
        Some(days) if days < 0 => {
            return Err(RecordError::invalid_input("free days must not be negative"));
        },
        Some(days) => u32::try_from(days)
            .map_err(|_| RecordError::invalid_input("free days out of range"))?,
    };

    let resolved = resolve_branch(input)?;
    let retention_free_until = retention_date(input.real_date, free_days)?;

    Ok(NewRecord {
        emitted_at: now,
        vessel: vessel.to_owned(),
        voyage: voyage.to_owned(),
        client: client.to_owned(),
        booking: booking.to_owned(),
        branch: resolved.branch,
        container: resolved.container,
        discharge_port: discharge_port.to_owned(),
        retention_free_until,
        free_days,
        carrier: resolved.carrier,
        terminal_title: terminal_title(discharge_port),
        signing_user: signing_user.to_owned(),
        created_at: now,
    })
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed)
}

fn resolve_branch(input: &CreateRecordInput) -> Result<Resolved> {
    let branch: Branch =
        input.branch.parse().map_err(|err| RecordError::invalid_input(format!("{err}")))?;

    match branch {
        Branch::Internacional => {
            let serial = required(&input.container_serial, "container serial")?;
            Ok(Resolved { branch, container: serial.to_owned(), carrier: None })
        },
        Branch::Nacional => {
            let iso = required(&input.iso_code, "iso code")?;
            let carrier = required(&input.carrier, "carrier")?;
            Ok(Resolved {
                branch,
                container: format!("1 X {iso}"),
                carrier: Some(carrier.to_owned()),
            })
        },
    }
}

/// Last free day: the real date plus the free-day count.
fn retention_date(real_date: NaiveDate, free_days: u32) -> Result<NaiveDate> {
    real_date
        .checked_add_days(Days::new(u64::from(free_days)))
        .ok_or_else(|| RecordError::invalid_input("retention date out of range"))
}
