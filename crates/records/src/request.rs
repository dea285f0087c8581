//! Record-creation request wire shape.
//!
//! [`CreateRecordRequest`] mirrors the JSON body accepted by the record
//! endpoint. [`CreateRecordRequest::into_input`] applies the wire-level
//! checks (lengths, date formats, the `rama` literal and the date contract)
//! and yields a [`CreateRecordInput`] for the normalization rules.

use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::{
    error::{RecordError, Result},
    input::CreateRecordInput,
    policy::{DateContract, RecordPolicy},
};

/// Wire format for dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on `dias_libre`.
pub const MAX_FREE_DAYS: i64 = 365;

/// JSON body of a record-creation request.
///
/// Field names are the public wire names. Unknown fields are rejected.
/// `emision`, `titulo_terminal` and `usuario_firma` are computed by the
/// server; they are accepted for older clients and otherwise ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecordRequest {
    /// Vessel name.
    #[serde(default)]
    pub nave: Option<String>,
    /// Voyage code.
    #[serde(default)]
    pub viaje: Option<String>,
    /// Client name.
    #[serde(default)]
    pub cliente: Option<String>,
    /// Booking reference.
    #[serde(default)]
    pub booking: Option<String>,
    /// Branch, `internacional` or `nacional`.
    #[serde(default)]
    pub rama: Option<String>,
    /// Container serial.
    #[serde(default)]
    pub contenedor_serie: Option<String>,
    /// Older name for `contenedor_serie`, used when that field is blank.
    #[serde(default)]
    pub contenedor: Option<String>,
    /// ISO equipment code.
    #[serde(default)]
    pub codigo_iso: Option<String>,
    /// Real arrival date, `YYYY-MM-DD`.
    #[serde(default)]
    pub fecha_real: Option<String>,
    /// Last free day, `YYYY-MM-DD`. Only read under the legacy date contract.
    #[serde(default)]
    pub libre_retencion_hasta: Option<String>,
    /// Free days granted.
    #[serde(default)]
    pub dias_libre: Option<i64>,
    /// Carrier.
    #[serde(default)]
    pub transportista: Option<String>,
    /// Discharge port.
    #[serde(default)]
    pub puerto_descargue: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub emision: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub titulo_terminal: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub usuario_firma: Option<String>,
}

impl CreateRecordRequest {
    /// Checks the wire-level rules and converts to a [`CreateRecordInput`].
    ///
    /// Required-field checks are left to the normalization rules, which
    /// trim before testing for emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if:
    /// - a field exceeds its maximum length
    /// - `rama` is set to anything but `internacional` or `nacional`
    /// - `dias_libre` is outside `0..=365`
    /// - a date is not `YYYY-MM-DD`
    /// - no real date can be established under `policy.date_contract`
    pub fn into_input(self, policy: &RecordPolicy) -> Result<CreateRecordInput> {
        check_len("nave", self.nave.as_deref(), 150)?;
        check_len("viaje", self.viaje.as_deref(), 100)?;
        check_len("cliente", self.cliente.as_deref(), 200)?;
        check_len("booking", self.booking.as_deref(), 100)?;
        check_len("contenedor_serie", self.contenedor_serie.as_deref(), 100)?;
        check_len("contenedor", self.contenedor.as_deref(), 100)?;
        check_len("codigo_iso", self.codigo_iso.as_deref(), 20)?;
        check_len("transportista", self.transportista.as_deref(), 200)?;
        check_len("puerto_descargue", self.puerto_descargue.as_deref(), 150)?;
        check_len("emision", self.emision.as_deref(), 50)?;
        check_len("titulo_terminal", self.titulo_terminal.as_deref(), 200)?;
        check_len("usuario_firma", self.usuario_firma.as_deref(), 200)?;

        let branch = self.rama.unwrap_or_default();
        if !branch.is_empty() && branch != "internacional" && branch != "nacional" {
            return Err(RecordError::invalid_input(
                "rama must be 'internacional' or 'nacional'",
            ));
        }

        if self.dias_libre.is_some_and(|days| !(0..=MAX_FREE_DAYS).contains(&days)) {
            return Err(RecordError::invalid_input(format!(
                "dias_libre must be between 0 and {MAX_FREE_DAYS}"
            )));
        }

        let real_date = parse_date("fecha_real", self.fecha_real.as_deref())?;
        let retention_date =
            parse_date("libre_retencion_hasta", self.libre_retencion_hasta.as_deref())?;
        let real_date = match (real_date, retention_date, policy.date_contract) {
            (Some(date), _, _) => date,
            (None, Some(until), DateContract::LegacyRetentionDate) => {
                let days = u64::try_from(self.dias_libre.unwrap_or(0)).unwrap_or(0);
                until.checked_sub_days(Days::new(days)).ok_or_else(|| {
                    RecordError::invalid_input("libre_retencion_hasta out of range")
                })?
            },
            _ => return Err(RecordError::invalid_input("fecha_real is required")),
        };

        let serial = self.contenedor_serie.unwrap_or_default();
        let container_serial = if serial.trim().is_empty() {
            self.contenedor.unwrap_or_default()
        } else {
            serial
        };

        Ok(CreateRecordInput {
            vessel: self.nave.unwrap_or_default(),
            voyage: self.viaje.unwrap_or_default(),
            client: self.cliente.unwrap_or_default(),
            booking: self.booking.unwrap_or_default(),
            branch,
            container_serial,
            iso_code: self.codigo_iso.unwrap_or_default(),
            real_date,
            free_days: self.dias_libre,
            carrier: self.transportista.unwrap_or_default(),
            discharge_port: self.puerto_descargue.unwrap_or_default(),
        })
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(RecordError::invalid_input(format!(
            "{field} exceeds {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Parses an optional `YYYY-MM-DD` date; empty counts as absent.
fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let invalid = || RecordError::invalid_input(format!("{field} must be YYYY-MM-DD"));
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map(Some).map_err(|_| invalid())
}
