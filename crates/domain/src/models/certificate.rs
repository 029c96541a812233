//! Certificate render model.
//!
//! The certificate itself is rendered client-side; the server only assembles
//! the data the fixed layout embeds. Assembly is a pure read over an
//! approved request and has no bearing on request state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One row of the certificate's participant table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRow {
    pub register_number: String,
    pub name: String,
    pub semester: i16,
    /// Formatted attendance: live feed value, else stored snapshot, else
    /// "N/A".
    pub attendance: String,
}

/// Data for the fixed-layout OD certificate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub request_id: String,
    pub event_name: String,
    pub venue: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: i64,
    pub tutor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_url: Option<String>,
    pub rows: Vec<CertificateRow>,
    pub generated_at: DateTime<Utc>,
}
