use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{DEFAULT_PAGE_SIZE, non_empty};

/// Filter and pagination criteria for listing certificates.
///
/// Every filter is optional. A missing or empty value places no constraint on
/// that dimension.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CertListParams {
    /// Serial number, in decimal or hexadecimal.
    pub cert_sn: Option<String>,

    /// CA label the certificate was issued under. Compared case-insensitively.
    pub role: Option<String>,

    /// Common name of the certificate subject.
    pub unique_id: Option<String>,

    /// Certificate status, e.g. `good` or `revoked`.
    pub status: Option<String>,

    /// Only return certificates expiring strictly after this date.
    pub expiry_start_time: Option<String>,

    /// Only return certificates expiring strictly before this date.
    pub expiry_end_time: Option<String>,

    /// The page to return, starting at 1. Zero or negative values return the
    /// first page.
    pub page: Option<i64>,

    /// The maximum number of results to return per page.
    pub page_size: Option<u64>,

    /// Sort order. Defaults to `issued_at desc`.
    pub order: Option<String>,
}

impl CertListParams {
    pub fn cert_sn(&self) -> Option<&str> {
        non_empty(&self.cert_sn)
    }

    pub fn role(&self) -> Option<&str> {
        non_empty(&self.role)
    }

    pub fn unique_id(&self) -> Option<&str> {
        non_empty(&self.unique_id)
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    pub fn expiry_start_time(&self) -> Option<&str> {
        non_empty(&self.expiry_start_time)
    }

    pub fn expiry_end_time(&self) -> Option<&str> {
        non_empty(&self.expiry_end_time)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn order(&self) -> Option<&str> {
        non_empty(&self.order)
    }
}

/// Request body for recording a newly issued certificate.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewCertificate {
    /// Serial number, in decimal or hexadecimal. Stored in decimal form.
    pub serial_number: String,
    pub authority_key_identifier: String,
    pub ca_label: String,
    pub common_name: String,
    pub status: String,

    /// Revocation reason code (RFC 5280 `CRLReason`).
    #[serde(default)]
    pub reason: i32,

    pub not_before: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,

    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,

    /// PEM-encoded certificate body.
    pub pem: String,
}

/// Request body for a partial certificate update. Omitted fields are left
/// untouched; fields that are present are written even when they hold a zero
/// value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCertificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,

    /// `null` clears the revocation time, a timestamp sets it, and omitting
    /// the field leaves it as it is.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub revoked_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pem: Option<String>,
}
