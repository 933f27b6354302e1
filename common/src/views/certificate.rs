use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Presentation view of a certificate record, as returned by the listing and
/// detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FullCert {
    /// Serial number in decimal form.
    pub serial_number: String,
    pub authority_key_identifier: String,

    /// CA label (role) the certificate was issued under.
    pub ca_label: String,
    pub common_name: String,
    pub status: String,
    pub not_before: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,

    /// PEM-encoded certificate body.
    pub pem: String,

    /// Fields read out of the certificate itself.
    pub details: CertDetails,
}

/// Fields parsed from the certificate's DER body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertDetails {
    /// Subject distinguished name, RFC 4514 style.
    pub subject: String,

    /// Issuer distinguished name, RFC 4514 style.
    pub issuer: String,

    /// SHA-256 fingerprint of the DER encoding (format: `sha256:<hex>`)
    pub fingerprint: String,

    /// DNS names from the subject alternative name extension.
    pub dns_names: Vec<String>,

    /// Whether basic constraints mark this certificate as a CA.
    pub is_ca: bool,
}

/// A stored certificate record, with every persisted column.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateRecord {
    pub serial_number: String,
    pub authority_key_identifier: String,
    pub ca_label: String,
    pub common_name: String,
    pub status: String,
    pub reason: i32,
    pub not_before: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub pem: String,
}
