use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_parser::{certificate::X509Certificate, extensions::GeneralName, prelude::FromDer};
use zaca_common::views::{CertDetails, FullCert};

use crate::models::columns;

/// The subset of a certificate record the listing and detail views read.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRow {
    pub serial_number: String,
    pub authority_key_identifier: String,
    pub ca_label: String,
    pub common_name: String,
    pub status: String,
    pub not_before: bson::DateTime,
    pub expiry: bson::DateTime,
    pub issued_at: bson::DateTime,
    #[serde(default)]
    pub revoked_at: Option<bson::DateTime>,
    pub pem: String,
}

impl CertificateRow {
    pub const COLUMNS: &'static [&'static str] = &[
        columns::CA_LABEL,
        columns::COMMON_NAME,
        columns::ISSUED_AT,
        columns::SERIAL_NUMBER,
        columns::AUTHORITY_KEY_IDENTIFIER,
        columns::STATUS,
        columns::NOT_BEFORE,
        columns::EXPIRY,
        columns::REVOKED_AT,
        columns::PEM,
    ];
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Failed to decode certificate PEM: {0}")]
    Pem(String),

    #[error("Failed to parse certificate: {0}")]
    Certificate(String),
}

/// Build the presentation view of a row, reading the details block out of
/// its PEM body.
pub fn project(row: CertificateRow) -> Result<FullCert, ProjectionError> {
    let details = details(&row.pem)?;

    Ok(FullCert {
        serial_number: row.serial_number,
        authority_key_identifier: row.authority_key_identifier,
        ca_label: row.ca_label,
        common_name: row.common_name,
        status: row.status,
        not_before: row.not_before.to_chrono(),
        expiry: row.expiry.to_chrono(),
        issued_at: row.issued_at.to_chrono(),
        revoked_at: row.revoked_at.map(|t| t.to_chrono()),
        pem: row.pem,
        details,
    })
}

fn details(pem: &str) -> Result<CertDetails, ProjectionError> {
    let (label, der) = pem_rfc7468::decode_vec(pem.as_bytes()).map_err(|e| ProjectionError::Pem(e.to_string()))?;
    if label != "CERTIFICATE" {
        return Err(ProjectionError::Pem(format!("unexpected PEM label {label:?}")));
    }

    let (_, cert) = X509Certificate::from_der(&der).map_err(|e| ProjectionError::Certificate(e.to_string()))?;

    let dns_names = match cert.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        Ok(None) => vec![],
        Err(e) => return Err(ProjectionError::Certificate(e.to_string())),
    };

    let mut hasher = Sha256::new();
    hasher.update(&der);
    let fingerprint = format!("sha256:{}", hex::encode(hasher.finalize()));

    Ok(CertDetails {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        fingerprint,
        dns_names,
        is_ca: cert.is_ca(),
    })
}
