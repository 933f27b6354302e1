use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zaca_common::{
    params::{NewCertificate, UpdateCertificate},
    views::CertificateRecord,
};

use crate::{
    codec,
    error::{DataError, PatchError},
    models::RecordKey,
    repository::{Entity, Patch},
};

/// Column names of the `certificates` collection.
pub mod columns {
    pub const SERIAL_NUMBER: &str = "serial_number";
    pub const AUTHORITY_KEY_IDENTIFIER: &str = "authority_key_identifier";
    pub const CA_LABEL: &str = "ca_label";
    pub const COMMON_NAME: &str = "common_name";
    pub const STATUS: &str = "status";
    pub const REASON: &str = "reason";
    pub const NOT_BEFORE: &str = "not_before";
    pub const EXPIRY: &str = "expiry";
    pub const ISSUED_AT: &str = "issued_at";
    pub const REVOKED_AT: &str = "revoked_at";
    pub const PEM: &str = "pem";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbCertificate {
    /// Serial number in canonical decimal form.
    pub serial_number: String,

    /// Authority key identifier of the issuing CA. Together with the serial
    /// number this identifies the record.
    pub authority_key_identifier: String,

    /// CA profile the certificate was issued under, lower case.
    pub ca_label: String,

    pub common_name: String,

    /// `good` or `revoked`.
    pub status: String,

    /// RFC 5280 revocation reason code, 0 while unrevoked.
    #[serde(default)]
    pub reason: i32,

    pub not_before: bson::DateTime,
    pub expiry: bson::DateTime,
    pub issued_at: bson::DateTime,

    #[serde(default)]
    pub revoked_at: Option<bson::DateTime>,

    /// PEM-encoded certificate.
    pub pem: String,
}

impl Entity for DbCertificate {
    const COLLECTION: &'static str = "certificates";

    const SORT_COLUMNS: &'static [&'static str] = &[
        columns::SERIAL_NUMBER,
        columns::AUTHORITY_KEY_IDENTIFIER,
        columns::CA_LABEL,
        columns::COMMON_NAME,
        columns::STATUS,
        columns::REASON,
        columns::NOT_BEFORE,
        columns::EXPIRY,
        columns::ISSUED_AT,
        columns::REVOKED_AT,
    ];

    type Key = RecordKey;
    type Patch = CertificatePatch;

    fn key(&self) -> RecordKey {
        RecordKey {
            serial_number: self.serial_number.clone(),
            authority_key_identifier: self.authority_key_identifier.clone(),
        }
    }

    fn key_filter(key: &RecordKey) -> Document {
        key.to_document()
    }
}

impl TryFrom<NewCertificate> for DbCertificate {
    type Error = DataError;

    fn try_from(value: NewCertificate) -> Result<Self, Self::Error> {
        Ok(Self {
            serial_number: codec::normalize(&value.serial_number)?,
            authority_key_identifier: value.authority_key_identifier,
            ca_label: value.ca_label.to_lowercase(),
            common_name: value.common_name,
            status: value.status,
            reason: value.reason,
            not_before: value.not_before.into(),
            expiry: value.expiry.into(),
            issued_at: value.issued_at.into(),
            revoked_at: value.revoked_at.map(Into::into),
            pem: value.pem,
        })
    }
}

impl From<DbCertificate> for CertificateRecord {
    fn from(value: DbCertificate) -> Self {
        Self {
            serial_number: value.serial_number,
            authority_key_identifier: value.authority_key_identifier,
            ca_label: value.ca_label,
            common_name: value.common_name,
            status: value.status,
            reason: value.reason,
            not_before: value.not_before.to_chrono(),
            expiry: value.expiry.to_chrono(),
            issued_at: value.issued_at.to_chrono(),
            revoked_at: value.revoked_at.map(|t| t.to_chrono()),
            pem: value.pem,
        }
    }
}

/// Fields of a certificate that an update may set. `None` leaves the stored
/// value alone; `Some` writes it, zero values included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificatePatch {
    pub ca_label: Option<String>,
    pub common_name: Option<String>,
    pub status: Option<String>,
    pub reason: Option<i32>,
    pub not_before: Option<DateTime<Utc>>,
    pub expiry: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,

    /// `Some(None)` clears the revocation time.
    pub revoked_at: Option<Option<DateTime<Utc>>>,

    pub pem: Option<String>,
}

impl Patch<DbCertificate> for CertificatePatch {
    fn apply_to(&self, record: &mut DbCertificate) -> Result<(), PatchError> {
        if let Some(ca_label) = &self.ca_label {
            record.ca_label = ca_label.to_lowercase();
        }
        if let Some(common_name) = &self.common_name {
            record.common_name.clone_from(common_name);
        }
        if let Some(status) = &self.status {
            record.status.clone_from(status);
        }
        if let Some(reason) = self.reason {
            record.reason = reason;
        }
        if let Some(not_before) = self.not_before {
            record.not_before = not_before.into();
        }
        if let Some(expiry) = self.expiry {
            record.expiry = expiry.into();
        }
        if let Some(issued_at) = self.issued_at {
            record.issued_at = issued_at.into();
        }
        if let Some(revoked_at) = self.revoked_at {
            record.revoked_at = revoked_at.map(Into::into);
        }
        if let Some(pem) = &self.pem {
            record.pem.clone_from(pem);
        }

        if record.not_before.timestamp_millis() > record.expiry.timestamp_millis() {
            return Err(PatchError(format!(
                "not_before {} is after expiry {}",
                record.not_before.to_chrono(),
                record.expiry.to_chrono()
            )));
        }

        Ok(())
    }
}

impl From<UpdateCertificate> for CertificatePatch {
    fn from(value: UpdateCertificate) -> Self {
        Self {
            ca_label: value.ca_label,
            common_name: value.common_name,
            status: value.status,
            reason: value.reason,
            not_before: value.not_before,
            expiry: value.expiry,
            issued_at: value.issued_at,
            revoked_at: value.revoked_at,
            pem: value.pem,
        }
    }
}
