use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zaca_common::{
    params::{NewOcspResponse, UpdateOcspResponse},
    views::OcspResponse,
};

use crate::{
    codec,
    error::{DataError, PatchError},
    models::RecordKey,
    repository::{Entity, Patch},
};

/// A pre-signed OCSP response, cached until `expiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbOcspResponse {
    pub serial_number: String,
    pub authority_key_identifier: String,

    /// Base64 DER-encoded response.
    pub body: String,

    pub expiry: bson::DateTime,
}

impl Entity for DbOcspResponse {
    const COLLECTION: &'static str = "ocsp_responses";
    const SORT_COLUMNS: &'static [&'static str] = &["serial_number", "authority_key_identifier", "expiry"];

    type Key = RecordKey;
    type Patch = OcspResponsePatch;

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

impl TryFrom<NewOcspResponse> for DbOcspResponse {
    type Error = DataError;

    fn try_from(value: NewOcspResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            serial_number: codec::normalize(&value.serial_number)?,
            authority_key_identifier: value.authority_key_identifier,
            body: value.body,
            expiry: value.expiry.into(),
        })
    }
}

impl From<DbOcspResponse> for OcspResponse {
    fn from(value: DbOcspResponse) -> Self {
        Self {
            serial_number: value.serial_number,
            authority_key_identifier: value.authority_key_identifier,
            body: value.body,
            expiry: value.expiry.to_chrono(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcspResponsePatch {
    pub body: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Patch<DbOcspResponse> for OcspResponsePatch {
    fn apply_to(&self, record: &mut DbOcspResponse) -> Result<(), PatchError> {
        if let Some(body) = &self.body {
            if body.is_empty() {
                return Err(PatchError("OCSP response body cannot be empty".into()));
            }
            record.body.clone_from(body);
        }
        if let Some(expiry) = self.expiry {
            record.expiry = expiry.into();
        }
        Ok(())
    }
}

impl From<UpdateOcspResponse> for OcspResponsePatch {
    fn from(value: UpdateOcspResponse) -> Self {
        Self {
            body: value.body,
            expiry: value.expiry,
        }
    }
}
