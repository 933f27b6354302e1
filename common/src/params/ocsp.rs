use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for storing a pre-signed OCSP response.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewOcspResponse {
    /// Serial number of the certificate this response covers, in decimal or
    /// hexadecimal.
    pub serial_number: String,
    pub authority_key_identifier: String,

    /// Base64 DER-encoded OCSP response.
    pub body: String,

    /// When this response stops being valid.
    pub expiry: DateTime<Utc>,
}

/// Request body for a partial OCSP response update.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateOcspResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}
