use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored OCSP response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OcspResponse {
    pub serial_number: String,
    pub authority_key_identifier: String,

    /// Base64 DER-encoded OCSP response.
    pub body: String,

    pub expiry: DateTime<Utc>,
}
