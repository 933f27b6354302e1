use std::fmt;

use bson::{Document, doc};

use crate::{codec, error::DataError};

pub mod certificate;
pub mod ocsp_response;

pub use certificate::*;
pub use ocsp_response::*;

/// Composite key shared by certificate-scoped records: the serial number in
/// canonical decimal form plus the issuer's authority key identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub serial_number: String,
    pub authority_key_identifier: String,
}

impl RecordKey {
    /// Build a key from caller-supplied text, normalizing the serial number
    /// from decimal or hexadecimal.
    pub fn parse(serial_number: &str, authority_key_identifier: &str) -> Result<Self, DataError> {
        Ok(Self {
            serial_number: codec::normalize(serial_number)?,
            authority_key_identifier: authority_key_identifier.to_string(),
        })
    }

    pub(crate) fn to_document(&self) -> Document {
        doc! {
            "serial_number": self.serial_number.clone(),
            "authority_key_identifier": self.authority_key_identifier.clone(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.serial_number, self.authority_key_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_normalizes_serial() {
        let key = RecordKey::parse("ff", "aki").unwrap();
        assert_eq!(key.serial_number, "255");
        assert_eq!(key.to_string(), "255/aki");
        assert_eq!(
            key.to_document(),
            doc! { "serial_number": "255", "authority_key_identifier": "aki" }
        );
    }

    #[test]
    fn test_key_parse_rejects_bad_serial() {
        assert!(RecordKey::parse("not-a-serial", "aki").is_err());
    }
}
