//! Certificate listing and detail views.
//!
//! [`CertificateQuery`] turns the caller's list criteria into a store
//! filter, reads the column subset the views need and projects each row into
//! a [`FullCert`]. Rows that cannot be projected are left out of the page
//! and counted in [`ListResult::skipped`].

use std::sync::Arc;

use tracing::{instrument, warn};
use zaca_common::{
    params::CertListParams,
    views::{FullCert, ListResult},
};

use crate::{
    codec,
    error::DataError,
    models::{DbCertificate, RecordKey, columns},
    query::{Filter, Order, Pagination, Predicate, Query, SortKey, parse_any},
    repository::Repository,
    storage::{RecordStore, StoreError},
};

mod projection;

pub use projection::{CertificateRow, ProjectionError, project};

#[cfg(test)]
mod tests;

/// Build the store filter for a certificate listing.
///
/// Predicates are added in a fixed field order (serial number, role, unique
/// id, status, expiry lower bound, expiry upper bound) and AND-combined.
/// Absent or empty criteria add nothing.
pub fn compose(params: &CertListParams) -> Result<Filter, DataError> {
    let mut filter = Filter::new();

    if let Some(cert_sn) = params.cert_sn() {
        filter.push(Predicate::eq(columns::SERIAL_NUMBER, codec::normalize(cert_sn)?));
    }
    if let Some(role) = params.role() {
        filter.push(Predicate::eq(columns::CA_LABEL, role.to_lowercase()));
    }
    if let Some(unique_id) = params.unique_id() {
        filter.push(Predicate::eq(columns::COMMON_NAME, unique_id));
    }
    if let Some(status) = params.status() {
        filter.push(Predicate::eq(columns::STATUS, status));
    }
    if let Some(start) = params.expiry_start_time() {
        filter.push(Predicate::gt(columns::EXPIRY, expiry_bound(start)?));
    }
    if let Some(end) = params.expiry_end_time() {
        filter.push(Predicate::lt(columns::EXPIRY, expiry_bound(end)?));
    }

    Ok(filter)
}

fn expiry_bound(text: &str) -> Result<bson::DateTime, DataError> {
    parse_any(text)
        .map(bson::DateTime::from_chrono)
        .map_err(|e| DataError::invalid_argument(format!("invalid expiry time: {e}")))
}

#[derive(Debug, Clone)]
pub struct CertificateQuery {
    repo: Repository<DbCertificate>,
}

impl CertificateQuery {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    fn default_order() -> Order {
        Order::new(vec![SortKey::desc(columns::ISSUED_AT)])
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: &CertListParams) -> Result<ListResult<FullCert>, DataError> {
        let filter = compose(params)?;
        let order = self.repo.order(params.order(), Self::default_order())?;
        let pagination = Pagination::new(params.page(), params.page_size())?;

        let query = Query::new(filter, order, pagination.window()).select(CertificateRow::COLUMNS);
        let page = self.repo.list_rows::<CertificateRow>(&query).await?;

        let mut skipped = page.skipped;
        let mut items = Vec::with_capacity(page.items.len());
        for row in page.items {
            let key = format!("{}/{}", row.serial_number, row.authority_key_identifier);
            match project(row) {
                Ok(cert) => items.push(cert),
                Err(e) => {
                    warn!(key, error = %e, "Skipping certificate that failed projection");
                    skipped += 1;
                }
            }
        }

        Ok(ListResult {
            items,
            total: page.total,
            skipped,
            page: pagination.page(),
            page_size: pagination.page_size(),
        })
    }

    /// Fetch one certificate by serial number (decimal or hex) and authority
    /// key identifier.
    #[instrument(skip(self))]
    pub async fn detail(&self, serial_number: &str, authority_key_identifier: &str) -> Result<FullCert, DataError> {
        let key = RecordKey::parse(serial_number, authority_key_identifier)?;
        let record = self.repo.get_one(&key).await?;

        project(CertificateRow::from(record)).map_err(|e| DataError::Lookup(StoreError::Internal(e.into())))
    }
}

impl From<DbCertificate> for CertificateRow {
    fn from(value: DbCertificate) -> Self {
        Self {
            serial_number: value.serial_number,
            authority_key_identifier: value.authority_key_identifier,
            ca_label: value.ca_label,
            common_name: value.common_name,
            status: value.status,
            not_before: value.not_before,
            expiry: value.expiry,
            issued_at: value.issued_at,
            revoked_at: value.revoked_at,
            pem: value.pem,
        }
    }
}
