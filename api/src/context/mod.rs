use std::sync::Arc;

use zaca_db::{
    certificates::CertificateQuery,
    models::{DbCertificate, DbOcspResponse},
    repository::Repository,
    storage::RecordStore,
};

use crate::config::ZacaApiConfig;

#[derive(Debug, Clone)]
pub struct ApiContext {
    pub _config: ZacaApiConfig,
    pub store: Arc<dyn RecordStore>,
    pub certificates: CertificateQuery,
    pub certificate_repo: Repository<DbCertificate>,
    pub ocsp_repo: Repository<DbOcspResponse>,
}

impl ApiContext {
    pub fn new(config: ZacaApiConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            _config: config,
            certificates: CertificateQuery::new(store.clone()),
            certificate_repo: Repository::new(store.clone()),
            ocsp_repo: Repository::new(store.clone()),
            store,
        }
    }
}
