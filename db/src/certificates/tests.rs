use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use zaca_common::params::CertListParams;

use super::*;
use crate::{error::ErrorKind, storage::memory::MemoryStorage};

fn pem_for(common_name: &str, is_ca: bool) -> String {
    let key_pair = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(vec![format!("{common_name}.example.com")]).unwrap();
    params.distinguished_name.push(DnType::CommonName, common_name);
    if is_ca {
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    }
    params.self_signed(&key_pair).unwrap().pem()
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn record(serial: &str, ca_label: &str, expiry: DateTime<Utc>, issued_at: DateTime<Utc>, pem: &str) -> DbCertificate {
    DbCertificate {
        serial_number: serial.into(),
        authority_key_identifier: "aki-1".into(),
        ca_label: ca_label.into(),
        common_name: format!("svc-{serial}"),
        status: "good".into(),
        reason: 0,
        not_before: day(2020, 1, 1).into(),
        expiry: expiry.into(),
        issued_at: issued_at.into(),
        revoked_at: None,
        pem: pem.into(),
    }
}

async fn service(records: Vec<DbCertificate>) -> CertificateQuery {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStorage::new());
    let repo = Repository::<DbCertificate>::new(store.clone());
    for record in records {
        repo.add(record).await.unwrap();
    }
    CertificateQuery::new(store)
}

fn serials(result: &ListResult<FullCert>) -> Vec<&str> {
    result.items.iter().map(|c| c.serial_number.as_str()).collect()
}

#[test]
fn test_compose_empty_params() {
    let filter = compose(&CertListParams::default()).unwrap();
    assert!(filter.is_empty());

    let blank = CertListParams {
        cert_sn: Some(String::new()),
        role: Some(String::new()),
        expiry_start_time: Some(String::new()),
        ..Default::default()
    };
    assert!(compose(&blank).unwrap().is_empty());
}

#[test]
fn test_compose_field_order() {
    let params = CertListParams {
        expiry_end_time: Some("2023-12-31".into()),
        status: Some("revoked".into()),
        role: Some("Intermediate".into()),
        cert_sn: Some("ff".into()),
        expiry_start_time: Some("2023-01-01".into()),
        unique_id: Some("svc-a".into()),
        ..Default::default()
    };

    let filter = compose(&params).unwrap();
    assert_eq!(
        filter.predicates(),
        &[
            Predicate::eq("serial_number", "255"),
            Predicate::eq("ca_label", "intermediate"),
            Predicate::eq("common_name", "svc-a"),
            Predicate::eq("status", "revoked"),
            Predicate::gt("expiry", bson::DateTime::from_chrono(day(2023, 1, 1))),
            Predicate::lt("expiry", bson::DateTime::from_chrono(day(2023, 12, 31))),
        ]
    );
}

#[test]
fn test_compose_serial_forms() {
    let zero = CertListParams {
        cert_sn: Some("00".into()),
        ..Default::default()
    };
    assert_eq!(compose(&zero).unwrap().predicates(), &[Predicate::eq("serial_number", "0")]);

    let hex = CertListParams {
        cert_sn: Some("1a3f".into()),
        ..Default::default()
    };
    assert_eq!(compose(&hex).unwrap().predicates(), &[Predicate::eq("serial_number", "6719")]);
}

#[test]
fn test_compose_rejects_bad_input() {
    let bad_sn = CertListParams {
        cert_sn: Some("xyz".into()),
        ..Default::default()
    };
    assert_eq!(compose(&bad_sn).unwrap_err().kind(), ErrorKind::InvalidArgument);

    let bad_date = CertListParams {
        expiry_end_time: Some("not a date".into()),
        ..Default::default()
    };
    let err = compose(&bad_date).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("invalid expiry time"), "{err}");
}

#[tokio::test]
async fn test_list_role_is_case_insensitive() {
    let pem = pem_for("svc", false);
    let service = service(vec![
        record("1", "intermediate", day(2030, 1, 1), day(2022, 1, 1), &pem),
        record("2", "root", day(2030, 1, 1), day(2022, 1, 2), &pem),
        record("3", "intermediate", day(2030, 1, 1), day(2022, 1, 3), &pem),
    ])
    .await;

    for role in ["Intermediate", "INTERMEDIATE", "intermediate"] {
        let params = CertListParams {
            role: Some(role.into()),
            ..Default::default()
        };
        let result = service.list(&params).await.unwrap();
        assert_eq!(serials(&result), vec!["3", "1"], "role {role}");
        assert_eq!(result.total, 2);
    }
}

#[tokio::test]
async fn test_list_expiry_window_is_exclusive() {
    let pem = pem_for("svc", false);
    let service = service(vec![
        record("10", "intermediate", day(2022, 12, 31), day(2022, 1, 1), &pem),
        record("11", "intermediate", day(2023, 1, 1), day(2022, 1, 2), &pem),
        record("12", "intermediate", day(2023, 3, 15), day(2022, 1, 3), &pem),
        record("13", "intermediate", day(2023, 6, 1), day(2022, 1, 4), &pem),
        record("14", "intermediate", day(2023, 12, 31), day(2022, 1, 5), &pem),
        record("15", "intermediate", day(2024, 1, 1), day(2022, 1, 6), &pem),
    ])
    .await;

    let params = CertListParams {
        expiry_start_time: Some("2023-01-01".into()),
        expiry_end_time: Some("2023-12-31".into()),
        ..Default::default()
    };
    let result = service.list(&params).await.unwrap();

    assert_eq!(serials(&result), vec!["13", "12"]);
    assert_eq!(result.total, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.page, 0);
    assert_eq!(result.page_size, 20);
}

#[tokio::test]
async fn test_list_skips_unprojectable_rows() {
    let pem = pem_for("svc", false);
    let service = service(vec![
        record("1", "intermediate", day(2030, 1, 1), day(2022, 1, 1), &pem),
        record("2", "intermediate", day(2030, 1, 1), day(2022, 1, 2), "-----BEGIN GARBAGE-----"),
        record("3", "intermediate", day(2030, 1, 1), day(2022, 1, 3), &pem),
    ])
    .await;

    let result = service.list(&CertListParams::default()).await.unwrap();
    assert_eq!(serials(&result), vec!["3", "1"]);
    assert_eq!(result.total, 3);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn test_list_pages_and_orders() {
    let pem = pem_for("svc", false);
    let records = (1..=5)
        .map(|n| record(&n.to_string(), "intermediate", day(2030, 1, n), day(2022, 1, 6 - n), &pem))
        .collect();
    let service = service(records).await;

    let params = CertListParams {
        order: Some("expiry asc".into()),
        page: Some(2),
        page_size: Some(2),
        ..Default::default()
    };
    let result = service.list(&params).await.unwrap();
    assert_eq!(serials(&result), vec!["3", "4"]);
    assert_eq!(result.total, 5);
    assert_eq!(result.pages(), 3);

    let bad_order = CertListParams {
        order: Some("pem desc".into()),
        ..Default::default()
    };
    assert_eq!(service.list(&bad_order).await.unwrap_err().kind(), ErrorKind::InvalidArgument);

    let zero_size = CertListParams {
        page_size: Some(0),
        ..Default::default()
    };
    assert_eq!(service.list(&zero_size).await.unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_list_no_matches() {
    let service = service(vec![]).await;
    let params = CertListParams {
        status: Some("revoked".into()),
        ..Default::default()
    };

    let result = service.list(&params).await.unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.total, 0);
}

#[tokio::test]
async fn test_detail() {
    let pem = pem_for("gateway", true);
    let service = service(vec![
        record("255", "root", day(2030, 1, 1), day(2022, 1, 1), &pem),
        record("256", "root", day(2030, 1, 1), day(2022, 1, 1), "not a pem"),
    ])
    .await;

    let cert = service.detail("ff", "aki-1").await.unwrap();
    assert_eq!(cert.serial_number, "255");
    assert_eq!(cert.ca_label, "root");
    assert!(cert.details.is_ca);
    assert!(cert.details.subject.contains("CN=gateway"), "{}", cert.details.subject);
    assert_eq!(cert.details.subject, cert.details.issuer);
    assert_eq!(cert.details.dns_names, vec!["gateway.example.com"]);
    assert!(cert.details.fingerprint.starts_with("sha256:"));
    assert_eq!(cert.details.fingerprint.len(), "sha256:".len() + 64);

    let missing = service.detail("255", "other-aki").await.unwrap_err();
    assert!(matches!(missing, DataError::NotFound));

    let broken = service.detail("256", "aki-1").await.unwrap_err();
    assert_eq!(broken.kind(), ErrorKind::NotFound);

    let invalid = service.detail("zz-top", "aki-1").await.unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
}
