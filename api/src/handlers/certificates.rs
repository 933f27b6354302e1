use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use zaca_common::{
    params::{CertListParams, NewCertificate, UpdateCertificate},
    views::{CertificateRecord, Deleted, FullCert, ListResult, Mutation},
};
use zaca_db::models::{CertificatePatch, DbCertificate, RecordKey};

use crate::{context::ApiContext, error::ApiError};

/// List certificates matching the given filters, newest first unless an
/// order is given.
#[utoipa::path(
    get,
    path = "/api/v1/certificates",
    tags = ["certificates"],
    params(CertListParams),
    responses(
        (status = 200, description = "Matching certificates", body = ListResult<FullCert>),
        (status = 400, description = "A filter could not be parsed"),
    )
)]
pub async fn list_certificates(
    State(ctx): State<ApiContext>,
    Query(params): Query<CertListParams>,
) -> Result<Json<ListResult<FullCert>>, ApiError> {
    Ok(Json(ctx.certificates.list(&params).await?))
}

/// Record a certificate, replacing any stored under the same serial number
/// and authority key identifier.
#[utoipa::path(
    post,
    path = "/api/v1/certificates",
    tags = ["certificates"],
    request_body = NewCertificate,
    responses(
        (status = 201, description = "Certificate stored", body = Mutation<CertificateRecord>),
        (status = 400, description = "The serial number is not a decimal or hexadecimal integer"),
    )
)]
pub async fn add_certificate(
    State(ctx): State<ApiContext>,
    Json(body): Json<NewCertificate>,
) -> Result<(StatusCode, Json<Mutation<CertificateRecord>>), ApiError> {
    let record = DbCertificate::try_from(body)?;
    let (record, rows_affected) = ctx.certificate_repo.add(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(Mutation {
            record: record.into(),
            rows_affected,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/{serial_number}/{authority_key_identifier}",
    tags = ["certificates"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    responses(
        (status = 200, description = "Resolved certificate", body = FullCert),
        (status = 404, description = "No such certificate"),
    )
)]
pub async fn get_certificate(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
) -> Result<Json<FullCert>, ApiError> {
    Ok(Json(
        ctx.certificates
            .detail(&serial_number, &authority_key_identifier)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/certificates/{serial_number}/{authority_key_identifier}",
    tags = ["certificates"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    request_body = UpdateCertificate,
    responses(
        (status = 200, description = "Certificate updated", body = Mutation<CertificateRecord>),
        (status = 404, description = "No such certificate"),
    )
)]
pub async fn update_certificate(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
    Json(body): Json<UpdateCertificate>,
) -> Result<Json<Mutation<CertificateRecord>>, ApiError> {
    let key = RecordKey::parse(&serial_number, &authority_key_identifier)?;
    let (record, rows_affected) = ctx
        .certificate_repo
        .update(&key, &CertificatePatch::from(body))
        .await?;

    Ok(Json(Mutation {
        record: record.into(),
        rows_affected,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/certificates/{serial_number}/{authority_key_identifier}",
    tags = ["certificates"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    responses(
        (status = 200, description = "Certificate deleted", body = Deleted),
        (status = 404, description = "No such certificate"),
    )
)]
pub async fn delete_certificate(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
) -> Result<Json<Deleted>, ApiError> {
    let key = RecordKey::parse(&serial_number, &authority_key_identifier)?;
    let rows_affected = ctx.certificate_repo.delete(&key).await?;

    Ok(Json(Deleted { rows_affected }))
}
