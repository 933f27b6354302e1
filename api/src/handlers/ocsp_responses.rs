use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use zaca_common::{
    params::{NewOcspResponse, PaginationParams, UpdateOcspResponse},
    views::{Deleted, ListResult, Mutation, OcspResponse},
};
use zaca_db::{
    models::{DbOcspResponse, OcspResponsePatch, RecordKey},
    query::{Filter, Order, Pagination, SortKey},
};

use crate::{context::ApiContext, error::ApiError};

/// List stored OCSP responses, latest expiry first unless an order is given.
#[utoipa::path(
    get,
    path = "/api/v1/ocsp-responses",
    tags = ["ocsp"],
    params(PaginationParams),
    responses(
        (status = 200, description = "Stored OCSP responses", body = ListResult<OcspResponse>),
        (status = 400, description = "Invalid page size or order"),
    )
)]
pub async fn list_ocsp_responses(
    State(ctx): State<ApiContext>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ListResult<OcspResponse>>, ApiError> {
    let pagination = Pagination::new(params.page(), params.page_size())?;
    let order = ctx
        .ocsp_repo
        .order(params.order(), Order::new(vec![SortKey::desc("expiry")]))?;

    let page = ctx
        .ocsp_repo
        .get_all(Filter::new(), pagination, order)
        .await?;

    Ok(Json(ListResult {
        items: page.items.into_iter().map(Into::into).collect(),
        total: page.total,
        skipped: page.skipped,
        page: pagination.page(),
        page_size: pagination.page_size(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ocsp-responses",
    tags = ["ocsp"],
    request_body = NewOcspResponse,
    responses(
        (status = 201, description = "OCSP response stored", body = Mutation<OcspResponse>),
        (status = 400, description = "The serial number is not a decimal or hexadecimal integer"),
    )
)]
pub async fn add_ocsp_response(
    State(ctx): State<ApiContext>,
    Json(body): Json<NewOcspResponse>,
) -> Result<(StatusCode, Json<Mutation<OcspResponse>>), ApiError> {
    let record = DbOcspResponse::try_from(body)?;
    let (record, rows_affected) = ctx.ocsp_repo.add(record).await?;

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
    path = "/api/v1/ocsp-responses/{serial_number}/{authority_key_identifier}",
    tags = ["ocsp"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    responses(
        (status = 200, description = "Resolved OCSP response", body = OcspResponse),
        (status = 404, description = "No such OCSP response"),
    )
)]
pub async fn get_ocsp_response(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
) -> Result<Json<OcspResponse>, ApiError> {
    let key = RecordKey::parse(&serial_number, &authority_key_identifier)?;
    Ok(Json(ctx.ocsp_repo.get_one(&key).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/ocsp-responses/{serial_number}/{authority_key_identifier}",
    tags = ["ocsp"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    request_body = UpdateOcspResponse,
    responses(
        (status = 200, description = "OCSP response updated", body = Mutation<OcspResponse>),
        (status = 404, description = "No such OCSP response"),
    )
)]
pub async fn update_ocsp_response(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
    Json(body): Json<UpdateOcspResponse>,
) -> Result<Json<Mutation<OcspResponse>>, ApiError> {
    let key = RecordKey::parse(&serial_number, &authority_key_identifier)?;
    let (record, rows_affected) = ctx
        .ocsp_repo
        .update(&key, &OcspResponsePatch::from(body))
        .await?;

    Ok(Json(Mutation {
        record: record.into(),
        rows_affected,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ocsp-responses/{serial_number}/{authority_key_identifier}",
    tags = ["ocsp"],
    params(
        ("serial_number" = String, Path, description = "Serial number, decimal or hexadecimal"),
        ("authority_key_identifier" = String, Path, description = "Issuer's authority key identifier"),
    ),
    responses(
        (status = 200, description = "OCSP response deleted", body = Deleted),
        (status = 404, description = "No such OCSP response"),
    )
)]
pub async fn delete_ocsp_response(
    State(ctx): State<ApiContext>,
    Path((serial_number, authority_key_identifier)): Path<(String, String)>,
) -> Result<Json<Deleted>, ApiError> {
    let key = RecordKey::parse(&serial_number, &authority_key_identifier)?;
    let rows_affected = ctx.ocsp_repo.delete(&key).await?;

    Ok(Json(Deleted { rows_affected }))
}
