use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::MatchedPath, http::{HeaderName, HeaderValue, Request, StatusCode}};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer}, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info_span;
use utoipa::{ToSchema, openapi::{Info, License, OpenApi, RefOr, path::Operation}};
use utoipa_axum::{router::OpenApiRouter, routes};
use zaca_common::views::ApiErrorResponse;
use zaca_db::storage::RecordStore;

use crate::{config::ZacaApiConfig, context::ApiContext, handlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the API router over `store`, along with its OpenAPI document.
pub fn make(cfg: ZacaApiConfig, store: Arc<dyn RecordStore>) -> anyhow::Result<(Router, OpenApi)> {
    let allow_origin = cfg
        .public_url
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid public URL {:?}", cfg.public_url))?;
    let request_timeout = cfg.request_timeout();
    let context = ApiContext::new(cfg, store);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    // Log the request ID as generated
                    let request_id = req.headers().get(REQUEST_ID_HEADER);
                    let span = info_span!(
                        "http_request",
                        method = req.method().to_string(),
                        request_id = Option::<&str>::None,
                        path = Option::<&str>::None,
                    );

                    if let Some(request_id) = request_id.and_then(|id| id.to_str().ok()) {
                        span.record("request_id", request_id);
                    };

                    if let Some(path) = req.extensions().get::<MatchedPath>() {
                        span.record("path", path.as_str())
                    } else {
                        span.record("path", req.uri().path())
                    };

                    span
                }),
        )
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(allow_origin)
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("ZACA Record Store API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build()
                ))
        )
        .build();

    let (r, mut a) = OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::health_check))
        .routes(routes!(
            handlers::certificates::list_certificates,
            handlers::certificates::add_certificate
        ))
        .routes(routes!(
            handlers::certificates::get_certificate,
            handlers::certificates::update_certificate,
            handlers::certificates::delete_certificate
        ))
        .routes(routes!(
            handlers::ocsp_responses::list_ocsp_responses,
            handlers::ocsp_responses::add_ocsp_response
        ))
        .routes(routes!(
            handlers::ocsp_responses::get_ocsp_response,
            handlers::ocsp_responses::update_ocsp_response,
            handlers::ocsp_responses::delete_ocsp_response
        ))
        .layer(middleware)
        .with_state(context)
        .split_for_parts();

    a.paths.paths.iter_mut().for_each(|(_path, item)| {
        apply_default_errors(&mut item.get);
        apply_default_errors(&mut item.post);
        apply_default_errors(&mut item.patch);
        apply_default_errors(&mut item.put);
        apply_default_errors(&mut item.delete);
    });

    Ok((r, a))
}

fn apply_default_errors(item: &mut Option<Operation>) {
    if let Some(item) = item {
        item.responses.responses.insert(
            "408".into(),
            RefOr::Ref(
                utoipa::openapi::Ref::builder()
                    .summary("Request timed out")
                    .ref_location_from_schema_name(ApiErrorResponse::name())
                    .build()
            )
        );

        item.responses.responses.insert(
            "500".into(),
            RefOr::Ref(
                utoipa::openapi::Ref::builder()
                    .summary("Internal server error")
                    .ref_location_from_schema_name(ApiErrorResponse::name())
                    .build()
            )
        );
    }
}
