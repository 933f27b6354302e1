use axum::extract::State;

use crate::{context::ApiContext, error::ApiError};

pub mod certificates;
pub mod ocsp_responses;

#[cfg(test)]
mod tests;

/// Report whether the record store is reachable.
#[utoipa::path(
    get,
    path = "/healthz",
    tags = ["health"],
    responses(
        (status = 200, description = "The record store answered a ping", body = String),
        (status = 503, description = "The record store is unavailable"),
    )
)]
pub async fn health_check(State(ctx): State<ApiContext>) -> Result<&'static str, ApiError> {
    ctx.store.ping().await?;
    Ok("Healthy")
}
