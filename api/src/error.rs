use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;
use zaca_common::views::ApiErrorResponse;
use zaca_db::{DataError, ErrorKind, storage::StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Data(de) => match de.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InsertFailed | ErrorKind::UpdateFailed | ErrorKind::DeleteFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse {
            code: match &err {
                ApiError::Data(de) => Some(format!("{:?}", de.kind())),
                ApiError::Storage(_) => Some("StoreUnavailable".into()),
            },

            message: match &err {
                ApiError::Data(de) => match de.kind() {
                    ErrorKind::InvalidArgument => de.to_string(),
                    ErrorKind::NotFound => "The requested resource was not found.".into(),
                    ErrorKind::InsertFailed => "The record could not be saved.".into(),
                    ErrorKind::UpdateFailed => "The record could not be updated.".into(),
                    ErrorKind::DeleteFailed => "The record could not be deleted.".into(),
                },
                ApiError::Storage(_) => "The record store is unavailable.".into(),
            },

            #[cfg(debug_assertions)]
            details: Some(err.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Error returned by handler: {self}");
        } else {
            tracing::debug!("Error returned by handler: {self}");
        }

        (status_code, Json(Into::<ApiErrorResponse>::into(self))).into_response()
    }
}
