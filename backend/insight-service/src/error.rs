use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;
use crate::services::RankingError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<RankingError> for AppError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::InvalidArgument(msg) => AppError::BadRequest(msg),
            RankingError::UnknownCohortValue { .. } => AppError::BadRequest(err.to_string()),
            RankingError::NotFound(msg) => AppError::NotFound(msg),
            RankingError::UpstreamUnavailable(e) => AppError::ServiceUnavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tikhub::TikHubError;

    #[test]
    fn test_ranking_error_status_mapping() {
        let cases = vec![
            (
                RankingError::InvalidArgument("limit".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RankingError::NotFound("video 1".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                RankingError::UpstreamUnavailable(TikHubError::Transport("reset".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_error_body_is_envelope() {
        let response = AppError::NotFound("video 1".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
