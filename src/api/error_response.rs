//! HTTP error response handling for the API
//!
//! Converts fatal harvest errors into JSON bodies with the status code from
//! [`ToHttpStatus`].

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// A bare [`ApiError`] carries no status of its own; requests that fail before
/// reaching the harvester are answered as bad requests
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, FetchError, FetchFailure, InputError};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let response = Error::Input(InputError::MissingUrl).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "missing_url");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_page_is_bad_gateway_with_details() {
        let error = Error::Extraction(ExtractionError::PageUnreachable(FetchError::new(
            "https://x.com/",
            FetchFailure::Status(500),
        )));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "page_unreachable");
        assert_eq!(json["error"]["details"]["url"], "https://x.com/");
    }

    #[tokio::test]
    async fn test_no_documents_is_unprocessable() {
        let error = Error::Extraction(ExtractionError::NoDocumentsFound {
            url: "https://x.com/".into(),
            kind: "PDF".into(),
        });
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_bare_api_error_is_bad_request() {
        let response = ApiError::validation("body is not JSON").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(json["error"]["message"], "body is not JSON");
    }
}
