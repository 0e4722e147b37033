// Paddock
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic code for REST handlers.
//!
//! A service exposes an `app` function in its `rest` module that builds the `Router` for all of
//! its APIs.  Each API lives in a file of its own named `<entity>_<method>.rs` (or
//! `<entities>_<method>.rs` for operations on collections), next to the tests that exercise it.
//!
//! Tests in those files declare a `route` function with the method and path of the API under
//! test and send all their requests through it via `testutils::OneShotBuilder`.  A `TestContext`
//! in the service's own `rest::testutils` module gives tests direct access to the database.

use crate::service::ServiceError;
use async_trait::async_trait;
use axum::Json;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

/// Errors returned to the client.  Each variant maps to one HTTP status code.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Failure on the server side, including an unreachable database.  Maps to 500.
    #[error("{0}")]
    InternalError(String),

    /// The request carries values that the business rules reject.  Maps to 400.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request references an entity that does not exist.  Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// The request carries a body but the API does not take one.  Maps to 413.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl From<ServiceError> for RestError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::BackendError(_) => RestError::InternalError(e.to_string()),
            ServiceError::InvalidArgument(_) => RestError::InvalidRequest(e.to_string()),
            ServiceError::NotFound(_) => RestError::NotFound(e.to_string()),
            ServiceError::Unavailable(_) => RestError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
        };

        let response = ErrorResponse { detail: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Body of every error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Human-readable description of the error.
    pub(crate) detail: String,
}

/// Extractor for APIs that take no body.  Rejects requests that carry one.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// In-process HTTP harness to exercise a `Router` from tests.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::ErrorResponse;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{self, StatusCode, header};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Upper bound on the size of the response bodies read by tests.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builds and sends a single request to a router.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router that receives the request.
        app: Router,

        /// Method of the request.
        method: http::Method,

        /// Path and, optionally, query of the request.
        uri: String,
    }

    impl OneShotBuilder {
        /// Prepares a request for the `method`/`uri` pair against `app`.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            Self { app, method, uri: uri.as_ref().to_owned() }
        }

        /// Appends `query`, serialized as form data, to the request URI.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            assert!(
                !self.uri.contains(|c| c == '?' || c == '#'),
                "URI already has a query or fragment: {}",
                self.uri
            );
            let query = serde_urlencoded::to_string(query).unwrap();
            self.uri = format!("{}?{}", self.uri, query);
            self
        }

        /// Sends the request with `body`, labeled as `content_type` if given.
        pub async fn send_raw(self, content_type: Option<&str>, body: Body) -> ResponseChecker {
            let mut builder = http::Request::builder().method(self.method).uri(self.uri);
            if let Some(content_type) = content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            let response = self.app.oneshot(builder.body(body).unwrap()).await.unwrap();
            ResponseChecker {
                status: response.status(),
                exp_status: StatusCode::OK,
                body: response.into_body(),
            }
        }

        /// Sends the request without a body.
        pub async fn send_empty(self) -> ResponseChecker {
            self.send_raw(None, Body::empty()).await
        }

        /// Sends the request with a plain text body.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            self.send_raw(Some(mime::TEXT_PLAIN.as_ref()), Body::from(text.into())).await
        }

        /// Sends the request with `value` serialized as a JSON body.
        pub async fn send_json<T: Serialize>(self, value: T) -> ResponseChecker {
            let body = Body::from(serde_json::to_vec(&value).unwrap());
            self.send_raw(Some(mime::APPLICATION_JSON.as_ref()), body).await
        }
    }

    /// Checks the response to a request sent by `OneShotBuilder`.
    ///
    /// The status is only verified once the body is consumed by one of the `expect_*` methods.
    #[must_use]
    pub struct ResponseChecker {
        /// Status of the response.
        status: StatusCode,

        /// Status that the response should have.  Defaults to `200 OK`.
        exp_status: StatusCode,

        /// Body of the response, not yet read.
        body: Body,
    }

    impl ResponseChecker {
        /// Sets the status that the response should have.
        pub fn expect_status(mut self, status: StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Verifies the status and returns the body as text.
        async fn into_text(self) -> String {
            assert_eq!(self.exp_status, self.status, "Unexpected HTTP status");
            let bytes = axum::body::to_bytes(self.body, MAX_BODY_SIZE).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        /// Expects an `ErrorResponse` whose detail matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            let body = self.into_text().await;
            let response: ErrorResponse = serde_json::from_str(&body)
                .unwrap_or_else(|e| panic!("Body is not an error response ({}): {}", e, body));
            assert_matches(exp_re, &response.detail);
        }

        /// Expects a body with a JSON representation of `T` and returns it.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            let body = self.into_text().await;
            serde_json::from_str(&body)
                .unwrap_or_else(|e| panic!("Body is not valid JSON ({}): {}", e, body))
        }

        /// Expects a plain text body that matches `exp_re`.  This is what axum's own rejections
        /// look like.
        pub async fn expect_text(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Cannot match an empty body");
            let body = self.into_text().await;
            assert!(
                serde_json::from_str::<ErrorResponse>(&body).is_err(),
                "Use expect_error to check error responses"
            );
            assert_matches(exp_re, &body);
        }
    }

    /// Asserts that `text` matches the regular expression `exp_re`.
    fn assert_matches(exp_re: &str, text: &str) {
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(text), "'{}' does not match '{}'", text, exp_re);
    }

    /// Generates a `test_payload_must_be_json` test for the API at `route`, which must only
    /// accept JSON bodies.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                use $crate::rest::testutils::OneShotBuilder;
                use axum::http::StatusCode;

                OneShotBuilder::new($app, $route)
                    .send_text("not json")
                    .await
                    .expect_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_text("Content-Type")
                    .await;

                OneShotBuilder::new($app, $route)
                    .send_raw(Some("application/json"), axum::body::Body::from("not json"))
                    .await
                    .expect_status(StatusCode::BAD_REQUEST)
                    .expect_text("expected ident")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Generates a `test_payload_must_be_empty` test for the API at `route`, which must reject
    /// requests that carry a body.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    .send_text("unexpected")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("^Content should be empty$")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}
