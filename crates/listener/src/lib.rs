//! Code deployer HTTP endpoint layer.
//!
//! Exposes the deployment pipeline over HTTP with `axum`:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/` | [`deployer::ServiceInfo`] |
//! | `GET` | `/health` | [`response::HealthStatus`] |
//! | `POST` | `/build` | [`deployer::BuildResult`] or [`response::ErrorBody`] |
//! | `POST` | `/revise` | [`deployer::ReviseResult`] or [`response::ErrorBody`] |
//!
//! Every request runs inside a `request` span carrying a fresh
//! [`deployer::RequestId`], which is also returned in the `x-request-id`
//! response header.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, body decoding, and status-code mapping live
//! here. The [`deployer`] crate never sees HTTP types.

pub mod handlers;
pub mod response;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use deployer::{DeploymentService, RequestId, ServiceInfo};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, info_span, Instrument};

/// Response header carrying the request's correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors raised while running the HTTP server.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DeploymentService,
    pub info: Arc<ServiceInfo>,
}

impl AppState {
    pub fn new(service: DeploymentService, info: ServiceInfo) -> Self {
        Self {
            service,
            info: Arc::new(info),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health))
        .route("/build", post(handlers::build))
        .route("/revise", post(handlers::revise))
        .layer(middleware::from_fn(request_span))
        .with_state(state)
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    info!(addr = %local, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}

async fn request_span(request: Request, next: Next) -> Response {
    let request_id = RequestId::new_random();
    let span = info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    span.in_scope(|| info!(status = response.status().as_u16(), "request completed"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ErrorBody, HealthStatus};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use deployer::{
        BuildResult, CommitSha, CredentialChecker, DeploymentSettings, FileCommit, HostingError,
        PagesSource, RepositoryHost, RepositoryRef, ResultStatus, ReviseResult,
    };
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    const SECRET: &str = "configured-secret";

    #[derive(Default)]
    struct FakeGitHub {
        calls: Mutex<Vec<&'static str>>,
        reject_create: bool,
    }

    #[async_trait]
    impl RepositoryHost for FakeGitHub {
        async fn create_repository(
            &self,
            _repository: &RepositoryRef,
            _description: &str,
        ) -> Result<(), HostingError> {
            self.calls.lock().unwrap().push("create_repository");
            if self.reject_create {
                return Err(HostingError::Api {
                    status: 422,
                    body: r#"{"message":"name already exists on this account"}"#.to_string(),
                });
            }
            Ok(())
        }

        async fn push_file(
            &self,
            _repository: &RepositoryRef,
            _file: &FileCommit,
        ) -> Result<Option<CommitSha>, HostingError> {
            self.calls.lock().unwrap().push("push_file");
            Ok(None)
        }

        async fn enable_pages(
            &self,
            _repository: &RepositoryRef,
            _source: &PagesSource,
        ) -> Result<(), HostingError> {
            self.calls.lock().unwrap().push("enable_pages");
            Ok(())
        }
    }

    fn app(host: Arc<FakeGitHub>) -> Router {
        let settings = DeploymentSettings::new(
            DeploymentSettings::DEFAULT_BRANCH,
            DeploymentSettings::DEFAULT_ENTRY_FILE,
        )
        .unwrap();
        let service = DeploymentService::new(
            host,
            CredentialChecker::new(Some(SECRET.to_string())),
            settings,
        );
        router(AppState::new(service, ServiceInfo::new("0.1.0")))
    }

    fn build_body() -> Value {
        json!({
            "email": "dev@example.com",
            "secret": SECRET,
            "project_name": "my-site",
            "code": "<h1>Hello</h1>",
            "github_username": "octocat",
        })
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body.to_string())).await
    }

    #[tokio::test]
    async fn test_root_lists_exactly_build_and_revise() {
        let (status, body) = send(app(Arc::default()), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"], json!(["/build", "/revise"]));
        assert_eq!(body["name"], "Code Deployer");
        assert_eq!(body["version"], "0.1.0");
        assert!(body["features"].as_array().is_some());
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Arc::default()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthStatus = serde_json::from_value(body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "code-deployer");
    }

    #[tokio::test]
    async fn test_build_success() {
        let host = Arc::new(FakeGitHub::default());
        let (status, body) = post_json(app(host.clone()), "/build", &build_body()).await;

        assert_eq!(status, StatusCode::OK);
        let result: BuildResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.repository_url, "https://github.com/octocat/my-site");
        assert_eq!(result.pages_url, "https://octocat.github.io/my-site/");
        assert_eq!(
            *host.calls.lock().unwrap(),
            vec!["create_repository", "push_file", "enable_pages"]
        );
    }

    #[tokio::test]
    async fn test_build_missing_fields_is_400() {
        for field in ["email", "secret", "project_name", "code"] {
            let mut body = build_body();
            body.as_object_mut().unwrap().remove(field);

            let host = Arc::new(FakeGitHub::default());
            let (status, body) = post_json(app(host.clone()), "/build", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
            let err: ErrorBody = serde_json::from_value(body).unwrap();
            assert_eq!(err.status, ResultStatus::Error);
            assert_eq!(err.kind, "validation_error");
            assert!(host.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_build_invalid_email_is_400() {
        let mut body = build_body();
        body["email"] = json!("not-an-email");
        let (status, body) = post_json(app(Arc::default()), "/build", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = send(
            app(Arc::default()),
            Method::POST,
            "/build",
            Some("{not json".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation_error");
    }

    #[tokio::test]
    async fn test_build_wrong_secret_is_401() {
        let mut body = build_body();
        body["secret"] = json!("some-other-secret");
        let (status, body) = post_json(app(Arc::default()), "/build", &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "auth_error");
    }

    #[tokio::test]
    async fn test_build_repository_conflict_is_500_and_stops() {
        let host = Arc::new(FakeGitHub {
            reject_create: true,
            ..Default::default()
        });
        let (status, body) = post_json(app(host.clone()), "/build", &build_body()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "github_api_error");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("422"));
        assert!(message.contains("name already exists"));
        assert_eq!(*host.calls.lock().unwrap(), vec!["create_repository"]);
    }

    #[tokio::test]
    async fn test_revise_always_succeeds_when_authenticated() {
        let host = Arc::new(FakeGitHub::default());
        let body = json!({
            "email": "dev@example.com",
            "secret": SECRET,
            "project_id": "does-not-exist",
            "changes": "Change the title",
        });
        let (status, body) = post_json(app(host.clone()), "/revise", &body).await;

        assert_eq!(status, StatusCode::OK);
        let result: ReviseResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.status, ResultStatus::Success);
        assert!(host.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revise_status_codes() {
        let missing = json!({ "email": "dev@example.com", "secret": SECRET, "changes": "x" });
        let (status, _) = post_json(app(Arc::default()), "/revise", &missing).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let wrong = json!({
            "email": "dev@example.com",
            "secret": "wrong",
            "project_id": "octocat/my-site",
            "changes": "x",
        });
        let (status, _) = post_json(app(Arc::default()), "/revise", &wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unconfigured_secret_is_500() {
        let settings = DeploymentSettings::new("main", "index.html").unwrap();
        let service = DeploymentService::new(
            Arc::new(FakeGitHub::default()),
            CredentialChecker::new(None),
            settings,
        );
        let app = router(AppState::new(service, ServiceInfo::new("0.1.0")));

        let (status, body) = post_json(app, "/build", &build_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "config_error");
    }
}
