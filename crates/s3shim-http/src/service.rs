//! The main S3 HTTP service implementing hyper's `Service` trait.
//!
//! [`S3HttpService`] ties together classification, dispatch, and response
//! rendering into a single hyper-compatible service. It handles:
//!
//! 1. Health check interception (`GET /_internal/health`)
//! 2. Backend reset (`GET /_internal/reset`, when enabled)
//! 3. S3 request classification via [`S3Router`]
//! 4. Request body collection
//! 5. Operation dispatch to the [`S3Handler`]
//! 6. Common response headers (`x-amz-request-id`, `x-amz-id-2`, `Server`, `Date`)
//! 7. Error response rendering

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use http::header::HeaderValue;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use s3shim_core::{S3Backend, S3Config};
use s3shim_model::S3Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::S3ResponseBody;
use crate::dispatch::{S3Handler, dispatch_operation};
use crate::handlers::BackendHandler;
use crate::response::{error_to_response, http_date};
use crate::router::S3Router;

const HEALTH_PATH: &str = "/_internal/health";
const RESET_PATH: &str = "/_internal/reset";
const SERVER_NAME: &str = "s3shim";

/// Configuration for the S3 HTTP service.
#[derive(Debug, Clone)]
pub struct S3HttpConfig {
    /// The host name of path-style requests; `<bucket>.<domain>` is subdomain style.
    pub domain: String,
    /// Whether to enable subdomain-style bucket addressing.
    pub virtual_hosting: bool,
    /// Whether `GET /_internal/reset` clears the backend.
    pub internal_reset: bool,
}

impl Default for S3HttpConfig {
    fn default() -> Self {
        Self {
            domain: "localhost".to_owned(),
            virtual_hosting: true,
            internal_reset: true,
        }
    }
}

impl From<&S3Config> for S3HttpConfig {
    fn from(config: &S3Config) -> Self {
        Self {
            domain: config.s3_domain.clone(),
            virtual_hosting: config.s3_virtual_hosting,
            internal_reset: config.internal_reset,
        }
    }
}

/// The S3 HTTP service that implements hyper's `Service` trait.
///
/// # Type Parameters
///
/// - `H`: The business logic handler implementing [`S3Handler`].
pub struct S3HttpService<H: S3Handler = BackendHandler> {
    handler: Arc<H>,
    router: S3Router,
    config: Arc<S3HttpConfig>,
    reset_target: Option<Arc<dyn S3Backend>>,
}

impl S3HttpService<BackendHandler> {
    /// Create a service serving directly from `backend`.
    ///
    /// The same backend is the target of `/_internal/reset` when
    /// [`S3HttpConfig::internal_reset`] is set.
    #[must_use]
    pub fn from_backend(backend: Arc<dyn S3Backend>, config: S3HttpConfig) -> Self {
        Self::new(BackendHandler::new(Arc::clone(&backend)), config).with_reset_target(backend)
    }
}

impl<H: S3Handler> S3HttpService<H> {
    /// Create a new S3 HTTP service with the given handler and configuration.
    #[must_use]
    pub fn new(handler: H, config: S3HttpConfig) -> Self {
        Self::from_shared(Arc::new(handler), config)
    }

    /// Create a new S3 HTTP service from an `Arc<H>` handler and configuration.
    #[must_use]
    pub fn from_shared(handler: Arc<H>, config: S3HttpConfig) -> Self {
        let router = S3Router::new(&config.domain, config.virtual_hosting);
        Self {
            handler,
            router,
            config: Arc::new(config),
            reset_target: None,
        }
    }

    /// Set the backend cleared by `/_internal/reset`.
    #[must_use]
    pub fn with_reset_target(mut self, backend: Arc<dyn S3Backend>) -> Self {
        self.reset_target = Some(backend);
        self
    }

    /// Run one request through the S3 pipeline.
    ///
    /// Never fails: every error is rendered into the returned response.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let response = self.process_request(req, &request_id).await;
        add_common_headers(response, &request_id)
    }

    async fn process_request<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let method = req.method().clone();
        let uri = req.uri().clone();
        debug!(%method, %uri, request_id, "processing S3 request");

        // 1. Internal endpoints.
        if method == http::Method::GET {
            match uri.path() {
                HEALTH_PATH => return health_check_response(),
                RESET_PATH if self.config.internal_reset => {
                    if let Some(backend) = &self.reset_target {
                        return reset_backend(backend.as_ref(), request_id).await;
                    }
                }
                _ => {}
            }
        }

        // 2. Classify.
        let desc = match self.router.resolve(&req) {
            Ok(desc) => desc,
            Err(err) => {
                warn!(%method, %uri, error = %err, request_id, "failed to classify S3 request");
                return error_to_response(&err, request_id);
            }
        };

        info!(
            operation = %desc.operation,
            bucket = ?desc.operation.bucket(),
            key = ?desc.operation.key(),
            request_id,
            "classified S3 request"
        );

        // 3. Collect body.
        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                error!(error = %err, request_id, "failed to collect request body");
                let s3_err = S3Error::internal_error("Failed to read request body");
                return error_to_response(&s3_err, request_id);
            }
        };

        // 4. Dispatch.
        match dispatch_operation(self.handler.as_ref(), desc, body).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, request_id, "S3 operation returned error");
                error_to_response(&err, request_id)
            }
        }
    }
}

impl<H: S3Handler> fmt::Debug for S3HttpService<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3HttpService")
            .field("router", &self.router)
            .field("config", &self.config)
            .field("reset_target", &self.reset_target)
            .finish_non_exhaustive()
    }
}

impl<H: S3Handler> Clone for S3HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router.clone(),
            config: Arc::clone(&self.config),
            reset_target: self.reset_target.clone(),
        }
    }
}

impl<H: S3Handler> Service<http::Request<Incoming>> for S3HttpService<H> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

async fn reset_backend(backend: &dyn S3Backend, request_id: &str) -> http::Response<S3ResponseBody> {
    match backend.reset().await {
        Ok(()) => {
            info!(request_id, "backend reset");
            http::Response::builder()
                .status(http::StatusCode::OK)
                .header("Content-Length", 0)
                .body(S3ResponseBody::empty())
                .expect("static reset response should be valid")
        }
        Err(err) => {
            error!(error = %err, request_id, "backend reset failed");
            error_to_response(&S3Error::from(err), request_id)
        }
    }
}

/// Produce a health check response.
fn health_check_response() -> http::Response<S3ResponseBody> {
    let body = serde_json::json!({
        "status": "running",
        "service": "s3",
        "version": env!("CARGO_PKG_VERSION"),
    });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(S3ResponseBody::from_string(body.to_string()))
        .expect("static health response should be valid")
}

/// Add common response headers to every S3 response.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amz-id-2", hv);
    }

    if let Ok(hv) = HeaderValue::from_str(&http_date(&Utc::now())) {
        headers.insert(http::header::DATE, hv);
    }

    headers.insert(http::header::SERVER, HeaderValue::from_static(SERVER_NAME));

    response
}
