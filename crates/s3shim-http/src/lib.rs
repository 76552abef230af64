//! S3 request classification, dispatch, response rendering, and hyper service.
//!
//! - **Classification** ([`router`]): Maps HTTP requests to a
//!   [`RequestDescriptor`](s3shim_model::RequestDescriptor) by examining host,
//!   path, method, query parameters, and headers. Supports both path-style and
//!   subdomain-style bucket addressing.
//!
//! - **Dispatch** ([`dispatch`]): Routes classified requests to the business
//!   logic via the [`S3Handler`](dispatch::S3Handler) trait.
//!
//! - **Handlers** ([`handlers`]): [`BackendHandler`](handlers::BackendHandler)
//!   serves every operation from an `S3Backend`.
//!
//! - **Service** ([`service`]): [`S3HttpService`](service::S3HttpService)
//!   implements hyper's `Service` trait.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> S3HttpService (hyper Service)
//!     -> /_internal/health, /_internal/reset interception
//!     -> S3Router (addressing style + operation identification)
//!     -> Body collection
//!     -> dispatch_operation (S3Handler trait)
//!     -> Common response headers (x-amz-request-id, Server, Date)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use s3shim_core::InMemoryBackend;
//! use s3shim_http::service::{S3HttpConfig, S3HttpService};
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let service = S3HttpService::from_backend(backend, S3HttpConfig::default());
//! // Use `service` with hyper server.
//! ```

// S3Error is the error type of every fallible classification and dispatch step.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod credential;
pub mod dispatch;
pub mod handlers;
pub mod response;
pub mod router;
pub mod service;

pub use body::S3ResponseBody;
pub use dispatch::S3Handler;
pub use handlers::BackendHandler;
pub use router::S3Router;
pub use service::{S3HttpConfig, S3HttpService};
