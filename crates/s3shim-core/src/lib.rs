//! Storage layer of the s3shim server.
//!
//! # Architecture
//!
//! ```text
//! s3shim-http (classification, dispatch, rendering)
//!        |
//!        v
//!   S3Backend (capability trait)
//!     |-- InMemoryBackend  (map lock -> per-bucket lock)
//!     `-- DiskBackend      (one directory per bucket)
//! ```
//!
//! Supporting modules: [`listing`] pages through a key snapshot,
//! [`checksums`] computes ETags and verifies `Content-MD5`, [`config`] loads
//! [`S3Config`] from the environment.

pub mod backend;
pub mod checksums;
pub mod config;
pub mod error;
pub mod listing;

pub use backend::{DiskBackend, InMemoryBackend, S3Backend};
pub use config::{BackendKind, S3Config};
pub use error::S3ServiceError;
