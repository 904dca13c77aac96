//! S3 publish client.
//!
//! This crate provides:
//! - Env-configured S3 client
//! - Overwrite-style publish (delete existing object, then upload)
//! - CDN URL issuance with a cache-busting query parameter

pub mod client;
pub mod error;
pub mod publish;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use publish::cdn_url;
