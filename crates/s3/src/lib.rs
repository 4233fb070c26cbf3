//! tnb-s3: aws-sdk-s3 adapter for truenas-backup
//!
//! Implements the `ObjectStore` trait from tnb-core against any
//! S3-compatible endpoint using static credentials and path-style
//! addressing.

pub mod client;

pub use client::{S3Client, StoreConfig};
