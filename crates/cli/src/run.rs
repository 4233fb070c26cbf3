//! One backup run, start to finish
//!
//! Linear pipeline with no retry: generate backup, compute filename,
//! create store client, upload, cleanup. The first failing stage aborts
//! the run; stage names are attached as context only.

use anyhow::{Context, Result};
use jiff::Timestamp;

use tnb_appliance::{generate_backup, ApplianceConfig};
use tnb_core::{backup_filename, object_key, prune_expired, Config, ObjectStore as _};
use tnb_s3::{S3Client, StoreConfig};

/// Content type for uploaded archives
const ARCHIVE_CONTENT_TYPE: &str = "application/x-tar";

/// Execute one backup run, returning the uploaded filename
pub async fn run(config: &Config) -> Result<String> {
    let run_start = Timestamp::now();

    let appliance = ApplianceConfig {
        base_url: config.truenas_url.clone(),
        api_key: config.truenas_api_key.clone(),
        verify_ssl: config.verify_ssl,
    };
    let archive = generate_backup(&appliance)
        .await
        .context("generating backup")?;

    let filename = backup_filename(&config.truenas_name, run_start);

    let store = S3Client::new(&StoreConfig {
        endpoint: config.s3_endpoint.clone(),
        region: config.s3_region.clone(),
        access_key: config.s3_access_key.clone(),
        secret_key: config.s3_secret_key.clone(),
        bucket: config.s3_bucket.clone(),
    })
    .await
    .context("creating S3 client")?;

    let key = object_key(&config.s3_prefix, &filename);
    tracing::info!(bucket = %config.s3_bucket, key = %key, "uploading archive");
    store
        .put_object(&key, archive, ARCHIVE_CONTENT_TYPE)
        .await
        .context("uploading archive")?;

    let report = prune_expired(
        &store,
        &config.s3_prefix,
        config.retention_days,
        Timestamp::now(),
    )
    .await
    .context("cleanup")?;
    tracing::info!(deleted = report.deleted, "cleanup: removed old backup(s)");

    Ok(filename)
}
