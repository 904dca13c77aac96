//! Asset fetch: remote URL download or local path validation.
//!
//! Remote references are streamed into the request workspace so every
//! downstream step operates on a local, seekable file. A non-existent local
//! reference is a fatal input error, not a fallback case.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use pvid_models::MediaAsset;

use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Timeout for a single remote fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a reference is a remote URL.
fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Obtain a local file for `reference`.
///
/// URLs are downloaded into `workdir` with the given extension; local paths
/// are returned as-is after an existence check.
pub async fn fetch_asset(
    reference: &str,
    workdir: impl AsRef<Path>,
    file_ext: &str,
) -> MediaResult<PathBuf> {
    if reference.is_empty() {
        return Err(MediaError::fetch_failed(reference, "empty asset reference"));
    }

    if !is_remote(reference) {
        let path = PathBuf::from(reference);
        if !path.exists() {
            return Err(MediaError::FileNotFound(path));
        }
        return Ok(path);
    }

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| MediaError::fetch_failed(reference, e.to_string()))?;

    let response = client
        .get(reference)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| MediaError::fetch_failed(reference, e.to_string()))?;

    let dest = workdir
        .as_ref()
        .join(format!("{}.{}", uuid_like_name(reference), file_ext));
    let mut file = tokio::fs::File::create(&dest).await?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::fetch_failed(reference, e.to_string()))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!("Downloaded {} -> {}", reference, dest.display());
    Ok(dest)
}

/// Fetch and probe a reference into a resolved asset.
pub async fn resolve_asset(
    reference: &str,
    workdir: impl AsRef<Path>,
    file_ext: &str,
) -> MediaResult<MediaAsset> {
    let path = fetch_asset(reference, workdir, file_ext).await?;
    let info = probe_media(&path).await?;
    debug!(
        "Resolved {}: {:.2}s {}x{}",
        reference, info.duration, info.width, info.height
    );
    Ok(MediaAsset {
        source: reference.to_string(),
        path,
        duration: info.duration,
        width: info.width,
        height: info.height,
    })
}

/// Stable filesystem-safe name derived from a reference.
fn uuid_like_name(reference: &str) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in reference.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("asset-{hash:016x}")
}
