//! Publish operation: overwrite upload plus CDN URL issuance.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::client::S3Client;
use crate::error::StorageResult;

impl S3Client {
    /// Publish a rendered video at `key` and return its CDN URL.
    ///
    /// Overwrite semantics: an existing object at the key is deleted before
    /// the upload, not versioned.
    pub async fn publish(&self, path: impl AsRef<Path>, key: &str) -> StorageResult<String> {
        if self.object_exists(key).await? {
            info!("Existing object found at {}, replacing", key);
            self.delete_object(key).await?;
        }

        self.upload_file(path, key, "video/mp4").await?;
        info!("Published {}", key);

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Ok(cdn_url(self.cdn_domain(), key, stamp))
    }
}

/// CDN URL for a published object, with a cache-busting version parameter.
pub fn cdn_url(cdn_domain: &str, key: &str, stamp: u64) -> String {
    format!("https://{cdn_domain}/{key}?v={stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdn_url_shape() {
        assert_eq!(
            cdn_url("cdn.example.com", "videos/demo.mp4", 1700000000),
            "https://cdn.example.com/videos/demo.mp4?v=1700000000"
        );
    }
}
