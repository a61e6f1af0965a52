//! Object storage interface for the radar archive (S3 compatible).

use futures::TryStreamExt;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use radar_common::{RadarError, RadarResult};

/// Configuration for the archive connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Bucket name
    pub bucket: String,
    /// AWS region of the bucket
    pub region: String,
    /// Optional S3-compatible endpoint (mirrors, MinIO)
    pub endpoint: Option<String>,
    /// Allow HTTP (for local mirrors)
    pub allow_http: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: "noaa-nexrad-level2".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            allow_http: false,
        }
    }
}

/// Read-only client for the Level II archive.
pub struct RadarArchive {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl RadarArchive {
    /// Create an anonymous S3 client from config.
    ///
    /// The NOAA bucket is public, so requests are sent unsigned.
    pub fn new(config: &ArchiveConfig) -> RadarResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_skip_signature(true);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| RadarError::Storage(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// Wrap an existing store (in-memory stores in tests, local mirrors).
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Bucket name this archive reads from.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// List object keys under a prefix, in listing order.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn list(&self, prefix: &str) -> RadarResult<Vec<String>> {
        let prefix_path = Path::from(prefix);
        let mut keys = Vec::new();

        let mut stream = self.store.list(Some(&prefix_path));
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| RadarError::Storage(format!("List failed for {}: {}", prefix, e)))?
        {
            keys.push(meta.location.to_string());
        }

        debug!(count = keys.len(), "Listed objects");
        Ok(keys)
    }

    /// Stream an object into a scratch file.
    ///
    /// The returned file is deleted when dropped, so callers hold it only for
    /// as long as they need the bytes on disk.
    #[instrument(skip(self, scratch_dir), fields(bucket = %self.bucket))]
    pub async fn fetch_to_scratch(
        &self,
        key: &str,
        scratch_dir: Option<&std::path::Path>,
    ) -> RadarResult<NamedTempFile> {
        let location = Path::from(key);

        let mut builder = tempfile::Builder::new();
        builder.prefix("nexrad-");
        let mut file = match scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| RadarError::Storage(format!("Failed to read {}: {}", key, e)))?;

        let mut stream = result.into_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| RadarError::Storage(format!("Error reading {}: {}", key, e)))?
        {
            file.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        file.flush()?;

        info!(bytes = written, path = %file.path().display(), "Fetched volume to scratch");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_noaa() {
        let config = ArchiveConfig::default();
        assert_eq!(config.bucket, "noaa-nexrad-level2");
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_anonymous_client_builds() {
        let archive = RadarArchive::new(&ArchiveConfig::default()).unwrap();
        assert_eq!(archive.bucket(), "noaa-nexrad-level2");
    }
}
