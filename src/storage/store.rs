//! Storage root parsing and object operations

use crate::config::StorageCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

/// A parsed storage root (bucket/container plus base prefix)
#[derive(Debug, Clone)]
pub struct StorageRoot {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl StorageRoot {
    /// Parse a root URL and create the appropriate object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/` or `./path/` - Local filesystem
    ///
    /// Credentials, when given, are applied explicitly to the S3 builder;
    /// the process environment is only a fallback and is never mutated.
    pub fn parse(url: &str, credentials: Option<&StorageCredentials>) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, credentials)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else {
            Self::parse_local(url)
        }
    }

    /// Parse S3 URL
    fn parse_s3(url: &str, credentials: Option<&StorageCredentials>) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("s3://")
            .ok_or_else(|| Error::config(format!("Invalid s3 URL: {url}")))?;

        let (bucket, prefix) = split_bucket(without_scheme);

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(creds) = credentials {
            builder = builder
                .with_access_key_id(&creds.access_key_id)
                .with_secret_access_key(&creds.secret_access_key);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create s3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "s3".to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("gs://")
            .ok_or_else(|| Error::config(format!("Invalid GCS URL: {url}")))?;

        let (bucket, prefix) = split_bucket(without_scheme);

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("az://")
            .ok_or_else(|| Error::config(format!("Invalid Azure URL: {url}")))?;

        let (container, prefix) = split_bucket(without_scheme);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        // Create directory if it doesn't exist
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Check if this is a cloud root (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Resolve a path relative to the root prefix
    fn resolve(&self, relative: &str) -> ObjectPath {
        let relative = relative.trim_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(relative)
        } else if relative.is_empty() {
            ObjectPath::from(self.prefix.trim_end_matches('/'))
        } else {
            ObjectPath::from(format!(
                "{}/{relative}",
                self.prefix.trim_end_matches('/')
            ))
        }
    }

    /// Full URL of a relative path, for logging and error messages
    pub fn url(&self, relative: &str) -> String {
        format!("{}://{}", self.scheme, self.resolve(relative))
    }

    /// Write bytes to a path under the root
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.resolve(relative);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;
        Ok(format!("{}://{path}", self.scheme))
    }

    /// Read bytes from a path under the root
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let path = self.resolve(relative);
        let result = self.store.get(&path).await?;
        Ok(result.bytes().await?)
    }

    /// List files at an exact depth below a prefix, filtered by extension.
    ///
    /// `depth` counts path segments below `prefix`, the filename included:
    /// `list_files("song_data", 4, "json")` matches
    /// `song_data/*/*/*/*.json` and nothing shallower or deeper. Returned
    /// paths are relative to the root.
    pub async fn list_files(
        &self,
        prefix: &str,
        depth: usize,
        extension: &str,
    ) -> Result<Vec<String>> {
        let full_prefix = self.resolve(prefix);
        let mut stream = self.store.list(Some(&full_prefix));

        let suffix = format!(".{extension}");
        let mut files = Vec::new();
        while let Some(meta) = stream.next().await {
            let meta = meta?;
            let location = meta.location.as_ref();
            let Some(relative) = strip_prefix(location, full_prefix.as_ref()) else {
                continue;
            };
            if relative.split('/').count() == depth && relative.ends_with(&suffix) {
                files.push(format!("{}/{relative}", prefix.trim_matches('/')));
            }
        }
        files.sort();
        Ok(files)
    }

    /// List all files under a prefix with the given extension, at any depth.
    pub async fn list_with_extension(&self, prefix: &str, extension: &str) -> Result<Vec<String>> {
        let full_prefix = self.resolve(prefix);
        let mut stream = self.store.list(Some(&full_prefix));

        let suffix = format!(".{extension}");
        let mut files = Vec::new();
        while let Some(meta) = stream.next().await {
            let meta = meta?;
            let location = meta.location.as_ref();
            let Some(relative) = strip_prefix(location, full_prefix.as_ref()) else {
                continue;
            };
            if relative.ends_with(&suffix) {
                files.push(format!("{}/{relative}", prefix.trim_matches('/')));
            }
        }
        files.sort();
        Ok(files)
    }

    /// Check whether any object exists under a prefix
    pub async fn prefix_exists(&self, prefix: &str) -> Result<bool> {
        let full_prefix = self.resolve(prefix);
        let mut stream = self.store.list(Some(&full_prefix));
        match stream.next().await {
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e.into()),
            None => Ok(false),
        }
    }

    /// Delete every object under a prefix, returning the number removed.
    ///
    /// Used to give table writes full-overwrite semantics.
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let full_prefix = self.resolve(prefix);
        let mut stream = self.store.list(Some(&full_prefix));

        let mut locations = Vec::new();
        while let Some(meta) = stream.next().await {
            locations.push(meta?.location);
        }

        let count = locations.len();
        for location in locations {
            self.store.delete(&location).await?;
        }
        Ok(count)
    }
}

/// Split `bucket/prefix` into its two halves
fn split_bucket(without_scheme: &str) -> (&str, String) {
    match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].trim_matches('/').to_string(),
        ),
        None => (without_scheme, String::new()),
    }
}

/// Strip a directory prefix from an object location
fn strip_prefix<'a>(location: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(location);
    }
    location
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
}
