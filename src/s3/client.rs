//! AWS S3 client wrapper

use std::path::Path;

use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::s3::types::{Bucket, ListObjectsResult, ObjectMetadata, S3Object, UploadStatus};

/// S3 client wrapper with high-level operations
pub struct S3Client {
    client: Client,
    current_region: String,
}

impl S3Client {
    /// Create a client for the given profile, or the default credential chain.
    pub async fn new(profile_name: Option<&str>) -> Result<Self> {
        let config = ClientConfig {
            profile: profile_name.map(|p| p.to_string()),
            ..ClientConfig::default()
        };
        Self::with_config(config).await
    }

    /// Create a client from explicit connection settings.
    pub async fn with_config(config: ClientConfig) -> Result<Self> {
        let sdk_config = config.resolve().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let current_region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| config.region_or_default().to_string());

        Ok(Self {
            client,
            current_region,
        })
    }

    /// Create a client from environment credentials.
    ///
    /// Fails with [`Error::MissingCredentials`] when no key pair is set.
    pub async fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?).await
    }

    /// The region this client operates in
    pub fn region(&self) -> &str {
        &self.current_region
    }

    // ---- buckets ----

    /// Create a bucket in the client's region.
    pub async fn create_bucket(&self, name: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(name);

        // us-east-1 rejects an explicit location constraint
        if self.current_region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.current_region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        request.send().await.map_err(aws_sdk_s3::Error::from)?;

        tracing::info!(bucket = name, region = %self.current_region, "created bucket");
        Ok(())
    }

    /// Create a bucket, falling back to a date-suffixed name when `base_name`
    /// is already taken by this account. Returns the name actually created.
    pub async fn create_bucket_unique(&self, base_name: &str) -> Result<String> {
        let existing = self.list_buckets().await?;
        let taken = |name: &str| existing.iter().any(|b| b.name == name);

        let name = if taken(base_name) {
            suffixed_name(base_name)
        } else {
            base_name.to_string()
        };

        if name != base_name && taken(&name) {
            return Err(Error::Config(format!(
                "bucket name {name} is already taken"
            )));
        }

        self.create_bucket(&name).await?;
        Ok(name)
    }

    /// List all accessible buckets.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().and_then(timestamp),
                region: None,
            })
            .collect();

        Ok(buckets)
    }

    /// Delete a bucket. The bucket must be empty.
    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::info!(bucket = name, "deleted bucket");
        Ok(())
    }

    /// Check whether a bucket exists and is accessible.
    pub async fn bucket_exists(&self, name: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(aws_sdk_s3::Error::from(err).into())
                }
            }
        }
    }

    // ---- objects ----

    /// List one page of objects under a prefix, folding common prefixes into
    /// folder entries.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListObjectsResult> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .delimiter("/")
            .max_keys(max_keys);

        if let Some(p) = prefix {
            request = request.prefix(p);
        }
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(aws_sdk_s3::Error::from)?;

        let mut objects = Vec::new();

        for prefix in response.common_prefixes() {
            if let Some(p) = prefix.prefix() {
                objects.push(S3Object {
                    key: p.to_string(),
                    size: 0,
                    last_modified: None,
                    is_folder: true,
                    etag: None,
                    storage_class: None,
                });
            }
        }

        for obj in response.contents() {
            objects.push(S3Object {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0) as u64,
                last_modified: obj.last_modified().and_then(timestamp),
                is_folder: false,
                etag: obj.e_tag().map(|s| s.to_string()),
                storage_class: obj.storage_class().map(|s| s.as_str().to_string()),
            });
        }

        Ok(ListObjectsResult {
            next_token: response.next_continuation_token().map(|s| s.to_string()),
            is_truncated: response.is_truncated().unwrap_or(false),
            objects,
        })
    }

    /// List every object under a prefix, draining pagination. No folder
    /// synthesis; keys come back flat.
    pub async fn list_all_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<S3Object>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);
            if let Some(p) = prefix {
                request = request.prefix(p);
            }
            if let Some(t) = &token {
                request = request.continuation_token(t);
            }

            let response = request.send().await.map_err(aws_sdk_s3::Error::from)?;

            for obj in response.contents() {
                objects.push(S3Object {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().unwrap_or(0) as u64,
                    last_modified: obj.last_modified().and_then(timestamp),
                    is_folder: false,
                    etag: obj.e_tag().map(|s| s.to_string()),
                    storage_class: obj.storage_class().map(|s| s.as_str().to_string()),
                });
            }

            token = response.next_continuation_token().map(|s| s.to_string());
            if token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    /// Download an object into memory.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let data = response.body.collect().await?;

        tracing::debug!(bucket, key, "downloaded object");
        Ok(data.into_bytes().to_vec())
    }

    /// Upload bytes as an object.
    pub async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.into())
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::debug!(bucket, key, "uploaded object");
        Ok(())
    }

    /// Upload bytes unless the key is already present.
    pub async fn put_object_if_absent(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
    ) -> Result<UploadStatus> {
        if self.object_exists(bucket, key).await? {
            tracing::info!(bucket, key, "object already exists, skipping upload");
            return Ok(UploadStatus::AlreadyExists);
        }

        self.put_object(bucket, key, data).await?;
        Ok(UploadStatus::Uploaded)
    }

    /// Upload a local file.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        bucket: &str,
        key: &str,
    ) -> Result<()> {
        let data = tokio::fs::read(path.as_ref()).await?;
        self.put_object(bucket, key, data).await
    }

    /// Download an object to a local file.
    pub async fn download_file(
        &self,
        bucket: &str,
        key: &str,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let data = self.get_object(bucket, key).await?;
        tokio::fs::write(path.as_ref(), data).await?;
        Ok(())
    }

    /// Delete an object.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::debug!(bucket, key, "deleted object");
        Ok(())
    }

    /// Delete several objects in one request.
    pub async fn delete_objects(&self, bucket: &str, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(*key).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let delete = Delete::builder().set_objects(Some(identifiers)).build()?;

        self.client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::debug!(bucket, count = keys.len(), "deleted objects");
        Ok(())
    }

    /// Server-side copy between locations.
    pub async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<()> {
        let copy_source = format!("{}/{}", source_bucket, source_key);

        self.client
            .copy_object()
            .bucket(dest_bucket)
            .key(dest_key)
            .copy_source(copy_source)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::debug!(
            from = %format!("{source_bucket}/{source_key}"),
            to = %format!("{dest_bucket}/{dest_key}"),
            "copied object"
        );
        Ok(())
    }

    /// Rename within a bucket (copy then delete).
    pub async fn rename_object(&self, bucket: &str, from_key: &str, to_key: &str) -> Result<()> {
        self.copy_object(bucket, from_key, bucket, to_key).await?;
        self.delete_object(bucket, from_key).await
    }

    /// Check whether an object exists. Only NotFound maps to `false`; any
    /// other failure (auth, transport) propagates.
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(aws_sdk_s3::Error::from(err).into())
                }
            }
        }
    }

    /// Fetch object metadata without the body.
    pub async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        Ok(ObjectMetadata {
            content_length: response.content_length().unwrap_or_default() as u64,
            content_type: response.content_type().map(|s| s.to_string()),
            last_modified: response.last_modified().and_then(timestamp),
            etag: response.e_tag().map(|s| s.to_string()),
            version_id: response.version_id().map(|s| s.to_string()),
            metadata: response.metadata().cloned().unwrap_or_default(),
        })
    }

    // ---- DataFrame bridges ----

    /// Read a CSV object into a [`DataFrame`].
    pub async fn read_frame(&self, bucket: &str, key: &str) -> Result<DataFrame> {
        let data = self.get_object(bucket, key).await?;
        DataFrame::from_csv(&data)
    }

    /// Read a Parquet object into a [`DataFrame`].
    pub async fn read_parquet_frame(&self, bucket: &str, key: &str) -> Result<DataFrame> {
        let data = self.get_object(bucket, key).await?;
        DataFrame::from_parquet(&data)
    }

    /// Write a [`DataFrame`] as a CSV object, unless the key already exists.
    pub async fn write_frame(
        &self,
        frame: &DataFrame,
        bucket: &str,
        key: &str,
    ) -> Result<UploadStatus> {
        let data = frame.to_csv()?;
        self.put_object_if_absent(bucket, key, data).await
    }
}

/// Date-suffixed fallback name for bucket collisions
fn suffixed_name(base: &str) -> String {
    format!("{}-{}", base, Utc::now().format("%Y%m%d"))
}

fn timestamp(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_name_shape() {
        let name = suffixed_name("reports");
        assert!(name.starts_with("reports-"));
        let suffix = name.strip_prefix("reports-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_timestamp_conversion() {
        let dt = aws_smithy_types::DateTime::from_secs(1_640_000_000);
        let converted = timestamp(&dt).unwrap();
        assert_eq!(converted.timestamp(), 1_640_000_000);
    }
}
