//! S3 data types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An S3 bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub region: Option<String>,
}

/// An S3 object (file) or synthesized folder entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub is_folder: bool,
    pub etag: Option<String>,
    pub storage_class: Option<String>,
}

impl S3Object {
    /// Last component of the key
    pub fn display_name(&self) -> &str {
        self.key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.key)
    }

    /// Human-readable size
    pub fn size_string(&self) -> String {
        if self.is_folder {
            return String::from("-");
        }

        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;
        const TB: u64 = GB * 1024;

        if self.size >= TB {
            format!("{:.2} TB", self.size as f64 / TB as f64)
        } else if self.size >= GB {
            format!("{:.2} GB", self.size as f64 / GB as f64)
        } else if self.size >= MB {
            format!("{:.2} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.2} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

/// HeadObject response fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_length: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub version_id: Option<String>,
    /// User-defined `x-amz-meta-*` entries
    pub metadata: HashMap<String, String>,
}

/// One page of a delimited object listing
#[derive(Debug, Clone)]
pub struct ListObjectsResult {
    pub objects: Vec<S3Object>,
    pub next_token: Option<String>,
    pub is_truncated: bool,
}

/// Outcome of a conditional upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// The object was written
    Uploaded,
    /// The key was already present; nothing was written
    AlreadyExists,
}

/// Parsed S3 location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an S3 location from `s3://` or either https addressing style.
    pub fn parse(input: &str) -> Result<Self, Error> {
        if let Some(rest) = input.strip_prefix("s3://") {
            let (bucket, key) = match rest.split_once('/') {
                Some((bucket, key)) => (bucket, key),
                None => (rest, ""),
            };
            if bucket.is_empty() {
                return Err(Error::InvalidUrl(input.to_string()));
            }
            return Ok(Self::new(bucket, key));
        }

        if input.starts_with("https://") || input.starts_with("http://") {
            if let Ok(parsed) = url::Url::parse(input) {
                if let Some(host) = parsed.host_str() {
                    // Virtual-hosted style: bucket.s3.region.amazonaws.com
                    if host.contains(".s3.") && host.ends_with(".amazonaws.com") {
                        if let Some(bucket) = host.split(".s3.").next() {
                            let key = parsed.path().trim_start_matches('/');
                            return Ok(Self::new(bucket, key));
                        }
                    }
                    // Path style: s3.region.amazonaws.com/bucket/key
                    if host.starts_with("s3.") && host.ends_with(".amazonaws.com") {
                        let path = parsed.path().trim_start_matches('/');
                        if !path.is_empty() {
                            let (bucket, key) = match path.split_once('/') {
                                Some((bucket, key)) => (bucket, key),
                                None => (path, ""),
                            };
                            return Ok(Self::new(bucket, key));
                        }
                    }
                }
            }
        }

        Err(Error::InvalidUrl(input.to_string()))
    }

    /// Render as an `s3://` URL
    pub fn to_s3_url(&self) -> String {
        if self.key.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}", self.bucket, self.key)
        }
    }
}

impl std::fmt::Display for S3Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_s3_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parse_s3_scheme() {
        let url = S3Url::parse("s3://my-bucket/path/to/file.csv").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "path/to/file.csv");
    }

    #[test]
    fn test_url_parse_bucket_only() {
        let url = S3Url::parse("s3://my-bucket").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "");

        let url = S3Url::parse("s3://my-bucket/").unwrap();
        assert_eq!(url.key, "");
    }

    #[test]
    fn test_url_parse_virtual_hosted() {
        let url = S3Url::parse("https://my-bucket.s3.eu-west-1.amazonaws.com/a/b.csv").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "a/b.csv");
    }

    #[test]
    fn test_url_parse_path_style() {
        let url = S3Url::parse("https://s3.eu-west-1.amazonaws.com/my-bucket/a/b.csv").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "a/b.csv");
    }

    #[test]
    fn test_url_parse_rejects_garbage() {
        assert!(S3Url::parse("").is_err());
        assert!(S3Url::parse("s3://").is_err());
        assert!(S3Url::parse("not-a-url").is_err());
        assert!(S3Url::parse("ftp://bucket/key").is_err());
        assert!(S3Url::parse("https://example.com/file.txt").is_err());
    }

    #[test]
    fn test_url_round_trip() {
        let url = S3Url::new("test-bucket", "folder/file.csv");
        assert_eq!(url.to_s3_url(), "s3://test-bucket/folder/file.csv");
        assert_eq!(S3Url::parse(&url.to_s3_url()).unwrap(), url);

        let url = S3Url::new("test-bucket", "");
        assert_eq!(url.to_s3_url(), "s3://test-bucket");
    }

    #[test]
    fn test_display_name() {
        let obj = S3Object {
            key: "path/to/myfile.csv".to_string(),
            size: 1024,
            last_modified: None,
            is_folder: false,
            etag: None,
            storage_class: None,
        };
        assert_eq!(obj.display_name(), "myfile.csv");

        let folder = S3Object {
            key: "path/to/folder/".to_string(),
            size: 0,
            last_modified: None,
            is_folder: true,
            etag: None,
            storage_class: None,
        };
        assert_eq!(folder.display_name(), "folder");
    }

    #[test]
    fn test_size_string_boundaries() {
        fn make(size: u64) -> S3Object {
            S3Object {
                key: "k".to_string(),
                size,
                last_modified: None,
                is_folder: false,
                etag: None,
                storage_class: None,
            }
        }

        assert_eq!(make(0).size_string(), "0 B");
        assert_eq!(make(1023).size_string(), "1023 B");
        assert_eq!(make(1024).size_string(), "1.00 KB");
        assert_eq!(make(1536).size_string(), "1.50 KB");
        assert_eq!(make(5 * 1024 * 1024).size_string(), "5.00 MB");
        assert_eq!(make(2 * 1024 * 1024 * 1024).size_string(), "2.00 GB");
        assert_eq!(make(3 * 1024 * 1024 * 1024 * 1024).size_string(), "3.00 TB");
    }

    #[test]
    fn test_size_string_folder() {
        let folder = S3Object {
            key: "folder/".to_string(),
            size: 0,
            last_modified: None,
            is_folder: true,
            etag: None,
            storage_class: None,
        };
        assert_eq!(folder.size_string(), "-");
    }

    #[test]
    fn test_object_metadata_default() {
        let meta = ObjectMetadata::default();
        assert_eq!(meta.content_length, 0);
        assert!(meta.content_type.is_none());
        assert!(meta.metadata.is_empty());
    }
}
