use crate::error::PublishError;
use crate::ports::storage::Publisher;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Uploads every file of a package as a public-read object.
#[derive(Clone)]
pub struct S3Publisher {
    client: Client,
    bucket: String,
}

impl S3Publisher {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Client from the ambient AWS configuration. A custom endpoint
    /// (MinIO, R2) switches to path-style addressing.
    pub async fn connect(endpoint: Option<&str>, bucket: String) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(endpoint.is_some())
            .build();
        Self::new(Client::from_conf(s3_config), bucket)
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), PublishError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| PublishError::S3 {
                key: key.to_string(),
                message: format!("cannot open {}: {}", local_path.display(), e),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(body)
            .send()
            .await
            .map_err(|e| PublishError::S3 {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(e).to_string(),
            })?;
        Ok(())
    }
}

/// Regular files under `dir`, in a stable order.
pub fn package_files(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| PublishError::Walk {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// `<dst>/<path relative to root>`, always with `/` separators.
pub fn object_key(dst: &str, root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut key = dst.trim_end_matches('/').to_string();
    for part in relative.components() {
        key.push('/');
        key.push_str(&part.as_os_str().to_string_lossy());
    }
    Some(key)
}

#[async_trait]
impl Publisher for S3Publisher {
    async fn publish(&self, local_dir: &Path, dst: &str) -> Result<(), PublishError> {
        let files = package_files(local_dir)?;
        for file in &files {
            let key = object_key(dst, local_dir, file).ok_or_else(|| PublishError::Walk {
                path: file.clone(),
                message: "outside of package directory".to_string(),
            })?;
            debug!("put s3://{}/{}", self.bucket, key);
            self.upload(file, &key).await?;
        }
        info!("published {} objects to s3://{}/{}", files.len(), self.bucket, dst);
        Ok(())
    }
}
