use crate::error::PublishError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes the contents of `local_dir` under the destination `dst`.
    async fn publish(&self, local_dir: &Path, dst: &str) -> Result<(), PublishError>;
}

#[async_trait]
impl<T: Publisher + ?Sized> Publisher for Arc<T> {
    async fn publish(&self, local_dir: &Path, dst: &str) -> Result<(), PublishError> {
        (**self).publish(local_dir, dst).await
    }
}
