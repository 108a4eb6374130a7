use crate::auth::VideoId;
use crate::domain::outcome::ReadyReport;
use crate::error::NotifyError;
use async_trait::async_trait;

/// Reports run outcomes to the catalog that owns the video records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogNotifier: Send + Sync {
    async fn report_ready(
        &self,
        video_id: &VideoId,
        report: &ReadyReport,
    ) -> Result<(), NotifyError>;

    async fn report_failed(&self, video_id: &VideoId) -> Result<(), NotifyError>;
}
