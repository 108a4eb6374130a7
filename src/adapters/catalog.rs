use crate::auth::{TokenCodec, VideoId};
use crate::domain::outcome::ReadyReport;
use crate::error::NotifyError;
use crate::ports::notifier::CatalogNotifier;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog API client. Each request carries a token signed for the video
/// it concerns.
pub struct HttpCatalogNotifier {
    client: Client,
    api_url: String,
    codec: TokenCodec,
}

impl HttpCatalogNotifier {
    pub fn new(api_url: impl Into<String>, codec: TokenCodec) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            codec,
        })
    }

    fn video_url(&self, video_id: &VideoId) -> String {
        format!("{}/videos/{}", self.api_url, video_id)
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        video_id: &VideoId,
    ) -> Result<RequestBuilder, NotifyError> {
        let token = self.codec.sign(video_id)?;
        Ok(request.bearer_auth(token))
    }

    fn check(url: String, response: Response) -> Result<(), NotifyError> {
        let status = response.status();
        if status.is_success() {
            debug!("catalog answered {} for {}", status, url);
            Ok(())
        } else {
            Err(NotifyError::Status { url, status })
        }
    }
}

#[async_trait]
impl CatalogNotifier for HttpCatalogNotifier {
    async fn report_ready(
        &self,
        video_id: &VideoId,
        report: &ReadyReport,
    ) -> Result<(), NotifyError> {
        let url = self.video_url(video_id);
        let response = self
            .authorized(self.client.put(&url), video_id)?
            .json(report)
            .send()
            .await?;
        Self::check(url, response)
    }

    async fn report_failed(&self, video_id: &VideoId) -> Result<(), NotifyError> {
        let url = self.video_url(video_id);
        let response = self
            .authorized(self.client.delete(&url), video_id)?
            .send()
            .await?;
        Self::check(url, response)
    }
}
