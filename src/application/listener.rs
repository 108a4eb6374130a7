use super::pipeline::PipelineService;
use crate::auth::TokenCodec;
use crate::domain::events::UploadEvent;
use crate::error::AuthError;
use crate::ports::notifier::CatalogNotifier;
use crate::ports::storage::Publisher;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Consumes upload events one at a time until every sender is gone.
///
/// Each run executes in its own task so that a panic in one upload is
/// logged, reported to the catalog as a failure, and the loop moves on.
pub async fn run<P, N>(
    mut events: mpsc::Receiver<UploadEvent>,
    codec: TokenCodec,
    pipeline: Arc<PipelineService<P, N>>,
) where
    P: Publisher + 'static,
    N: CatalogNotifier + 'static,
{
    info!("waiting for uploads");
    while let Some(event) = events.recv().await {
        let upload_id = event.upload_id.clone();

        let video_id = match event
            .authorization()
            .ok_or(AuthError::Rejected)
            .and_then(|header| codec.verify_bearer(header))
        {
            Ok(video_id) => video_id,
            Err(_) => {
                warn!(%upload_id, "dropping upload with invalid authorization");
                discard_upload(&pipeline, &event).await;
                continue;
            }
        };

        info!(%upload_id, %video_id, "processing upload");
        let task = {
            let pipeline = pipeline.clone();
            let upload_id = upload_id.clone();
            let stored_path = event.stored_path.clone();
            let video_id = video_id.clone();
            tokio::spawn(async move {
                pipeline.process(&upload_id, &stored_path, &video_id).await
            })
        };

        match task.await {
            Ok(run) => match run.outcome {
                Ok(outcome) => info!(
                    %upload_id,
                    %video_id,
                    renditions = outcome.renditions.len(),
                    "upload processed"
                ),
                Err(e) => warn!(%upload_id, %video_id, "upload failed: {}", e),
            },
            Err(e) => {
                error!(%upload_id, %video_id, "pipeline task aborted: {}", e);
                pipeline
                    .abandon(&upload_id, &event.stored_path, &video_id)
                    .await;
            }
        }
    }
    info!("upload queue closed");
}

async fn discard_upload<P, N>(pipeline: &PipelineService<P, N>, event: &UploadEvent)
where
    P: Publisher,
    N: CatalogNotifier,
{
    let layout = pipeline.layout();
    let _ = tokio::fs::remove_file(&event.stored_path).await;
    let _ = tokio::fs::remove_file(layout.upload_info_path(&event.upload_id)).await;
}
