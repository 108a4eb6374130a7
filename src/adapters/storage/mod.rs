//! Outbound publication of finished packages.

pub mod command;
pub mod s3;

pub use command::CommandPublisher;
pub use s3::S3Publisher;

use crate::config::{StoreConfig, StoreKind};
use crate::error::PublishError;
use crate::ports::command::CommandRunner;
use crate::ports::storage::Publisher;
use std::sync::Arc;

/// Builds the publisher selected by the store configuration.
pub async fn from_config(
    config: &StoreConfig,
    runner: Arc<dyn CommandRunner>,
) -> Result<Arc<dyn Publisher>, PublishError> {
    let publisher: Arc<dyn Publisher> = match config.kind {
        StoreKind::S3 => {
            let bucket = config
                .bucket
                .clone()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| PublishError::Config("missing bucket".to_string()))?;
            Arc::new(S3Publisher::connect(config.aws_endpoint.as_deref(), bucket).await)
        }
        StoreKind::Command => Arc::new(CommandPublisher::new(runner, config.command.clone())?),
    };
    Ok(publisher)
}
