use crate::error::PublishError;
use crate::ports::command::{run_checked, CommandRunner};
use crate::ports::storage::Publisher;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const SRC: &str = "${src}";
const DST: &str = "${dst}";

/// Publishes by running an operator-supplied command such as
/// `rclone copy ${src} remote:bucket/${dst}`.
pub struct CommandPublisher {
    runner: Arc<dyn CommandRunner>,
    program: String,
    args: Vec<String>,
}

impl CommandPublisher {
    pub fn new(runner: Arc<dyn CommandRunner>, command: Vec<String>) -> Result<Self, PublishError> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PublishError::Config("empty publish command".to_string()))?;

        Ok(Self {
            runner,
            program,
            args: parts.collect(),
        })
    }

    pub fn expand(&self, local_dir: &Path, dst: &str) -> Vec<String> {
        let src = local_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(SRC, &src).replace(DST, dst))
            .collect()
    }
}

#[async_trait]
impl Publisher for CommandPublisher {
    async fn publish(&self, local_dir: &Path, dst: &str) -> Result<(), PublishError> {
        let args = self.expand(local_dir, dst);
        run_checked(self.runner.as_ref(), &self.program, &args).await?;
        info!("published {} with {}", dst, self.program);
        Ok(())
    }
}
