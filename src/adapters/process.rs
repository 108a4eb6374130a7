use crate::ports::command::CommandRunner;
use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Runs programs as child processes of the service.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<Output> {
        debug!("exec {} {}", program, args.join(" "));
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
    }
}
