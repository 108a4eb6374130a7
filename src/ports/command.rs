use crate::error::ToolError;
use async_trait::async_trait;
use std::io;
use std::process::Output;

/// Runs an external program to completion and captures its output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<Output>;
}

/// Runs `program` and turns a launch failure or non-zero exit into a
/// [`ToolError`] carrying the captured stderr.
pub async fn run_checked<R>(runner: &R, program: &str, args: &[String]) -> Result<Output, ToolError>
where
    R: CommandRunner + ?Sized,
{
    let output = runner
        .run(program, args)
        .await
        .map_err(|source| ToolError::Launch {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ToolError::Exit {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
