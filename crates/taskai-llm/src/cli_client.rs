// CLI subprocess backend
// Pipes the prompt over stdin to a local model CLI and reads stdout back.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::{LlmBackend, LlmError};

const DEFAULT_COMMAND: &str = "claude";
const DEFAULT_ARGS: &[&str] = &["chat"];
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// The CLI refuses to start when it thinks it is running inside itself.
// Stripping this variable from the child environment avoids the nested
// session error when taskai is itself launched from such a session.
const RECURSION_GUARD_VAR: &str = "CLAUDECODE";

#[derive(Debug, Clone)]
pub struct CliBackend {
    command: String,
    args: Vec<String>,
    model: String,
    timeout_secs: u64,
}

impl Default for CliBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CliBackend {
    pub fn new() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            model: "sonnet".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    // override the command line (also used to point tests at /bin/cat etc.)
    pub fn with_command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    async fn run(&self, full_prompt: &str) -> Result<String, LlmError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .env_remove(RECURSION_GUARD_VAR)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LlmError::Configuration(format!(
                        "command '{}' not found. Make sure it's installed and in PATH.",
                        self.command
                    ))
                } else {
                    LlmError::Io(e)
                }
            })?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| LlmError::Api("failed to open child stdin".to_string()))?;
            stdin.write_all(full_prompt.as_bytes()).await?;
            // drop closes stdin so the child sees EOF
        }

        // kill_on_drop reaps the child if the deadline fires
        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout_secs))??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // The CLI is known to exit non-zero with warnings while still
        // producing a valid answer, so any non-empty stdout counts as
        // success; exit status only matters when stdout is empty.
        if !stdout.is_empty() {
            if !stderr.is_empty() {
                warn!(command = %self.command, stderr = %stderr, "CLI backend wrote to stderr");
            }
            return Ok(stdout);
        }

        if !output.status.success() {
            let message = if stderr.is_empty() {
                "Unknown error".to_string()
            } else {
                stderr
            };
            return Err(LlmError::Api(message));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl LlmBackend for CliBackend {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        // the CLI has no separate system channel; prepend it
        let full_prompt = match system {
            Some(system) => format!("{system}\n\n{prompt}"),
            None => prompt.to_string(),
        };
        self.run(&full_prompt).await
    }

    fn provider(&self) -> &str {
        "cli"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdin_roundtrip() {
        // cat echoes stdin back, standing in for the model CLI
        let backend = CliBackend::new().with_command("cat", vec![]);
        let reply = backend.generate("hello backend", None).await.unwrap();
        assert_eq!(reply, "hello backend");
    }

    #[tokio::test]
    async fn test_system_prompt_is_prepended() {
        let backend = CliBackend::new().with_command("cat", vec![]);
        let reply = backend
            .generate("the prompt", Some("the system"))
            .await
            .unwrap();
        assert_eq!(reply, "the system\n\nthe prompt");
    }

    #[tokio::test]
    async fn test_missing_command_is_configuration_error() {
        let backend = CliBackend::new().with_command("taskai-no-such-binary", vec![]);
        let err = backend.generate("hi", None).await.unwrap_err();
        match err {
            LlmError::Configuration(msg) => assert!(msg.contains("not found")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let backend = CliBackend::new()
            .with_command("sleep", vec!["5".to_string()])
            .with_timeout(1);
        let err = backend.generate("hi", None).await.unwrap_err();
        match err {
            LlmError::Timeout(secs) => assert_eq!(secs, 1),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_output_is_success() {
        // emits on stdout then fails; output still wins
        let backend = CliBackend::new().with_command(
            "sh",
            vec!["-c".to_string(), "echo partial answer; exit 3".to_string()],
        );
        let reply = backend.generate("hi", None).await.unwrap();
        assert_eq!(reply, "partial answer");
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_output_is_error() {
        let backend = CliBackend::new().with_command(
            "sh",
            vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()],
        );
        let err = backend.generate("hi", None).await.unwrap_err();
        match err {
            LlmError::Api(msg) => assert_eq!(msg, "broken"),
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
