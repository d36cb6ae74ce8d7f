//! Environment Export
//!
//! Hands values to downstream build steps. On Bitrise agents this is
//! `envman add --key <KEY>` with the value on stdin.

use std::path::PathBuf;
use tracing::info;

use avd_provision_core::{run_to_completion, CommandRunner, Invocation, Result, StepError};

/// Exported variable holding the created AVD's name
pub const BITRISE_EMULATOR_NAME: &str = "BITRISE_EMULATOR_NAME";

/// Persists a key/value pair for later steps
#[allow(async_fn_in_trait)]
pub trait EnvExporter {
    async fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// How the `envman` binary is found
#[derive(Debug, Clone)]
enum Envman {
    /// Looked up on PATH when the first export runs
    OnPath(String),
    Binary(PathBuf),
}

/// Exports through the `envman` tool
pub struct EnvmanExporter<'a, R> {
    runner: &'a R,
    envman: Envman,
}

impl<'a, R: CommandRunner> EnvmanExporter<'a, R> {
    /// Use `envman` from PATH, resolved at export time
    pub fn new(runner: &'a R) -> Self {
        Self::on_path(runner, "envman")
    }

    /// Use the binary `name` from PATH, resolved at export time
    pub fn on_path(runner: &'a R, name: &str) -> Self {
        Self {
            runner,
            envman: Envman::OnPath(name.to_string()),
        }
    }

    pub fn with_binary(runner: &'a R, envman: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            envman: Envman::Binary(envman.into()),
        }
    }

    fn binary(&self, key: &str) -> Result<PathBuf> {
        match &self.envman {
            Envman::Binary(path) => Ok(path.clone()),
            Envman::OnPath(name) => which::which(name).map_err(|e| StepError::Export {
                key: key.to_string(),
                cause: format!("{} not found: {}", name, e),
            }),
        }
    }

    fn add_command(&self, envman: PathBuf, key: &str, value: &str) -> Invocation {
        Invocation::new(envman)
            .args(["add", "--key", key])
            .stdin(value)
    }
}

impl<R: CommandRunner> EnvExporter for EnvmanExporter<'_, R> {
    async fn export(&self, key: &str, value: &str) -> Result<()> {
        let invocation = self.add_command(self.binary(key)?, key, value);
        run_to_completion(self.runner, &invocation)
            .await
            .map_err(|e| StepError::Export {
                key: key.to_string(),
                cause: e.to_string(),
            })?;

        info!("Exported {}={}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avd_provision_core::testing::RecordingRunner;
    use avd_provision_core::CommandOutcome;

    #[tokio::test]
    async fn test_envman_add() {
        let runner = RecordingRunner::succeeding();
        let exporter = EnvmanExporter::with_binary(&runner, "envman");

        exporter.export(BITRISE_EMULATOR_NAME, "Pixel_API_23").await.unwrap();

        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("envman"));
        assert_eq!(calls[0].args, vec!["add", "--key", "BITRISE_EMULATOR_NAME"]);
        assert_eq!(calls[0].stdin.as_deref(), Some("Pixel_API_23"));
    }

    #[tokio::test]
    async fn test_envman_failure_is_export_error() {
        let runner = RecordingRunner::with_handler(|_| Ok(CommandOutcome::failure(2)));
        let exporter = EnvmanExporter::with_binary(&runner, "envman");

        let err = exporter.export(BITRISE_EMULATOR_NAME, "Pixel").await.unwrap_err();
        assert!(matches!(err, StepError::Export { ref key, .. } if key == BITRISE_EMULATOR_NAME));
    }

    #[tokio::test]
    async fn test_missing_envman_fails_at_export_time() {
        let runner = RecordingRunner::succeeding();
        let exporter = EnvmanExporter::on_path(&runner, "envman-not-installed-on-this-agent");

        let err = exporter.export(BITRISE_EMULATOR_NAME, "Pixel").await.unwrap_err();
        assert!(matches!(err, StepError::Export { ref key, .. } if key == BITRISE_EMULATOR_NAME));
        assert!(runner.invocations().is_empty());
    }
}
