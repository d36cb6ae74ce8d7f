//! Tool Locator
//!
//! Decides whether the SDK root carries the modern command-line tools
//! (`tools/bin/sdkmanager`, `tools/bin/avdmanager`) or only the deprecated
//! `tools/android`. The mode is resolved once per run into [`SdkTools`] and
//! passed to every command builder.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use avd_provision_core::{run_to_completion, CommandRunner, Invocation, Result, StepError};

/// Which generation of SDK tools is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// `sdkmanager` / `avdmanager`
    Modern,
    /// `android`
    Legacy,
}

/// SDK tools the step drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkTool {
    /// Package installs
    SdkManager,
    /// AVD creation
    AvdManager,
}

impl SdkTool {
    fn modern_path(&self, sdk_root: &Path) -> PathBuf {
        let name = match self {
            SdkTool::SdkManager => "sdkmanager",
            SdkTool::AvdManager => "avdmanager",
        };
        sdk_root.join("tools").join("bin").join(name)
    }
}

fn legacy_path(sdk_root: &Path) -> PathBuf {
    sdk_root.join("tools").join("android")
}

/// A tool binary found under the SDK root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTool {
    pub path: PathBuf,
    pub mode: ToolMode,
}

/// Find `tool` under `sdk_root`, falling back to the legacy `android` binary
pub fn locate(sdk_root: &Path, tool: SdkTool) -> Result<LocatedTool> {
    let modern = tool.modern_path(sdk_root);
    if modern.exists() {
        return Ok(LocatedTool { path: modern, mode: ToolMode::Modern });
    }

    let legacy = legacy_path(sdk_root);
    if legacy.exists() {
        return Ok(LocatedTool { path: legacy, mode: ToolMode::Legacy });
    }

    Err(StepError::ToolNotFound(modern))
}

/// The SDK tool set of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkTools {
    sdk_root: PathBuf,
    mode: ToolMode,
}

impl SdkTools {
    /// Resolve the tool mode from the AVD manager's location
    pub fn detect(sdk_root: impl Into<PathBuf>) -> Result<Self> {
        let sdk_root = sdk_root.into();
        let located = locate(&sdk_root, SdkTool::AvdManager)?;
        debug!("Found {:?} SDK tools at {}", located.mode, located.path.display());
        Ok(Self { sdk_root, mode: located.mode })
    }

    /// Like [`SdkTools::detect`], but when only the legacy tool exists try
    /// once to update the SDK tools and switch to modern mode.
    ///
    /// The update is best-effort: its failure leaves the run in legacy mode.
    pub async fn detect_with_upgrade<R: CommandRunner>(
        sdk_root: impl Into<PathBuf>,
        runner: &R,
    ) -> Result<Self> {
        let mut tools = Self::detect(sdk_root)?;
        if tools.mode == ToolMode::Modern {
            return Ok(tools);
        }

        info!("Legacy Android SDK tools found, updating tools");
        let update = tools.update_tools_command();
        info!("$ {}", update);

        match run_to_completion(runner, &update).await {
            Ok(()) => {
                if SdkTool::AvdManager.modern_path(&tools.sdk_root).exists() {
                    info!("SDK tools updated, using sdkmanager/avdmanager");
                    tools.mode = ToolMode::Modern;
                } else {
                    warn!("SDK tools update finished but avdmanager is still missing, staying on legacy tools");
                }
            }
            Err(e) => warn!("Failed to update SDK tools ({}), staying on legacy tools", e),
        }

        Ok(tools)
    }

    /// Build a tool set with a known mode
    pub fn with_mode(sdk_root: impl Into<PathBuf>, mode: ToolMode) -> Self {
        Self { sdk_root: sdk_root.into(), mode }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn is_legacy(&self) -> bool {
        self.mode == ToolMode::Legacy
    }

    /// Binary that performs `tool`'s job in the resolved mode
    pub fn binary(&self, tool: SdkTool) -> PathBuf {
        match self.mode {
            ToolMode::Modern => tool.modern_path(&self.sdk_root),
            ToolMode::Legacy => legacy_path(&self.sdk_root),
        }
    }

    /// Like [`SdkTools::binary`], failing when the binary is missing
    pub fn require(&self, tool: SdkTool) -> Result<PathBuf> {
        let path = self.binary(tool);
        if path.exists() {
            Ok(path)
        } else {
            Err(StepError::ToolNotFound(path))
        }
    }

    fn update_tools_command(&self) -> Invocation {
        Invocation::new(legacy_path(&self.sdk_root))
            .args(["update", "sdk", "--no-ui", "--all", "--filter", "tools"])
            .stdin("y")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avd_provision_core::testing::RecordingRunner;
    use avd_provision_core::CommandOutcome;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_locate_modern() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/bin/avdmanager");

        let located = locate(sdk.path(), SdkTool::AvdManager).unwrap();
        assert_eq!(located.mode, ToolMode::Modern);
        assert_eq!(located.path, sdk.path().join("tools/bin/avdmanager"));
    }

    #[test]
    fn test_locate_legacy() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/android");

        let located = locate(sdk.path(), SdkTool::AvdManager).unwrap();
        assert_eq!(located.mode, ToolMode::Legacy);
        assert_eq!(located.path, sdk.path().join("tools/android"));
    }

    #[test]
    fn test_locate_nothing() {
        let sdk = tempfile::tempdir().unwrap();
        match locate(sdk.path(), SdkTool::SdkManager) {
            Err(StepError::ToolNotFound(path)) => {
                assert_eq!(path, sdk.path().join("tools/bin/sdkmanager"))
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_require_missing_installer() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/bin/avdmanager");

        let tools = SdkTools::detect(sdk.path()).unwrap();
        assert!(tools.require(SdkTool::AvdManager).is_ok());
        assert!(matches!(
            tools.require(SdkTool::SdkManager),
            Err(StepError::ToolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upgrade_switches_to_modern() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/android");

        let root = sdk.path().to_path_buf();
        let runner = RecordingRunner::with_handler(move |_| {
            touch(&root, "tools/bin/avdmanager");
            touch(&root, "tools/bin/sdkmanager");
            Ok(CommandOutcome::success())
        });

        let tools = SdkTools::detect_with_upgrade(sdk.path(), &runner).await.unwrap();
        assert_eq!(tools.mode(), ToolMode::Modern);

        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, sdk.path().join("tools/android"));
        assert_eq!(calls[0].args, vec!["update", "sdk", "--no-ui", "--all", "--filter", "tools"]);
        assert_eq!(calls[0].stdin.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn test_failed_upgrade_stays_legacy() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/android");

        let runner = RecordingRunner::with_handler(|_| Ok(CommandOutcome::failure(1)));
        let tools = SdkTools::detect_with_upgrade(sdk.path(), &runner).await.unwrap();
        assert!(tools.is_legacy());
        assert_eq!(tools.binary(SdkTool::SdkManager), sdk.path().join("tools/android"));
    }

    #[tokio::test]
    async fn test_upgrade_without_avdmanager_stays_legacy() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/android");

        // exits 0 but leaves tools/bin empty
        let runner = RecordingRunner::succeeding();
        let tools = SdkTools::detect_with_upgrade(sdk.path(), &runner).await.unwrap();

        assert_eq!(tools.mode(), ToolMode::Legacy);
        assert_eq!(runner.invocations().len(), 1);
        assert_eq!(tools.binary(SdkTool::AvdManager), sdk.path().join("tools/android"));
    }

    #[tokio::test]
    async fn test_modern_sdk_skips_upgrade() {
        let sdk = tempfile::tempdir().unwrap();
        touch(sdk.path(), "tools/bin/avdmanager");

        let runner = RecordingRunner::succeeding();
        let tools = SdkTools::detect_with_upgrade(sdk.path(), &runner).await.unwrap();
        assert_eq!(tools.mode(), ToolMode::Modern);
        assert!(runner.invocations().is_empty());
    }
}
