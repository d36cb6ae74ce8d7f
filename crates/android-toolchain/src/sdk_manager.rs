//! SDK Manager
//!
//! Installs SDK components with whichever tool the run resolved:
//! `sdkmanager <package>` or `android update sdk --filter <legacy id>`. Both
//! are answered with `y` to accept the license prompt.

use tracing::info;

use avd_provision_core::{run_to_completion, CommandRunner, Invocation, Result, StepError};

use crate::component::SdkComponent;
use crate::locator::{SdkTool, SdkTools, ToolMode};
use crate::prober::InstallationProber;

/// Answer to the license prompt
const ACCEPT_LICENSE: &str = "y";

/// Android SDK Manager wrapper
pub struct SdkManager<'a> {
    tools: &'a SdkTools,
}

impl<'a> SdkManager<'a> {
    pub fn new(tools: &'a SdkTools) -> Self {
        Self { tools }
    }

    /// Build the install invocation for a component
    pub fn install_command(&self, component: &SdkComponent) -> Result<Invocation> {
        let binary = self.tools.require(SdkTool::SdkManager)?;

        let invocation = match self.tools.mode() {
            ToolMode::Modern => Invocation::new(binary).arg(component.sdk_style_path()),
            ToolMode::Legacy => Invocation::new(binary)
                .args(["update", "sdk", "--no-ui", "--all", "--filter"])
                .arg(component.legacy_sdk_style_path()),
        };

        Ok(invocation.stdin(ACCEPT_LICENSE))
    }

    /// Run the install for a component.
    ///
    /// A zero exit code does not prove the component landed on disk; callers
    /// confirm with [`SdkManager::install_verified`] or their own probe.
    pub async fn install<R: CommandRunner>(&self, runner: &R, component: &SdkComponent) -> Result<()> {
        let invocation = self.install_command(component)?;

        info!("Installing: {}", component);
        info!("$ {}", invocation);

        run_to_completion(runner, &invocation)
            .await
            .map_err(|e| StepError::install(component.display_name(), e))?;

        Ok(())
    }

    /// Install, then re-probe: the probe is the authoritative success signal
    pub async fn install_verified<R: CommandRunner>(
        &self,
        runner: &R,
        prober: &InstallationProber,
        component: &SdkComponent,
    ) -> Result<()> {
        self.install(runner, component).await?;

        if !prober.is_installed(component)? {
            return Err(StepError::install(
                component.display_name(),
                format!("{} not found at {} after install", component.kind(), component.install_path().display()),
            ));
        }

        info!("Installed {}", component);
        Ok(())
    }
}
