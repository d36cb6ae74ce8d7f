//! Provisioning command
//!
//! Drives one run of the step: resolve the SDK tools, make sure the platform
//! and system image are installed, create the AVD, apply the custom hardware
//! profile and export the emulator name.

use std::path::PathBuf;
use tracing::{debug, info};

use avd_provision_android_toolchain::{
    EnvExporter, ImageLayout, InstallationProber, SdkComponent, SdkManager, SdkTools, ToolMode,
    BITRISE_EMULATOR_NAME,
};
use avd_provision_core::{CommandRunner, Orchestrator, Result, RunState, StepConfig, StepError};
use avd_provision_emulator_bridge::{AvdConfig, AvdManager};

/// What a successful run did
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub tool_mode: ToolMode,
    /// Components installed by this run
    pub installed: Vec<SdkComponent>,
    pub avd_name: String,
    /// Written config.ini, when a custom hardware profile was given
    pub hardware_profile: Option<PathBuf>,
    /// Visited run states
    pub states: Vec<RunState>,
}

/// Provision command options
pub struct ProvisionCommand {
    pub config: StepConfig,
    pub avd_manager: AvdManager,
}

impl ProvisionCommand {
    pub fn new(config: StepConfig) -> Self {
        Self {
            config,
            avd_manager: AvdManager::new(),
        }
    }

    pub fn with_avd_manager(mut self, avd_manager: AvdManager) -> Self {
        self.avd_manager = avd_manager;
        self
    }

    /// Execute the provisioning run
    pub async fn execute<R, E>(&self, runner: &R, exporter: &E) -> Result<ProvisionOutcome>
    where
        R: CommandRunner,
        E: EnvExporter,
    {
        let config = &self.config;
        let mut run = Orchestrator::new();
        let mut installed = Vec::new();

        let tools = SdkTools::detect_with_upgrade(&config.android_home, runner).await?;
        info!("Using {:?} Android SDK tools", tools.mode());

        let prober = InstallationProber::new(
            &config.android_home,
            ImageLayout::from_fallback(config.untagged_image_fallback),
        );
        let sdk_manager = SdkManager::new(&tools);

        let platform = SdkComponent::platform(&config.platform);
        if ensure_installed(&mut run, runner, &prober, &sdk_manager, &platform).await? {
            installed.push(platform);
        }

        let image = SdkComponent::system_image(&config.platform, config.abi.as_str(), config.tag.as_str());
        if ensure_installed(&mut run, runner, &prober, &sdk_manager, &image).await? {
            installed.push(image);
        }

        let avd = AvdConfig::new(&config.name, &config.platform, config.abi.as_str(), config.tag.as_str())
            .with_options(config.options.clone());
        self.avd_manager.create_avd(runner, &tools, &avd).await?;
        run.advance(RunState::AvdCreated)?;

        let hardware_profile = match config.custom_hardware_profile.as_deref() {
            Some(content) => {
                info!("Applying custom hardware profile");
                let path = self.avd_manager.apply_hardware_profile(&config.name, content).await?;
                run.advance(RunState::HardwareProfileApplied)?;
                Some(path)
            }
            None => None,
        };

        match self.avd_manager.read_avd_info(&config.name).await {
            Ok(avd_info) => info!(
                "AVD {} at {}: abi={}, tag={}, image={}",
                avd_info.name,
                avd_info.path.display(),
                avd_info.abi.as_deref().unwrap_or("-"),
                avd_info.tag.as_deref().unwrap_or("-"),
                avd_info.image_sysdir.as_deref().unwrap_or("-"),
            ),
            Err(e) => debug!("Could not read config of AVD {}: {}", config.name, e),
        }

        exporter.export(BITRISE_EMULATOR_NAME, &config.name).await?;
        run.advance(RunState::EnvironmentExported)?;
        info!(
            "Emulator name is exported in environment variable: {} (value: {})",
            BITRISE_EMULATOR_NAME, config.name
        );

        Ok(ProvisionOutcome {
            tool_mode: tools.mode(),
            installed,
            avd_name: config.name.clone(),
            hardware_profile,
            states: run.history().to_vec(),
        })
    }
}

/// Probe, install when missing, re-probe. Returns whether an install ran.
async fn ensure_installed<R: CommandRunner>(
    run: &mut Orchestrator,
    runner: &R,
    prober: &InstallationProber,
    sdk_manager: &SdkManager<'_>,
    component: &SdkComponent,
) -> Result<bool> {
    let (checked, present_state) = match component {
        SdkComponent::SystemImage { .. } => (RunState::ImageChecked, RunState::ImageInstalled),
        SdkComponent::Platform { .. } => (RunState::PlatformChecked, RunState::PlatformInstalled),
        SdkComponent::BuildTool { .. } => {
            return Err(StepError::InvalidState(format!(
                "{} is not provisioned by this step",
                component.display_name()
            )))
        }
    };

    info!("Check if {} installed", component.kind());
    let present = prober.is_installed(component)?;
    info!("installed: {}", present);
    run.advance(checked)?;

    if !present {
        sdk_manager.install_verified(runner, prober, component).await?;
    }
    run.advance(present_state)?;

    Ok(!present)
}
