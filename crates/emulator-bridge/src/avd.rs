//! AVD (Android Virtual Device) Manager
//!
//! Creates the AVD, writes an optional custom hardware profile into it and
//! reads back its `config.ini`.

use std::path::PathBuf;
use configparser::ini::Ini;
use tracing::{debug, info};

use avd_provision_android_toolchain::{SdkComponent, SdkTool, SdkTools, ToolMode, DEFAULT_TAG};
use avd_provision_core::{run_to_completion, CommandRunner, Invocation, Result, StepError};

/// Answer to the "create a custom hardware profile?" prompt
const DECLINE_HARDWARE_PROFILE: &str = "n";

/// AVD configuration for creation
#[derive(Debug, Clone)]
pub struct AvdConfig {
    pub name: String,
    pub platform: String,
    pub abi: String,
    pub tag: String,
    /// Extra arguments appended verbatim to `create avd`
    pub options: Vec<String>,
}

impl AvdConfig {
    /// An empty tag is stored as `default`.
    pub fn new(name: &str, platform: &str, abi: &str, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: platform.to_string(),
            abi: abi.to_string(),
            tag: if tag.is_empty() { DEFAULT_TAG.to_string() } else { tag.to_string() },
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// System image the AVD is based on
    pub fn system_image(&self) -> SdkComponent {
        SdkComponent::system_image(&self.platform, &self.abi, &self.tag)
    }
}

/// Details read from a created AVD
#[derive(Debug, Clone)]
pub struct AvdInfo {
    pub name: String,
    pub path: PathBuf,
    pub abi: Option<String>,
    pub image_sysdir: Option<String>,
    pub tag: Option<String>,
    pub device_name: Option<String>,
}

/// AVD Manager
pub struct AvdManager {
    avd_home: PathBuf,
}

impl AvdManager {
    /// Create a manager for `~/.android/avd`
    pub fn new() -> Self {
        let avd_home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".android")
            .join("avd");

        Self { avd_home }
    }

    pub fn with_avd_home(avd_home: impl Into<PathBuf>) -> Self {
        Self { avd_home: avd_home.into() }
    }

    /// Directory of the named AVD
    pub fn avd_dir(&self, name: &str) -> PathBuf {
        self.avd_home.join(format!("{}.avd", name))
    }

    /// Build the `create avd` invocation for the resolved tool mode
    pub fn create_command(&self, tools: &SdkTools, config: &AvdConfig) -> Result<Invocation> {
        let binary = tools.require(SdkTool::AvdManager)?;

        let invocation = match tools.mode() {
            ToolMode::Modern => {
                let mut invocation = Invocation::new(binary)
                    .args(["create", "avd", "--force", "--package"])
                    .arg(config.system_image().sdk_style_path())
                    .args(["--name", config.name.as_str(), "--abi", config.abi.as_str()]);
                if config.tag != DEFAULT_TAG {
                    invocation = invocation.args(["--tag", config.tag.as_str()]);
                }
                invocation
            }
            // TODO: decide whether legacy creation should encode the tag
            // (e.g. `--abi <tag>/<abi>`); tagged images are untested with `android create avd`.
            ToolMode::Legacy => Invocation::new(binary).args([
                "create",
                "avd",
                "--force",
                "--name",
                config.name.as_str(),
                "--target",
                config.platform.as_str(),
                "--abi",
                config.abi.as_str(),
            ]),
        };

        Ok(invocation
            .args(config.options.iter().cloned())
            .stdin(DECLINE_HARDWARE_PROFILE))
    }

    /// Create a new AVD
    pub async fn create_avd<R: CommandRunner>(
        &self,
        runner: &R,
        tools: &SdkTools,
        config: &AvdConfig,
    ) -> Result<()> {
        let invocation = self.create_command(tools, config)?;

        info!("Creating AVD: {}", config.name);
        info!("$ {}", invocation);

        run_to_completion(runner, &invocation).await.map_err(|e| {
            StepError::install(
                format!("AVD {} ({})", config.name, config.system_image().display_name()),
                e,
            )
        })?;

        info!("AVD created successfully: {}", config.name);
        Ok(())
    }

    /// Overwrite the AVD's config.ini with `content`.
    ///
    /// The AVD directory must already exist.
    pub async fn apply_hardware_profile(&self, name: &str, content: &str) -> Result<PathBuf> {
        let avd_dir = self.avd_dir(name);
        let config_path = avd_dir.join(crate::AVD_CONFIG_FILE);

        if !avd_dir.is_dir() {
            return Err(StepError::HardwareProfile {
                path: config_path,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("AVD directory {} does not exist", avd_dir.display()),
                ),
            });
        }

        tokio::fs::write(&config_path, content)
            .await
            .map_err(|source| StepError::HardwareProfile {
                path: config_path.clone(),
                source,
            })?;

        info!("Custom hardware profile written to {}", config_path.display());
        Ok(config_path)
    }

    /// Parse AVD info from its config.ini
    pub async fn read_avd_info(&self, name: &str) -> std::io::Result<AvdInfo> {
        let avd_dir = self.avd_dir(name);
        let content = tokio::fs::read_to_string(avd_dir.join(crate::AVD_CONFIG_FILE)).await?;

        let mut config = Ini::new();
        config
            .read(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        debug!("Parsed config.ini of AVD {}", name);

        Ok(AvdInfo {
            name: name.to_string(),
            path: avd_dir,
            abi: config.get("default", "abi.type"),
            image_sysdir: config.get("default", "image.sysdir.1"),
            tag: config.get("default", "tag.id"),
            device_name: config.get("default", "hw.device.name"),
        })
    }
}

impl Default for AvdManager {
    fn default() -> Self {
        Self::new()
    }
}
