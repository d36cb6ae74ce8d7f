//! SDK components
//!
//! The three kinds of SDK package the step knows how to address. Each one has
//! a modern package-manager id (`sdkmanager`), a legacy filter id (`android
//! update sdk`) and a location relative to the SDK root once installed.

use std::fmt;
use std::path::PathBuf;

/// Tag used when a system image has none
pub const DEFAULT_TAG: &str = "default";

/// SDK component types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkComponent {
    /// platforms;android-XX
    Platform { version: String },
    /// system-images;android-XX;tag;abi
    SystemImage { platform: String, abi: String, tag: String },
    /// build-tools;XX.X.X
    BuildTool { version: String },
}

impl SdkComponent {
    pub fn platform(version: impl Into<String>) -> Self {
        SdkComponent::Platform { version: version.into() }
    }

    /// An empty tag is stored as [`DEFAULT_TAG`].
    pub fn system_image(
        platform: impl Into<String>,
        abi: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        let tag = tag.into();
        SdkComponent::SystemImage {
            platform: platform.into(),
            abi: abi.into(),
            tag: if tag.is_empty() { DEFAULT_TAG.to_string() } else { tag },
        }
    }

    pub fn build_tool(version: impl Into<String>) -> Self {
        SdkComponent::BuildTool { version: version.into() }
    }

    /// Modern package id, e.g. `system-images;android-23;default;x86`
    pub fn sdk_style_path(&self) -> String {
        match self {
            SdkComponent::Platform { version } => format!("platforms;{}", version),
            SdkComponent::SystemImage { platform, abi, tag } => {
                format!("system-images;{};{};{}", platform, effective_tag(tag), abi)
            }
            SdkComponent::BuildTool { version } => format!("build-tools;{}", version),
        }
    }

    /// Legacy filter id, e.g. `sys-img-x86-android-23`.
    ///
    /// Tagged images replace the platform token with `<tag>-<api>`:
    /// `sys-img-x86-google_apis-23`.
    pub fn legacy_sdk_style_path(&self) -> String {
        match self {
            SdkComponent::Platform { version } => version.clone(),
            SdkComponent::SystemImage { platform, abi, tag } => {
                let tag = effective_tag(tag);
                let mut token = platform.clone();
                if tag != DEFAULT_TAG {
                    let split: Vec<&str> = platform.split('-').collect();
                    if split.len() == 2 {
                        token = format!("{}-{}", tag, split[1]);
                    }
                }
                format!("sys-img-{}-{}", abi, token)
            }
            SdkComponent::BuildTool { version } => format!("build-tools-{}", version),
        }
    }

    /// Location relative to the SDK root once installed
    pub fn install_path(&self) -> PathBuf {
        match self {
            SdkComponent::Platform { version } => PathBuf::from("platforms").join(version),
            SdkComponent::SystemImage { platform, abi, tag } => PathBuf::from("system-images")
                .join(platform)
                .join(effective_tag(tag))
                .join(abi),
            SdkComponent::BuildTool { version } => PathBuf::from("build-tools").join(version),
        }
    }

    /// Older SDKs put system images directly under `<platform>/<abi>`
    pub fn untagged_install_path(&self) -> Option<PathBuf> {
        match self {
            SdkComponent::SystemImage { platform, abi, .. } => {
                Some(PathBuf::from("system-images").join(platform).join(abi))
            }
            SdkComponent::Platform { .. } | SdkComponent::BuildTool { .. } => None,
        }
    }

    /// Short kind name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            SdkComponent::Platform { .. } => "platform",
            SdkComponent::SystemImage { .. } => "system image",
            SdkComponent::BuildTool { .. } => "build tool",
        }
    }

    /// Human-readable identity, e.g. `android-23/x86/google_apis`
    pub fn display_name(&self) -> String {
        match self {
            SdkComponent::Platform { version } | SdkComponent::BuildTool { version } => {
                version.clone()
            }
            SdkComponent::SystemImage { platform, abi, tag } => {
                format!("{}/{}/{}", platform, abi, effective_tag(tag))
            }
        }
    }
}

impl fmt::Display for SdkComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.display_name())
    }
}

fn effective_tag(tag: &str) -> &str {
    if tag.is_empty() {
        DEFAULT_TAG
    } else {
        tag
    }
}
