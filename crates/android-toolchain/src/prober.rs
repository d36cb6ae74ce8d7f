//! Installation Prober
//!
//! Answers "is this component on disk?" for one SDK root. A missing path is
//! a plain `false`; only filesystem access failures are errors.

use std::path::{Path, PathBuf};
use tracing::debug;

use avd_provision_core::{Result, StepError};

use crate::component::SdkComponent;

/// Where system images are looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLayout {
    /// Only `system-images/<platform>/<tag>/<abi>`
    TagQualified,
    /// Tag-qualified path first, then the older `system-images/<platform>/<abi>`
    #[default]
    UntaggedFallback,
}

impl ImageLayout {
    pub fn from_fallback(enabled: bool) -> Self {
        if enabled {
            ImageLayout::UntaggedFallback
        } else {
            ImageLayout::TagQualified
        }
    }
}

/// Checks component presence under an SDK root
#[derive(Debug, Clone)]
pub struct InstallationProber {
    sdk_root: PathBuf,
    layout: ImageLayout,
}

impl InstallationProber {
    pub fn new(sdk_root: impl Into<PathBuf>, layout: ImageLayout) -> Self {
        Self {
            sdk_root: sdk_root.into(),
            layout,
        }
    }

    /// Check if a component is installed
    pub fn is_installed(&self, component: &SdkComponent) -> Result<bool> {
        if self.path_exists(&component.install_path())? {
            return Ok(true);
        }

        if self.layout == ImageLayout::UntaggedFallback {
            if let Some(untagged) = component.untagged_install_path() {
                return self.path_exists(&untagged);
            }
        }

        Ok(false)
    }

    fn path_exists(&self, relative: &Path) -> Result<bool> {
        let path = self.sdk_root.join(relative);
        debug!("checking path: {}", path.display());

        path.try_exists()
            .map_err(|source| StepError::Probe { path, source })
    }
}
