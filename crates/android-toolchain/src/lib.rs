//! Android Toolchain Management
//!
//! Handles the SDK side of provisioning:
//! - SDK component addressing (modern and legacy ids, install paths)
//! - Installation probing
//! - Locating `sdkmanager`/`avdmanager` or the legacy `android` tool
//! - Installing components
//! - Exporting values to later build steps

pub mod component;
pub mod env;
pub mod locator;
pub mod prober;
pub mod sdk_manager;

pub use component::{SdkComponent, DEFAULT_TAG};
pub use env::{EnvExporter, EnvmanExporter, BITRISE_EMULATOR_NAME};
pub use locator::{locate, LocatedTool, SdkTool, SdkTools, ToolMode};
pub use prober::{ImageLayout, InstallationProber};
pub use sdk_manager::SdkManager;
