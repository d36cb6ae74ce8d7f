//! avd-provision - Android emulator provisioning build step
//!
//! Ensures an Android platform, system image and AVD exist on a CI build
//! agent, creating whatever is missing with the SDK tools found under
//! `ANDROID_HOME`, then exports the emulator name for later steps.
//!
//! ## Architecture
//!
//! - `avd-provision-core`: errors, step configuration, process seam, run states
//! - `avd-provision-android-toolchain`: SDK components, probing, tool location, installs
//! - `avd-provision-emulator-bridge`: AVD creation and configuration

#![warn(clippy::all)]

pub mod commands;

pub use avd_provision_android_toolchain as toolchain;
pub use avd_provision_core as core;
pub use avd_provision_emulator_bridge as emulator;

pub use commands::{ProvisionCommand, ProvisionOutcome};

/// Application name
pub const APP_NAME: &str = "avd-provision";

