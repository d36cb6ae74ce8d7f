//! Android Emulator Bridge
//!
//! Creates and configures Android Virtual Devices (AVDs).

pub mod avd;

pub use avd::{AvdConfig, AvdInfo, AvdManager};

/// Default AVD configuration file name inside `<name>.avd`
pub const AVD_CONFIG_FILE: &str = "config.ini";
