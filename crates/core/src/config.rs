//! Step Configuration
//!
//! Reads the step inputs from environment variables and validates them:
//! - AVD name, platform, ABI and system image tag
//! - extra `create avd` options (shell-quoted)
//! - optional custom hardware profile
//! - the SDK root (`ANDROID_HOME`)
//!
//! All string-level validation happens before the single filesystem check of
//! the SDK root, so a bad input never reaches the SDK.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, StepError};

/// Input keys
pub const NAME_KEY: &str = "name";
pub const PLATFORM_KEY: &str = "platform";
pub const ABI_KEY: &str = "abi";
pub const TAG_KEY: &str = "tag";
pub const OPTIONS_KEY: &str = "options";
pub const HARDWARE_PROFILE_KEY: &str = "custom_hardware_profile_content";
pub const ANDROID_HOME_KEY: &str = "ANDROID_HOME";
pub const UNTAGGED_FALLBACK_KEY: &str = "system_image_untagged_fallback";
pub const COMMAND_TIMEOUT_KEY: &str = "command_timeout";

/// System image ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    ArmeabiV7a,
    Arm64V8a,
    Mips,
    X86,
    X86_64,
}

impl Abi {
    /// Every accepted ABI
    pub const ALL: [Abi; 5] = [Abi::ArmeabiV7a, Abi::Arm64V8a, Abi::Mips, Abi::X86, Abi::X86_64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Abi::ArmeabiV7a => "armeabi-v7a",
            Abi::Arm64V8a => "arm64-v8a",
            Abi::Mips => "mips",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }
}

impl FromStr for Abi {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self> {
        Abi::ALL
            .into_iter()
            .find(|abi| abi.as_str() == s)
            .ok_or_else(|| {
                StepError::Config(format!(
                    "invalid abi ({}), available: {}",
                    s,
                    Abi::ALL.map(|a| a.as_str()).join(", ")
                ))
            })
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System image flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    #[default]
    Default,
    GoogleApis,
    GoogleApisPlaystore,
    AndroidTv,
    AndroidWear,
}

impl Tag {
    /// Every accepted tag
    pub const ALL: [Tag; 5] = [
        Tag::Default,
        Tag::GoogleApis,
        Tag::GoogleApisPlaystore,
        Tag::AndroidTv,
        Tag::AndroidWear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Default => "default",
            Tag::GoogleApis => "google_apis",
            Tag::GoogleApisPlaystore => "google_apis_playstore",
            Tag::AndroidTv => "android-tv",
            Tag::AndroidWear => "android-wear",
        }
    }
}

impl FromStr for Tag {
    type Err = StepError;

    /// An empty tag reads as [`Tag::Default`].
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Tag::Default);
        }
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| {
                StepError::Config(format!(
                    "invalid tag ({}), available: {}",
                    s,
                    Tag::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated step inputs
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// AVD name
    pub name: String,
    /// Platform, e.g. `android-23`
    pub platform: String,
    pub abi: Abi,
    pub tag: Tag,
    /// Extra `create avd` arguments, already word-split
    pub options: Vec<String>,
    /// Content written verbatim into the AVD's config.ini
    pub custom_hardware_profile: Option<String>,
    /// SDK root
    pub android_home: PathBuf,
    /// Also accept system images installed without the tag directory
    pub untagged_image_fallback: bool,
    /// Upper bound for each external SDK invocation
    pub command_timeout: Option<Duration>,
}

impl StepConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through a key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let name = get(NAME_KEY).ok_or_else(|| missing("Name"))?;
        let platform = get(PLATFORM_KEY).ok_or_else(|| missing("Platform"))?;
        let abi: Abi = get(ABI_KEY).ok_or_else(|| missing("Abi"))?.parse()?;
        let tag: Tag = get(TAG_KEY).unwrap_or_default().parse()?;

        let options = match get(OPTIONS_KEY) {
            Some(raw) => shell_words::split(&raw).map_err(|e| {
                StepError::Config(format!("failed to split custom options ({}): {}", raw, e))
            })?,
            None => Vec::new(),
        };

        let untagged_image_fallback = match get(UNTAGGED_FALLBACK_KEY) {
            Some(raw) => parse_bool(UNTAGGED_FALLBACK_KEY, &raw)?,
            None => true,
        };

        let command_timeout = match get(COMMAND_TIMEOUT_KEY) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(StepError::Config(format!(
                        "{} must be a positive number of seconds, got: {}",
                        COMMAND_TIMEOUT_KEY, raw
                    )))
                }
            },
            None => None,
        };

        let custom_hardware_profile = get(HARDWARE_PROFILE_KEY);

        let android_home = get(ANDROID_HOME_KEY)
            .map(PathBuf::from)
            .ok_or_else(|| StepError::Config("no ANDROID_HOME env set".into()))?;

        // Last check: the only one that touches the filesystem.
        if !android_home.is_dir() {
            return Err(StepError::Config(format!(
                "ANDROID_HOME ({}) is not an existing directory",
                android_home.display()
            )));
        }

        debug!("Configuration loaded for AVD {}", name);

        Ok(Self {
            name,
            platform,
            abi,
            tag,
            options,
            custom_hardware_profile,
            android_home,
            untagged_image_fallback,
            command_timeout,
        })
    }

    /// Log the configuration
    pub fn log_summary(&self) {
        info!("Configs:");
        info!("- Name: {}", self.name);
        info!("- Platform: {}", self.platform);
        info!("- Abi: {}", self.abi);
        info!("- Tag: {}", self.tag);
        info!("- Options: {}", shell_words::join(&self.options));
        info!(
            "- CustomHardwareProfile: {}",
            if self.custom_hardware_profile.is_some() { "set" } else { "not set" }
        );
        info!("- AndroidHome: {}", self.android_home.display());
    }
}

fn missing(what: &str) -> StepError {
    StepError::Config(format!("no {} parameter specified", what))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(StepError::Config(format!("{} must be true or false, got: {}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_inputs(home: &str) -> Vec<(&'static str, String)> {
        vec![
            (NAME_KEY, "Pixel_API_23".to_string()),
            (PLATFORM_KEY, "android-23".to_string()),
            (ABI_KEY, "x86".to_string()),
            (TAG_KEY, "google_apis".to_string()),
            (ANDROID_HOME_KEY, home.to_string()),
        ]
    }

    fn as_refs<'a>(pairs: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
        pairs.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    #[test]
    fn test_valid_config() {
        let home = tempfile::tempdir().unwrap();
        let mut inputs = valid_inputs(home.path().to_str().unwrap());
        inputs.push((OPTIONS_KEY, "--sdcard 512M --device \"Nexus 5\"".to_string()));

        let config = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap();
        assert_eq!(config.name, "Pixel_API_23");
        assert_eq!(config.abi, Abi::X86);
        assert_eq!(config.tag, Tag::GoogleApis);
        assert_eq!(config.options, vec!["--sdcard", "512M", "--device", "Nexus 5"]);
        assert!(config.untagged_image_fallback);
        assert!(config.command_timeout.is_none());
        assert!(config.custom_hardware_profile.is_none());
    }

    #[test]
    fn test_invalid_abi_fails_before_filesystem_check() {
        // ANDROID_HOME points nowhere: the abi error must win.
        let mut inputs = valid_inputs("/definitely/not/an/sdk");
        inputs[2].1 = "arm99".to_string();

        let err = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("arm99"));
    }

    #[test]
    fn test_empty_tag_is_default() {
        let home = tempfile::tempdir().unwrap();
        let mut inputs = valid_inputs(home.path().to_str().unwrap());
        inputs[3].1 = String::new();

        let config = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap();
        assert_eq!(config.tag, Tag::Default);
    }

    #[test]
    fn test_missing_name() {
        let home = tempfile::tempdir().unwrap();
        let inputs = valid_inputs(home.path().to_str().unwrap());
        let without_name: Vec<_> = inputs.into_iter().filter(|(k, _)| *k != NAME_KEY).collect();

        let err = StepConfig::from_lookup(lookup(&as_refs(&without_name))).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: no Name parameter specified");
    }

    #[test]
    fn test_android_home_must_exist() {
        let inputs = valid_inputs("/definitely/not/an/sdk");
        let err = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap_err();
        assert!(err.to_string().contains("ANDROID_HOME"));
    }

    #[test]
    fn test_unbalanced_options_quote() {
        let home = tempfile::tempdir().unwrap();
        let mut inputs = valid_inputs(home.path().to_str().unwrap());
        inputs.push((OPTIONS_KEY, "--device \"Nexus 5".to_string()));

        let err = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap_err();
        assert!(err.to_string().contains("failed to split custom options"));
    }

    #[test]
    fn test_supplementary_inputs() {
        let home = tempfile::tempdir().unwrap();
        let mut inputs = valid_inputs(home.path().to_str().unwrap());
        inputs.push((UNTAGGED_FALLBACK_KEY, "false".to_string()));
        inputs.push((COMMAND_TIMEOUT_KEY, "600".to_string()));

        let config = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap();
        assert!(!config.untagged_image_fallback);
        assert_eq!(config.command_timeout, Some(Duration::from_secs(600)));

        inputs.push((COMMAND_TIMEOUT_KEY, "0".to_string()));
        let err = StepConfig::from_lookup(lookup(&as_refs(&inputs))).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_abi_and_tag_names() {
        assert_eq!("arm64-v8a".parse::<Abi>().unwrap(), Abi::Arm64V8a);
        assert_eq!(Tag::AndroidTv.to_string(), "android-tv");
        assert!("tv".parse::<Tag>().is_err());
    }
}
