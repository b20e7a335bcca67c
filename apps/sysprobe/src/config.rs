//! Probe configuration management.
//!
//! Configuration is stored as TOML at `~/.config/sysprobe/sysprobe.toml`
//! and created with defaults on first run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysprobe_collect::{DisplaySource, ScanOptions, ScanTool};

/// Probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Run scan tools through `sudo -n`.
    #[serde(default)]
    pub use_sudo: bool,

    /// `/proc/net/dev` interface name prefixes treated as wireless.
    #[serde(default = "default_wireless_prefixes")]
    pub wireless_prefixes: Vec<String>,

    /// Wireless scan tool.
    #[serde(default)]
    pub scan_tool: ScanTool,

    /// Where display EDIDs are read from.
    #[serde(default)]
    pub display_source: DisplaySource,
}

fn default_wireless_prefixes() -> Vec<String> {
    vec!["wlan".into(), "wlp".into()]
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            use_sudo: false,
            wireless_prefixes: default_wireless_prefixes(),
            scan_tool: ScanTool::default(),
            display_source: DisplaySource::default(),
        }
    }
}

impl ProbeConfig {
    /// Loads the configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads configuration from `path`, or writes the defaults there if the
    /// file does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ProbeConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = ProbeConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            tool: self.scan_tool,
            use_sudo: self.use_sudo,
            prefixes: self.wireless_prefixes.clone(),
        }
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("sysprobe")
        .join("sysprobe.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ProbeConfig::default();
        assert!(!config.use_sudo);
        assert_eq!(config.wireless_prefixes, vec!["wlan", "wlp"]);
        assert_eq!(config.scan_tool, ScanTool::Auto);
        assert_eq!(config.display_source, DisplaySource::Auto);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: ProbeConfig = toml::from_str("scan_tool = \"iwlist\"").unwrap();
        assert_eq!(config.scan_tool, ScanTool::Iwlist);
        assert!(!config.use_sudo);
        assert_eq!(config.wireless_prefixes, vec!["wlan", "wlp"]);
        assert_eq!(config.display_source, DisplaySource::Auto);
    }

    #[test]
    fn full_toml() {
        let toml_str = r#"
use_sudo = true
wireless_prefixes = ["wl"]
scan_tool = "iw"
display_source = "xrandr"
"#;
        let config: ProbeConfig = toml::from_str(toml_str).unwrap();
        assert!(config.use_sudo);
        assert_eq!(config.wireless_prefixes, vec!["wl"]);
        assert_eq!(config.scan_tool, ScanTool::Iw);
        assert_eq!(config.display_source, DisplaySource::Xrandr);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert!(toml::from_str::<ProbeConfig>("scan_tool = \"nmcli\"").is_err());
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysprobe").join("sysprobe.toml");

        let config = ProbeConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.scan_tool, ScanTool::Auto);

        let reloaded = ProbeConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.wireless_prefixes, config.wireless_prefixes);
    }

    #[test]
    fn scan_options_follow_config() {
        let config = ProbeConfig {
            use_sudo: true,
            scan_tool: ScanTool::Iw,
            ..ProbeConfig::default()
        };
        let options = config.scan_options();
        assert!(options.use_sudo);
        assert_eq!(options.tool, ScanTool::Iw);
        assert_eq!(options.prefixes, vec!["wlan", "wlp"]);
    }
}
