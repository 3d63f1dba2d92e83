use anyhow::{Context, Result};
use ose::lock::{DEFAULT_INTERVAL, DEFAULT_MODE};
use ose::platform::Fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub temp: TempConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LockConfig {
    /// Polling interval for blocking acquisition, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Permission bits of created lock files.
    #[serde(default = "default_lock_mode")]
    pub mode: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            mode: default_lock_mode(),
        }
    }
}

impl LockConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TempConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Directory for temp files. Unset means next to the destination.
    pub dir: Option<PathBuf>,
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            dir: None,
        }
    }
}

impl TempConfig {
    /// Where to stage a temp file that will be published at `dst`.
    pub fn dir_for(&self, dst: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dst
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL.as_millis() as u64
}

fn default_lock_mode() -> u32 {
    DEFAULT_MODE
}

fn default_prefix() -> String {
    ".ose-".to_string()
}

impl Config {
    pub fn load(path: &Path, fs: &impl Fs) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    /// Load the config from an explicit path, or from the default location
    /// when it exists. A missing default file yields the defaults.
    pub fn resolve(explicit: Option<&Path>, fs: &impl Fs) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path, fs);
        }
        match Self::default_path(fs) {
            Some(path) if fs.exists(&path) => Self::load(&path, fs),
            _ => Ok(Self::default()),
        }
    }

    /// Return the default config file path.
    pub fn default_path(fs: &impl Fs) -> Option<PathBuf> {
        fs.config_dir().map(|dir| dir.join("ose").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ose::platform::FakeFs;

    const CONFIG_PATH: &str = "/home/test/.config/ose/config.toml";

    #[test]
    fn default_path_under_config_dir() {
        let fs = FakeFs::new("/home/test");
        assert_eq!(Config::default_path(&fs), Some(PathBuf::from(CONFIG_PATH)));
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let fs = FakeFs::new("/home/test");
        let config = Config::resolve(None, &fs).unwrap();
        assert_eq!(config.lock.interval(), Duration::from_millis(100));
        assert_eq!(config.lock.mode, 0o644);
        assert_eq!(config.temp.prefix, ".ose-");
        assert_eq!(config.temp.dir, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let fs = FakeFs::new("/home/test");
        fs.add_file(CONFIG_PATH, "[lock]\ninterval_ms = 20\n\n[temp]\ndir = \"/var/tmp\"\n");
        let config = Config::resolve(None, &fs).unwrap();
        assert_eq!(config.lock.interval(), Duration::from_millis(20));
        assert_eq!(config.lock.mode, 0o644);
        assert_eq!(config.temp.prefix, ".ose-");
        assert_eq!(config.temp.dir.as_deref(), Some(Path::new("/var/tmp")));
    }

    #[test]
    fn lock_mode_accepts_octal_literal() {
        let fs = FakeFs::new("/home/test");
        fs.add_file(CONFIG_PATH, "[lock]\nmode = 0o600\n");
        assert_eq!(Config::resolve(None, &fs).unwrap().lock.mode, 0o600);

        fs.add_file(CONFIG_PATH, "[lock]\nmode = 420\n");
        assert_eq!(Config::resolve(None, &fs).unwrap().lock.mode, 0o644);
    }

    #[test]
    fn explicit_path_must_exist() {
        let fs = FakeFs::new("/home/test");
        let err = Config::resolve(Some(Path::new("/etc/ose.toml")), &fs).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("/etc/ose.toml"), "got: {msg}");
    }

    #[test]
    fn invalid_toml_is_reported() {
        let fs = FakeFs::new("/home/test");
        fs.add_file(CONFIG_PATH, "[lock\n");
        let err = Config::resolve(None, &fs).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn temp_dir_defaults_to_destination_parent() {
        let temp = TempConfig::default();
        assert_eq!(temp.dir_for(Path::new("/srv/out.txt")), PathBuf::from("/srv"));
        assert_eq!(temp.dir_for(Path::new("out.txt")), PathBuf::from("."));

        let temp = TempConfig {
            dir: Some(PathBuf::from("/var/tmp")),
            ..Default::default()
        };
        assert_eq!(temp.dir_for(Path::new("/srv/out.txt")), PathBuf::from("/var/tmp"));
    }
}
