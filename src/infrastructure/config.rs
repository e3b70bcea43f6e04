use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct JradConfig {
    /// Seconds between polls
    pub interval_secs: u64,
    pub output: OutputSettings,
    pub opensky: OpenSkySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub placefile: String,
    pub icon: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenSkySettings {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// One day
pub const MAX_INTERVAL_SECS: u64 = 86_400;

impl JradConfig {
    /// Reject settings the polling loop cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be at least 1");
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            anyhow::bail!(
                "interval_secs must be at most {}, got {}",
                MAX_INTERVAL_SECS,
                self.interval_secs
            );
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl OutputSettings {
    pub fn placefile_path(&self) -> PathBuf {
        self.directory.join(&self.placefile)
    }

    /// Absolute path of the icon sheet, as the radar client needs it
    pub fn icon_path(&self) -> anyhow::Result<PathBuf> {
        let icon = self.directory.join(&self.icon);
        std::path::absolute(&icon)
            .with_context(|| format!("Failed to resolve icon path {}", icon.display()))
    }
}

impl OpenSkySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn load_jrad_config() -> anyhow::Result<JradConfig> {
    load_jrad_config_from("config/jrad")
}

/// Defaults, overridden by the optional config file `name` (any extension the
/// config crate understands), overridden by `JRAD_*` environment variables
/// such as `JRAD_INTERVAL_SECS` or `JRAD_OPENSKY__USERNAME`.
pub fn load_jrad_config_from(name: &str) -> anyhow::Result<JradConfig> {
    let settings = config::Config::builder()
        .set_default("interval_secs", 60)?
        .set_default("output.directory", "data")?
        .set_default("output.placefile", "jrad.txt")?
        .set_default("output.icon", "planes.png")?
        .set_default("opensky.base_url", "https://opensky-network.org/api")?
        .set_default("opensky.timeout_secs", 30)?
        .add_source(config::File::with_name(name).required(false))
        .add_source(
            config::Environment::with_prefix("JRAD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: JradConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
