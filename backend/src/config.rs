//! Configuration management.

use crate::gst::SourceOptions;
use castrig_types::{AudioFormat, VideoFormat};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    sources: SourcesConfig,
    #[serde(default)]
    debug: DebugConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SourcesConfig {
    /// Use test patterns instead of capture devices
    fake: Option<bool>,
    front_device: Option<PathBuf>,
    surface_device: Option<PathBuf>,
    /// ARGB background of the surface test pattern
    background_color: Option<u32>,
    /// Waveform of the audio test source
    wave: Option<String>,
    front_format: Option<VideoFormat>,
    surface_format: Option<VideoFormat>,
    audio_format: Option<AudioFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DebugConfig {
    /// Directory that pipeline DOT graphs are written to
    dot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

/// Values given on the command line. They override every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub fake: Option<bool>,
    pub front_device: Option<PathBuf>,
    pub surface_device: Option<PathBuf>,
    pub dot_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fake: bool,
    pub front_device: PathBuf,
    pub surface_device: PathBuf,
    pub background_color: u32,
    pub wave: String,
    /// Raw formats the branches are normalized to
    pub front_format: VideoFormat,
    pub surface_format: VideoFormat,
    pub audio_format: AudioFormat,
    /// Directory for DOT dumps (GST_DEBUG_DUMP_DOT_DIR is used when unset)
    pub dot_dir: Option<PathBuf>,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain:
    /// defaults < user config < `.castrig.toml` < `config_path` < env vars < CLI args.
    ///
    /// The user config is `config.toml` in the user config directory
    /// (~/.config/castrig/ on Linux). Environment variables use the
    /// `CASTRIG_` prefix with `__` between section and key, e.g.
    /// `CASTRIG_SOURCES__FRONT_DEVICE`.
    pub fn from_figment(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".castrig.toml"));
        let user_config = directories::ProjectDirs::from("", "", "castrig")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        // 1. Start with defaults
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        // 2. Merge user and local config files if they exist
        for path in [user_config, local_config].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // 3. An explicitly named file must exist
        if let Some(path) = config_path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        // 4. Merge environment variables (CASTRIG_* prefix)
        figment = figment.merge(Env::prefixed("CASTRIG_").split("__"));

        // 5. Merge CLI arguments (highest priority)
        if let Some(fake) = overrides.fake {
            figment = figment.merge(Serialized::default("sources.fake", fake));
        }
        if let Some(ref device) = overrides.front_device {
            figment = figment.merge(Serialized::default("sources.front_device", device));
        }
        if let Some(ref device) = overrides.surface_device {
            figment = figment.merge(Serialized::default("sources.surface_device", device));
        }
        if let Some(ref dir) = overrides.dot_dir {
            figment = figment.merge(Serialized::default("debug.dot_dir", dir));
        }
        if let Some(ref level) = overrides.log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        let config_file: ConfigFile = figment.extract()?;
        Ok(Self::from_file(config_file))
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = SourceOptions::default();
        Self {
            fake: file.sources.fake.unwrap_or(defaults.fake),
            front_device: file.sources.front_device.unwrap_or(defaults.front_device),
            surface_device: file
                .sources
                .surface_device
                .unwrap_or(defaults.surface_device),
            background_color: file
                .sources
                .background_color
                .unwrap_or(defaults.background_color),
            wave: file.sources.wave.unwrap_or(defaults.wave),
            front_format: file.sources.front_format.unwrap_or(defaults.front_format),
            surface_format: file
                .sources
                .surface_format
                .unwrap_or(defaults.surface_format),
            audio_format: file.sources.audio_format.unwrap_or(defaults.audio_format),
            dot_dir: file.debug.dot_dir,
            log_level: file.logging.log_level,
        }
    }

    /// Options for [`crate::gst::add_test_sources`].
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            fake: self.fake,
            front_device: self.front_device.clone(),
            surface_device: self.surface_device.clone(),
            background_color: self.background_color,
            wave: self.wave.clone(),
            front_format: self.front_format.clone(),
            surface_format: self.surface_format.clone(),
            audio_format: self.audio_format.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}
