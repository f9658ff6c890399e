//! Audio configuration resource.
//!
//! Holds pool sizing, the default singleton options of audio players and the
//! clip catalogue, loaded from an INI file. Every value has a safe default so
//! a missing file is not an error for the caller that ignores it.
//!
//! # Configuration File Format
//!
//! ```ini
//! [pool]
//! default_capacity = 10
//! max_size = 100
//!
//! [player]
//! singleton_mode = global
//! persist_when_global = true
//!
//! [clips]
//! explosion = 1.25
//! theme = 94.5
//! ```
//!
//! Section and key names are case-sensitive, so clip names reach the
//! [`ClipStore`](crate::resources::clipstore::ClipStore) exactly as written.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::components::audioplayer::pool::{DEFAULT_CAPACITY, DEFAULT_MAX_SIZE};
use crate::resources::identity::SingletonMode;

const DEFAULT_PERSIST_WHEN_GLOBAL: bool = true;
const DEFAULT_CONFIG_PATH: &str = "./audio.ini";

/// Audio configuration resource.
///
/// Changes made at runtime are pushed to live players by
/// [`apply_audio_config_changes`](crate::systems::audioconfig::apply_audio_config_changes).
#[derive(Resource, Debug, Clone)]
pub struct AudioConfig {
    /// Idle storage reserved up front by each pool.
    pub default_capacity: usize,
    /// Cap on live voices per player.
    pub max_size: usize,
    /// Singleton mode given to players spawned from this config.
    pub singleton_mode: SingletonMode,
    /// Whether a global player is detached from its parent and survives
    /// scope switches.
    pub persist_when_global: bool,
    /// Clip name and length in seconds, in file order.
    pub clips: Vec<(String, f32)>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioConfig {
    pub fn new() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            max_size: DEFAULT_MAX_SIZE,
            singleton_mode: SingletonMode::default(),
            persist_when_global: DEFAULT_PERSIST_WHEN_GLOBAL,
            clips: Vec::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values keep their current values. Clips listed in the file
    /// replace the current clip list.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new_cs();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load audio config file: {}", e))?;
        self.apply_ini(&config);

        info!(
            "Loaded audio config: capacity={}, max_size={}, mode={}, persist={}, clips={}",
            self.default_capacity,
            self.max_size,
            self.singleton_mode,
            self.persist_when_global,
            self.clips.len()
        );
        Ok(())
    }

    /// Parse configuration from INI text. Used by tests and embedded configs.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new_cs();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse audio config: {}", e))?;
        self.apply_ini(&config);
        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) {
        // [pool] section
        if let Some(capacity) = config.getuint("pool", "default_capacity").ok().flatten() {
            self.default_capacity = capacity as usize;
        }
        if let Some(max) = config.getuint("pool", "max_size").ok().flatten() {
            self.max_size = (max as usize).max(1);
        }

        // [player] section
        if let Some(mode) = config.get("player", "singleton_mode") {
            match mode.parse::<SingletonMode>() {
                Ok(mode) => self.singleton_mode = mode,
                Err(e) => warn!("Ignoring [player] singleton_mode: {}", e),
            }
        }
        if let Some(persist) = config.getbool("player", "persist_when_global").ok().flatten() {
            self.persist_when_global = persist;
        }

        // [clips] section; names keep their case
        let map = config.get_map_ref();
        if let Some(section) = map.get("clips") {
            let mut clips: Vec<(String, f32)> = Vec::with_capacity(section.len());
            for (name, value) in section {
                let Some(value) = value else {
                    warn!("Clip '{}' has no length, skipped", name);
                    continue;
                };
                match value.trim().parse::<f32>() {
                    Ok(length) if length >= 0.0 => clips.push((name.clone(), length)),
                    _ => warn!("Clip '{}' has invalid length '{}', skipped", name, value),
                }
            }
            clips.sort_by(|a, b| a.0.cmp(&b.0));
            self.clips = clips;
        }
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new_cs();

        config.set(
            "pool",
            "default_capacity",
            Some(self.default_capacity.to_string()),
        );
        config.set("pool", "max_size", Some(self.max_size.to_string()));

        config.set(
            "player",
            "singleton_mode",
            Some(self.singleton_mode.to_string()),
        );
        config.set(
            "player",
            "persist_when_global",
            Some(self.persist_when_global.to_string()),
        );

        for (name, length) in &self.clips {
            config.set("clips", name, Some(length.to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save audio config file: {}", e))?;

        info!("Saved audio config to {:?}", self.config_path);
        Ok(())
    }

    /// Set pool sizing.
    pub fn set_pool_size(&mut self, default_capacity: usize, max_size: usize) {
        self.default_capacity = default_capacity;
        self.max_size = max_size.max(1);
    }

    pub fn clip_length(&self, name: &str) -> Option<f32> {
        self.clips
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, length)| *length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pool_defaults() {
        let config = AudioConfig::new();
        assert_eq!(config.default_capacity, 10);
        assert_eq!(config.max_size, 100);
        assert_eq!(config.singleton_mode, SingletonMode::GlobalUnique);
        assert!(config.persist_when_global);
        assert!(config.clips.is_empty());
    }

    #[test]
    fn parses_every_section() {
        let mut config = AudioConfig::new();
        config
            .load_from_str(
                "[pool]\ndefault_capacity = 2\nmax_size = 4\n\n\
                 [player]\nsingleton_mode = scene\npersist_when_global = false\n\n\
                 [clips]\nexplosion = 1.25\ntheme = 90\nbroken = loud\n",
            )
            .unwrap();
        assert_eq!(config.default_capacity, 2);
        assert_eq!(config.max_size, 4);
        assert_eq!(config.singleton_mode, SingletonMode::PerScopeUnique);
        assert!(!config.persist_when_global);
        assert_eq!(
            config.clips,
            vec![("explosion".to_string(), 1.25), ("theme".to_string(), 90.0)]
        );
        assert_eq!(config.clip_length("theme"), Some(90.0));
        assert_eq!(config.clip_length("broken"), None);
    }

    #[test]
    fn clip_names_keep_their_case() {
        let mut config = AudioConfig::new();
        config
            .load_from_str("[clips]\nExplosion = 1\nUI_Click = 0.1\n")
            .unwrap();
        assert_eq!(config.clip_length("Explosion"), Some(1.0));
        assert_eq!(config.clip_length("UI_Click"), Some(0.1));
        assert_eq!(config.clip_length("explosion"), None);
    }

    #[test]
    fn bad_mode_keeps_previous_value() {
        let mut config = AudioConfig::new();
        config
            .load_from_str("[player]\nsingleton_mode = sometimes\n")
            .unwrap();
        assert_eq!(config.singleton_mode, SingletonMode::GlobalUnique);
    }

    #[test]
    fn zero_max_size_is_raised_to_one() {
        let mut config = AudioConfig::new();
        config.load_from_str("[pool]\nmax_size = 0\n").unwrap();
        assert_eq!(config.max_size, 1);
    }
}
