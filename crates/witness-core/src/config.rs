//! Configuration loading and typed config structures for the action core.
//!
//! The canonical configuration lives in `witness-config.yaml` at the project
//! root. Every section is optional: an empty file yields the standard
//! registry, the standard sense profiles, and the standard effectors.
//! Entries under `actions`, `senses`, and `effectors` override the
//! standard tables rather than replacing them wholesale (except
//! `effectors`, which replaces the table when present).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use witness_actions::{DEFAULT_MAX_MESSAGE_LEN, HandlerSettings};
use witness_rules::{
    ActionDefinition, ActionRegistry, DEFAULT_CR, EffectorRegistry, RESULT_DIE, RulesError,
    standard_effectors,
};
use witness_senses::{MemoryConfig, ProfileEntry, SenseError, SenseProfiles};

use crate::batch::BatchMode;
use crate::pipeline::{DEFAULT_FALLBACK_RADIUS, PipelineSettings};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An action definition override is malformed.
    #[error("invalid action definition: {source}")]
    Rules {
        /// The registry error.
        #[from]
        source: RulesError,
    },

    /// A sense profile override is malformed.
    #[error("invalid sense profile: {source}")]
    Senses {
        /// The profile error.
        #[from]
        source: SenseError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `witness-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WitnessConfig {
    /// Pipeline and batch settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Dice settings.
    #[serde(default)]
    pub roll: RollConfig,

    /// Observer memory bounds.
    #[serde(default)]
    pub perception: MemoryConfig,

    /// Action definition overrides.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,

    /// Sense profile overrides keyed by `VERB` or `VERB.SUBTYPE`.
    #[serde(default)]
    pub senses: BTreeMap<String, Vec<ProfileEntry>>,

    /// Replacement tag effectors. `None` keeps the standard table.
    #[serde(default)]
    pub effectors: Option<EffectorRegistry>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WitnessConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The standard registry with `actions` applied. Definitions without a
    /// base CR get `roll.default_cr`.
    pub fn registry(&self) -> Result<ActionRegistry, ConfigError> {
        let merged = ActionRegistry::standard().with_overrides(self.actions.iter().cloned())?;
        let default_cr = self.roll.default_cr;
        let registry = ActionRegistry::from_definitions(merged.iter().cloned().map(|mut def| {
            def.base_cr = def.base_cr.or(Some(default_cr));
            def
        }))?;
        Ok(registry)
    }

    /// The standard sense profiles with `senses` applied.
    pub fn profiles(&self) -> Result<SenseProfiles, ConfigError> {
        Ok(SenseProfiles::standard().with_overrides(self.senses.clone())?)
    }

    /// The configured effectors, or the standard table.
    pub fn effector_registry(&self) -> EffectorRegistry {
        self.effectors.clone().unwrap_or_else(standard_effectors)
    }

    /// Pipeline tunables.
    pub const fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            fallback_radius: self.pipeline.fallback_radius,
            handler: HandlerSettings {
                result_die: self.roll.die_sides,
                max_message_len: self.pipeline.max_message_len,
            },
        }
    }
}

/// Pipeline and batch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    /// Target query radius for verbs with no finite range.
    #[serde(default = "default_fallback_radius")]
    pub fallback_radius: u32,

    /// Longest message `COMMUNICATE` accepts.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// How batches are scheduled.
    #[serde(default)]
    pub batch_mode: BatchMode,

    /// Seed for reproducible rolls. Unset draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fallback_radius: default_fallback_radius(),
            max_message_len: default_max_message_len(),
            batch_mode: BatchMode::default(),
            seed: None,
        }
    }
}

const fn default_fallback_radius() -> u32 {
    DEFAULT_FALLBACK_RADIUS
}

const fn default_max_message_len() -> usize {
    DEFAULT_MAX_MESSAGE_LEN
}

/// Dice settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RollConfig {
    /// Faces on the result die.
    #[serde(default = "default_die_sides")]
    pub die_sides: u32,

    /// CR for verbs whose definition sets none.
    #[serde(default = "default_cr")]
    pub default_cr: i64,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            die_sides: default_die_sides(),
            default_cr: default_cr(),
        }
    }
}

const fn default_die_sides() -> u32 {
    RESULT_DIE
}

const fn default_cr() -> i64 {
    DEFAULT_CR
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when
    /// set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use witness_types::{ActionKind, EffectorChannel, Sense, Verb};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WitnessConfig::default();
        assert_eq!(config.pipeline.fallback_radius, 30);
        assert_eq!(config.pipeline.max_message_len, 500);
        assert_eq!(config.pipeline.batch_mode, BatchMode::Sequential);
        assert_eq!(config.roll.die_sides, 20);
        assert_eq!(config.roll.default_cr, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.registry().is_ok());
        assert!(config.profiles().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "pipeline:\n  batch_mode: parallel\n  seed: 7\n";
        let config = WitnessConfig::parse(yaml).unwrap();
        assert_eq!(config.pipeline.batch_mode, BatchMode::Parallel);
        assert_eq!(config.pipeline.seed, Some(7));
        // Untouched sections keep their defaults.
        assert_eq!(config.pipeline.fallback_radius, 30);
        assert_eq!(config.roll, RollConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = WitnessConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn overrides_merge_into_standard_tables() {
        let yaml = r#"
roll:
  default_cr: 12
actions:
  - verb: INSPECT
    target_range: 4
    requires_target: true
    base_cr: 8
senses:
  MOVE:
    - sense: pressure
      intensity: 4
      range: 6
effectors:
  spiked:
    - channel: potency
      kind: SHIFT
      value: "2"
      source: spiked
"#;
        let config = WitnessConfig::parse(yaml).unwrap();

        let registry = config.registry().unwrap();
        let inspect = registry.get(Verb::Inspect).unwrap();
        assert_eq!(inspect.target_range, Some(4));
        assert_eq!(inspect.base_cr, Some(8));
        assert_eq!(registry.get(Verb::Move).unwrap().base_cr, Some(12));
        assert_eq!(registry.len(), ActionRegistry::standard().len());

        let profiles = config.profiles().unwrap();
        let walk = profiles.broadcasts(ActionKind::Move);
        assert_eq!(walk.len(), 1);
        assert_eq!(walk.first().map(|b| b.sense), Some(Sense::Pressure));
        assert_eq!(profiles.max_range(ActionKind::Move), 6);

        let effectors = config.effector_registry();
        assert_eq!(effectors.len(), 1);
        assert_eq!(
            effectors.for_tag("spiked").first().map(|e| e.channel),
            Some(EffectorChannel::Potency)
        );
    }

    #[test]
    fn templated_override_without_template_is_rejected() {
        let yaml = "actions:\n  - verb: GRAPPLE\n";
        let config = WitnessConfig::parse(yaml).unwrap();
        assert!(matches!(config.registry(), Err(ConfigError::Rules { .. })));
    }

    #[test]
    fn unknown_sense_key_is_rejected() {
        let yaml = "senses:\n  DANCE:\n    - sense: light\n      intensity: 2\n      range: 5\n";
        let config = WitnessConfig::parse(yaml).unwrap();
        assert!(matches!(config.profiles(), Err(ConfigError::Senses { .. })));
    }

    #[test]
    fn settings_follow_config() {
        let yaml = "roll:\n  die_sides: 12\npipeline:\n  max_message_len: 40\n";
        let settings = WitnessConfig::parse(yaml).unwrap().pipeline_settings();
        assert_eq!(settings.handler.result_die, 12);
        assert_eq!(settings.handler.max_message_len, 40);
        assert_eq!(settings.fallback_radius, 30);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("witness-config.yaml");
        if path.exists() {
            let config = WitnessConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            let config = config.unwrap();
            assert!(config.registry().is_ok());
            assert!(config.profiles().is_ok());
        }
    }
}
