//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SimError};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "prisoners.toml";

/// Full simulator configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub simulation: SimulationConfig,
    pub scaling: ScalingConfig,
    pub plot: PlotConfig,
    /// Path the config was loaded from (or would have been).
    #[serde(skip)]
    pub source: PathBuf,
}

/// Where experiment records and charts land.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub log_file: PathBuf,
    pub log_format: LogFormat,
    pub plot_file: PathBuf,
}

/// Line format of the experiment log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `Experiment 1: Permutation: [..] | Result: success`
    #[default]
    Text,
    /// One JSON object per line.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "jsonl" | "json" => Ok(Self::Jsonl),
            other => Err(format!("unknown log format {other:?} (expected text or jsonl)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Jsonl => f.write_str("jsonl"),
        }
    }
}

/// Randomness settings shared by every command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Scaling-run knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScalingConfig {
    pub start_prisoners: usize,
    pub growth_factor: usize,
    /// Largest N a scaling run will attempt before stopping on its own.
    pub max_prisoners: usize,
}

/// Chart geometry and labelling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("log.txt"),
            log_format: LogFormat::Text,
            plot_file: PathBuf::from("plot.svg"),
        }
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            start_prisoners: 10,
            growth_factor: 10,
            max_prisoners: 100_000_000,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1_000,
            height: 600,
            title: "100 Prisoner Problem: Success Rate vs Number of Prisoners".to_string(),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SimError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SimError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.source = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render the effective config back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SimError::Serialization {
            context: "toml",
            details: e.to_string(),
        })
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PSIM_SEED") {
            self.simulation.seed = Some(parse_env_u64("PSIM_SEED", &raw)?);
        }

        if let Some(raw) = lookup("PSIM_LOG_FILE") {
            self.output.log_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("PSIM_LOG_FORMAT") {
            self.output.log_format =
                raw.parse::<LogFormat>()
                    .map_err(|details| SimError::ConfigParse {
                        context: "env",
                        details: format!("PSIM_LOG_FORMAT={raw:?}: {details}"),
                    })?;
        }
        if let Some(raw) = lookup("PSIM_PLOT_FILE") {
            self.output.plot_file = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("PSIM_SCALING_MAX_PRISONERS") {
            self.scaling.max_prisoners = parse_env_usize("PSIM_SCALING_MAX_PRISONERS", &raw)?;
        }

        if let Some(raw) = lookup("PSIM_PLOT_WIDTH") {
            self.plot.width = parse_env_u32("PSIM_PLOT_WIDTH", &raw)?;
        }
        if let Some(raw) = lookup("PSIM_PLOT_HEIGHT") {
            self.plot.height = parse_env_u32("PSIM_PLOT_HEIGHT", &raw)?;
        }

        Ok(())
    }

    /// Check cross-field constraints. Called by [`Config::load`]; callers that
    /// mutate a loaded config (CLI overrides) should call it again.
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("output.log_file", &self.output.log_file),
            ("output.plot_file", &self.output.plot_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SimError::InvalidConfig {
                    details: format!("{name} must not be empty"),
                });
            }
        }

        let scaling = &self.scaling;
        if scaling.start_prisoners < 2 || scaling.start_prisoners % 2 != 0 {
            return Err(SimError::InvalidConfig {
                details: format!(
                    "scaling.start_prisoners must be even and >= 2, got {}",
                    scaling.start_prisoners
                ),
            });
        }
        if scaling.growth_factor < 2 {
            return Err(SimError::InvalidConfig {
                details: format!(
                    "scaling.growth_factor must be >= 2, got {}",
                    scaling.growth_factor
                ),
            });
        }
        if scaling.max_prisoners < scaling.start_prisoners {
            return Err(SimError::InvalidConfig {
                details: format!(
                    "scaling.max_prisoners ({}) must be >= scaling.start_prisoners ({})",
                    scaling.max_prisoners, scaling.start_prisoners
                ),
            });
        }

        if self.plot.width < 100 || self.plot.height < 100 {
            return Err(SimError::InvalidConfig {
                details: format!(
                    "plot dimensions must be at least 100x100 px, got {}x{}",
                    self.plot.width, self.plot.height
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|error| SimError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| SimError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|error| SimError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, LogFormat, SimError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.output.log_file, PathBuf::from("log.txt"));
        assert_eq!(cfg.output.log_format, LogFormat::Text);
        assert_eq!(cfg.scaling.start_prisoners, 10);
        assert_eq!(cfg.simulation.seed, None);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let raw = r#"
            [simulation]
            seed = 42

            [output]
            log_format = "jsonl"
        "#;
        let cfg: Config = toml::from_str(raw).expect("partial config should parse");
        assert_eq!(cfg.simulation.seed, Some(42));
        assert_eq!(cfg.output.log_format, LogFormat::Jsonl);
        assert_eq!(cfg.output.plot_file, PathBuf::from("plot.svg"));
        assert_eq!(cfg.plot.width, 1_000);
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = Config::default();
        let overrides = vars(&[
            ("PSIM_SEED", "7"),
            ("PSIM_LOG_FILE", "/tmp/psim/run.log"),
            ("PSIM_LOG_FORMAT", "JSONL"),
            ("PSIM_PLOT_FILE", "/tmp/psim/chart.svg"),
            ("PSIM_SCALING_MAX_PRISONERS", "100000"),
            ("PSIM_PLOT_WIDTH", "800"),
        ]);

        cfg.apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect("env overrides should parse");

        assert_eq!(cfg.simulation.seed, Some(7));
        assert_eq!(cfg.output.log_file, PathBuf::from("/tmp/psim/run.log"));
        assert_eq!(cfg.output.log_format, LogFormat::Jsonl);
        assert_eq!(cfg.output.plot_file, PathBuf::from("/tmp/psim/chart.svg"));
        assert_eq!(cfg.scaling.max_prisoners, 100_000);
        assert_eq!(cfg.plot.width, 800);
        assert_eq!(cfg.plot.height, 600);
    }

    #[test]
    fn env_invalid_seed_rejected() {
        let mut cfg = Config::default();
        let overrides = vars(&[("PSIM_SEED", "forty-two")]);

        let err = cfg
            .apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect_err("invalid seed should fail");
        match err {
            SimError::ConfigParse { context, details } => {
                assert_eq!(context, "env");
                assert!(details.contains("PSIM_SEED"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_unknown_log_format_rejected() {
        let mut cfg = Config::default();
        let overrides = vars(&[("PSIM_LOG_FORMAT", "xml")]);
        let err = cfg
            .apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect_err("unknown format should fail");
        assert!(err.to_string().contains("PSIM_LOG_FORMAT"));
    }

    #[test]
    fn odd_scaling_start_rejected() {
        let mut cfg = Config::default();
        cfg.scaling.start_prisoners = 9;
        let err = cfg.validate().expect_err("odd start should fail");
        assert!(err.to_string().contains("start_prisoners"));
    }

    #[test]
    fn growth_factor_below_two_rejected() {
        let mut cfg = Config::default();
        cfg.scaling.growth_factor = 1;
        let err = cfg.validate().expect_err("factor 1 never grows");
        assert!(err.to_string().contains("growth_factor"));
    }

    #[test]
    fn ceiling_below_start_rejected() {
        let mut cfg = Config::default();
        cfg.scaling.max_prisoners = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_log_path_rejected() {
        let mut cfg = Config::default();
        cfg.output.log_file = PathBuf::new();
        let err = cfg.validate().expect_err("empty path should fail");
        assert!(err.to_string().contains("output.log_file"));
    }

    #[test]
    fn tiny_plot_rejected() {
        let mut cfg = Config::default();
        cfg.plot.height = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let err = Config::load(Some(std::path::Path::new(
            "/nonexistent/psim/prisoners.toml",
        )))
        .expect_err("missing explicit path should fail");
        assert_eq!(err.code(), "PSIM-1002");
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prisoners.toml");
        std::fs::write(&path, "[plot]\nwidth = 1200\n").unwrap();

        let cfg = Config::load(Some(&path)).expect("explicit file should load");
        assert_eq!(cfg.plot.width, 1_200);
        assert_eq!(cfg.source, path);
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut cfg = Config::default();
        cfg.simulation.seed = Some(99);
        let rendered = cfg.to_toml().expect("render");
        let parsed: Config = toml::from_str(&rendered).expect("reparse");
        assert_eq!(parsed.simulation.seed, Some(99));
        assert_eq!(parsed.scaling, cfg.scaling);
    }
}
