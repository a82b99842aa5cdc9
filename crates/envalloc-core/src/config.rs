use crate::error::{EnvallocError, EnvallocResult};
use envalloc_calculator::{CalculatorSettings, ResidualStrategy, ZeroMeasurementPolicy};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ENVALLOC_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "envalloc.toml";
const MAX_DECIMALS: u32 = 6;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RoundingConfig {
    pub decimals: u32,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self { decimals: 1 }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizationConfig {
    pub target: f64,
    pub tolerance: f64,
    pub residual: ResidualStrategy,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self { target: 100.0, tolerance: 0.01, residual: ResidualStrategy::LastCandidate }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MeasurementConfig {
    pub zero_policy: ZeroMeasurementPolicy,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportingConfig {
    /// Tables whose total strays this far from the target are flagged.
    pub warning_tolerance: f64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self { warning_tolerance: 0.01 }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub rounding: RoundingConfig,
    pub normalization: NormalizationConfig,
    pub measurement: MeasurementConfig,
    pub reporting: ReportingConfig,
}

impl EngineConfig {
    /// Loads from `$ENVALLOC_CONFIG_PATH`, falling back to `envalloc.toml`.
    pub fn load() -> EnvallocResult<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Loads a TOML file. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> EnvallocResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_toml_str(&contents)?;
                info!(path = %path.display(), "Loaded engine configuration");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "Configuration file not found. Using default configuration."
                );
                Ok(Self::default())
            }
            Err(e) => Err(EnvallocError::configuration(
                "path",
                format!("failed to read '{}': {e}", path.display()),
            )),
        }
    }

    pub fn from_toml_str(contents: &str) -> EnvallocResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| EnvallocError::configuration("toml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EnvallocResult<()> {
        if self.rounding.decimals > MAX_DECIMALS {
            return Err(EnvallocError::configuration(
                "rounding.decimals",
                format!("must be at most {MAX_DECIMALS}, got {}", self.rounding.decimals),
            ));
        }
        if !(self.normalization.target.is_finite() && self.normalization.target > 0.0) {
            return Err(EnvallocError::configuration(
                "normalization.target",
                "must be a positive number",
            ));
        }
        for (setting, value) in [
            ("normalization.tolerance", self.normalization.tolerance),
            ("reporting.warning_tolerance", self.reporting.warning_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EnvallocError::configuration(setting, "must be non-negative"));
            }
        }
        Ok(())
    }

    pub fn calculator_settings(&self) -> CalculatorSettings {
        CalculatorSettings {
            decimals: self.rounding.decimals,
            target_total: self.normalization.target,
            tolerance: self.normalization.tolerance,
            residual: self.normalization.residual,
            zero_measurement: self.measurement.zero_policy,
        }
    }
}
