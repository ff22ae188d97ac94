//! Configuration System
//!
//! Every threshold the analyzers use is a named constant here and can be
//! overridden from a TOML config file or environment variables.

use crate::error::{InsightsError, InsightsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// |r| above this is a strong correlation
pub const DEFAULT_STRONG_CORRELATION: f64 = 0.7;
/// |r| above this (and at most strong) is a moderate correlation
pub const DEFAULT_MODERATE_CORRELATION: f64 = 0.5;
/// Minimum paired points before a correlation is emitted
pub const DEFAULT_MIN_CORRELATION_POINTS: usize = 3;
/// |slope| at or below this is classified as stable
pub const DEFAULT_STABLE_SLOPE: f64 = 0.1;
/// Size of the "recent" and "older" comparison windows
pub const DEFAULT_RECENT_WINDOW: usize = 5;
/// Moving-average window used for decomposition
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;
/// Z-score above which a value is an outlier
pub const DEFAULT_Z_THRESHOLD: f64 = 2.5;
/// Minimum values per metric before outlier detection runs
pub const DEFAULT_MIN_OUTLIER_POINTS: usize = 5;
/// Reporting cap on the merged outlier list
pub const DEFAULT_MAX_REPORTED_OUTLIERS: usize = 10;
/// Number of density samples across a metric's range
pub const DEFAULT_DENSITY_SAMPLES: usize = 51;
/// Coefficient of variation above which weekly variation is reported
pub const DEFAULT_WEEKLY_CV_THRESHOLD: f64 = 0.2;
/// Minimum values before weekly-pattern detection runs
pub const DEFAULT_MIN_WEEKLY_POINTS: usize = 14;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(flatten)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds for all analyzers
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub correlation: CorrelationConfig,

    #[serde(default)]
    pub trend: TrendConfig,

    #[serde(default)]
    pub outliers: OutlierConfig,

    #[serde(default)]
    pub density: DensityConfig,

    #[serde(default)]
    pub patterns: PatternConfig,
}

/// Correlation strength cut-offs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CorrelationConfig {
    #[serde(default = "default_strong")]
    pub strong: f64,

    #[serde(default = "default_moderate")]
    pub moderate: f64,

    #[serde(default = "default_min_correlation_points")]
    pub min_points: usize,
}

fn default_strong() -> f64 {
    DEFAULT_STRONG_CORRELATION
}

fn default_moderate() -> f64 {
    DEFAULT_MODERATE_CORRELATION
}

fn default_min_correlation_points() -> usize {
    DEFAULT_MIN_CORRELATION_POINTS
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            strong: default_strong(),
            moderate: default_moderate(),
            min_points: default_min_correlation_points(),
        }
    }
}

/// Trend classification and decomposition settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrendConfig {
    #[serde(default = "default_stable_slope")]
    pub stable_slope: f64,

    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: usize,
}

fn default_stable_slope() -> f64 {
    DEFAULT_STABLE_SLOPE
}

fn default_recent_window() -> usize {
    DEFAULT_RECENT_WINDOW
}

fn default_moving_average_window() -> usize {
    DEFAULT_MOVING_AVERAGE_WINDOW
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_slope: default_stable_slope(),
            recent_window: default_recent_window(),
            moving_average_window: default_moving_average_window(),
        }
    }
}

/// Z-score outlier settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutlierConfig {
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,

    #[serde(default = "default_min_outlier_points")]
    pub min_points: usize,

    #[serde(default = "default_max_reported")]
    pub max_reported: usize,
}

fn default_z_threshold() -> f64 {
    DEFAULT_Z_THRESHOLD
}

fn default_min_outlier_points() -> usize {
    DEFAULT_MIN_OUTLIER_POINTS
}

fn default_max_reported() -> usize {
    DEFAULT_MAX_REPORTED_OUTLIERS
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            z_threshold: default_z_threshold(),
            min_points: default_min_outlier_points(),
            max_reported: default_max_reported(),
        }
    }
}

/// Kernel density settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DensityConfig {
    #[serde(default = "default_density_samples")]
    pub samples: usize,
}

fn default_density_samples() -> usize {
    DEFAULT_DENSITY_SAMPLES
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            samples: default_density_samples(),
        }
    }
}

/// Weekly-pattern settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatternConfig {
    #[serde(default = "default_weekly_cv_threshold")]
    pub weekly_cv_threshold: f64,

    #[serde(default = "default_min_weekly_points")]
    pub min_weekly_points: usize,
}

fn default_weekly_cv_threshold() -> f64 {
    DEFAULT_WEEKLY_CV_THRESHOLD
}

fn default_min_weekly_points() -> usize {
    DEFAULT_MIN_WEEKLY_POINTS
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            weekly_cv_threshold: default_weekly_cv_threshold(),
            min_weekly_points: default_min_weekly_points(),
        }
    }
}

impl AnalysisConfig {
    /// Reject thresholds that would make an analyzer meaningless
    pub fn validate(&self) -> InsightsResult<()> {
        let c = &self.correlation;
        if !(0.0..=1.0).contains(&c.strong) {
            return Err(InsightsError::InvalidThreshold {
                name: "correlation.strong",
                value: c.strong,
            });
        }
        if !(0.0..=1.0).contains(&c.moderate) || c.moderate > c.strong {
            return Err(InsightsError::InvalidThreshold {
                name: "correlation.moderate",
                value: c.moderate,
            });
        }
        if self.trend.stable_slope < 0.0 || !self.trend.stable_slope.is_finite() {
            return Err(InsightsError::InvalidThreshold {
                name: "trend.stable_slope",
                value: self.trend.stable_slope,
            });
        }
        if self.trend.recent_window == 0 {
            return Err(InsightsError::InvalidWindow(self.trend.recent_window));
        }
        if self.trend.moving_average_window == 0 {
            return Err(InsightsError::InvalidWindow(
                self.trend.moving_average_window,
            ));
        }
        if self.outliers.z_threshold <= 0.0 || !self.outliers.z_threshold.is_finite() {
            return Err(InsightsError::InvalidThreshold {
                name: "outliers.z_threshold",
                value: self.outliers.z_threshold,
            });
        }
        if self.density.samples < 2 {
            return Err(InsightsError::InvalidSampleCount(self.density.samples));
        }
        if self.patterns.weekly_cv_threshold < 0.0 {
            return Err(InsightsError::InvalidThreshold {
                name: "patterns.weekly_cv_threshold",
                value: self.patterns.weekly_cv_threshold,
            });
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config
            .analysis
            .validate()
            .map_err(|e| ConfigError::Invalid {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Nothing is logged here: this usually runs before the subscriber is
    /// installed, so the outcome is returned for [`LoadedConfig::log`].
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("journal-insights").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first candidate that exists and parses
    ///
    /// Candidates that exist but fail to load are recorded in
    /// `skipped`. Falls back to defaults with environment overrides.
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        let a = &mut self.analysis;

        env_override("JOURNAL_INSIGHTS_STRONG_CORRELATION", &mut a.correlation.strong);
        env_override("JOURNAL_INSIGHTS_MODERATE_CORRELATION", &mut a.correlation.moderate);
        env_override("JOURNAL_INSIGHTS_MIN_CORRELATION_POINTS", &mut a.correlation.min_points);
        env_override("JOURNAL_INSIGHTS_STABLE_SLOPE", &mut a.trend.stable_slope);
        env_override("JOURNAL_INSIGHTS_RECENT_WINDOW", &mut a.trend.recent_window);
        env_override("JOURNAL_INSIGHTS_MOVING_AVERAGE_WINDOW", &mut a.trend.moving_average_window);
        env_override("JOURNAL_INSIGHTS_Z_THRESHOLD", &mut a.outliers.z_threshold);
        env_override("JOURNAL_INSIGHTS_MIN_OUTLIER_POINTS", &mut a.outliers.min_points);
        env_override("JOURNAL_INSIGHTS_MAX_OUTLIERS", &mut a.outliers.max_reported);
        env_override("JOURNAL_INSIGHTS_DENSITY_SAMPLES", &mut a.density.samples);
        env_override("JOURNAL_INSIGHTS_WEEKLY_CV_THRESHOLD", &mut a.patterns.weekly_cv_threshold);
        env_override("JOURNAL_INSIGHTS_MIN_WEEKLY_POINTS", &mut a.patterns.min_weekly_points);

        if let Ok(level) = std::env::var("JOURNAL_INSIGHTS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("JOURNAL_INSIGHTS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Overwrite `target` when `key` is set and parses; bad values are ignored
fn env_override<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparsable environment override"),
        }
    }
}

/// Outcome of searching the default config locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` for defaults
    pub source: Option<PathBuf>,
    /// Candidate files that existed but failed to load
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Report where the config came from and any files that were skipped
    pub fn log(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipping config file: {}", error);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Journal Insights Configuration
#
# Environment variables override these settings:
# - JOURNAL_INSIGHTS_STRONG_CORRELATION
# - JOURNAL_INSIGHTS_MODERATE_CORRELATION
# - JOURNAL_INSIGHTS_MIN_CORRELATION_POINTS
# - JOURNAL_INSIGHTS_STABLE_SLOPE
# - JOURNAL_INSIGHTS_RECENT_WINDOW
# - JOURNAL_INSIGHTS_MOVING_AVERAGE_WINDOW
# - JOURNAL_INSIGHTS_Z_THRESHOLD
# - JOURNAL_INSIGHTS_MIN_OUTLIER_POINTS
# - JOURNAL_INSIGHTS_MAX_OUTLIERS
# - JOURNAL_INSIGHTS_DENSITY_SAMPLES
# - JOURNAL_INSIGHTS_WEEKLY_CV_THRESHOLD
# - JOURNAL_INSIGHTS_MIN_WEEKLY_POINTS
# - JOURNAL_INSIGHTS_LOG_LEVEL
# - JOURNAL_INSIGHTS_LOG_FORMAT

[correlation]
# |r| above this is reported as a strong correlation
strong = 0.7

# |r| above this (up to strong) is reported as moderate
moderate = 0.5

# Minimum number of entries carrying both metrics
min_points = 3

[trend]
# Slopes with magnitude at or below this are "stable"
stable_slope = 0.1

# Number of values in the recent and older comparison windows
recent_window = 5

# Moving-average window for trend/residual decomposition
# (an even window spans one extra entry: 4 behaves like 5)
moving_average_window = 5

[outliers]
# Values with a z-score above this are flagged
z_threshold = 2.5

# Metrics with fewer values are not checked
min_points = 5

# Maximum outliers included in a report
max_reported = 10

[density]
# Number of points sampled across each metric's range
samples = 51

[patterns]
# Coefficient of variation above which weekly variation is reported
weekly_cv_threshold = 0.2

# Metrics with fewer values are not checked for weekly patterns
min_weekly_points = 14

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
