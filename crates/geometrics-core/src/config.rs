use crate::error::{GeometricsError, Result};
use crate::models::MatchStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default minimum overlap score for a pair to be matched
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default decay radius for distance-based scores
pub const DEFAULT_POINT_RADIUS: f64 = 1.0;

/// Below this many shapes per side, pairs are scored without the spatial index
pub const DEFAULT_INDEX_MIN_SIZE: usize = 16;

/// Units with more shapes than this on either side are rejected
pub const DEFAULT_MAX_SHAPES_PER_UNIT: usize = 10_000;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Validated evaluation settings handed to the matcher and the batch driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub threshold: f64,
    pub strategy: MatchStrategy,
    pub per_category: bool,
    pub class_agnostic: bool,
    pub min_confidence: Option<f64>,
    pub point_radius: f64,
    pub index_min_size: usize,
    pub max_shapes_per_unit: usize,
    pub workers: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            strategy: MatchStrategy::Greedy,
            per_category: true,
            class_agnostic: false,
            min_confidence: None,
            point_radius: DEFAULT_POINT_RADIUS,
            index_min_size: DEFAULT_INDEX_MIN_SIZE,
            max_shapes_per_unit: DEFAULT_MAX_SHAPES_PER_UNIT,
            workers: default_workers(),
        }
    }
}

impl EvaluationConfig {
    /// Create a validated configuration with the three caller-facing knobs
    pub fn new(threshold: f64, strategy: MatchStrategy, per_category: bool) -> Result<Self> {
        let config = Self { threshold, strategy, per_category, ..Default::default() };
        config.validate()?;
        Ok(config)
    }

    pub fn class_agnostic(mut self, class_agnostic: bool) -> Self {
        self.class_agnostic = class_agnostic;
        self
    }

    pub fn min_confidence(mut self, min_confidence: Option<f64>) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn index_min_size(mut self, size: usize) -> Self {
        self.index_min_size = size;
        self
    }

    pub fn max_shapes_per_unit(mut self, limit: usize) -> Self {
        self.max_shapes_per_unit = limit;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject out-of-range values before any work starts
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(GeometricsError::config(
                "threshold",
                format!("{} is outside [0, 1]", self.threshold),
            ));
        }

        if let Some(min_confidence) = self.min_confidence {
            if !min_confidence.is_finite() || !(0.0..=1.0).contains(&min_confidence) {
                return Err(GeometricsError::config(
                    "min_confidence",
                    format!("{} is outside [0, 1]", min_confidence),
                ));
            }
        }

        if !self.point_radius.is_finite() || self.point_radius <= 0.0 {
            return Err(GeometricsError::config(
                "point_radius",
                format!("{} must be a positive finite number", self.point_radius),
            ));
        }

        if self.max_shapes_per_unit == 0 {
            return Err(GeometricsError::config(
                "max_shapes_per_unit",
                "a unit must be allowed at least one shape per side",
            ));
        }

        if self.workers == 0 {
            return Err(GeometricsError::config("workers", "at least one worker is required"));
        }

        Ok(())
    }
}

/// Layered configuration for geometrics
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub threshold: ConfigValue<f64>,
    pub strategy: ConfigValue<MatchStrategy>,
    pub per_category: ConfigValue<bool>,
    pub class_agnostic: ConfigValue<bool>,
    pub min_confidence: ConfigValue<Option<f64>>,
    pub point_radius: ConfigValue<f64>,
    pub index_min_size: ConfigValue<usize>,
    pub max_shapes_per_unit: ConfigValue<usize>,
    pub workers: ConfigValue<usize>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = EvaluationConfig::default();
        Self {
            threshold: ConfigValue::new(defaults.threshold, ConfigSource::Default),
            strategy: ConfigValue::new(defaults.strategy, ConfigSource::Default),
            per_category: ConfigValue::new(defaults.per_category, ConfigSource::Default),
            class_agnostic: ConfigValue::new(defaults.class_agnostic, ConfigSource::Default),
            min_confidence: ConfigValue::new(defaults.min_confidence, ConfigSource::Default),
            point_radius: ConfigValue::new(defaults.point_radius, ConfigSource::Default),
            index_min_size: ConfigValue::new(defaults.index_min_size, ConfigSource::Default),
            max_shapes_per_unit: ConfigValue::new(
                defaults.max_shapes_per_unit,
                ConfigSource::Default,
            ),
            workers: ConfigValue::new(defaults.workers, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeometricsError::config("file", format!("Failed to read config file: {}", e))
        })?;

        let file_config: FileConfig = toml::from_str(&content)
            .map_err(|e| GeometricsError::config("file", format!("Failed to parse TOML: {}", e)))?;

        if let Some(threshold) = file_config.threshold {
            self.threshold.update(threshold, ConfigSource::File);
        }

        if let Some(strategy) = file_config.strategy {
            self.strategy.update(parse_strategy(&strategy)?, ConfigSource::File);
        }

        if let Some(per_category) = file_config.per_category {
            self.per_category.update(per_category, ConfigSource::File);
        }

        if let Some(class_agnostic) = file_config.class_agnostic {
            self.class_agnostic.update(class_agnostic, ConfigSource::File);
        }

        if let Some(min_confidence) = file_config.min_confidence {
            self.min_confidence.update(Some(min_confidence), ConfigSource::File);
        }

        if let Some(point_radius) = file_config.point_radius {
            self.point_radius.update(point_radius, ConfigSource::File);
        }

        if let Some(index_min_size) = file_config.index_min_size {
            self.index_min_size.update(index_min_size, ConfigSource::File);
        }

        if let Some(limit) = file_config.max_shapes_per_unit {
            self.max_shapes_per_unit.update(limit, ConfigSource::File);
        }

        if let Some(workers) = file_config.workers {
            self.workers.update(workers, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the file only when it exists
    pub fn load_from_file_if_exists<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().exists() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    ///
    /// A variable that is set but malformed is a configuration error.
    pub fn load_from_env(mut self) -> Result<Self> {
        // GEOMETRICS_THRESHOLD
        if let Some(threshold) = env_value("GEOMETRICS_THRESHOLD", parse_f64)? {
            self.threshold.update(threshold, ConfigSource::Environment);
        }

        // GEOMETRICS_STRATEGY
        if let Some(strategy) = env_value("GEOMETRICS_STRATEGY", parse_strategy)? {
            self.strategy.update(strategy, ConfigSource::Environment);
        }

        // GEOMETRICS_PER_CATEGORY
        if let Some(per_category) = env_value("GEOMETRICS_PER_CATEGORY", parse_bool)? {
            self.per_category.update(per_category, ConfigSource::Environment);
        }

        // GEOMETRICS_CLASS_AGNOSTIC
        if let Some(class_agnostic) = env_value("GEOMETRICS_CLASS_AGNOSTIC", parse_bool)? {
            self.class_agnostic.update(class_agnostic, ConfigSource::Environment);
        }

        // GEOMETRICS_MIN_CONFIDENCE
        if let Some(min_confidence) = env_value("GEOMETRICS_MIN_CONFIDENCE", parse_f64)? {
            self.min_confidence.update(Some(min_confidence), ConfigSource::Environment);
        }

        // GEOMETRICS_POINT_RADIUS
        if let Some(point_radius) = env_value("GEOMETRICS_POINT_RADIUS", parse_f64)? {
            self.point_radius.update(point_radius, ConfigSource::Environment);
        }

        // GEOMETRICS_INDEX_MIN_SIZE
        if let Some(size) = env_value("GEOMETRICS_INDEX_MIN_SIZE", parse_usize)? {
            self.index_min_size.update(size, ConfigSource::Environment);
        }

        // GEOMETRICS_MAX_SHAPES_PER_UNIT
        if let Some(limit) = env_value("GEOMETRICS_MAX_SHAPES_PER_UNIT", parse_usize)? {
            self.max_shapes_per_unit.update(limit, ConfigSource::Environment);
        }

        // GEOMETRICS_WORKERS
        if let Some(workers) = env_value("GEOMETRICS_WORKERS", parse_usize)? {
            self.workers.update(workers, ConfigSource::Environment);
        }

        Ok(self)
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(threshold) = overrides.threshold {
            self.threshold.update(threshold, ConfigSource::Cli);
        }

        if let Some(strategy) = overrides.strategy {
            self.strategy.update(strategy, ConfigSource::Cli);
        }

        if let Some(per_category) = overrides.per_category {
            self.per_category.update(per_category, ConfigSource::Cli);
        }

        if let Some(class_agnostic) = overrides.class_agnostic {
            self.class_agnostic.update(class_agnostic, ConfigSource::Cli);
        }

        if let Some(min_confidence) = overrides.min_confidence {
            self.min_confidence.update(Some(min_confidence), ConfigSource::Cli);
        }

        if let Some(point_radius) = overrides.point_radius {
            self.point_radius.update(point_radius, ConfigSource::Cli);
        }

        if let Some(limit) = overrides.max_shapes_per_unit {
            self.max_shapes_per_unit.update(limit, ConfigSource::Cli);
        }

        if let Some(workers) = overrides.workers {
            self.workers.update(workers, ConfigSource::Cli);
        }
    }

    /// Collapse the layers into a validated configuration
    pub fn resolve(&self) -> Result<EvaluationConfig> {
        let config = EvaluationConfig {
            threshold: self.threshold.value,
            strategy: self.strategy.value,
            per_category: self.per_category.value,
            class_agnostic: self.class_agnostic.value,
            min_confidence: self.min_confidence.value,
            point_radius: self.point_radius.value,
            index_min_size: self.index_min_size.value,
            max_shapes_per_unit: self.max_shapes_per_unit.value,
            workers: self.workers.value,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "threshold".to_string(),
            (self.threshold.value.to_string(), self.threshold.source),
        );

        map.insert("strategy".to_string(), (self.strategy.value.to_string(), self.strategy.source));

        map.insert(
            "per_category".to_string(),
            (self.per_category.value.to_string(), self.per_category.source),
        );

        map.insert(
            "class_agnostic".to_string(),
            (self.class_agnostic.value.to_string(), self.class_agnostic.source),
        );

        map.insert(
            "min_confidence".to_string(),
            (
                self.min_confidence
                    .value
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                self.min_confidence.source,
            ),
        );

        map.insert(
            "point_radius".to_string(),
            (self.point_radius.value.to_string(), self.point_radius.source),
        );

        map.insert(
            "index_min_size".to_string(),
            (self.index_min_size.value.to_string(), self.index_min_size.source),
        );

        map.insert(
            "max_shapes_per_unit".to_string(),
            (self.max_shapes_per_unit.value.to_string(), self.max_shapes_per_unit.source),
        );

        map.insert("workers".to_string(), (self.workers.value.to_string(), self.workers.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    threshold: Option<f64>,
    strategy: Option<String>,
    per_category: Option<bool>,
    class_agnostic: Option<bool>,
    min_confidence: Option<f64>,
    point_radius: Option<f64>,
    index_min_size: Option<usize>,
    max_shapes_per_unit: Option<usize>,
    workers: Option<usize>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub threshold: Option<f64>,
    pub strategy: Option<MatchStrategy>,
    pub per_category: Option<bool>,
    pub class_agnostic: Option<bool>,
    pub min_confidence: Option<f64>,
    pub point_radius: Option<f64>,
    pub max_shapes_per_unit: Option<usize>,
    pub workers: Option<usize>,
}

/// Parse a matching strategy from string
pub fn parse_strategy(s: &str) -> Result<MatchStrategy> {
    match s.trim().to_lowercase().as_str() {
        "greedy" => Ok(MatchStrategy::Greedy),
        "optimal" | "hungarian" => Ok(MatchStrategy::Optimal),
        _ => Err(GeometricsError::config(
            "strategy",
            format!("Unknown strategy: {}. Use greedy or optimal", s),
        )),
    }
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(GeometricsError::config("flag", format!("Expected true or false, got {}", s))),
    }
}

fn parse_f64(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| GeometricsError::config("number", format!("Expected a number, got {}", s)))
}

fn parse_usize(s: &str) -> Result<usize> {
    s.trim().parse::<usize>().map_err(|_| {
        GeometricsError::config("integer", format!("Expected a non-negative integer, got {}", s))
    })
}

/// Read and parse an environment variable, naming the variable in the error
fn env_value<T>(name: &str, parse: fn(&str) -> Result<T>) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => parse(&raw).map(Some).map_err(|e| match e {
            GeometricsError::Configuration { reason, .. } => {
                GeometricsError::Configuration { key: name.to_string(), reason }
            }
            other => other,
        }),
        Err(_) => Ok(None),
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
