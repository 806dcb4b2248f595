//! Configuration loading for the profiler service.
//!
//! The YAML file may reference environment variables as `${VAR}` or
//! `${VAR:-default}`; they are expanded before parsing. `CAPPI_*` and
//! `PROFILE_*` variables then override individual fields.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cappi_reader::CappiConfig;
use profile_processor::AggregatorConfig;
use serde::{Deserialize, Serialize};
use storm_lifecycle::ClassificationConfig;

// ============================================================================
// Configuration structures
// ============================================================================

/// Root configuration of the profiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Layout of the raw CAPPI files.
    pub radar: CappiConfig,

    /// Vertical profile parameters.
    pub aggregator: AggregatorConfig,

    /// Lifecycle classification thresholds.
    pub classification: ClassificationConfig,

    pub batch: BatchConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; 0 uses one per CPU.
    pub workers: usize,

    /// Cut each cell's bounding box out of the volume before aggregating.
    pub window_to_cell: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            window_to_cell: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,

    /// `json` or `text`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl ProfilerConfig {
    /// Load a YAML configuration file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read profiler config from {:?}", path))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("Failed to parse profiler config from {:?}", path))?
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text after expanding `${VAR}` references.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.radar = self.radar.with_env_overrides();
        self.aggregator = self.aggregator.with_env_overrides();
        if let Some(workers) = std::env::var("PROFILER_WORKERS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.batch.workers = workers;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.radar.validate().context("Invalid radar configuration")?;
        self.aggregator
            .validate()
            .context("Invalid aggregator configuration")?;
        anyhow::ensure!(
            matches!(self.logging.format.as_str(), "json" | "text"),
            "Unknown logging format: {}",
            self.logging.format
        );
        anyhow::ensure!(
            self.classification.short_max_secs <= self.classification.medium_max_secs,
            "short_max_secs must not exceed medium_max_secs"
        );
        Ok(())
    }
}

/// Expand environment variables in configuration content.
///
/// Supports `${VAR}` (must be set) and `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
