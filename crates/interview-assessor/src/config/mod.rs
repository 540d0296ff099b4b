use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the assessment engine and its CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub assessment: AssessmentConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let template_dirs = parse_template_dirs(
            &env::var("ASSESSOR_TEMPLATE_DIRS").unwrap_or_else(|_| "templates".to_string()),
        )?;

        let judge_failure_tolerance = match env::var("ASSESSOR_JUDGE_FAILURE_TOLERANCE") {
            Ok(raw) => parse_tolerance(&raw)?,
            Err(_) => AssessmentConfig::DEFAULT_JUDGE_FAILURE_TOLERANCE,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            assessment: AssessmentConfig {
                template_dirs,
                judge_failure_tolerance,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Rubric lookup and scoring knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentConfig {
    /// Searched in order for `<template_id>-assessment.yaml`.
    pub template_dirs: Vec<PathBuf>,
    /// Ratio of unjudged answers above which the confidence band drops one step.
    pub judge_failure_tolerance: f64,
}

impl AssessmentConfig {
    pub const DEFAULT_JUDGE_FAILURE_TOLERANCE: f64 = 0.25;
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec![PathBuf::from("templates")],
            judge_failure_tolerance: Self::DEFAULT_JUDGE_FAILURE_TOLERANCE,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_template_dirs(raw: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let dirs: Vec<PathBuf> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect();

    if dirs.is_empty() {
        return Err(ConfigError::EmptyTemplateDirs);
    }
    Ok(dirs)
}

fn parse_tolerance(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidFailureTolerance(raw.to_string()))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidFailureTolerance(raw.to_string()));
    }
    Ok(value)
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyTemplateDirs,
    InvalidFailureTolerance(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyTemplateDirs => {
                write!(f, "ASSESSOR_TEMPLATE_DIRS must name at least one directory")
            }
            ConfigError::InvalidFailureTolerance(raw) => write!(
                f,
                "ASSESSOR_JUDGE_FAILURE_TOLERANCE must be a number between 0 and 1, got '{}'",
                raw
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
