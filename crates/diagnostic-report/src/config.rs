use anyhow::{bail, Context, Result};
use diagnostic_stats::{DiagnosticError, DiagnosticInputs};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => bail!("unknown report format '{other}' (expected text or json)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub sensitivity: f64,          // 0.9
    pub specificity: f64,          // 0.9
    pub prevalence: f64,           // 0.1
    pub population_size: u64,      // 1000
    pub format: ReportFormat,      // text
    pub clamp_inputs: bool,        // reject out-of-range values unless set
}

impl Default for ReportConfig {
    fn default() -> Self {
        let inputs = DiagnosticInputs::default();
        Self {
            sensitivity: inputs.sensitivity,
            specificity: inputs.specificity,
            prevalence: inputs.prevalence,
            population_size: inputs.population_size,
            format: ReportFormat::Text,
            clamp_inputs: false,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            sensitivity: parse_or(&lookup, "DIAG_SENSITIVITY", defaults.sensitivity)?,
            specificity: parse_or(&lookup, "DIAG_SPECIFICITY", defaults.specificity)?,
            prevalence: parse_or(&lookup, "DIAG_PREVALENCE", defaults.prevalence)?,
            population_size: parse_or(&lookup, "DIAG_POPULATION_SIZE", defaults.population_size)?,
            format: parse_or(&lookup, "DIAG_REPORT_FORMAT", defaults.format)?,
            clamp_inputs: parse_or(&lookup, "DIAG_CLAMP_INPUTS", defaults.clamp_inputs)?,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        if let Some(v) = flag_value(args, "--sensitivity") {
            self.sensitivity = parse_param("--sensitivity", v)?;
        }
        if let Some(v) = flag_value(args, "--specificity") {
            self.specificity = parse_param("--specificity", v)?;
        }
        if let Some(v) = flag_value(args, "--prevalence") {
            self.prevalence = parse_param("--prevalence", v)?;
        }
        if let Some(v) = flag_value(args, "--population") {
            self.population_size = parse_param("--population", v)?;
        }
        if args.iter().any(|a| a == "--json") {
            self.format = ReportFormat::Json;
        }
        if args.iter().any(|a| a == "--clamp") {
            self.clamp_inputs = true;
        }

        Ok(self)
    }

    /// Build calculator inputs, either rejecting or clamping out-of-range probabilities.
    pub fn inputs(&self) -> Result<DiagnosticInputs> {
        if self.clamp_inputs {
            return Ok(DiagnosticInputs::clamped(
                self.sensitivity,
                self.specificity,
                self.prevalence,
                self.population_size,
            ));
        }

        DiagnosticInputs::validated(
            self.sensitivity,
            self.specificity,
            self.prevalence,
            self.population_size,
        )
        .context("invalid diagnostic inputs (pass --clamp to force them into range)")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => Ok(parse_param(key, &raw)?),
        None => Ok(default),
    }
}

fn parse_param<T>(name: &str, raw: &str) -> std::result::Result<T, DiagnosticError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| DiagnosticError::InvalidParameter(format!("{name}={raw}: {e}")))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
