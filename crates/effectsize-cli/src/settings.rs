use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file looked up in the working directory when `--config` is not given.
pub const SETTINGS_FILE: &str = "effectsize.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

/// Resolved settings for a run. Command-line flags override file values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: Option<PathBuf>,
    pub group_column: Option<String>,
    pub metrics: Vec<String>,
    pub factors: Vec<String>,
    pub format: OutputFormat,
    pub run_dir: PathBuf,
    pub max_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: None,
            group_column: None,
            metrics: Vec::new(),
            factors: Vec::new(),
            format: OutputFormat::Csv,
            run_dir: PathBuf::from("runs"),
            max_rows: 50,
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub input: Option<PathBuf>,
    pub group_column: Option<String>,
    pub metrics: Vec<String>,
    pub factors: Vec<String>,
    pub format: Option<OutputFormat>,
    pub run_dir: Option<PathBuf>,
    pub max_rows: Option<usize>,
}

impl Settings {
    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(input) = overrides.input {
            self.input = Some(input);
        }
        if let Some(group_column) = overrides.group_column {
            self.group_column = Some(group_column);
        }
        if !overrides.metrics.is_empty() {
            self.metrics = overrides.metrics;
        }
        if !overrides.factors.is_empty() {
            self.factors = overrides.factors;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if let Some(run_dir) = overrides.run_dir {
            self.run_dir = run_dir;
        }
        if let Some(max_rows) = overrides.max_rows {
            self.max_rows = max_rows;
        }
    }
}

pub fn parse_settings(content: &str) -> SettingsResult<Settings> {
    Ok(toml::from_str(content)?)
}

/// Load settings from `path`, or from `effectsize.toml` when it exists.
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load_settings(path: Option<&Path>) -> SettingsResult<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = PathBuf::from(SETTINGS_FILE);
            if !default_path.exists() {
                return Ok(Settings::default());
            }
            default_path
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_settings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = parse_settings(
            r#"
input = "data/penguins.csv"
group_column = "species"
metrics = ["Body Mass (g)", "Flipper Length (mm)"]
format = "markdown"
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.input, Some(PathBuf::from("data/penguins.csv")));
        assert_eq!(settings.group_column.as_deref(), Some("species"));
        assert_eq!(settings.metrics.len(), 2);
        assert!(settings.factors.is_empty());
        assert_eq!(settings.format, OutputFormat::Markdown);
        assert_eq!(settings.run_dir, PathBuf::from("runs"));
        assert_eq!(settings.max_rows, 50);
    }

    #[test]
    fn flags_override_file_values() {
        let mut settings = parse_settings("group_column = \"species\"\nmetrics = [\"a\"]\n").unwrap();
        settings.apply(SettingsOverrides {
            group_column: Some("island".to_string()),
            factors: vec!["sex".to_string()],
            max_rows: Some(5),
            ..SettingsOverrides::default()
        });
        assert_eq!(settings.group_column.as_deref(), Some("island"));
        assert_eq!(settings.metrics, vec!["a"]);
        assert_eq!(settings.factors, vec!["sex"]);
        assert_eq!(settings.max_rows, 5);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(parse_settings("format = \"xlsx\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("effectsize-{}.toml", uuid::Uuid::new_v4()));
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
