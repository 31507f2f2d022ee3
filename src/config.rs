use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use tablet_log_core::clock::parse_timezone;
use tablet_log_core::models::Field;
use tablet_log_core::rules::{IntakeRules, QuantityParse, DEFAULT_REQUIRED_FIELDS};
use tablet_log_core::sanitize::MAX_TEXT_LENGTH;
use tablet_log_core::schema::SchemaVariant;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetConfig {
    #[serde(default = "default_sheet_name")]
    pub name: String,
    #[serde(default)]
    pub schema: SchemaVariant,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub valid_types: Option<Vec<String>>,
    #[serde(default)]
    pub quantity_parse: QuantityParse,
    #[serde(default = "default_bold_header")]
    pub bold_header: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            name: default_sheet_name(),
            schema: SchemaVariant::default(),
            timezone: default_timezone(),
            max_text_length: default_max_text_length(),
            required_fields: default_required_fields(),
            valid_types: None,
            quantity_parse: QuantityParse::default(),
            bold_header: default_bold_header(),
        }
    }
}

fn default_sheet_name() -> String {
    "工作表1".to_string()
}
fn default_timezone() -> String {
    "GMT+8".to_string()
}
fn default_max_text_length() -> usize {
    MAX_TEXT_LENGTH
}
fn default_required_fields() -> Vec<String> {
    DEFAULT_REQUIRED_FIELDS
        .iter()
        .map(|f| f.as_str().to_string())
        .collect()
}
fn default_bold_header() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Build the immutable intake rules for the configured sheet.
    ///
    /// Fails on an unknown required field or an unparseable timezone;
    /// [`load_config`] runs this once so a loaded config always converts.
    pub fn intake_rules(&self) -> Result<IntakeRules> {
        let sheet = &self.sheet;
        let timezone = parse_timezone(&sheet.timezone).with_context(|| {
            format!(
                "sheet.timezone '{}' is not a fixed offset like GMT+8 or +08:00",
                sheet.timezone
            )
        })?;

        let required_fields = sheet
            .required_fields
            .iter()
            .map(|name| {
                Field::parse(name)
                    .with_context(|| format!("sheet.required_fields: unknown field '{}'", name))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rules = IntakeRules::for_schema(sheet.schema);
        rules.max_text_length = sheet.max_text_length;
        rules.required_fields = required_fields;
        rules.quantity_parse = sheet.quantity_parse;
        rules.timezone = timezone;
        if let Some(types) = &sheet.valid_types {
            rules.valid_types = types.clone();
        }
        Ok(rules)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.sheet.name.trim().is_empty() {
        anyhow::bail!("sheet.name must not be empty");
    }

    if config.sheet.max_text_length == 0 {
        anyhow::bail!("sheet.max_text_length must be > 0");
    }

    if let Some(types) = &config.sheet.valid_types {
        if types.is_empty() {
            anyhow::bail!("sheet.valid_types must list at least one type when given");
        }
    }

    // Timezone and required fields
    config.intake_rules()?;

    Ok(())
}
