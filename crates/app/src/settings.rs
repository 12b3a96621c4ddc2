use std::path::Path;

use anyhow::{Context, Result};
use concord_core::MatchConfig;
use concord_import::LedgerProfile;
use serde::Deserialize;
use toml::{Table, Value};

/// Everything one run needs besides the two CSV paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub matching: MatchConfig,
    pub internal: LedgerProfile,
    pub bank: LedgerProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            internal: LedgerProfile::internal_export(),
            bank: LedgerProfile::bank_statement(),
        }
    }
}

/// The settings file as written: every section optional, every key optional.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    matching: Table,
    #[serde(default)]
    internal: Table,
    #[serde(default)]
    bank: Table,
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub date_tolerance_days: Option<i64>,
    pub similarity_threshold: Option<f64>,
    pub amount_bucket_width: Option<rust_decimal::Decimal>,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings file {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("loading settings file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Each section is layered over its preset, so a `[bank]` table that only
    /// sets `delimiter` keeps the bank column names. `[matching]` is validated
    /// here, before any CSV is read.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(content).context("parsing settings")?;
        let defaults = Settings::default();
        let matching = toml::to_string(&file.matching).context("[matching]")?;
        Ok(Self {
            matching: MatchConfig::from_toml(&matching).context("[matching]")?,
            internal: layered(&defaults.internal, file.internal).context("[internal]")?,
            bank: layered(&defaults.bank, file.bank).context("[bank]")?,
        })
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(days) = overrides.date_tolerance_days {
            self.matching.date_tolerance_days = days;
        }
        if let Some(threshold) = overrides.similarity_threshold {
            self.matching.similarity_threshold = threshold;
        }
        if let Some(width) = overrides.amount_bucket_width {
            self.matching.amount_bucket_width = width;
        }
        self
    }
}

fn layered<T>(preset: &T, overlay: Table) -> Result<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut base = match Value::try_from(preset)? {
        Value::Table(table) => table,
        other => anyhow::bail!("preset is not a table: {other}"),
    };
    merge(&mut base, overlay);
    Ok(Value::Table(base).try_into()?)
}

fn merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Table(mut inner)), Value::Table(patch)) => {
                merge(&mut inner, patch);
                Value::Table(inner)
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
}
