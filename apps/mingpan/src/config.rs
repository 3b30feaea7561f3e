//! # Configuration
//!
//! `mingpan.toml` loading. Every section and key is optional:
//!
//! ```toml
//! [rules]
//! path = "bazi_rule_tables.json"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100
//! cors_origins = "http://localhost:3000"
//!
//! [logging]
//! format = "json"
//! ```
//!
//! Precedence, lowest to highest: built-in defaults, the file, environment
//! variables (`MINGPAN_RULES`, `MINGPAN_RATE_LIMIT`, `MINGPAN_CORS_ORIGINS`,
//! `MINGPAN_LOG_FORMAT`), command-line flags.

use mingpan_core::{MingpanError, RuleTables, primitives::RULE_TABLE_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum size of a configuration file (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Default requests per second for the HTTP API.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// SECTIONS
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "text" => Some(LogFormat::Text),
            _ => None,
        }
    }
}

/// `[rules]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule table document; the built-in table is used when unset.
    pub path: Option<PathBuf>,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Comma-separated origins, or "*".
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rules: RulesConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, MingpanError> {
        toml::from_str(text).map_err(|e| MingpanError::DeserializationError(e.to_string()))
    }

    /// Load the configuration file, or the defaults when it does not exist.
    ///
    /// Environment overrides are NOT applied; see [`AppConfig::apply_env`].
    pub fn load(path: &Path) -> Result<Self, MingpanError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| MingpanError::IoError(format!("Cannot read config metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MingpanError::IoError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| MingpanError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Apply `MINGPAN_*` environment variables.
    ///
    /// Returns a warning for each value that was ignored.
    #[must_use]
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Unparsable values are ignored; one warning per ignored value is
    /// returned so the caller can log it once tracing is installed.
    #[must_use]
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(path) = lookup("MINGPAN_RULES").filter(|s| !s.trim().is_empty()) {
            self.rules.path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("MINGPAN_RATE_LIMIT") {
            match value.trim().parse() {
                Ok(rate) => self.server.rate_limit = rate,
                Err(_) => warnings.push(format!("Ignoring invalid MINGPAN_RATE_LIMIT '{}'", value)),
            }
        }

        if let Some(origins) = lookup("MINGPAN_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }

        if let Some(value) = lookup("MINGPAN_LOG_FORMAT") {
            match LogFormat::from_env_value(&value) {
                Some(format) => self.logging.format = format,
                None => warnings.push(format!("Ignoring invalid MINGPAN_LOG_FORMAT '{}'", value)),
            }
        }

        warnings
    }

    /// The rule table document to load, if any.
    ///
    /// Without an explicit path, a `bazi_rule_tables.json` in the working
    /// directory is used when present; `None` selects the built-in table.
    pub fn rule_table_path(&self) -> Option<PathBuf> {
        self.rules.path.clone().or_else(|| {
            let local = PathBuf::from(RULE_TABLE_FILE_NAME);
            local.is_file().then_some(local)
        })
    }

    /// The rule tables this configuration selects.
    ///
    /// A document path is loaded leniently: missing or malformed files
    /// degrade to empty tables.
    pub fn rule_tables(&self) -> Arc<RuleTables> {
        match self.rule_table_path() {
            Some(path) => {
                tracing::info!("Loading rule table from {}", path.display());
                Arc::new(RuleTables::load_or_empty(&path))
            }
            None => {
                tracing::debug!("Using built-in rule table");
                Arc::new(RuleTables::builtin().clone())
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
