//! Generator configuration and validation
//!
//! # Example
//!
//! ```
//! use ime_datagen::domain::{EmitFormat, ExistenceConfigBuilder};
//!
//! let config = ExistenceConfigBuilder::new()
//!     .error_rate(0.001)
//!     .format(EmitFormat::source("mozc::dictionary"))
//!     .build()
//!     .expect("Valid config");
//! assert_eq!(config.error_rate, 0.001);
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::validate_error_rate;
use crate::error::{GenError, Result};

/// Default target false positive rate
pub const DEFAULT_ERROR_RATE: f64 = 0.01;

/// Default guard on the number of entries accepted in one run
pub const DEFAULT_MAX_ENTRIES: usize = 50_000_000;

/// How an artifact is rendered
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmitFormat {
    /// Exact bytes
    #[default]
    Binary,
    /// Rust byte-array constant wrapped in `namespace` (`a::b` nests modules)
    Source { namespace: String },
}

impl EmitFormat {
    pub fn source(namespace: impl Into<String>) -> Self {
        EmitFormat::Source {
            namespace: namespace.into(),
        }
    }

    /// Namespace segments must be plain identifiers
    pub fn validate(&self) -> Result<()> {
        if let EmitFormat::Source { namespace } = self {
            if namespace.is_empty() {
                return Ok(());
            }
            if let Some(bad) = namespace.split("::").find(|s| !is_identifier(s)) {
                return Err(GenError::Configuration(format!(
                    "namespace segment {:?} is not an identifier",
                    bad
                )));
            }
        }
        Ok(())
    }
}

/// Strict and reserved keywords of Rust 2021, plus `gen` reserved in 2024
const RUST_KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Plain ASCII identifier usable as a module or constant name
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s != "_"
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !RUST_KEYWORDS.contains(&s)
}

/// Existence data generation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExistenceConfig {
    /// Target false positive rate, in (0, 1)
    pub error_rate: f64,
    /// Reject inputs with more entries than this
    pub max_entries: usize,
    /// Output representation
    pub format: EmitFormat,
}

impl Default for ExistenceConfig {
    fn default() -> Self {
        Self {
            error_rate: DEFAULT_ERROR_RATE,
            max_entries: DEFAULT_MAX_ENTRIES,
            format: EmitFormat::Binary,
        }
    }
}

impl ExistenceConfig {
    /// Create a new configuration with validation
    pub fn new(error_rate: f64, max_entries: usize, format: EmitFormat) -> Result<Self> {
        let config = Self {
            error_rate,
            max_entries,
            format,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_error_rate(self.error_rate)?;
        if self.max_entries == 0 {
            return Err(GenError::Configuration(
                "max_entries cannot be 0".to_string(),
            ));
        }
        self.format.validate()
    }

    /// Check an entry count against the configured guard
    pub fn check_entry_count(&self, count: usize) -> Result<()> {
        if count > self.max_entries {
            return Err(GenError::Capacity {
                what: "entries",
                value: count as u64,
                max: self.max_entries as u64,
            });
        }
        Ok(())
    }

    /// Load from JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GenError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Builder for ExistenceConfig with validation
#[derive(Default)]
pub struct ExistenceConfigBuilder {
    error_rate: Option<f64>,
    max_entries: Option<usize>,
    format: Option<EmitFormat>,
}

impl ExistenceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target false positive rate (must be in (0, 1))
    pub fn error_rate(mut self, rate: f64) -> Self {
        self.error_rate = Some(rate);
        self
    }

    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    pub fn format(mut self, format: EmitFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Build the config, validating all parameters
    pub fn build(self) -> Result<ExistenceConfig> {
        let defaults = ExistenceConfig::default();
        ExistenceConfig::new(
            self.error_rate.unwrap_or(defaults.error_rate),
            self.max_entries.unwrap_or(defaults.max_entries),
            self.format.unwrap_or(defaults.format),
        )
    }
}
