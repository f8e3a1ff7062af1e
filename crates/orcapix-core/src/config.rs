use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{OrcapixError, OrcapixResult};
use crate::types::{PixKeyInput, PixKeyType};

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrcapixConfig {
    pub pix: PixConfig,
    pub log: LogConfig,
}

/// Receiver profile used to build Pix charges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixConfig {
    /// Pix key (CPF/CNPJ, phone, e-mail or random key)
    pub key: Option<String>,
    /// Merchant name printed by the payer's banking app
    pub name: String,
    /// Merchant city (default: SAO PAULO when unset)
    pub city: Option<String>,
    /// Key type hint: cpf_cnpj, email, telefone or aleatoria
    pub key_type: Option<PixKeyType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl PixConfig {
    /// Build the assembler input from the stored profile.
    ///
    /// A missing key becomes an empty string so that the assembler reports it
    /// as an invalid key instead of failing here.
    pub fn to_input(&self) -> PixKeyInput {
        PixKeyInput {
            key: self.key.clone().unwrap_or_default(),
            name: self.name.clone(),
            city: self.city.clone(),
            key_type: self.key_type,
        }
    }
}

impl OrcapixConfig {
    /// Parse a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> OrcapixResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| OrcapixError::Config(format!("parsing {}: {e}", path.display())))
    }
}
