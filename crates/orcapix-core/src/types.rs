use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrcapixError;

/// Kind of Pix key registered with the receiver's bank (DICT key type).
///
/// Serialized with the names the quoting app stores in its profile settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixKeyType {
    /// CPF (11 digits) or CNPJ (14 digits)
    CpfCnpj,
    /// E-mail address, kept verbatim apart from whitespace
    Email,
    /// Phone number
    Telefone,
    /// Random key (EVP), a 36-char UUID
    Aleatoria,
}

impl PixKeyType {
    pub const ALL: [PixKeyType; 4] = [
        PixKeyType::CpfCnpj,
        PixKeyType::Email,
        PixKeyType::Telefone,
        PixKeyType::Aleatoria,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PixKeyType::CpfCnpj => "cpf_cnpj",
            PixKeyType::Email => "email",
            PixKeyType::Telefone => "telefone",
            PixKeyType::Aleatoria => "aleatoria",
        }
    }
}

impl fmt::Display for PixKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixKeyType {
    type Err = OrcapixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PixKeyType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                OrcapixError::InvalidPixKey(format!(
                    "unknown key type '{s}' (expected cpf_cnpj, email, telefone or aleatoria)"
                ))
            })
    }
}

/// Raw payment profile as captured in the settings screen.
///
/// Nothing here is validated; the BR Code assembler sanitizes every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixKeyInput {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "type")]
    pub key_type: Option<PixKeyType>,
}

impl PixKeyInput {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            city: None,
            key_type: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_key_type(mut self, key_type: PixKeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }
}
