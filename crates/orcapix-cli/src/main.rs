//! orcapix: Pix BR Code tool for quotes and invoices
//!
//! Commands:
//!   brcode              - build an open-amount Pix payload from the profile
//!   decode <payload>    - verify the CRC and print the fields of a payload
//!   crc <text>          - CRC16/CCITT-FALSE of arbitrary text
//!   config show         - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use orcapix_brcode::{assemble_payload, crc16_hex, decode_payload, BrCode};
use orcapix_core::config::OrcapixConfig;
use orcapix_core::{OrcapixError, PixKeyInput, PixKeyType};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "orcapix",
    version,
    about = "Pix BR Code payloads for quotes",
    long_about = "orcapix: build, verify and decode Pix BR Code (EMV QR) payloads"
)]
struct Cli {
    /// Path to config.toml
    #[arg(
        long,
        short = 'c',
        env = "ORCAPIX_CONFIG",
        default_value = "~/.config/orcapix/config.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides [log] level
    #[arg(long, env = "ORCAPIX_LOG")]
    log: Option<String>,

    /// Log format; overrides [log] format
    #[arg(long, env = "ORCAPIX_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an open-amount Pix BR Code from the configured receiver
    ///
    /// Flags override the [pix] section of the config file.
    Brcode {
        /// Pix key (CPF/CNPJ, phone, e-mail or random key)
        #[arg(long, short = 'k')]
        key: Option<String>,
        /// Merchant name
        #[arg(long, short = 'n')]
        name: Option<String>,
        /// Merchant city
        #[arg(long)]
        city: Option<String>,
        /// Key type: cpf_cnpj, email, telefone or aleatoria
        #[arg(long, short = 't')]
        key_type: Option<String>,
        /// Print a JSON object with the payload and its decoded fields
        #[arg(long)]
        json: bool,
    },

    /// Verify and decode an existing BR Code
    Decode {
        /// Payload text (the "Pix copia e cola" string)
        payload: String,
        #[arg(long)]
        json: bool,
    },

    /// Print the CRC16/CCITT-FALSE of a string as 4 hex digits
    Crc {
        text: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

/// Overrides for the stored receiver profile, taken from `brcode` flags
#[derive(Debug, Default)]
struct ProfileOverrides {
    key: Option<String>,
    name: Option<String>,
    city: Option<String>,
    key_type: Option<String>,
}

#[derive(Serialize)]
struct BrCodeOutput<'a> {
    payload: &'a str,
    #[serde(flatten)]
    fields: BrCode,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = OrcapixConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = match cli.log_format.clone() {
        Some(f) => f,
        None => LogFormat::from_str(&config.log.format, true)
            .map_err(|e| anyhow::anyhow!("invalid [log] format '{}': {e}", config.log.format))?,
    };
    init_logging(&level, &format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "orcapix starting"
    );

    match cli.command {
        Commands::Brcode { key, name, city, key_type, json } => {
            let overrides = ProfileOverrides { key, name, city, key_type };
            cmd_brcode(&config, &config_path, overrides, json)
        }
        Commands::Decode { payload, json } => cmd_decode(&payload, json),
        Commands::Crc { text } => {
            println!("{}", crc16_hex(&text));
            Ok(())
        }
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &config_path),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the payload, logs go to stderr
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Expand `~` in path to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}

/// Unknown key types are dropped so the sanitizer infers the type itself.
fn parse_key_type(raw: &str) -> Option<PixKeyType> {
    match raw.parse() {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("{e}; inferring key type from the key");
            None
        }
    }
}

/// Merge `brcode` flags over the stored profile: flag > config.
fn resolve_profile(config: &OrcapixConfig, overrides: ProfileOverrides) -> PixKeyInput {
    let mut input = config.pix.to_input();
    if let Some(key) = overrides.key {
        input.key = key;
    }
    if let Some(name) = overrides.name {
        input.name = name;
    }
    if let Some(city) = overrides.city {
        input.city = Some(city);
    }
    if let Some(raw) = overrides.key_type {
        input.key_type = parse_key_type(&raw);
    }
    input
}

// ── `orcapix brcode` ──────────────────────────────────────────────────────────

fn cmd_brcode(
    config: &OrcapixConfig,
    config_path: &Path,
    overrides: ProfileOverrides,
    json: bool,
) -> Result<()> {
    let input = resolve_profile(config, overrides);

    let payload = match assemble_payload(&input) {
        Ok(p) => p,
        Err(e @ OrcapixError::InvalidPixKey(_)) => anyhow::bail!(
            "{e}\nSet `key` under [pix] in {} or pass --key",
            config_path.display()
        ),
        Err(e) => return Err(e).context("assembling BR Code"),
    };

    if json {
        let fields = decode_payload(&payload).context("decoding assembled BR Code")?;
        print_json(&BrCodeOutput {
            payload: &payload,
            fields,
        })
    } else {
        println!("{payload}");
        Ok(())
    }
}

// ── `orcapix decode` ──────────────────────────────────────────────────────────

fn cmd_decode(payload: &str, json: bool) -> Result<()> {
    let payload = payload.trim();
    let code = decode_payload(payload).context("invalid BR Code")?;

    if json {
        return print_json(&BrCodeOutput {
            payload,
            fields: code,
        });
    }

    println!("Pix BR Code (CRC {} ok)", code.crc);
    println!("  key:       {}", code.key);
    println!("  name:      {}", code.merchant_name);
    println!("  city:      {}", code.merchant_city);
    println!("  country:   {}", code.country);
    println!("  currency:  {}", code.currency);
    println!("  category:  {}", code.merchant_category);
    match &code.amount {
        Some(amount) => println!("  amount:    {amount}"),
        None => println!("  amount:    (payer enters the value)"),
    }
    if let Some(txid) = &code.txid {
        println!("  txid:      {txid}");
    }
    Ok(())
}

// ── `orcapix config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &OrcapixConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing JSON output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_profile() -> OrcapixConfig {
        toml::from_str(
            r#"
[pix]
key = "a@b.com"
name = "Loja"
city = "Recife"
key_type = "email"
"#,
        )
        .unwrap()
    }

    #[test]
    fn flags_override_profile() {
        let overrides = ProfileOverrides {
            key: Some("11999998888".into()),
            key_type: Some("telefone".into()),
            ..Default::default()
        };
        let input = resolve_profile(&config_with_profile(), overrides);

        assert_eq!(input.key, "11999998888");
        assert_eq!(input.key_type, Some(PixKeyType::Telefone));
        assert_eq!(input.name, "Loja");
        assert_eq!(input.city.as_deref(), Some("Recife"));
    }

    #[test]
    fn unknown_key_type_flag_clears_hint() {
        let overrides = ProfileOverrides {
            key_type: Some("cpf".into()),
            ..Default::default()
        };
        let input = resolve_profile(&config_with_profile(), overrides);
        assert_eq!(input.key_type, None);
    }

    #[test]
    fn expand_tilde_uses_home() {
        let expanded = expand_tilde(Path::new("~/.config/orcapix/config.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with(".config/orcapix/config.toml"));

        assert_eq!(expand_tilde(Path::new("/etc/x.toml")), PathBuf::from("/etc/x.toml"));
    }

    #[test]
    fn brcode_json_output_flattens_fields() {
        let payload = assemble_payload(&config_with_profile().pix.to_input()).unwrap();
        let out = BrCodeOutput {
            payload: &payload,
            fields: decode_payload(&payload).unwrap(),
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["payload"], payload.as_str());
        assert_eq!(value["key"], "a@b.com");
        assert_eq!(value["merchant_city"], "RECIFE");
        assert!(value["amount"].is_null());
    }

    #[test]
    fn missing_key_names_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[pix]\nname = \"Loja\"\n").unwrap();
        let config = OrcapixConfig::load(&path).unwrap();

        let err = cmd_brcode(&config, &path, ProfileOverrides::default(), false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Pix key is required"), "{msg}");
        assert!(msg.contains("config.toml"), "{msg}");
    }

    #[test]
    fn cli_parses_brcode_flags() {
        let cli = Cli::try_parse_from([
            "orcapix", "brcode", "--key", "a@b.com", "--name", "Jane", "-t", "email", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Brcode { key, name, key_type, json, .. } => {
                assert_eq!(key.as_deref(), Some("a@b.com"));
                assert_eq!(name.as_deref(), Some("Jane"));
                assert_eq!(key_type.as_deref(), Some("email"));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
