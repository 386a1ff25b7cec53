//! Club configuration loading from config.toml
//!
//! The file carries the club's name and currency, the default gold rate used
//! before an admin sets one, the nominal draw day, the QR encoder settings
//! and the member list used to seed an empty registry.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Club-wide settings
    pub club: ClubConfig,
    /// Payment QR encoder settings
    #[serde(default)]
    pub qr: QrConfig,
    /// Members to seed when the registry is empty
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

/// Club-wide settings
#[derive(Debug, Deserialize, Clone)]
pub struct ClubConfig {
    /// Club name, used in QR payment descriptions
    pub name: String,
    /// Currency code for amounts and the gold price
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Gold price per gram used until an admin sets one
    #[serde(default = "default_gold_price_per_gram")]
    pub default_gold_price_per_gram: f64,
    /// Day of month on which the draw is nominally held
    #[serde(default = "default_draw_day")]
    pub draw_day: u32,
}

/// Payment QR encoder settings
#[derive(Debug, Deserialize, Clone)]
pub struct QrConfig {
    /// Endpoint of the QR image service
    #[serde(default = "default_qr_base_url")]
    pub base_url: String,
    /// Image size passed to the service, e.g. `"200x200"`
    #[serde(default = "default_qr_size")]
    pub size: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            base_url: default_qr_base_url(),
            size: default_qr_size(),
        }
    }
}

/// Configuration for a single seed member
#[derive(Debug, Deserialize, Clone)]
pub struct MemberConfig {
    /// Member name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Optional contact email
    #[serde(default)]
    pub email: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

const fn default_gold_price_per_gram() -> f64 {
    6000.0
}

const fn default_draw_day() -> u32 {
    15
}

fn default_qr_base_url() -> String {
    "https://api.qrserver.com/v1/create-qr-code/".to_string()
}

fn default_qr_size() -> String {
    "200x200".to_string()
}

/// Loads club configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
/// - The draw day is outside 1..=28
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses and validates the contents of a config.toml file
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !(1..=28).contains(&config.club.draw_day) {
        return Err(Error::Config {
            message: format!(
                "draw_day must be between 1 and 28, got {}",
                config.club.draw_day
            ),
        });
    }

    Ok(config)
}
