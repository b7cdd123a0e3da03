//! Application and brand configuration for StratBuilder.
//!
//! App config lives at `~/.stratbuilder/stratbuilder.toml`. The per-run
//! brand config is a separate TOML file passed on the command line, and is
//! validated before any pipeline stage executes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StratBuilderError};
use crate::types::{BusinessGoal, SourceMode};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "stratbuilder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".stratbuilder";

/// Upper bound on seed entities per run.
const MAX_SEED_ENTITIES: usize = 50;

/// Allowed length range for a sanitized entity name.
const ENTITY_NAME_RANGE: std::ops::RangeInclusive<usize> = 2..=100;

/// Maximum brand name length.
const MAX_BRAND_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// App config (stratbuilder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default export output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Timeout in seconds for the single sitemap fetch.
    #[serde(default = "default_sitemap_timeout")]
    pub sitemap_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            sitemap_timeout_secs: default_sitemap_timeout(),
        }
    }
}

fn default_output_dir() -> String {
    "~/stratbuilder-exports".into()
}
fn default_sitemap_timeout() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Brand config (per-run input)
// ---------------------------------------------------------------------------

/// The validated description of a brand, its goals, and its entity source.
/// Produced once per run and consumed read-only by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandConfig {
    /// Brand name, 1–100 chars after trimming.
    pub brand_name: String,

    /// Primary niche/market the brand operates in.
    pub primary_niche: String,

    /// At least one business goal.
    pub business_goals: Vec<BusinessGoal>,

    /// How entities are sourced.
    #[serde(default = "default_source_mode")]
    pub source_mode: SourceMode,

    /// Required iff `source_mode` is sitemap or hybrid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap_url: Option<String>,

    /// Required (non-empty after trimming) iff `source_mode` is seed or hybrid.
    #[serde(default)]
    pub seed_entities: Vec<String>,

    /// Competitor brand names.
    #[serde(default)]
    pub competitors: Vec<String>,

    /// Target regions (informational; defaults to US).
    #[serde(default = "default_regions")]
    pub target_regions: Vec<String>,
}

fn default_source_mode() -> SourceMode {
    SourceMode::Seed
}
fn default_regions() -> Vec<String> {
    vec!["US".into()]
}

impl BrandConfig {
    /// Seed entities after sanitization, with blanks dropped.
    /// Order is preserved; this is the order entities are created in.
    pub fn trimmed_seeds(&self) -> Vec<String> {
        self.seed_entities
            .iter()
            .map(|s| sanitize_entity(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Validate the configuration shape. Called before any stage runs;
    /// every later stage may assume a valid config.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        let brand = self.brand_name.trim();
        if brand.is_empty() {
            errors.push("brand_name is required".into());
        } else if brand.len() > MAX_BRAND_NAME_LEN {
            errors.push(format!("brand_name exceeds {MAX_BRAND_NAME_LEN} characters"));
        }

        if self.primary_niche.trim().is_empty() {
            errors.push("primary_niche is required".into());
        }

        if self.business_goals.is_empty() {
            errors.push("at least one business goal is required".into());
        }

        match (&self.sitemap_url, self.source_mode.uses_sitemap()) {
            (None, true) => errors.push(format!(
                "sitemap_url is required when source_mode is {:?}",
                self.source_mode
            )),
            (Some(raw), true) => {
                if let Err(e) = Url::parse(raw) {
                    errors.push(format!("sitemap_url is not a valid URL: {e}"));
                }
            }
            (Some(_), false) => {
                errors.push("sitemap_url must not be set when source_mode is seed".into());
            }
            (None, false) => {}
        }

        let seeds = self.trimmed_seeds();
        if self.source_mode.uses_seeds() {
            if seeds.is_empty() {
                errors.push(format!(
                    "seed_entities are required when source_mode is {:?}",
                    self.source_mode
                ));
            }
            if seeds.len() > MAX_SEED_ENTITIES {
                errors.push(format!(
                    "too many seed entities ({}, max {MAX_SEED_ENTITIES})",
                    seeds.len()
                ));
            }
            for seed in &seeds {
                if !ENTITY_NAME_RANGE.contains(&seed.len()) {
                    errors.push(format!(
                        "seed entity '{seed}' must be 2-100 characters after sanitization"
                    ));
                }
            }
        } else if !seeds.is_empty() {
            errors.push("seed_entities must be empty when source_mode is sitemap".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StratBuilderError::configuration(errors.join("; ")))
        }
    }
}

/// Strip characters that have no place in an entity name and trim whitespace.
pub fn sanitize_entity(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&' | '\\'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Load a brand config from a TOML file.
pub fn load_brand_config(path: &Path) -> Result<BrandConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StratBuilderError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        StratBuilderError::configuration(format!("failed to parse {}: {e}", path.display()))
    })
}

// ---------------------------------------------------------------------------
// App config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.stratbuilder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StratBuilderError::configuration("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.stratbuilder/stratbuilder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StratBuilderError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        StratBuilderError::configuration(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StratBuilderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config)
        .map_err(|e| StratBuilderError::configuration(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StratBuilderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_config() -> BrandConfig {
        BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widget automation".into(),
            business_goals: vec![BusinessGoal::BrandAwareness],
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: vec!["Acme Widget".into(), "Acme Gadget".into()],
            competitors: vec![],
            target_regions: default_regions(),
        }
    }

    #[test]
    fn valid_seed_config_passes() {
        assert!(seed_config().validate().is_ok());
    }

    #[test]
    fn empty_seeds_rejected_in_seed_mode() {
        let mut config = seed_config();
        config.seed_entities = vec!["   ".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("seed_entities are required"));
    }

    #[test]
    fn sitemap_url_required_iff_sitemap_mode() {
        let mut config = seed_config();
        config.source_mode = SourceMode::Sitemap;
        config.seed_entities = vec![];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sitemap_url is required"));

        config.sitemap_url = Some("not a url".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));

        config.sitemap_url = Some("https://example.com/sitemap.xml".into());
        assert!(config.validate().is_ok());

        // And the reverse direction: seed mode must not carry a sitemap URL
        let mut config = seed_config();
        config.sitemap_url = Some("https://example.com/sitemap.xml".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn hybrid_requires_both_sources() {
        let mut config = seed_config();
        config.source_mode = SourceMode::Hybrid;
        assert!(config.validate().is_err());

        config.sitemap_url = Some("https://example.com/sitemap.xml".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sanitize_strips_markup_chars() {
        assert_eq!(sanitize_entity("  Wid<get>s  "), "Widgets");
        assert_eq!(sanitize_entity("'quoted' name"), "quoted name");
        assert_eq!(sanitize_entity("plain name"), "plain name");
    }

    #[test]
    fn brand_config_toml_roundtrip() {
        let config = seed_config();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: BrandConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.defaults.sitemap_timeout_secs, 30);

        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.output_dir, "~/stratbuilder-exports");
    }
}
