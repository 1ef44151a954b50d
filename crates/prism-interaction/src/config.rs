//! Configuration file management for PRISM.
//!
//! Supports reading secrets from `~/.config/prism/secret.json`.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub text_model: Option<String>,
    #[serde(default)]
    pub image_model: Option<String>,
    #[serde(default)]
    pub edit_model: Option<String>,
}

/// Loads the secret configuration file from ~/.config/prism/secret.json
pub fn load_secret_config() -> Result<SecretConfig, String> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            config_path.display()
        ));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        )
    })
}

/// Returns the path to the configuration file: ~/.config/prism/secret.json
fn get_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
    Ok(home.join(".config").join("prism").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_secret_config() {
        let json = r#"{
            "gemini": {
                "api_key": "test-key",
                "text_model": "gemini-custom",
                "image_model": "imagen-custom",
                "edit_model": "gemini-edit-custom"
            }
        }"#;

        let config: SecretConfig = serde_json::from_str(json).unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "test-key");
        assert_eq!(gemini.text_model.as_deref(), Some("gemini-custom"));
        assert_eq!(gemini.image_model.as_deref(), Some("imagen-custom"));
        assert_eq!(gemini.edit_model.as_deref(), Some("gemini-edit-custom"));
    }

    #[test]
    fn test_parse_minimal_secret_config() {
        let json = r#"{ "gemini": { "api_key": "test-key" } }"#;

        let config: SecretConfig = serde_json::from_str(json).unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "test-key");
        assert!(gemini.text_model.is_none());
        assert!(gemini.image_model.is_none());
        assert!(gemini.edit_model.is_none());
    }

    #[test]
    fn test_parse_config_without_gemini_section() {
        let config: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(config.gemini.is_none());
    }
}
