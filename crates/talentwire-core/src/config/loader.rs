//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to a JSON5-compatible string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.gateway.port == 0 {
            errors.push("Gateway port cannot be 0".to_string());
        }

        if let Some(default) = &self.default_unit {
            if !self.units.contains_key(default) {
                errors.push(format!(
                    "default_unit '{}' has no [units] entry",
                    default
                ));
            }
        }

        for (name, unit) in &self.units {
            if !unit.has_any_channel() {
                errors.push(format!("Unit '{}' has no channels configured", name));
            }

            if let Some(wa) = &unit.whatsapp {
                if wa.phone_number_id.is_empty() {
                    errors.push(format!("Unit '{}': whatsapp.phone_number_id is empty", name));
                }
                if wa.access_token.is_empty() {
                    errors.push(format!("Unit '{}': whatsapp.access_token is empty", name));
                }
            }

            if let Some(sms) = &unit.sms {
                if !sms.from_number.starts_with('+') {
                    errors.push(format!(
                        "Unit '{}': sms.from_number must be E.164 (got '{}')",
                        name, sms.from_number
                    ));
                }
            }

            if let Some(teams) = &unit.teams {
                if !teams.webhook_url.starts_with("https://") {
                    errors.push(format!("Unit '{}': teams.webhook_url must be https", name));
                }
            }
        }

        if self.dispatch.retry_multiplier < 1.0 {
            errors.push(format!(
                "dispatch.retry_multiplier must be >= 1.0, got {}",
                self.dispatch.retry_multiplier
            ));
        }

        if self.dispatch.bulk_batch_size == 0 {
            errors.push("dispatch.bulk_batch_size cannot be 0".to_string());
        }

        if self.dispatch.bulk_concurrency == 0 {
            errors.push("dispatch.bulk_concurrency cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SmsSettings, TeamsSettings, UnitConfig};

    #[test]
    fn test_parse_json5_with_comments() {
        let content = r#"{
            // huntRED main tenant
            units: {
                huntred: {
                    teams: { webhook_url: "https://example.webhook.office.com/abc" },
                },
            },
            default_unit: "huntred",
            gateway: { port: 9000 },
        }"#;

        let config = Config::parse(content).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.default_unit.as_deref(), Some("huntred"));
        assert!(config.units["huntred"].teams.is_some());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.gateway.port = 0;
        config.default_unit = Some("missing".to_string());
        config.dispatch.retry_multiplier = 0.5;
        config.dispatch.bulk_batch_size = 0;

        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 4),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_non_e164_sms() {
        let mut config = Config::default();
        config.units.insert(
            "huntu".to_string(),
            UnitConfig {
                sms: Some(SmsSettings {
                    account_sid: "AC123".to_string(),
                    auth_token: "tok".into(),
                    from_number: "5551234".to_string(),
                }),
                ..Default::default()
            },
        );

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_unit() {
        let mut config = Config::default();
        config
            .units
            .insert("empty".to_string(), UnitConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");

        let mut config = Config::default();
        config.units.insert(
            "amigro".to_string(),
            UnitConfig {
                teams: Some(TeamsSettings {
                    webhook_url: "https://example.webhook.office.com/x".to_string(),
                }),
                ..Default::default()
            },
        );
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.units.contains_key("amigro"));
    }
}
