//! Processor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_model::DEFAULT_MAX_ENTRIES;
use super::error::A2uiError;
use super::message::MAX_MESSAGE_BYTES;
use super::safe_regex::DEFAULT_MATCH_TIMEOUT;

/// Resource limits and policies of an [`A2uiMessageProcessor`].
///
/// Every field has a default, so a config document only needs the values
/// it changes:
///
/// ```
/// use a2ui_kit::a2ui::ProcessorConfig;
///
/// let config = ProcessorConfig::from_json_str(r#"{"maxSurfaces": 5}"#).unwrap();
/// assert_eq!(config.max_surfaces, 5);
/// assert_eq!(config.max_components_per_surface, 1000);
/// ```
///
/// [`A2uiMessageProcessor`]: super::A2uiMessageProcessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorConfig {
    /// Live surfaces allowed at once
    pub max_surfaces: usize,

    /// Components allowed in one surface's table
    pub max_components_per_surface: usize,

    /// Keys and list elements allowed in one data model
    pub max_data_model_entries: usize,

    /// Largest raw message accepted, in bytes
    pub max_message_bytes: usize,

    /// Wall-clock budget for one regex match
    pub regex_timeout_ms: u64,

    /// URL schemes `openUrl` may open
    pub allowed_url_schemes: Vec<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            max_surfaces: 50,
            max_components_per_surface: 1000,
            max_data_model_entries: DEFAULT_MAX_ENTRIES,
            max_message_bytes: MAX_MESSAGE_BYTES,
            regex_timeout_ms: DEFAULT_MATCH_TIMEOUT.as_millis() as u64,
            allowed_url_schemes: ["https", "http", "mailto", "tel", "sms"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ProcessorConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, A2uiError> {
        let config: ProcessorConfig =
            serde_json::from_str(json).map_err(|e| A2uiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every message fail
    pub fn validate(&self) -> Result<(), A2uiError> {
        let zero = [
            ("maxSurfaces", self.max_surfaces as u64),
            ("maxComponentsPerSurface", self.max_components_per_surface as u64),
            ("maxDataModelEntries", self.max_data_model_entries as u64),
            ("maxMessageBytes", self.max_message_bytes as u64),
            ("regexTimeoutMs", self.regex_timeout_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        if let Some((name, _)) = zero {
            return Err(A2uiError::Config(format!("{} must be greater than zero", name)));
        }
        if let Some(scheme) = self
            .allowed_url_schemes
            .iter()
            .find(|s| s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        {
            return Err(A2uiError::Config(format!("invalid URL scheme {:?}", scheme)));
        }
        Ok(())
    }

    pub fn regex_timeout(&self) -> Duration {
        Duration::from_millis(self.regex_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.max_surfaces, 50);
        assert_eq!(config.max_components_per_surface, 1000);
        assert_eq!(config.max_data_model_entries, 10_000);
        assert_eq!(config.max_message_bytes, 1024 * 1024);
        assert_eq!(config.regex_timeout(), Duration::from_millis(100));
        assert_eq!(config.allowed_url_schemes, vec!["https", "http", "mailto", "tel", "sms"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let config = ProcessorConfig::from_json_str(
            r#"{"maxComponentsPerSurface": 10, "allowedUrlSchemes": ["https"]}"#,
        )
        .unwrap();
        assert_eq!(config.max_components_per_surface, 10);
        assert_eq!(config.allowed_url_schemes, vec!["https"]);
        assert_eq!(config.max_surfaces, 50);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            ProcessorConfig::from_json_str(r#"{"maxSurfaces": 0}"#),
            Err(A2uiError::Config(_))
        ));
        assert!(matches!(
            ProcessorConfig::from_json_str(r#"{"maxSurfaces": -1}"#),
            Err(A2uiError::Config(_))
        ));
        assert!(matches!(
            ProcessorConfig::from_json_str(r#"{"allowedUrlSchemes": ["java script"]}"#),
            Err(A2uiError::Config(_))
        ));
        assert!(matches!(
            ProcessorConfig::from_json_str("not json"),
            Err(A2uiError::Config(_))
        ));
    }
}
