//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Email configuration (Resend)
///
/// The API key is optional outside production; without it transactional
/// emails are skipped (they are best-effort side effects).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: Option<String>,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.resend_api_key.is_none() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if let Some(key) = &self.resend_api_key {
            if !key.starts_with("re_") {
                return Err(ValidationError::InvalidResendKey);
            }
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_from_email() -> String {
    "noreply@breweryrecipes.com".to_string()
}

fn default_from_name() -> String {
    "Brewery Recipe Platform".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_defaults() {
        let config = EmailConfig::default();
        assert_eq!(config.from_email, "noreply@breweryrecipes.com");
        assert_eq!(config.from_name, "Brewery Recipe Platform");
    }

    #[test]
    fn test_from_header() {
        let config = EmailConfig::default();
        assert_eq!(
            config.from_header(),
            "Brewery Recipe Platform <noreply@breweryrecipes.com>"
        );
    }

    #[test]
    fn test_validation_missing_api_key_allowed_in_development() {
        let config = EmailConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_validation_missing_api_key_rejected_in_production() {
        let config = EmailConfig::default();
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::MissingRequired("RESEND_API_KEY"))
        ));
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = EmailConfig {
            resend_api_key: Some("sk_xxx".to_string()), // Wrong prefix
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_invalid_from_email() {
        let config = EmailConfig {
            resend_api_key: Some("re_xxx".to_string()),
            from_email: "invalid-email".to_string(),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = EmailConfig {
            resend_api_key: Some("re_abcd1234".to_string()),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }
}
