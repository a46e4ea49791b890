//! Configuration validation.
//!
//! Serde handles syntactic checks; this module performs the semantic ones.
//! Validation is a pure function over the parsed config and returns all
//! errors found, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    PrefixMissingSlash(String),
    NoSupportedVersions,
    InvalidVersionHeader(String),
    TlsPathMissing(&'static str),
    ZeroTimeout,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{}' is not a socket address", addr)
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address '{}' is not a socket address", addr)
            }
            ValidationError::PrefixMissingSlash(prefix) => {
                write!(f, "api.prefix '{}' must start with '/'", prefix)
            }
            ValidationError::NoSupportedVersions => {
                write!(f, "api.supported_versions must not be empty")
            }
            ValidationError::InvalidVersionHeader(name) => {
                write!(f, "api.version_header '{}' is not a valid header name", name)
            }
            ValidationError::TlsPathMissing(field) => {
                write!(f, "listener.tls.{} must not be empty", field)
            }
            ValidationError::ZeroTimeout => {
                write!(f, "timeouts.request_secs must be greater than zero")
            }
        }
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if !config.api.prefix.starts_with('/') {
        errors.push(ValidationError::PrefixMissingSlash(config.api.prefix.clone()));
    }

    if config.api.supported_versions.is_empty() {
        errors.push(ValidationError::NoSupportedVersions);
    }

    if config.api.version_header.parse::<HeaderName>().is_err() {
        errors.push(ValidationError::InvalidVersionHeader(
            config.api.version_header.clone(),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::TlsPathMissing("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::TlsPathMissing("key_path"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.api.prefix = "api".to_string();
        config.api.supported_versions.clear();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::NoSupportedVersions));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_tls_paths_required() {
        let mut config = AppConfig::default();
        config.listener.tls = Some(TlsConfig {
            cert_path: String::new(),
            key_path: "key.pem".to_string(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::TlsPathMissing("cert_path")]);
    }

    #[test]
    fn test_bad_version_header_rejected() {
        let mut config = AppConfig::default();
        config.api.version_header = "not a header\n".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidVersionHeader(_)));
    }
}
