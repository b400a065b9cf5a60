//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pass limits, page sizes)
//! - Validate backend URL and bind address shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SsrConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SsrConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("backend.base_url '{0}' is not an absolute http(s) URL")]
    BackendUrl(String),

    #[error("backend.translation_page_size must be greater than 0")]
    TranslationPageSize,

    #[error("render.max_passes must be greater than 0")]
    MaxPasses,

    #[error("render.suspicious_after ({suspicious_after}) must be below render.max_passes ({max_passes})")]
    SuspiciousAfter {
        suspicious_after: usize,
        max_passes: usize,
    },

    #[error("relay endpoint '{0}' must be a single non-empty path segment")]
    RelayEndpoint(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &SsrConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match url::Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::BackendUrl(config.backend.base_url.clone())),
    }

    if config.backend.translation_page_size == 0 {
        errors.push(ValidationError::TranslationPageSize);
    }

    if config.render.max_passes == 0 {
        errors.push(ValidationError::MaxPasses);
    } else if config.render.suspicious_after >= config.render.max_passes {
        errors.push(ValidationError::SuspiciousAfter {
            suspicious_after: config.render.suspicious_after,
            max_passes: config.render.max_passes,
        });
    }

    for endpoint in &config.relay.endpoints {
        if endpoint.is_empty() || endpoint.contains('/') {
            errors.push(ValidationError::RelayEndpoint(endpoint.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&SsrConfig::default()), Ok(()));
    }

    #[test]
    fn suspicious_threshold_must_be_below_cap() {
        let mut config = SsrConfig::default();
        config.render.suspicious_after = 10;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::SuspiciousAfter {
                suspicious_after: 10,
                max_passes: 10
            }]
        );
    }

    #[test]
    fn relay_endpoints_are_single_segments() {
        let mut config = SsrConfig::default();
        config.relay.endpoints = vec!["api/v1".into(), "".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn backend_url_must_be_http() {
        let mut config = SsrConfig::default();
        config.backend.base_url = "ftp://files".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::BackendUrl("ftp://files".into())]
        );
    }
}
