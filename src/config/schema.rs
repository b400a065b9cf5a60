//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SSR host.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the storefront SSR host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SsrConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment environment; drives bootstrap and error policy.
    pub environment: Environment,

    /// Backend content API the host renders against.
    pub backend: BackendConfig,

    /// Render convergence limits.
    pub render: RenderConfig,

    /// Path prefixes relayed verbatim to the backend.
    pub relay: RelayConfig,

    /// Client bundles, fonts and third-party scripts.
    pub assets: AssetConfig,

    /// CMS page templates.
    pub templates: TemplateConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum request body accepted for relayed requests, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => f.write_str("production"),
            Environment::Development => f.write_str("development"),
        }
    }
}

/// Backend content API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:5000").
    pub base_url: String,

    /// Page size used when fetching translation dictionaries.
    pub translation_page_size: u32,

    /// Connect timeout of the HTTP client in seconds. Requests carry no deadline.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            translation_page_size: 131_072,
            connect_timeout_secs: 5,
        }
    }
}

/// Render convergence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Hard cap on await-and-rerender cycles.
    pub max_passes: usize,

    /// Cycles after which new pending work is considered suspicious.
    pub suspicious_after: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_passes: 10,
            suspicious_after: 5,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// First path segments forwarded to the backend (e.g., "api").
    pub endpoints: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoints: [
                "api",
                "identity",
                "admin",
                "userfiles",
                "systemresources",
                "bundles",
                "excel",
                "base",
                "email",
                "account",
                "favicon.ico",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory served under `/dist`.
    pub dist_dir: String,

    /// Cache-busting version appended to bundle URLs.
    pub bundle_version: String,

    /// Font stylesheet used by the content administration shell.
    pub shell_font_url: String,

    /// Hosted payment iframe script included in every document.
    pub payment_iframe_script: Option<String>,

    /// Rich content editor script included in the shell document.
    pub content_editor_script: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dist_dir: "dist".to_string(),
            bundle_version: env!("CARGO_PKG_VERSION").to_string(),
            shell_font_url: "https://fonts.googleapis.com/css?family=Barlow:300,400,700&display=swap"
                .to_string(),
            payment_iframe_script: Some(
                "https://test-htp.tokenex.com/Iframe/Iframe-v3.min.js".to_string(),
            ),
            content_editor_script:
                "/SystemResources/Scripts/Libraries/ckfinder/3.4.1/ckfinder.js".to_string(),
        }
    }
}

/// CMS template configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Root directory holding page templates (`*.json`).
    pub dir: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
        }
    }
}

/// Timeout configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for relayed requests in seconds.
    pub relay_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { relay_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: SsrConfig = toml::from_str(
            r#"
            environment = "production"

            [backend]
            base_url = "http://backend:8080"
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.backend.base_url, "http://backend:8080");
        assert_eq!(config.backend.translation_page_size, 131_072);
        assert_eq!(config.render.max_passes, 10);
        assert_eq!(config.render.suspicious_after, 5);
        assert!(config.relay.endpoints.iter().any(|e| e == "api"));
    }

    #[test]
    fn default_environment_is_development() {
        let config = SsrConfig::default();
        assert!(!config.environment.is_production());
        assert_eq!(config.environment.to_string(), "development");
    }
}
