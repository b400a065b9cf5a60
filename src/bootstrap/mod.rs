//! Site/translation bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! page path (before rendering)
//!     → Bootstrap::ensure
//!         → site generation    (guarded by site_checked)
//!         → translation generation (guarded by translations_tried)
//!     → continue to render, or abort (site generation outside production)
//!
//! templates.rs
//!     → CMS template files, listed for the shell and submitted by site generation
//! ```
//!
//! # Design Decisions
//! - Flags live for the process and survive config reloads
//! - Production checks once; other environments check on every page request
//! - `generateIfNeeded=true` anywhere in the URL forces a site check
//! - Concurrent first requests may both run generation; the backend
//!   treats generation as idempotent, so no lock is taken

pub mod templates;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::SiteGenerator;
use crate::error::SsrError;

pub use templates::{TemplateError, TemplateStore};

const FORCE_GENERATION_PARAM: &str = "generateifneeded=true";

/// Process-scoped generation guards.
#[derive(Debug, Default)]
pub struct Bootstrap {
    site_checked: AtomicBool,
    translations_tried: AtomicBool,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site_checked(&self) -> bool {
        self.site_checked.load(Ordering::Acquire)
    }

    pub fn translations_tried(&self) -> bool {
        self.translations_tried.load(Ordering::Acquire)
    }

    /// Run the generation steps that are due for this request.
    ///
    /// Only a site generation failure outside production is returned.
    pub async fn ensure(
        &self,
        generator: &dyn SiteGenerator,
        production: bool,
        url: &str,
    ) -> Result<(), SsrError> {
        let forced = url.to_lowercase().contains(FORCE_GENERATION_PARAM);
        if !self.site_checked() || !production || forced {
            if let Err(e) = generator.generate_site_if_needed().await {
                if !production {
                    return Err(SsrError::SiteGeneration(e));
                }
                tracing::error!(error = %e, "Site generation failed");
            }
            self.site_checked.store(true, Ordering::Release);
        }

        if !self.translations_tried() || !production {
            if let Err(e) = generator.generate_translations().await {
                tracing::error!(error = %e, "Translation generation failed");
            }
            self.translations_tried.store(true, Ordering::Release);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FakeContentApi;

    fn count(counter: &std::sync::atomic::AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn production_checks_once() {
        let api = FakeContentApi::default();
        let bootstrap = Bootstrap::new();

        bootstrap.ensure(&api, true, "/").await.unwrap();
        bootstrap.ensure(&api, true, "/Catalog").await.unwrap();

        assert_eq!(count(&api.site_generations), 1);
        assert_eq!(count(&api.translation_generations), 1);
        assert!(bootstrap.site_checked());
        assert!(bootstrap.translations_tried());
    }

    #[tokio::test]
    async fn query_parameter_forces_site_check() {
        let api = FakeContentApi::default();
        let bootstrap = Bootstrap::new();

        bootstrap.ensure(&api, true, "/").await.unwrap();
        bootstrap
            .ensure(&api, true, "/?GenerateIfNeeded=TRUE")
            .await
            .unwrap();

        assert_eq!(count(&api.site_generations), 2);
        assert_eq!(count(&api.translation_generations), 1);
    }

    #[tokio::test]
    async fn development_checks_every_request() {
        let api = FakeContentApi::default();
        let bootstrap = Bootstrap::new();

        bootstrap.ensure(&api, false, "/").await.unwrap();
        bootstrap.ensure(&api, false, "/").await.unwrap();

        assert_eq!(count(&api.site_generations), 2);
        assert_eq!(count(&api.translation_generations), 2);
    }

    #[tokio::test]
    async fn site_generation_failure_is_fatal_outside_production() {
        let api = FakeContentApi {
            fail_site_generation: true,
            ..FakeContentApi::default()
        };
        let bootstrap = Bootstrap::new();

        let result = bootstrap.ensure(&api, false, "/").await;

        assert!(matches!(result, Err(SsrError::SiteGeneration(_))));
        assert!(!bootstrap.site_checked());
        assert_eq!(count(&api.translation_generations), 0);
    }

    #[tokio::test]
    async fn site_generation_failure_is_logged_in_production() {
        let api = FakeContentApi {
            fail_site_generation: true,
            fail_translation_generation: true,
            ..FakeContentApi::default()
        };
        let bootstrap = Bootstrap::new();

        bootstrap.ensure(&api, true, "/").await.unwrap();

        assert!(bootstrap.site_checked());
        assert!(bootstrap.translations_tried());
    }

    #[tokio::test]
    async fn translation_failure_never_propagates() {
        let api = FakeContentApi {
            fail_translation_generation: true,
            ..FakeContentApi::default()
        };
        let bootstrap = Bootstrap::new();

        assert!(bootstrap.ensure(&api, false, "/").await.is_ok());
    }
}
