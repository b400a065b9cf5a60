//! The page-render path: default handler for every unrouted URL.
//!
//! # Data Flow
//! ```text
//! IncomingRequest
//!     → bootstrap (site / translation generation when due)
//!     → session::classify_entry + shell cookies
//!     → storefront only, concurrently:
//!         site messages | translations | page lookup (bridge) → theme
//!     → ConvergenceEngine over StorefrontApp (unless disableSSR)
//!         → Redirect: Location response, no document
//!         → Rendered: document::assemble
//!     → OutgoingResponse (status, Set-Cookie, HTML)
//! ```

use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::app::{set_initial_page, StorefrontApp, CONTEXT_KEY};
use crate::backend::{ApiSession, BackendResult, SiteMessage, TranslationEntry};
use crate::document::{
    assemble, default_theme, head_tracking_script, noscript_tracking_script,
    process_site_messages, process_translations, resolve_theme, DocumentMode, DocumentModel,
};
use crate::error::SsrError;
use crate::handlers::HandlerContext;
use crate::http::request::IncomingRequest;
use crate::http::response::OutgoingResponse;
use crate::render::{Dictionary, RenderContext, RenderOutcome, Store};
use crate::session::{
    classify_entry, shell_cookies, BridgeOutcome, SessionBridge, LANGUAGE_COOKIE,
};

const DISABLE_SSR_PARAM: &str = "disableSSR";

/// Backend data gathered for a storefront request before rendering.
struct StorefrontData {
    bridge: BridgeOutcome,
    theme: Option<Value>,
    site_messages: BackendResult<Vec<SiteMessage>>,
    translations: BackendResult<Vec<TranslationEntry>>,
}

async fn load_storefront_data(
    ctx: &HandlerContext<'_>,
    request: &IncomingRequest,
    session: &ApiSession,
) -> StorefrontData {
    let api = ctx.runtime.api.as_ref();
    let language = request.cookie(LANGUAGE_COOKIE);
    let page_size = ctx.runtime.config.backend.translation_page_size;

    let page_and_theme = async {
        let bridge = SessionBridge::new(api).load_page(request, session).await;
        let bridged = session.with_cookies(bridge.session.clone());
        let theme = match api.theme(&bridged).await {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::debug!(error = %e, "Theme unavailable, using default");
                None
            }
        };
        (bridge, theme)
    };

    let (site_messages, translations, (bridge, theme)) = tokio::join!(
        api.site_messages(language, session),
        api.translation_dictionaries(language, page_size, session),
        page_and_theme,
    );

    StorefrontData {
        bridge,
        theme,
        site_messages,
        translations,
    }
}

fn dictionary<T>(
    result: BackendResult<Vec<T>>,
    what: &str,
    reduce: impl FnOnce(&[T]) -> Dictionary,
) -> Dictionary {
    match result {
        Ok(entries) => reduce(&entries),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load {what}");
            Dictionary::new()
        }
    }
}

/// Render the page for `request`.
///
/// Only a bootstrap failure outside production is returned as an error;
/// every other failure degrades the document.
pub async fn render_page(
    ctx: &HandlerContext<'_>,
    request: IncomingRequest,
) -> Result<Response, SsrError> {
    let runtime = ctx.runtime;
    let config = &runtime.config;

    ctx.bootstrap
        .ensure(
            runtime.generator.as_ref(),
            config.environment.is_production(),
            &request.original_url,
        )
        .await?;

    let entry = classify_entry(&request);
    let (shell, cookies) = shell_cookies(&request, entry);
    let mut response = OutgoingResponse::new();
    for cookie in cookies {
        response.cookie(cookie);
    }

    if entry.is_shell() {
        let mut model = DocumentModel::new(DocumentMode::Shell, default_theme(), config.assets.clone());
        model.language_code = request.cookie(LANGUAGE_COOKIE).map(str::to_string);
        return Ok(response.send_html(assemble("", &model)));
    }

    let session = ctx.api_session(&request);
    let data = load_storefront_data(ctx, &request, &session).await;
    let bridge = data.bridge;

    // Dictionaries follow a language the backend just issued; `<html lang>` does not.
    let language = request
        .cookie(LANGUAGE_COOKIE)
        .or_else(|| bridge.issued(LANGUAGE_COOKIE).filter(|code| !code.is_empty()))
        .map(str::to_string);
    let site_messages = dictionary(data.site_messages, "site messages", |m| {
        process_site_messages(m, language.as_deref())
    });
    let translations = dictionary(data.translations, "translation dictionaries", |t| {
        process_translations(t, language.as_deref())
    });
    let theme = resolve_theme(data.theme.as_ref());

    for cookie in &bridge.response_cookies {
        response.cookie(cookie.clone());
    }

    let store = Arc::new(Store::new());
    if let Some(page) = &bridge.page {
        set_initial_page(&store, &request.original_url, page);
    }

    let mut model = DocumentModel::new(DocumentMode::Storefront, theme.clone(), config.assets.clone());
    model.language_code = request.cookie(LANGUAGE_COOKIE).map(str::to_string);

    let render_ssr = !request.has_query_param(DISABLE_SSR_PARAM);
    let mut fragment = String::new();
    if render_ssr {
        let context = Arc::new(RenderContext {
            store: Arc::clone(&store),
            api: Arc::clone(&runtime.api),
            session: Arc::new(session.with_cookies(bridge.session.clone())),
            location: request.original_url.clone(),
            shell,
            theme: Arc::new(theme),
            site_messages: Arc::new(site_messages.clone()),
            translations: Arc::new(translations.clone()),
        });

        match runtime.engine.converge(&StorefrontApp, &context).await {
            RenderOutcome::Redirect { location, status } => {
                if let Some(status) = status {
                    response.status(status);
                }
                return Ok(response.redirect(&location));
            }
            RenderOutcome::Rendered(page) => {
                if let Some(status) = page.status {
                    response.status(status);
                }
                fragment = page.html;
                model.style_markup = page.style_markup;
                model.metadata = page.metadata;
            }
        }
        model.hydration_state = Some(store.snapshot());
    }

    let settings = store.get_path(CONTEXT_KEY, "/settings");
    model.head_tracking_script = head_tracking_script(settings.as_ref());
    model.noscript_tracking = noscript_tracking_script(settings.as_ref());
    model.favicon = store
        .get_path(CONTEXT_KEY, "/website/websiteFavicon")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|f| !f.is_empty());
    model.site_messages = site_messages;
    model.translations = translations;

    Ok(response.send_html(assemble(&fragment, &model)))
}
