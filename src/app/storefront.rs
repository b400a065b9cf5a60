//! Default storefront component tree.
//!
//! Loads the session context and the page for the current location through
//! the pending queue, then renders the page and its widgets. A page that
//! cannot be obtained renders the unhandled-error presentation.

use std::sync::Arc;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::{json, Value};

use crate::backend::RetrievePageResult;
use crate::render::{PageMetadata, RenderContext, RenderScope, Renderable, Store};

/// Store slice holding `{session, website, settings}`.
pub const CONTEXT_KEY: &str = "context";
/// Store slice holding `{url, result}` or `{url, error}` for the current page.
pub const PAGE_KEY: &str = "page";

/// Seed the store with a page looked up before rendering.
pub fn set_initial_page(store: &Store, url: &str, result: &RetrievePageResult) {
    store.set(PAGE_KEY, json!({ "url": url, "result": result }));
}

enum PageState {
    Loading,
    Failed,
    Loaded(RetrievePageResult),
}

/// The built-in storefront.
#[derive(Debug, Default, Clone, Copy)]
pub struct StorefrontApp;

impl StorefrontApp {
    fn ensure_context(&self, scope: &RenderScope<'_>) -> bool {
        let store = scope.store();
        if store.contains(CONTEXT_KEY) {
            return true;
        }
        if store.begin_load(CONTEXT_KEY) {
            let context = Arc::clone(scope.context());
            scope.track(async move {
                let value = match context.api.session_context(&context.session).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(url = %context.location, error = %e, "Session context unavailable");
                        Value::Null
                    }
                };
                context.store.finish_load(CONTEXT_KEY, value);
            });
        }
        false
    }

    fn page_state(&self, scope: &RenderScope<'_>) -> PageState {
        let context = scope.context();
        let store = scope.store();
        let current = store
            .get(PAGE_KEY)
            .filter(|page| page.get("url").and_then(Value::as_str) == Some(context.location.as_str()));

        match current {
            Some(page) if page.get("error").is_some() => PageState::Failed,
            Some(page) => match page.get("result").cloned().map(serde_json::from_value) {
                Some(Ok(result)) => PageState::Loaded(result),
                _ => PageState::Failed,
            },
            None => {
                if store.begin_load(PAGE_KEY) {
                    load_page(scope, Arc::clone(context));
                }
                PageState::Loading
            }
        }
    }
}

fn load_page(scope: &RenderScope<'_>, context: Arc<RenderContext>) {
    scope.track(async move {
        let url = context.location.clone();
        let bypass_filters = url.starts_with("/Content/Page/");
        let value = match context.api.page_by_url(&url, bypass_filters, &context.session).await {
            Ok(response) => json!({ "url": url, "result": response.result }),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Page could not be retrieved");
                json!({ "url": url, "error": e.to_string() })
            }
        };
        context.store.finish_load(PAGE_KEY, value);
    });
}

impl Renderable for StorefrontApp {
    fn render(&self, scope: &RenderScope<'_>) -> String {
        let context = scope.context();
        if let Some(font) = context
            .theme
            .pointer("/typography/body/fontFamily")
            .and_then(Value::as_str)
        {
            scope.style(format!("body{{margin:0;font-family:{font};}}"));
        }

        let context_ready = self.ensure_context(scope);
        let page = self.page_state(scope);
        if !context_ready {
            return loading();
        }

        match page {
            PageState::Loading => loading(),
            PageState::Failed => unhandled_error(scope),
            PageState::Loaded(result) => render_page(scope, result),
        }
    }
}

fn loading() -> String {
    r#"<div class="page-loading"></div>"#.to_string()
}

fn unhandled_error(scope: &RenderScope<'_>) -> String {
    let context = scope.context();
    scope.style(".unhandled-error{padding:2rem;text-align:center;}");
    scope.set_metadata(PageMetadata {
        title: Some(context.translate("Unhandled Error")),
        ..PageMetadata::default()
    });
    let message = context
        .site_message("UnhandledError_Message")
        .map(str::to_string)
        .unwrap_or_else(|| context.translate("An unexpected error occurred."));
    format!(
        r#"<div class="page unhandled-error"><h1>{}</h1><p>{}</p></div>"#,
        encode_text(&context.translate("Something went wrong")),
        encode_text(&message)
    )
}

fn render_page(scope: &RenderScope<'_>, result: RetrievePageResult) -> String {
    if let Some(status) = result.status_code {
        scope.set_status(status);
    }
    if let Some(location) = result.redirect_to.filter(|l| !l.is_empty()) {
        scope.redirect(location);
        return String::new();
    }
    let Some(page) = result.page else {
        return unhandled_error(scope);
    };

    let fields = page.get("fields").cloned().unwrap_or(Value::Null);
    let field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let title = field("title");
    scope.set_metadata(PageMetadata {
        title: field("metaTitle").or_else(|| title.clone()),
        open_graph_title: field("openGraphTitle"),
        open_graph_image: field("openGraphImage"),
        open_graph_url: field("openGraphUrl"),
        meta_keywords: field("metaKeywords"),
        meta_description: field("metaDescription"),
        canonical_url: page
            .get("canonicalPath")
            .and_then(Value::as_str)
            .map(str::to_string),
    });

    let page_type = page.get("type").and_then(Value::as_str).unwrap_or("ContentPage");
    scope.style(".page{max-width:1140px;margin:0 auto;}");

    let mut html = format!(
        r#"<div class="page" data-page-type="{}">"#,
        encode_double_quoted_attribute(page_type)
    );
    if let Some(title) = &title {
        html.push_str(&format!("<h1>{}</h1>", encode_text(title)));
    }
    for widget in page.get("widgets").and_then(Value::as_array).into_iter().flatten() {
        html.push_str(&render_widget(scope, widget));
    }
    html.push_str("</div>");
    html
}

fn render_widget(scope: &RenderScope<'_>, widget: &Value) -> String {
    let widget_type = widget.get("type").and_then(Value::as_str).unwrap_or("Unknown");
    let class = widget_type.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), "-");
    scope.style(format!(".widget-{class}{{display:block;}}"));
    let text = widget
        .pointer("/fields/content")
        .or_else(|| widget.pointer("/fields/text"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    format!(
        r#"<section class="widget widget-{class}">{}</section>"#,
        encode_text(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{test_context, FakeContentApi};
    use crate::render::{ConvergenceEngine, RenderOutcome};

    fn page(value: Value) -> RetrievePageResult {
        RetrievePageResult {
            page: Some(value),
            ..RetrievePageResult::default()
        }
    }

    #[tokio::test]
    async fn context_and_page_load_in_one_batch() {
        let api = FakeContentApi::default()
            .with_context(json!({ "session": {}, "website": {}, "settings": {} }))
            .with_page(page(json!({
                "type": "HomePage",
                "fields": { "title": "Welcome", "metaDescription": "Home of shoes" },
                "widgets": [{ "type": "RichContent", "fields": { "content": "<b>Sale</b>" } }]
            })));
        let context = test_context(Arc::new(api), "/");

        let RenderOutcome::Rendered(page) =
            ConvergenceEngine::default().converge(&StorefrontApp, &context).await
        else {
            panic!("expected rendered page");
        };

        assert!(page.converged);
        assert_eq!(page.cycles, 1);
        assert!(page.html.contains("<h1>Welcome</h1>"));
        assert!(page.html.contains("&lt;b&gt;Sale&lt;/b&gt;"));
        assert!(page.style_markup.contains(".widget-richcontent"));
        let metadata = page.metadata.unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Welcome"));
        assert_eq!(metadata.meta_description.as_deref(), Some("Home of shoes"));
    }

    #[tokio::test]
    async fn seeded_page_is_not_fetched_again() {
        let api = Arc::new(FakeContentApi::default().with_context(json!({})));
        let context = test_context(api.clone(), "/Catalog");
        set_initial_page(&context.store, "/Catalog", &page(json!({ "fields": {} })));

        ConvergenceEngine::default().converge(&StorefrontApp, &context).await;

        assert_eq!(api.page_lookups.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn page_redirect_and_status_are_applied() {
        let api = FakeContentApi::default().with_context(json!({}));
        let context = test_context(Arc::new(api), "/old");
        set_initial_page(
            &context.store,
            "/old",
            &RetrievePageResult {
                page: None,
                status_code: Some(301),
                redirect_to: Some("/new".to_string()),
            },
        );

        let outcome = ConvergenceEngine::default().converge(&StorefrontApp, &context).await;

        assert_eq!(
            outcome,
            RenderOutcome::Redirect {
                location: "/new".to_string(),
                status: Some(301)
            }
        );
    }

    #[tokio::test]
    async fn missing_page_renders_unhandled_error() {
        let api = FakeContentApi::default();
        let context = test_context(Arc::new(api), "/Catalog");

        let RenderOutcome::Rendered(page) =
            ConvergenceEngine::default().converge(&StorefrontApp, &context).await
        else {
            panic!("expected rendered page");
        };

        assert!(page.html.contains("unhandled-error"));
        assert_eq!(page.status, None);
    }
}
