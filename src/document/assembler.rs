//! Final HTML document around a rendered fragment.
//!
//! Storefront documents carry the hydration payload, localization
//! dictionaries, tracking snippets and the public bundle. Shell documents
//! carry the shell font, the rich content editor and the shell bundle, and a
//! fixed title.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use serde_json::Value;

use crate::config::AssetConfig;
use crate::render::{Dictionary, PageMetadata};

pub const SHELL_TITLE: &str = "Content Administration";

/// Which document flavor to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMode {
    Storefront,
    Shell,
}

/// Everything the document needs besides the rendered fragment.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub mode: DocumentMode,
    pub language_code: Option<String>,
    pub metadata: Option<PageMetadata>,
    pub favicon: Option<String>,
    /// `<style>` markup extracted from the final render pass.
    pub style_markup: String,
    pub theme: Value,
    /// Serialized store; `None` when the page was not rendered on the server.
    pub hydration_state: Option<Value>,
    pub site_messages: Dictionary,
    pub translations: Dictionary,
    pub head_tracking_script: Option<String>,
    pub noscript_tracking: Option<String>,
    pub assets: AssetConfig,
}

impl DocumentModel {
    pub fn new(mode: DocumentMode, theme: Value, assets: AssetConfig) -> Self {
        Self {
            mode,
            language_code: None,
            metadata: None,
            favicon: None,
            style_markup: String::new(),
            theme,
            hydration_state: None,
            site_messages: Dictionary::new(),
            translations: Dictionary::new(),
            head_tracking_script: None,
            noscript_tracking: None,
            assets,
        }
    }

    fn is_shell(&self) -> bool {
        self.mode == DocumentMode::Shell
    }
}

/// Serialize `value` for an inline script, escaping `</`.
pub fn escape_script_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Maps and `Value`s always serialize; fall back to null regardless.
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn attr(value: &str) -> std::borrow::Cow<'_, str> {
    encode_double_quoted_attribute(value)
}

/// Build the complete HTML document.
pub fn assemble(fragment: &str, model: &DocumentModel) -> String {
    let mut html = String::with_capacity(fragment.len() + 4096);
    let metadata = model.metadata.clone().unwrap_or_default();
    let shell = model.is_shell();

    html.push_str("<!DOCTYPE html>");
    match &model.language_code {
        Some(lang) => {
            let _ = write!(html, r#"<html lang="{}">"#, attr(lang));
        }
        None => html.push_str("<html>"),
    }
    html.push_str("<head>");

    if let Some(script) = model.head_tracking_script.as_deref().filter(|_| !shell) {
        let _ = write!(html, "<script>{}</script>", script.replace("</", "<\\/"));
    }
    html.push_str(r#"<meta charset="utf-8"/>"#);
    html.push_str(
        r#"<meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no"/>"#,
    );
    let title = if shell {
        SHELL_TITLE
    } else {
        metadata.title.as_deref().unwrap_or_default()
    };
    let _ = write!(html, "<title>{}</title>", encode_text(title));
    if let Some(favicon) = &model.favicon {
        let _ = write!(
            html,
            r#"<link rel="icon" href="{}" type="image/x-icon"/>"#,
            attr(favicon)
        );
    }
    html.push_str(r#"<meta property="og:type" content="website"/>"#);
    push_meta(&mut html, r#"id="ogTitle" property="og:title""#, &metadata.open_graph_title);
    push_meta(&mut html, r#"id="ogImage" property="og:image""#, &metadata.open_graph_image);
    push_meta(&mut html, r#"id="ogUrl" property="og:url""#, &metadata.open_graph_url);
    push_meta(&mut html, r#"name="keywords""#, &metadata.meta_keywords);
    push_meta(&mut html, r#"name="description""#, &metadata.meta_description);
    if let Some(canonical) = &metadata.canonical_url {
        let _ = write!(html, r#"<link rel="canonical" href="{}"/>"#, attr(canonical));
    }
    html.push_str(r#"<base href="/"/>"#);
    if shell {
        let _ = write!(
            html,
            r#"<link href="{}" rel="stylesheet"/>"#,
            attr(&model.assets.shell_font_url)
        );
    }
    if let Some(font) = super::theme::font_import_url(&model.theme) {
        let _ = write!(html, r#"<link href="{}" rel="stylesheet"/>"#, attr(font));
    }
    html.push_str(&model.style_markup);
    html.push_str("</head><body>");

    if let Some(noscript) = model.noscript_tracking.as_deref().filter(|_| !shell) {
        let _ = write!(html, "<noscript>{noscript}</noscript>");
    }
    let _ = write!(html, r#"<div id="react-app">{fragment}</div>"#);

    if !shell {
        let _ = write!(
            html,
            "<script>var siteMessages = {};\nvar translationDictionaries = {};</script>",
            escape_script_json(&model.site_messages),
            escape_script_json(&model.translations),
        );
        if let Some(state) = &model.hydration_state {
            let _ = write!(
                html,
                "<script>var initialReduxState = {}</script>",
                escape_script_json(state)
            );
        }
    }
    let _ = write!(
        html,
        "<script>var initialTheme = {}</script>",
        escape_script_json(&model.theme)
    );
    let bundle = if shell { "shell" } else { "public" };
    let _ = write!(
        html,
        r#"<script async defer src="/dist/{bundle}.js?v={}"></script>"#,
        attr(&model.assets.bundle_version)
    );
    if let Some(script) = &model.assets.payment_iframe_script {
        let _ = write!(html, r#"<script src="{}"></script>"#, attr(script));
    }
    if shell {
        let _ = write!(
            html,
            r#"<script src="{}"></script>"#,
            attr(&model.assets.content_editor_script)
        );
    }
    html.push_str("</body></html>");
    html
}

fn push_meta(html: &mut String, key: &str, content: &Option<String>) {
    match content {
        Some(content) => {
            let _ = write!(html, r#"<meta {key} content="{}"/>"#, attr(content));
        }
        None => {
            let _ = write!(html, "<meta {key}/>");
        }
    }
}
