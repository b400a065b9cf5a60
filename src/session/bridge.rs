//! Translates browser cookies to and from the backend session.

use crate::backend::{ApiSession, ContentApi, RetrievePageResult};
use crate::http::request::IncomingRequest;
use crate::render::ShellContext;
use crate::session::cookies::{ResponseCookie, SessionCookieSet};

/// Cookie holding the shell content mode.
pub const CONTENT_MODE_COOKIE: &str = "ContentMode";
/// Cookie flagging a storefront opened inside the administration shell.
pub const IS_SITE_IN_SHELL_COOKIE: &str = "IsSiteInShell";
/// Cookie holding the visitor's language code.
pub const LANGUAGE_COOKIE: &str = "SetContextLanguageCode";

const SHELL_PREFIX: &str = "/contentadmin";

/// Content mode of a storefront page viewed through the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    Viewing,
    Editing,
}

impl ContentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentMode::Viewing => "Viewing",
            ContentMode::Editing => "Editing",
        }
    }
}

/// How a request entered the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryContext {
    /// The content administration shell itself.
    Shell,
    /// A storefront page, possibly framed by the shell.
    Storefront { in_shell: bool },
}

impl EntryContext {
    pub fn is_shell(self) -> bool {
        matches!(self, EntryContext::Shell)
    }
}

/// Decide whether a request is for the shell, the storefront, or the
/// storefront embedded in the shell.
pub fn classify_entry(request: &IncomingRequest) -> EntryContext {
    if request.path.to_lowercase().starts_with(SHELL_PREFIX) {
        return EntryContext::Shell;
    }

    let from_shell_referer = request
        .header("referer")
        .and_then(|referer| referer.to_lowercase().find(SHELL_PREFIX))
        .is_some_and(|index| index > 0);
    let flagged = request.cookie(IS_SITE_IN_SHELL_COOKIE) == Some("true");

    EntryContext::Storefront {
        in_shell: from_shell_referer || flagged,
    }
}

/// Shell flags for the tree and the cookies that keep them on later requests.
pub fn shell_cookies(
    request: &IncomingRequest,
    entry: EntryContext,
) -> (ShellContext, Vec<ResponseCookie>) {
    let mut cookies = Vec::new();
    let mut shell = ShellContext {
        is_current_page: true,
        ..ShellContext::default()
    };

    if let EntryContext::Storefront { in_shell: true } = entry {
        shell.is_in_shell = true;
        match request.cookie(CONTENT_MODE_COOKIE) {
            None => cookies.push(ResponseCookie::new(
                CONTENT_MODE_COOKIE,
                ContentMode::Viewing.as_str(),
            )),
            Some(mode) => shell.is_editing = mode == ContentMode::Editing.as_str(),
        }
        cookies.push(ResponseCookie::new(IS_SITE_IN_SHELL_COOKIE, "true"));
    }

    (shell, cookies)
}

/// What the bridge learned from the page lookup.
#[derive(Debug, Clone, Default)]
pub struct BridgeOutcome {
    /// `None` when the lookup failed.
    pub page: Option<RetrievePageResult>,
    /// Session to use for every later backend call of this request.
    pub session: SessionCookieSet,
    /// Backend-issued cookies to re-emit to the browser.
    pub response_cookies: Vec<ResponseCookie>,
}

impl BridgeOutcome {
    /// Value of a cookie the backend issued during the lookup.
    pub fn issued(&self, name: &str) -> Option<&str> {
        self.response_cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }
}

/// Performs the page-by-URL lookup and merges the backend's cookies into the session.
pub struct SessionBridge<'a> {
    api: &'a dyn ContentApi,
}

impl<'a> SessionBridge<'a> {
    pub fn new(api: &'a dyn ContentApi) -> Self {
        Self { api }
    }

    /// `session` carries the forwarded headers and the request's own cookies.
    pub async fn load_page(&self, request: &IncomingRequest, session: &ApiSession) -> BridgeOutcome {
        let url = request.original_url.as_str();
        let bypass_filters = url.starts_with("/Content/Page/");
        let mut cookies = session.cookies.clone();

        let response = match self.api.page_by_url(url, bypass_filters, session).await {
            Ok(response) => response,
            Err(e) => {
                // The render path surfaces the missing page as an error page.
                tracing::error!(url = %url, error = %e, "Page lookup failed");
                return BridgeOutcome {
                    page: None,
                    session: cookies,
                    response_cookies: Vec::new(),
                };
            }
        };

        let mut response_cookies = Vec::with_capacity(response.set_cookies.len());
        for header in &response.set_cookies {
            match ResponseCookie::parse_set_cookie(header) {
                Some(cookie) => {
                    cookies.insert(cookie.name.clone(), &cookie.value);
                    response_cookies.push(cookie);
                }
                None => tracing::warn!(url = %url, header = %header, "Ignoring malformed Set-Cookie from backend"),
            }
        }

        BridgeOutcome {
            page: Some(response.result),
            session: cookies,
            response_cookies,
        }
    }
}
