//! Cookie/session bridge subsystem.
//!
//! # Data Flow
//! ```text
//! browser Cookie header
//!     → cookies.rs (decode into request cookies)
//!     → bridge.rs (classify entry: shell / storefront / storefront-in-shell)
//!     → bridge.rs (page-by-URL lookup, merge backend Set-Cookie)
//!     → SessionCookieSet (encoded, used for every backend call of the request)
//!     → ResponseCookie list (re-emitted to the browser, encoded)
//! ```
//!
//! # Design Decisions
//! - Values are encoded exactly once on the way out, decoded once on the way in
//! - A failed page lookup never fails the request; the session falls back to
//!   the request's own cookies
//! - The session set is frozen before rendering starts

pub mod bridge;
pub mod cookies;

pub use bridge::{
    classify_entry, shell_cookies, BridgeOutcome, ContentMode, EntryContext, SessionBridge,
    CONTENT_MODE_COOKIE, IS_SITE_IN_SHELL_COOKIE, LANGUAGE_COOKIE,
};
pub use cookies::{decode_cookie, encode_cookie, parse_cookie_header, ResponseCookie, SessionCookieSet};
