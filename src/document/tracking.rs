//! Google Tag Manager snippets derived from website settings.
//!
//! Settings live in the store under `context.settings`; the container is
//! used only when the tracking type is `GoogleTagManager`.

use serde_json::Value;

const TRACKING_TYPE: &str = "/websiteSettings/googleTrackingTypeComputed";
const TRACKING_ACCOUNT: &str = "/websiteSettings/googleTrackingAccountId";

fn container_id(settings: Option<&Value>) -> Option<&str> {
    let settings = settings?;
    if settings.pointer(TRACKING_TYPE).and_then(Value::as_str) != Some("GoogleTagManager") {
        return None;
    }
    settings
        .pointer(TRACKING_ACCOUNT)
        .and_then(Value::as_str)
        .map(str::trim)
        // Ids are interpolated into script text.
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

/// Inline script for the document head.
pub fn head_tracking_script(settings: Option<&Value>) -> Option<String> {
    let id = container_id(settings)?;
    Some(format!(
        "(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':new Date().getTime(),event:'gtm.js'}});\
var f=d.getElementsByTagName(s)[0],j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';\
j.async=true;j.src='https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);\
}})(window,document,'script','dataLayer','{id}');"
    ))
}

/// Markup placed inside `<noscript>` at the top of the body.
pub fn noscript_tracking_script(settings: Option<&Value>) -> Option<String> {
    let id = container_id(settings)?;
    Some(format!(
        r#"<iframe src="https://www.googletagmanager.com/ns.html?id={id}" height="0" width="0" style="display:none;visibility:hidden"></iframe>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(kind: &str, id: &str) -> Value {
        json!({
            "websiteSettings": {
                "googleTrackingTypeComputed": kind,
                "googleTrackingAccountId": id
            }
        })
    }

    #[test]
    fn tag_manager_container_yields_both_snippets() {
        let settings = settings("GoogleTagManager", "GTM-ABC123");
        assert!(head_tracking_script(Some(&settings))
            .unwrap()
            .contains("'dataLayer','GTM-ABC123'"));
        assert!(noscript_tracking_script(Some(&settings))
            .unwrap()
            .contains("ns.html?id=GTM-ABC123"));
    }

    #[test]
    fn other_tracking_types_yield_nothing() {
        let settings = settings("GoogleAnalytics", "UA-1");
        assert_eq!(head_tracking_script(Some(&settings)), None);
        assert_eq!(noscript_tracking_script(None), None);
    }

    #[test]
    fn suspicious_ids_are_rejected() {
        let settings = settings("GoogleTagManager", "GTM-1');alert(1);//");
        assert_eq!(head_tracking_script(Some(&settings)), None);
    }
}
