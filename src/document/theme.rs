//! Storefront theme: a built-in default overlaid with the backend theme.

use serde_json::{json, Map, Value};

/// Theme used when the backend has none or cannot be reached.
pub fn default_theme() -> Value {
    json!({
        "breakpoints": {
            "keys": ["xs", "sm", "md", "lg", "xl"],
            "values": [0, 576, 768, 992, 1200],
            "maxWidths": [540, 540, 720, 960, 1140]
        },
        "colors": {
            "primary": { "main": "#275E9D", "contrast": "#FFFFFF" },
            "secondary": { "main": "#4A4A4A", "contrast": "#FFFFFF" },
            "success": { "main": "#2E7D32", "contrast": "#FFFFFF" },
            "danger": { "main": "#C62828", "contrast": "#FFFFFF" },
            "warning": { "main": "#F9A825", "contrast": "#363636" },
            "info": { "main": "#0277BD", "contrast": "#FFFFFF" },
            "text": { "main": "#363636", "disabled": "#888888", "accent": "#4A4A4A", "link": "#275E9D" },
            "common": { "background": "#FFFFFF", "accent": "#F4F4F4", "border": "#CCCCCC" }
        },
        "typography": {
            "fontFamilyImportUrl": "https://fonts.googleapis.com/css?family=Open+Sans:300,400,600,700&display=swap",
            "body": { "fontFamily": "Open Sans, sans-serif", "size": 15, "lineHeight": 1.5 },
            "h1": { "size": 40, "weight": 300 },
            "h2": { "size": 32, "weight": 300 },
            "h3": { "size": 24, "weight": 600 }
        },
        "zIndex": { "menu": 1000, "modal": 1100, "popover": 1200, "tooltip": 1300 }
    })
}

/// Deep-merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base value,
/// except `null`, which leaves the base untouched.
pub fn merge_theme(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_objects(base, overlay),
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay.clone(),
    }
}

fn merge_objects(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(key) {
            Some(existing) => merge_theme(existing, value),
            None if !value.is_null() => {
                base.insert(key.clone(), value.clone());
            }
            None => {}
        }
    }
}

/// The default theme with `api_theme` merged over it.
pub fn resolve_theme(api_theme: Option<&Value>) -> Value {
    let mut theme = default_theme();
    if let Some(api_theme) = api_theme {
        merge_theme(&mut theme, api_theme);
    }
    theme
}

/// Stylesheet URL of the storefront font.
pub fn font_import_url(theme: &Value) -> Option<&str> {
    theme
        .pointer("/typography/fontFamilyImportUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_theme_overrides_nested_values_only() {
        let theme = resolve_theme(Some(&json!({
            "colors": { "primary": { "main": "#000000" } },
            "typography": { "fontFamilyImportUrl": null },
            "custom": { "flag": true }
        })));

        assert_eq!(theme.pointer("/colors/primary/main").unwrap(), "#000000");
        assert_eq!(theme.pointer("/colors/primary/contrast").unwrap(), "#FFFFFF");
        assert_eq!(theme.pointer("/custom/flag").unwrap(), true);
        assert!(font_import_url(&theme).unwrap().contains("Open+Sans"));
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let mut base = json!({ "values": [1, 2, 3] });
        merge_theme(&mut base, &json!({ "values": [9] }));
        assert_eq!(base, json!({ "values": [9] }));
    }

    #[test]
    fn missing_api_theme_is_default() {
        assert_eq!(resolve_theme(None), default_theme());
    }
}
