//! Turning the webhook's response body into chat text.

use serde_json::Value;

/// Prefix placed before the list of files accepted in a turn.
pub const UPLOADED_FILES_PREFIX: &str = "**Uploaded files:** ";

/// Extract display text from a raw response body.
///
/// A JSON object shows its `output` field, else its `message` field, else
/// the whole object pretty-printed. String fields are shown verbatim, other
/// values pretty-printed. Any other JSON is pretty-printed; a body that is
/// not JSON is returned as-is.
pub fn render_response(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match &value {
        Value::Object(map) => match map.get("output").or_else(|| map.get("message")) {
            Some(field) => display_value(field),
            None => pretty(&value),
        },
        _ => pretty(&value),
    }
}

/// Final reply text: the rendered response, prefixed with the accepted file
/// names when there are any.
pub fn render_display(accepted: &[String], body: &str) -> String {
    let text = render_response(body);
    if accepted.is_empty() {
        text
    } else {
        format!("{UPLOADED_FILES_PREFIX}{}\n{text}", accepted.join(", "))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
