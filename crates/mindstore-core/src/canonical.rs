//! Canonical textual rendering of a document, used only for size accounting.
//!
//! Deterministic XML-like output: object keys are emitted sorted, arrays as
//! repeated `<item>` elements. The measured size is the char count of the
//! trimmed rendering.

use serde_json::Value;

/// Render `value` as canonical text under `root_label`.
pub fn to_canonical_text(value: &Value, root_label: &str) -> String {
    let mut out = String::new();
    render(root_label, value, &mut out);
    out
}

/// Char length of the trimmed canonical rendering.
pub fn document_size(value: &Value, root_label: &str) -> usize {
    to_canonical_text(value, root_label).trim().chars().count()
}

fn render(label: &str, value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push_str(&format!("<{label}>"));
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                render(key, &map[key.as_str()], out);
            }
            out.push_str(&format!("</{label}>"));
        }
        Value::Array(items) => {
            out.push_str(&format!("<{label}>"));
            for item in items {
                render("item", item, out);
            }
            out.push_str(&format!("</{label}>"));
        }
        Value::Null => out.push_str(&format!("<{label}/>")),
        Value::String(s) => out.push_str(&format!("<{label}>{s}</{label}>")),
        other => out.push_str(&format!("<{label}>{other}</{label}>")),
    }
}
