//! Tolerant extraction of display messages from backend error bodies.
//!
//! The backend reports errors in three shapes: a plain string, a structured
//! object, or a validation-style array of `{ "msg": ... }` entries.

use serde_json::Value;

/// Extracts a human-readable message from an error value.
///
/// - string → returned as-is
/// - array → each entry's `msg` field (or the entry serialized), joined with `", "`
/// - anything else → serialized to text
pub fn extract_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => entry.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Extracts a display message from a raw HTTP error body.
///
/// Looks for the conventional wrapper keys (`detail`, `error`, `message`)
/// before falling back to the whole document; non-JSON bodies are returned
/// verbatim.
pub fn message_from_body(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    for key in ["detail", "error", "message"] {
        if let Some(inner) = value.get(key) {
            return extract_message(inner);
        }
    }
    extract_message(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string() {
        assert_eq!(extract_message(&json!("boom")), "boom");
    }

    #[test]
    fn validation_array_joins_msgs() {
        let value = json!([{"msg": "name required"}, {"msg": "size invalid"}]);
        assert_eq!(extract_message(&value), "name required, size invalid");
    }

    #[test]
    fn array_entry_without_msg_is_serialized() {
        let value = json!([{"msg": "a"}, {"code": 42}]);
        assert_eq!(extract_message(&value), r#"a, {"code":42}"#);
    }

    #[test]
    fn object_is_serialized() {
        let value = json!({"code": 500, "reason": "assembly failed"});
        let msg = extract_message(&value);
        assert!(msg.contains("assembly failed"));
    }

    #[test]
    fn body_with_detail_key() {
        let body = r#"{"detail":[{"msg":"siteId is required"}]}"#;
        assert_eq!(message_from_body(body), "siteId is required");
    }

    #[test]
    fn body_with_error_string() {
        assert_eq!(message_from_body(r#"{"error":"not found"}"#), "not found");
    }

    #[test]
    fn body_with_message_key() {
        assert_eq!(
            message_from_body(r#"{"message":"upstream timeout"}"#),
            "upstream timeout"
        );
    }

    #[test]
    fn non_json_body_returned_verbatim() {
        assert_eq!(message_from_body("502 Bad Gateway"), "502 Bad Gateway");
    }
}
