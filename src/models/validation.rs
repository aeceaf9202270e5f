//! Shape checks for incoming chat requests.
//!
//! Validation runs on the raw JSON value rather than through `Deserialize`
//! so that every failing field is reported at once instead of stopping at the
//! first serde error.

use serde::Serialize;
use serde_json::{ Map, Value };
use std::collections::BTreeMap;
use std::fmt;

use super::chat::{ ChatRequest, Message, Role };

/// Flattened validation failure: problems with the body as a whole, plus
/// problems keyed by top-level field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    #[serde(rename = "formErrors")]
    pub form_errors: Vec<String>,
    #[serde(rename = "fieldErrors")]
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add_form_error(message);
        errors
    }

    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn add_field_error(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(|v| v.as_slice())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            for message in messages {
                parts.push(format!("{}: {}", field, message));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, got: &Value) -> String {
    format!("Expected {}, received {}", kind, type_name(got))
}

/// Parses a raw request body and validates it. A body that is not JSON at
/// all is reported as a form error.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, ValidationErrors> {
    let value: Value = serde_json
        ::from_slice(body)
        .map_err(|_| ValidationErrors::form("Invalid JSON body"))?;
    validate_chat_request(&value)
}

pub fn validate_chat_request(value: &Value) -> Result<ChatRequest, ValidationErrors> {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(ValidationErrors::form(expected("object", other)));
        }
    };

    let mut errors = ValidationErrors::default();

    let message = match obj.get("message") {
        None => {
            errors.add_field_error("message", "Required");
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.add_field_error("message", "String must contain at least 1 character(s)");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.add_field_error("message", expected("string", other));
            None
        }
    };

    let conversation_id = match obj.get("conversationId") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.add_field_error("conversationId", expected("string", other));
            None
        }
    };

    let history = match obj.get("history") {
        None => None,
        Some(Value::Array(items)) => {
            let mut messages = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match validate_message(item) {
                    Ok(msg) => messages.push(msg),
                    Err(problems) => {
                        for problem in problems {
                            errors.add_field_error("history", format!("[{}]{}", index, problem));
                        }
                    }
                }
            }
            Some(messages)
        }
        Some(other) => {
            errors.add_field_error("history", expected("array", other));
            None
        }
    };

    match message {
        Some(message) if errors.is_empty() =>
            Ok(ChatRequest {
                message,
                conversation_id,
                history,
            }),
        _ => Err(errors),
    }
}

/// Checks one history entry. Problems are returned as path-suffixed strings
/// (`.role: ...`) so the caller can prefix the entry index.
fn validate_message(value: &Value) -> Result<Message, Vec<String>> {
    let obj: &Map<String, Value> = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(vec![format!(": {}", expected("object", other))]);
        }
    };

    let mut problems = Vec::new();

    let mut string_field = |name: &str| -> Option<String> {
        match obj.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                problems.push(format!(".{}: {}", name, expected("string", other)));
                None
            }
            None => {
                problems.push(format!(".{}: Required", name));
                None
            }
        }
    };

    let id = string_field("id");
    let content = string_field("content");

    let role = match obj.get("role") {
        Some(Value::String(s)) if s == "user" => Some(Role::User),
        Some(Value::String(s)) if s == "assistant" => Some(Role::Assistant),
        Some(Value::String(s)) => {
            problems.push(
                format!(".role: Invalid enum value. Expected 'user' | 'assistant', received '{}'", s)
            );
            None
        }
        Some(other) => {
            problems.push(
                format!(".role: Expected 'user' | 'assistant', received {}", type_name(other))
            );
            None
        }
        None => {
            problems.push(".role: Required".to_string());
            None
        }
    };

    let timestamp = match obj.get("timestamp") {
        Some(Value::Number(n)) => {
            match n.as_i64() {
                Some(ms) => Some(ms),
                None => n.as_f64().map(|ms| ms.trunc() as i64),
            }
        }
        Some(other) => {
            problems.push(format!(".timestamp: {}", expected("number", other)));
            None
        }
        None => {
            problems.push(".timestamp: Required".to_string());
            None
        }
    };

    match (id, role, content, timestamp) {
        (Some(id), Some(role), Some(content), Some(timestamp)) if problems.is_empty() =>
            Ok(Message { id, role, content, timestamp }),
        _ => Err(problems),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_request() {
        let req = validate_chat_request(&json!({ "message": "Was ist Anthroposophie?" })).unwrap();
        assert_eq!(req.message, "Was ist Anthroposophie?");
        assert!(req.conversation_id.is_none());
        assert!(req.history.is_none());
    }

    #[test]
    fn accepts_full_request_and_ignores_unknown_fields() {
        let req = validate_chat_request(
            &json!({
                "message": "Und die Waldorfschule?",
                "conversationId": "conv-1",
                "history": [
                    { "id": "1", "role": "user", "content": "Hallo", "timestamp": 1000 },
                    { "id": "2", "role": "assistant", "content": "", "timestamp": 2000.7 }
                ],
                "extra": true
            })
        ).unwrap();

        assert_eq!(req.conversation_id.as_deref(), Some("conv-1"));
        let history = req.history.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].timestamp, 2000);
    }

    #[test]
    fn empty_message_names_the_message_field() {
        let errors = validate_chat_request(&json!({ "message": "" })).unwrap_err();
        let messages = errors.field("message").unwrap();
        assert_eq!(messages, ["String must contain at least 1 character(s)"]);
        assert!(errors.form_errors.is_empty());
    }

    #[test]
    fn missing_message_is_required() {
        let errors = validate_chat_request(&json!({})).unwrap_err();
        assert_eq!(errors.field("message").unwrap(), ["Required"]);
    }

    #[test]
    fn reports_every_failing_field() {
        let errors = validate_chat_request(
            &json!({
                "message": 42,
                "conversationId": null,
                "history": [
                    { "id": "1", "role": "system", "content": "x", "timestamp": 1 },
                    "not a message",
                    { "role": "user", "content": 5, "timestamp": "yesterday" }
                ]
            })
        ).unwrap_err();

        assert_eq!(errors.field("message").unwrap(), ["Expected string, received number"]);
        assert_eq!(errors.field("conversationId").unwrap(), ["Expected string, received null"]);

        let history = errors.field("history").unwrap();
        assert!(history.iter().any(|m| m.starts_with("[0].role: Invalid enum value")));
        assert!(history.contains(&"[1]: Expected object, received string".to_string()));
        assert!(history.contains(&"[2].id: Required".to_string()));
        assert!(history.contains(&"[2].content: Expected string, received number".to_string()));
        assert!(history.contains(&"[2].timestamp: Expected number, received string".to_string()));
    }

    #[test]
    fn history_must_be_an_array() {
        let errors = validate_chat_request(
            &json!({ "message": "Hallo", "history": "none" })
        ).unwrap_err();
        assert_eq!(errors.field("history").unwrap(), ["Expected array, received string"]);
        assert!(errors.field("message").is_none());
    }

    #[test]
    fn non_object_body_is_a_form_error() {
        let errors = validate_chat_request(&json!(["message"])).unwrap_err();
        assert_eq!(errors.form_errors, ["Expected object, received array"]);
        assert!(errors.field_errors.is_empty());
    }

    #[test]
    fn invalid_json_is_a_form_error() {
        let errors = parse_chat_request(b"{ not json").unwrap_err();
        assert_eq!(errors.form_errors, ["Invalid JSON body"]);
    }

    #[test]
    fn serializes_in_flattened_shape() {
        let errors = validate_chat_request(&json!({ "message": "" })).unwrap_err();
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["formErrors"], json!([]));
        assert!(value["fieldErrors"]["message"].is_array());
    }
}
