//! Reply parsing — turns an assistant message into the next action.
//!
//! The endpoint gets no native tool schema, so the model writes tool calls as
//! a JSON object in its reply:
//!
//! ```text
//! Action:
//! {"name": "multiply_two_numbers", "arguments": {"num1": 6, "num2": 7}}
//! ```
//!
//! An `Action:` marker followed by `{` is always an attempted call. A fenced
//! ```` ```json ```` block or a reply that is itself a JSON object counts only
//! when it names a tool (`"name"` or `"tool"`). Any other reply, JSON data
//! included, is a plain-text final answer.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::tools::ToolArgs;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\n?(.*?)```").expect("valid regex")
});
static CALL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:name|tool)"\s*:"#).expect("valid regex"));

/// Keys that name the tool being called.
const CALL_KEYS: [&str; 2] = ["name", "tool"];

/// What the model asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Invoke a registered tool.
    Call { name: String, arguments: ToolArgs },
    /// The reply carried no tool call; its text is the answer, verbatim.
    Answer(String),
}

/// The reply tried to call a tool but the call could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse tool call: {0}")]
pub struct MalformedAction(pub String);

/// Parse one assistant reply.
pub fn parse_action(reply: &str) -> Result<Action, MalformedAction> {
    if let Some(candidate) = marked_object(reply) {
        return decode_call(candidate);
    }

    let candidates = [fenced_object(reply), bare_object(reply)];
    match candidates.into_iter().flatten().find(|c| looks_like_call(c)) {
        Some(candidate) => decode_call(candidate),
        None => Ok(Action::Answer(reply.to_string())),
    }
}

/// The object after an `Action:` marker. The marker only counts when a `{`
/// follows it; `Action:` in ordinary prose is ignored.
fn marked_object(reply: &str) -> Option<&str> {
    let (_, rest) = reply.split_once("Action:")?;
    rest.trim_start()
        .starts_with('{')
        .then(|| outermost_object(rest))
}

/// The body of the first fenced block, if it is JSON-object shaped.
fn fenced_object(reply: &str) -> Option<&str> {
    let body = FENCED_BLOCK.captures(reply)?.get(1)?.as_str().trim();
    body.starts_with('{').then_some(body)
}

/// The whole reply, if it is a single `{...}`.
fn bare_object(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
}

/// A JSON object with a `name`/`tool` key, or unparseable text that still
/// names one. Other JSON (an inventory dump, say) is plain answer text.
fn looks_like_call(candidate: &str) -> bool {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(obj)) => CALL_KEYS.iter().any(|key| obj.contains_key(*key)),
        Ok(_) => false,
        Err(_) => CALL_KEY.is_match(candidate),
    }
}

/// Slice from the first `{` to the last `}`, or the trimmed input if there is none.
fn outermost_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

fn decode_call(candidate: &str) -> Result<Action, MalformedAction> {
    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| MalformedAction(format!("invalid JSON ({e})")))?;
    let Value::Object(mut obj) = value else {
        return Err(MalformedAction("expected a JSON object".into()));
    };

    let name = CALL_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| MalformedAction("missing string field \"name\"".into()))?;

    let arguments = match obj.remove("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        // OpenAI-style: arguments as a JSON-encoded string.
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(MalformedAction(
                    "\"arguments\" string is not a JSON object".into(),
                ))
            }
        },
        Some(_) => return Err(MalformedAction("\"arguments\" must be an object".into())),
    };

    Ok(Action::Call {
        name,
        arguments: arguments.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: Value) -> Action {
        Action::Call {
            name: name.into(),
            arguments: serde_json::from_value(args).unwrap(),
        }
    }

    #[test]
    fn test_plain_text_is_answer_verbatim() {
        let reply = "  You have 3 apples and 1 orange.\n";
        assert_eq!(parse_action(reply).unwrap(), Action::Answer(reply.into()));
    }

    #[test]
    fn test_braces_in_prose_are_not_a_call() {
        let reply = "The set {1, 2} has two elements.";
        assert_eq!(parse_action(reply).unwrap(), Action::Answer(reply.into()));
    }

    #[test]
    fn test_action_marker() {
        let reply = "Thought: I need the product.\nAction:\n{\"name\": \"multiply_two_numbers\", \"arguments\": {\"num1\": 6, \"num2\": 7}}";
        assert_eq!(
            parse_action(reply).unwrap(),
            call("multiply_two_numbers", json!({"num1": 6, "num2": 7}))
        );
    }

    #[test]
    fn test_fenced_block() {
        let reply = "Let me check.\n```json\n{\"name\": \"fetch_inventory\"}\n```";
        assert_eq!(parse_action(reply).unwrap(), call("fetch_inventory", json!({})));
    }

    #[test]
    fn test_bare_object_with_tool_alias() {
        let reply = r#"{"tool": "final_answer", "arguments": {"answer": "42"}}"#;
        assert_eq!(parse_action(reply).unwrap(), call("final_answer", json!({"answer": "42"})));
    }

    #[test]
    fn test_string_encoded_arguments() {
        let reply = r#"Action: {"name": "get_current_time_in_timezone", "arguments": "{\"timezone\": \"Asia/Tokyo\"}"}"#;
        assert_eq!(
            parse_action(reply).unwrap(),
            call("get_current_time_in_timezone", json!({"timezone": "Asia/Tokyo"}))
        );
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_action("Action: {\"name\": \"multiply_two_numbers\", ").unwrap_err();
        assert!(err.to_string().starts_with("could not parse tool call"));
    }

    #[test]
    fn test_non_string_name() {
        let err = parse_action(r#"{"name": 5, "arguments": {}}"#).unwrap_err();
        assert!(err.0.contains("name"));
    }

    #[test]
    fn test_truncated_fenced_call_is_malformed() {
        let reply = "```json\n{\"name\": \"fetch_inventory\", \"arguments\": \n```";
        assert!(parse_action(reply).is_err());
    }

    #[test]
    fn test_json_data_without_tool_name_is_answer() {
        for reply in [
            r#"{"apple": 3, "orange": 1}"#,
            "Here is your inventory:\n```json\n{\"apple\": 3, \"orange\": 1}\n```",
            r#"{"arguments": {"x": 1}}"#,
        ] {
            assert_eq!(parse_action(reply).unwrap(), Action::Answer(reply.into()));
        }
    }

    #[test]
    fn test_action_word_in_prose_is_answer() {
        let reply = "Next Action: none needed. You have 3 apples.";
        assert_eq!(parse_action(reply).unwrap(), Action::Answer(reply.into()));
    }

    #[test]
    fn test_non_object_arguments() {
        assert!(parse_action(r#"{"name": "fetch_inventory", "arguments": [1, 2]}"#).is_err());
    }

    #[test]
    fn test_fenced_non_json_block_is_answer() {
        let reply = "Here is code:\n```\nfn main() {}\n```";
        assert_eq!(parse_action(reply).unwrap(), Action::Answer(reply.into()));
    }
}
