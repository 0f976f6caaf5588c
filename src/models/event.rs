use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CHAT_CONTENT: &str = "chat.content";
pub const PAIR_CREATED: &str = "pair.created";
pub const IMAGE_PARTIAL: &str = "image.partial";
pub const IMAGE_COMPLETED: &str = "image.completed";
pub const TOOL_CALLS: &str = "tool.calls";
pub const ERROR: &str = "error";

/// Server-pushed notification, one per SSE frame
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Text delta to append to the running answer
    ChatContent(String),
    /// Backend-allocated id for this prompt/response pair
    PairCreated(String),
    /// Progressive image tile for generation slot `index`
    ImagePartial { index: f64, b64: String },
    /// Final image URL
    ImageCompleted(String),
    /// Tool invocations, passed through without per-element validation
    ToolCalls(Vec<Value>),
    /// Terminal stream error
    Error(String),
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::ChatContent(_) => CHAT_CONTENT,
            StreamEvent::PairCreated(_) => PAIR_CREATED,
            StreamEvent::ImagePartial { .. } => IMAGE_PARTIAL,
            StreamEvent::ImageCompleted(_) => IMAGE_COMPLETED,
            StreamEvent::ToolCalls(_) => TOOL_CALLS,
            StreamEvent::Error(_) => ERROR,
        }
    }

    pub fn is_known(event: &str) -> bool {
        matches!(
            event,
            CHAT_CONTENT | PAIR_CREATED | IMAGE_PARTIAL | IMAGE_COMPLETED | TOOL_CALLS | ERROR
        )
    }
}

/// Result of classifying one SSE frame
#[derive(Debug)]
pub enum Decoded {
    Event(StreamEvent),
    /// Known event whose payload did not carry a usable value
    Rejected(&'static str),
    Unknown(String),
    Malformed(serde_json::Error),
}

/// Classify a frame by event name and coerce its JSON payload.
///
/// Coercion is lenient: missing fields default to empty strings, and only
/// the per-event acceptance checks (non-empty id/url/b64, non-NaN index,
/// non-empty tool array) can reject a frame.
pub fn decode(event: &str, data: &str) -> Decoded {
    if !StreamEvent::is_known(event) {
        return Decoded::Unknown(event.to_string());
    }

    let payload: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Decoded::Malformed(e),
    };

    match event {
        CHAT_CONTENT => Decoded::Event(StreamEvent::ChatContent(coerce_string(
            payload.get("data"),
        ))),
        PAIR_CREATED => {
            let id = coerce_string(payload.get("id"));
            if id.is_empty() {
                Decoded::Rejected("empty pair id")
            } else {
                Decoded::Event(StreamEvent::PairCreated(id))
            }
        }
        IMAGE_PARTIAL => {
            let inner = payload.get("data");
            let index = coerce_number(inner.and_then(|d| d.get("index")));
            let b64 = coerce_string(inner.and_then(|d| d.get("b64")));
            if index.is_nan() {
                Decoded::Rejected("image index is not a number")
            } else if b64.is_empty() {
                Decoded::Rejected("empty image data")
            } else {
                Decoded::Event(StreamEvent::ImagePartial { index, b64 })
            }
        }
        IMAGE_COMPLETED => {
            let url = coerce_string(payload.get("data").and_then(|d| d.get("url")));
            if url.is_empty() {
                Decoded::Rejected("empty image url")
            } else {
                Decoded::Event(StreamEvent::ImageCompleted(url))
            }
        }
        TOOL_CALLS => match payload.get("data") {
            Some(Value::Array(calls)) if !calls.is_empty() => {
                Decoded::Event(StreamEvent::ToolCalls(calls.clone()))
            }
            _ => Decoded::Rejected("no tool calls"),
        },
        _ => {
            let message = coerce_string(payload.get("message"));
            if message.is_empty() {
                Decoded::Event(StreamEvent::Error(data.to_string()))
            } else {
                Decoded::Event(StreamEvent::Error(message))
            }
        }
    }
}

/// Loose string conversion; `null` and missing fields become `""`
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Loose numeric conversion that yields NaN where no number can be read.
///
/// `null` is 0, numeric strings are parsed after trimming, a blank string is
/// 0 and booleans are 0/1. Arrays and objects are NaN.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_numeric_str(s),
        Some(_) => f64::NAN,
    }
}

fn parse_numeric_str(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // reject Rust-only spellings like "inf" and "nan"
        t if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        t => t.parse().unwrap_or(f64::NAN),
    }
}

/// Typed view of one backend tool invocation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolCallInfo {
    pub id: String,
    pub name: String,
    pub args: Map<String, Value>,
}

impl ToolCallInfo {
    /// Lenient conversion from a raw `tool.calls` element; missing fields default to empty.
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: coerce_string(value.get("id")),
            name: coerce_string(value.get("name")),
            args: value
                .get("args")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
