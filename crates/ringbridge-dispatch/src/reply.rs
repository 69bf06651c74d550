//! Handler return values.

use std::fmt;

use serde_json::Value;

use crate::accessors::Headers;
use crate::producer::BodyProducer;

/// What a handler hands back.
///
/// Every variant except [`Reply::Other`] produces a response; `Other`
/// tells the dispatcher the handler has already dealt with the response
/// itself (or returned something meaningless).
#[derive(Debug)]
pub enum Reply {
    Text(String),
    Map(ReplyMap),
    Structured(StructuredResponse),
    Producer(BodyProducer),
    Other(Unrecognized),
}

impl Reply {
    /// A reply that leaves the response untouched. `what` describes the
    /// value for logs and strict-mode errors.
    pub fn other(what: impl Into<String>) -> Self {
        Reply::Other(Unrecognized(what.into()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Text(_) => "text",
            Reply::Map(_) => "map",
            Reply::Structured(_) => "structured",
            Reply::Producer(_) => "producer",
            Reply::Other(_) => "other",
        }
    }
}

/// Plain attribute mapping. Absent fields leave response defaults alone.
#[derive(Debug, Default)]
pub struct ReplyMap {
    pub status: Option<u16>,
    pub headers: Option<Headers>,
    pub body: Option<BodyProducer>,
}

impl ReplyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add one value to header `name`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn body(mut self, body: impl Into<BodyProducer>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Typed response value: status and headers are always present.
#[derive(Debug)]
pub struct StructuredResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: BodyProducer,
}

impl StructuredResponse {
    pub fn new(status: u16, headers: Headers, body: impl Into<BodyProducer>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Description of a value that does not produce a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrecognized(pub String);

impl fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<ReplyMap> for Reply {
    fn from(map: ReplyMap) -> Self {
        Reply::Map(map)
    }
}

impl From<StructuredResponse> for Reply {
    fn from(response: StructuredResponse) -> Self {
        Reply::Structured(response)
    }
}

impl From<BodyProducer> for Reply {
    fn from(producer: BodyProducer) -> Self {
        Reply::Producer(producer)
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::other(format!("boolean {value}"))
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::other("unit")
    }
}

/// JSON values: a string is a text reply, an object is read as a reply
/// map, anything else does not produce a response.
///
/// In an object, `status` must be an integer in `100..=999`, `headers` an
/// object whose values are scalars or arrays of scalars, and `body` a
/// string, `null`, or any other JSON value (sent as JSON text).
impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Reply::Text(text),
            Value::Object(mut object) => {
                let mut map = ReplyMap::new();
                if let Some(status) = object.remove("status") {
                    match status.as_u64().filter(|s| (100..=999).contains(s)) {
                        Some(status) => map.status = Some(status as u16),
                        None => return Reply::other(format!("object with status {status}")),
                    }
                }
                if let Some(headers) = object.remove("headers") {
                    match json_headers(headers) {
                        Some(headers) => map.headers = Some(headers),
                        None => return Reply::other("object with malformed headers"),
                    }
                }
                map.body = match object.remove("body") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(text)) => Some(BodyProducer::Text(text)),
                    Some(other) => Some(BodyProducer::Text(other.to_string())),
                };
                Reply::Map(map)
            }
            Value::Null => Reply::other("null"),
            Value::Bool(b) => Reply::from(b),
            Value::Number(n) => Reply::other(format!("number {n}")),
            Value::Array(_) => Reply::other("array"),
        }
    }
}

fn json_headers(value: Value) -> Option<Headers> {
    let Value::Object(object) = value else {
        return None;
    };
    object
        .into_iter()
        .map(|(name, value)| {
            let values = match value {
                Value::Array(items) => items.into_iter().map(json_scalar).collect::<Option<_>>()?,
                scalar => vec![json_scalar(scalar)?],
            };
            Some((name, values))
        })
        .collect()
}

fn json_scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
