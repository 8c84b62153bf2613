use serde_json::Value;

/// HTTP methods the dispatcher issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

impl RequestMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the response body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Parse the body as JSON
    #[default]
    Structured,
    /// Return the body text untouched
    Text,
}

impl ResponseMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" | "structured" => Some(Self::Structured),
            "text" | "raw" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Text => "text",
        }
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Structured(Value),
    Text(String),
    /// Structured mode and the server sent nothing to parse
    Empty,
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Collapse into a JSON value; text becomes a JSON string, empty becomes null
    pub fn into_json(self) -> Value {
        match self {
            Self::Structured(v) => v,
            Self::Text(s) => Value::String(s),
            Self::Empty => Value::Null,
        }
    }
}
