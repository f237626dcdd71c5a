//! Operand coercion for filter values.
//!
//! Values arrive as text from query strings and stored widget
//! configurations. Integers and single-decimal-point numbers become numeric
//! operands; everything else, including dotted version strings such as
//! `1.2.3`, stays text.

use regex::Regex;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("valid integer regex"));
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid float regex")
});

/// A coerced operand. Every variant keeps the raw text it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64, String),
    Float(f64, String),
    Text(String),
}

impl Scalar {
    pub fn raw(&self) -> &str {
        match self {
            Scalar::Int(_, raw) | Scalar::Float(_, raw) | Scalar::Text(raw) => raw,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scalar::Text(_))
    }
}

/// Coerces a raw operand to an integer, a float, or leaves it as text.
pub fn coerce(raw: &str) -> Scalar {
    if INTEGER_RE.is_match(raw) {
        if let Ok(n) = raw.parse::<i64>() {
            return Scalar::Int(n, raw.to_string());
        }
    }
    // the grammar admits at most one '.', so "1.2.3" never gets here
    if FLOAT_RE.is_match(raw) {
        if let Ok(f) = raw.parse::<f64>() {
            return Scalar::Float(f, raw.to_string());
        }
    }
    Scalar::Text(raw.to_string())
}

/// Lenient boolean used by the exists operator: `yes`, `true`, `1`, `Y`...
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.chars().next().map(|c| c.to_ascii_lowercase()),
        Some('y' | 't' | '1')
    )
}
