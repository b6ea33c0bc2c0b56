//! Line-oriented reader for a restricted configuration dialect.
//!
//! The dialect covers top-level `NAME = VALUE` assignments with scalar
//! values, plus bracketed list and mapping literals that may span lines.
//! Compound literals are massaged textually into JSON and handed to
//! serde_json; no general-purpose evaluation happens anywhere.
//!
//! Out of scope: arithmetic, function calls, comprehensions, imports,
//! multi-line strings outside brackets, escape sequences beyond JSON's,
//! and comments sharing a line with an assignment.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Characters a variable name must not contain.
const FORBIDDEN_NAME_CHARS: &[char] = &[' ', '.', '+', '-', '=', '*', '/'];

/// Parse failures. Never swallowed; the caller decides how to surface them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Assignment target is empty or contains a forbidden character.
    #[error("invalid variable {0:?}")]
    InvalidVariable(String),

    /// Line is neither blank, a comment, nor an assignment.
    #[error("not an assignment: {0:?}")]
    NotAssignment(String),

    /// Right-hand side outside the supported value grammar.
    #[error("cannot parse value {value:?} for {name:?}")]
    UnsupportedValue { name: String, value: String },

    /// Compound literal that did not survive the JSON bridge.
    #[error("invalid or too complex literal for {0:?}")]
    TooComplex(String),

    /// Input ended inside an open compound literal.
    #[error("unterminated literal for {name:?}, expected {delimiter:?}")]
    Unterminated { name: String, delimiter: char },
}

/// One in-flight compound literal. Holding the buffer, delimiter and target
/// name together keeps the continuation invariants structural: a buffer can
/// only exist with its delimiter and name, and all three clear together.
#[derive(Debug)]
struct OpenLiteral {
    name: String,
    delimiter: char,
    buffer: Vec<String>,
}

/// Parser for one logical document.
#[derive(Debug, Default)]
pub struct Parser {
    open: Option<OpenLiteral>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document into a name → value mapping.
    ///
    /// Later bindings of a name replace earlier ones.
    pub fn parse(&mut self, text: &str) -> Result<BTreeMap<String, Value>, ParseError> {
        self.open = None;
        let mut values = BTreeMap::new();
        for line in text.lines() {
            self.feed(line, &mut values)?;
        }
        if let Some(open) = self.open.take() {
            return Err(ParseError::Unterminated {
                name: open.name,
                delimiter: open.delimiter,
            });
        }
        Ok(values)
    }

    fn feed(&mut self, line: &str, values: &mut BTreeMap<String, Value>) -> Result<(), ParseError> {
        if let Some(open) = self.open.as_mut() {
            open.buffer.push(line.to_string());
            return self.complete_if_closed(line, values);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let Some((lhs, rhs)) = trimmed.split_once('=') else {
            return Err(ParseError::NotAssignment(trimmed.to_string()));
        };
        let name = lhs.trim();
        let rhs = rhs.trim();
        if name.is_empty() || name.contains(FORBIDDEN_NAME_CHARS) {
            return Err(ParseError::InvalidVariable(name.to_string()));
        }

        match rhs.as_bytes().first() {
            Some(b'[') => self.open_literal(name, ']', rhs),
            Some(b'{') => self.open_literal(name, '}', rhs),
            _ => {
                values.insert(name.to_string(), scalar(name, rhs)?);
                return Ok(());
            }
        }
        self.complete_if_closed(rhs, values)
    }

    fn open_literal(&mut self, name: &str, delimiter: char, rhs: &str) {
        self.open = Some(OpenLiteral {
            name: name.to_string(),
            delimiter,
            buffer: vec![rhs.to_string()],
        });
    }

    /// Finalize the open literal when the line's trailing non-whitespace is
    /// the expected delimiter.
    fn complete_if_closed(
        &mut self,
        line: &str,
        values: &mut BTreeMap<String, Value>,
    ) -> Result<(), ParseError> {
        let closed = self
            .open
            .as_ref()
            .is_some_and(|open| line.trim_end().ends_with(open.delimiter));
        if closed {
            let OpenLiteral { name, buffer, .. } = self.open.take().expect("literal is open");
            let value = finalize(&name, &buffer)?;
            values.insert(name, value);
        }
        Ok(())
    }
}

/// Evaluate a scalar right-hand side, trying the forms in fixed order.
fn scalar(name: &str, rhs: &str) -> Result<Value, ParseError> {
    match rhs {
        "True" => return Ok(Value::Bool(true)),
        "False" => return Ok(Value::Bool(false)),
        "None" => return Ok(Value::Null),
        "true" | "false" | "null" => {
            return serde_json::from_str(rhs).map_err(|_| ParseError::UnsupportedValue {
                name: name.to_string(),
                value: rhs.to_string(),
            })
        }
        _ => {}
    }

    if !rhs.is_empty() && rhs.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let parsed = if rhs.contains('.') {
            rhs.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        } else {
            rhs.parse::<i64>().ok().map(Value::from)
        };
        return parsed.ok_or_else(|| ParseError::UnsupportedValue {
            name: name.to_string(),
            value: rhs.to_string(),
        });
    }

    if rhs.len() >= 2 {
        let bytes = rhs.as_bytes();
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            return Ok(Value::String(rhs[1..rhs.len() - 1].to_string()));
        }
    }

    Err(ParseError::UnsupportedValue {
        name: name.to_string(),
        value: rhs.to_string(),
    })
}

/// Run the buffered literal through the JSON bridge.
fn finalize(name: &str, buffer: &[String]) -> Result<Value, ParseError> {
    let joined = buffer.join("\n");
    let jsonish = jsonify(&joined);
    if let Ok(value) = serde_json::from_str(&jsonish) {
        return Ok(value);
    }
    serde_json::from_str(&requote(&jsonish)).map_err(|_| ParseError::TooComplex(name.to_string()))
}

/// Fixed textual substitutions carrying the dialect's literals into JSON:
/// keyword literals, tuples to lists, unicode string markers stripped.
fn jsonify(text: &str) -> String {
    text.replace(" None", " null")
        .replace(" True", " true")
        .replace(" False", " false")
        .replace(" (", " [")
        .replace("),", "],")
        .replace(" [u\"", " [\"")
        .replace(" u\"", " \"")
        .replace(" [u'", " ['")
        .replace(" u'", " '")
}

/// Second pass for single-quoted strings. A line with an even number of
/// double quotes has its single quotes turned into double quotes; with an
/// odd number the single quotes are escaped instead. Best-effort legacy
/// compatibility, not a grammar.
fn requote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.matches('"').count() % 2 == 0 {
                line.replace('\'', "\"")
            } else {
                line.replace('\'', "\\'")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> BTreeMap<String, Value> {
        Parser::new().parse(text).unwrap()
    }

    fn parse_err(text: &str) -> ParseError {
        Parser::new().parse(text).unwrap_err()
    }

    #[test]
    fn test_scalar_booleans_and_null() {
        let values = parse("a = True\nb = False\nc = None\nd = true\ne = false\nf = null\n");
        assert_eq!(values["a"], json!(true));
        assert_eq!(values["b"], json!(false));
        assert_eq!(values["c"], Value::Null);
        assert_eq!(values["d"], json!(true));
        assert_eq!(values["e"], json!(false));
        assert_eq!(values["f"], Value::Null);
    }

    #[test]
    fn test_scalar_numbers() {
        let values = parse("port = 9481\nratio = 0.5\n");
        assert_eq!(values["port"], json!(9481));
        assert_eq!(values["ratio"], json!(0.5));
    }

    #[test]
    fn test_scalar_strings() {
        let values = parse("a = 'single'\nb = \"double\"\n");
        assert_eq!(values["a"], json!("single"));
        assert_eq!(values["b"], json!("double"));
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        let values = parse("# leading comment\n\na = 1\n   # indented comment\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], json!(1));
    }

    #[test]
    fn test_single_line_list() {
        let values = parse("a = 1\nb = [1,2,3,'a']\n");
        assert_eq!(values["a"], json!(1));
        assert_eq!(values["b"], json!([1, 2, 3, "a"]));
    }

    #[test]
    fn test_multi_line_list() {
        let values = parse("servers = [\n  'alpha',\n  'beta',\n  'gamma'\n]\n");
        assert_eq!(values["servers"], json!(["alpha", "beta", "gamma"]));
    }

    #[test]
    fn test_mapping_literal() {
        let values = parse("limits = { \"low\" : 1, \"high\" : [ 2, 3 ] }\n");
        assert_eq!(values["limits"], json!({"low": 1, "high": [2, 3]}));
    }

    #[test]
    fn test_mapping_with_single_quotes() {
        let values = parse("limits = { 'low' : 1 }\n");
        assert_eq!(values["limits"], json!({"low": 1}));
    }

    #[test]
    fn test_keyword_literals_inside_list() {
        let values = parse("flags = [ True, False, None ]\n");
        assert_eq!(values["flags"], json!([true, false, Value::Null]));
    }

    #[test]
    fn test_tuple_becomes_list() {
        let values = parse("pairs = [ ( 1, 2 ), 5 ]\n");
        assert_eq!(values["pairs"], json!([[1, 2], 5]));
    }

    #[test]
    fn test_unicode_markers_stripped() {
        let values = parse("names = [ u\"x\", u'y' ]\n");
        assert_eq!(values["names"], json!(["x", "y"]));
    }

    #[test]
    fn test_nested_compound() {
        let values = parse("tree = {\n  \"leaf\" : [ 1, { \"deep\" : None } ]\n}\n");
        assert_eq!(values["tree"], json!({"leaf": [1, {"deep": Value::Null}]}));
    }

    #[test]
    fn test_last_binding_wins() {
        let values = parse("a = 1\na = 2\n");
        assert_eq!(values["a"], json!(2));
    }

    #[test]
    fn test_invalid_variable_names() {
        for doc in ["my-var = 1\n", "a.b = 1\n", "a b = 1\n", "= 1\n", "a+b = 1\n"] {
            assert!(
                matches!(parse_err(doc), ParseError::InvalidVariable(_)),
                "accepted {doc:?}"
            );
        }
    }

    #[test]
    fn test_non_assignment_rejected() {
        assert!(matches!(
            parse_err("just some words\n"),
            ParseError::NotAssignment(_)
        ));
    }

    #[test]
    fn test_unsupported_scalar_rejected() {
        assert!(matches!(
            parse_err("a = 1 + 2\n"),
            ParseError::UnsupportedValue { .. }
        ));
        assert!(matches!(
            parse_err("a = foo()\n"),
            ParseError::UnsupportedValue { .. }
        ));
        assert!(matches!(
            parse_err("a = 1.2.3\n"),
            ParseError::UnsupportedValue { .. }
        ));
    }

    #[test]
    fn test_unterminated_literal() {
        let err = parse_err("a = [\n  1,\n  2,\n");
        assert_eq!(
            err,
            ParseError::Unterminated {
                name: "a".to_string(),
                delimiter: ']',
            }
        );
    }

    #[test]
    fn test_too_complex_literal() {
        assert!(matches!(
            parse_err("a = [ lambda: 1 ]\n"),
            ParseError::TooComplex(_)
        ));
    }

    #[test]
    fn test_round_trip_every_value_kind() {
        let doc = "\
flag = True
off = False
missing = None
count = 42
ratio = 2.5
label = 'plain'
items = [ 1, 2.5, 'x', True, None ]
table = { 'k' : [ 1 ], \"j\" : None }
";
        let values = parse(doc);
        assert_eq!(values["flag"], json!(true));
        assert_eq!(values["off"], json!(false));
        assert_eq!(values["missing"], Value::Null);
        assert_eq!(values["count"], json!(42));
        assert_eq!(values["ratio"], json!(2.5));
        assert_eq!(values["label"], json!("plain"));
        assert_eq!(values["items"], json!([1, 2.5, "x", true, Value::Null]));
        assert_eq!(values["table"], json!({"k": [1], "j": Value::Null}));
    }

    #[test]
    fn test_parser_state_clears_between_documents() {
        let mut parser = Parser::new();
        assert!(parser.parse("a = [\n").is_err());
        // A failed document must not leak continuation state into the next.
        let values = parser.parse("b = 1\n").unwrap();
        assert_eq!(values["b"], json!(1));
    }
}
