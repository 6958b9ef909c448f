//! Field level checks for incoming documents.
//!
//! Bodies are read as loose JSON first so that a failure can name the exact
//! field path (`stops.2.arrival`) instead of a generic deserializer message.
use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{document} validation failed: {path}: {reason}")]
pub struct ValidationError {
    pub document: &'static str,
    pub path: String,
    pub reason: Reason,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Reason {
    #[error("field is required")]
    Required,
    #[error("expected {0}")]
    WrongType(&'static str),
    #[error("must not be empty")]
    Empty,
    #[error("`{0}` is not a supported geometry type, expected `Point`")]
    NotPoint(String),
    #[error("expected [longitude, latitude], got {0} values")]
    CoordinateCount(usize),
    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("body is not valid JSON: {0}")]
    Json(String),
}

/// Parses a request body into loose JSON, reporting syntax errors against `document`.
pub fn parse_body(document: &'static str, body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError {
        document,
        path: "(body)".to_string(),
        reason: Reason::Json(e.to_string()),
    })
}

/// Read access to one JSON object, remembering where it sits in the document.
#[derive(Debug)]
pub struct Fields<'a> {
    document: &'static str,
    prefix: String,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn root(document: &'static str, value: &'a Value) -> Result<Self, ValidationError> {
        match value.as_object() {
            Some(object) => Ok(Self {
                document,
                prefix: String::new(),
                object,
            }),
            None => Err(ValidationError {
                document,
                path: "(root)".to_string(),
                reason: Reason::WrongType("an object"),
            }),
        }
    }

    pub fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    pub fn error_at(&self, path: String, reason: Reason) -> ValidationError {
        ValidationError {
            document: self.document,
            path,
            reason,
        }
    }

    pub fn error(&self, field: &str, reason: Reason) -> ValidationError {
        self.error_at(self.path(field), reason)
    }

    /// `null` counts as absent.
    pub fn optional(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    pub fn required(&self, field: &str) -> Result<&'a Value, ValidationError> {
        self.optional(field)
            .ok_or_else(|| self.error(field, Reason::Required))
    }

    /// A required, non-empty string.
    pub fn string(&self, field: &str) -> Result<String, ValidationError> {
        match self.required(field)? {
            Value::String(s) if s.is_empty() => Err(self.error(field, Reason::Empty)),
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.error(field, Reason::WrongType("a string"))),
        }
    }

    /// A required integer. Floats without a fractional part are accepted.
    pub fn integer(&self, field: &str) -> Result<i64, ValidationError> {
        let value = self.required(field)?;
        as_integer(value).ok_or_else(|| self.error(field, Reason::WrongType("an integer")))
    }

    pub fn object(&self, field: &str) -> Result<Fields<'a>, ValidationError> {
        let value = self.required(field)?;
        self.nested(self.path(field), value)
    }

    /// An optional array; absent and `null` both give `None`.
    pub fn array(&self, field: &str) -> Result<Option<&'a Vec<Value>>, ValidationError> {
        match self.optional(field) {
            None => Ok(None),
            Some(Value::Array(values)) => Ok(Some(values)),
            Some(_) => Err(self.error(field, Reason::WrongType("an array"))),
        }
    }

    /// Wraps an object found at `path`, e.g. an array element.
    pub fn nested(&self, path: String, value: &'a Value) -> Result<Fields<'a>, ValidationError> {
        match value.as_object() {
            Some(object) => Ok(Fields {
                document: self.document,
                prefix: path,
                object,
            }),
            None => Err(self.error_at(path, Reason::WrongType("an object"))),
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(n) = number.as_i64() {
        return Some(n);
    }

    let f = number.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_nested_paths() {
        let value = json!({ "outer": { "inner": 5 } });
        let fields = Fields::root("Thing", &value).unwrap();
        let outer = fields.object("outer").unwrap();

        let err = outer.string("inner").unwrap_err();

        assert_eq!(err.path, "outer.inner");
        assert_eq!(err.reason, Reason::WrongType("a string"));
        assert_eq!(
            err.to_string(),
            "Thing validation failed: outer.inner: expected a string"
        );
    }

    #[test]
    fn test_null_is_missing() {
        let value = json!({ "name": null });
        let fields = Fields::root("Thing", &value).unwrap();

        assert_eq!(fields.string("name").unwrap_err().reason, Reason::Required);
        assert_eq!(fields.array("name").unwrap(), None);
    }

    #[test]
    fn test_integer() {
        let value = json!({ "a": 7, "b": 7.0, "c": 7.5, "d": "7" });
        let fields = Fields::root("Thing", &value).unwrap();

        assert_eq!(fields.integer("a").unwrap(), 7);
        assert_eq!(fields.integer("b").unwrap(), 7);
        assert!(fields.integer("c").is_err());
        assert!(fields.integer("d").is_err());
    }

    #[test]
    fn test_root_must_be_object() {
        let err = Fields::root("Thing", &json!([1, 2])).err().unwrap();
        assert_eq!(err.path, "(root)");
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body("Thing", br#"{"a": 1}"#).is_ok());

        let err = parse_body("Thing", b"{not json").unwrap_err();
        assert_eq!(err.path, "(body)");
        assert!(matches!(err.reason, Reason::Json(_)));
    }
}
