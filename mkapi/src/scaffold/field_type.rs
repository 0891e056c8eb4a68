//! Column type and example value mapping for OpenAPI annotations
//!
//! # Type Classes
//!
//! | Raw type              | `type`    | `format`    |
//! |-----------------------|-----------|-------------|
//! | `tinyint`, `int`      | `integer` | `int32`     |
//! | `bigint`              | `integer` | `int64`     |
//! | `timestamp`           | `string`  | `date-time` |
//! | `varchar`, `text`     | `string`  |             |
//! | `decimal`, `double`   | `number`  | `double`    |
//! | `float`               | `number`  | `float`     |
//! | anything else         | `string`  |             |
//!
//! The raw token is matched whole, so sized variants such as `tinyint(1)` or
//! the truncated `decimal(8` fall through to the string row. Both lookups are
//! total: unknown input falls back to a string type or the literal `string`
//! example, never an error.

use chrono::NaiveDateTime;
use std::fmt;

/// Documentation type/format pair for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocType {
    /// OpenAPI `type`
    pub kind: &'static str,
    /// OpenAPI `format`, empty when unspecified
    pub format: &'static str,
}

impl DocType {
    const fn new(kind: &'static str, format: &'static str) -> Self {
        Self { kind, format }
    }

    /// Map a raw column type token
    ///
    /// # Examples
    ///
    /// ```
    /// # use mkapi::scaffold::field_type::DocType;
    /// assert_eq!(DocType::from_raw("bigint").format, "int64");
    /// assert_eq!(DocType::from_raw("varchar(255)").kind, "string");
    /// assert_eq!(DocType::from_raw("tinyint(1)"), DocType::from_raw("geometry"));
    /// ```
    #[must_use]
    pub fn from_raw(raw_type: &str) -> Self {
        match raw_type.trim().to_ascii_lowercase().as_str() {
            "int" | "tinyint" => Self::new("integer", "int32"),
            "bigint" => Self::new("integer", "int64"),
            "timestamp" => Self::new("string", "date-time"),
            "decimal" | "double" => Self::new("number", "double"),
            "float" => Self::new("number", "float"),
            _ => Self::new("string", ""),
        }
    }
}

/// Representative value shown in a property's `example`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleValue {
    /// Numeric literal
    Number(i64),
    /// Text literal
    Text(String),
}

impl ExampleValue {
    /// Pick an example from the column name
    ///
    /// Timestamp columns use `now`, formatted `YYYY-MM-DD HH:MM:SS`; the caller
    /// fixes `now` once so repeated renders agree.
    #[must_use]
    pub fn for_column(column_name: &str, now: NaiveDateTime) -> Self {
        match column_name.to_lowercase().as_str() {
            "id" | "state" => Self::Number(0),
            "username" => Self::Text("user".to_string()),
            "password" => Self::Text("1234567".to_string()),
            "email" => Self::Text("example@example.com".to_string()),
            "ip" => Self::Text("127.0.0.1".to_string()),
            "created_at" | "updated_at" => {
                Self::Text(now.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            _ => Self::Text("string".to_string()),
        }
    }
}

impl fmt::Display for ExampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(DocType::from_raw("int"), DocType::new("integer", "int32"));
        assert_eq!(DocType::from_raw("tinyint"), DocType::new("integer", "int32"));
        assert_eq!(DocType::from_raw("bigint"), DocType::new("integer", "int64"));
        assert_eq!(DocType::from_raw("INT"), DocType::new("integer", "int32"));
    }

    #[test]
    fn test_sized_tokens_are_not_narrowed() {
        for raw in ["tinyint(1)", "int(11)", "bigint(20)", "decimal(8", "varchar(255)"] {
            assert_eq!(DocType::from_raw(raw), DocType::new("string", ""), "{raw}");
        }
    }

    #[test]
    fn test_temporal_and_text_types() {
        assert_eq!(DocType::from_raw("timestamp"), DocType::new("string", "date-time"));
        assert_eq!(DocType::from_raw("varchar(120)"), DocType::new("string", ""));
        assert_eq!(DocType::from_raw("text"), DocType::new("string", ""));
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(DocType::from_raw("decimal"), DocType::new("number", "double"));
        assert_eq!(DocType::from_raw("double"), DocType::new("number", "double"));
        assert_eq!(DocType::from_raw("FLOAT"), DocType::new("number", "float"));
    }

    #[test]
    fn test_unknown_types_fall_back_to_string() {
        for raw in ["", "enum(", "json", "datetime", "(", "smallint"] {
            assert_eq!(DocType::from_raw(raw), DocType::new("string", ""), "{raw}");
        }
    }

    #[test]
    fn test_examples() {
        let now = fixed_now();
        assert_eq!(ExampleValue::for_column("id", now), ExampleValue::Number(0));
        assert_eq!(ExampleValue::for_column("State", now), ExampleValue::Number(0));
        assert_eq!(ExampleValue::for_column("username", now).to_string(), "user");
        assert_eq!(ExampleValue::for_column("password", now).to_string(), "1234567");
        assert_eq!(
            ExampleValue::for_column("email", now).to_string(),
            "example@example.com"
        );
        assert_eq!(ExampleValue::for_column("ip", now).to_string(), "127.0.0.1");
        assert_eq!(
            ExampleValue::for_column("created_at", now).to_string(),
            "2024-05-17 09:30:05"
        );
        assert_eq!(ExampleValue::for_column("title", now).to_string(), "string");
    }
}
