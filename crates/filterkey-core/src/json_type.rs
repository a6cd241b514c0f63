//! Coarse column value types used to pick and validate filter operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The coarse value type of a column as reported by query metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// True/false values.
    Boolean,
    /// Dates and date-times.
    Date,
    /// Floating point numbers.
    Float,
    /// Integers.
    Int,
    /// Free text.
    String,
}

impl JsonType {
    /// All value types, in declaration order.
    pub const ALL: [JsonType; 5] = [
        JsonType::Boolean,
        JsonType::Date,
        JsonType::Float,
        JsonType::Int,
        JsonType::String,
    ];

    /// The lower-case tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Boolean => "boolean",
            JsonType::Date => "date",
            JsonType::Float => "float",
            JsonType::Int => "int",
            JsonType::String => "string",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("unknown value type '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("int".parse::<JsonType>().unwrap(), JsonType::Int);
        assert_eq!("Boolean".parse::<JsonType>().unwrap(), JsonType::Boolean);
        assert!("decimal".parse::<JsonType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&JsonType::Date).unwrap();
        assert_eq!(json, "\"date\"");
        let back: JsonType = serde_json::from_str("\"float\"").unwrap();
        assert_eq!(back, JsonType::Float);
    }
}
