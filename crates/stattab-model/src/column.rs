use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// Default color-scale palette applied to columns that do not declare one.
pub const DEFAULT_SCALE: &str = "GnBu";

/// Declared storage type of a column. The backing store is the arbiter of
/// type legality; nothing is validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Text,
    Real,
    Integer,
}

impl ColumnType {
    /// The SQLite storage class this type materializes as.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" | "CHAR" | "STRING" => Ok(ColumnType::Text),
            "REAL" | "NUM" | "NUMERIC" | "FLOAT" => Ok(ColumnType::Real),
            "INTEGER" | "INT" => Ok(ColumnType::Integer),
            _ => Err(format!("Unknown column type: {s}")),
        }
    }
}

/// Display format applied to a cell value at render time.
///
/// Formatting is best-effort: a value that cannot be coerced to the numeric
/// reading `Fixed` expects falls back to its verbatim text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueFormat {
    /// Fixed-point with the given number of decimals.
    Fixed(u8),
    /// Pass the value through unformatted.
    Raw,
}

impl Default for ValueFormat {
    fn default() -> Self {
        ValueFormat::Fixed(1)
    }
}

impl ValueFormat {
    /// Apply this format to a value, or `None` when the value has no reading
    /// the format can work with (the caller falls back to verbatim text).
    pub fn apply(&self, value: &CellValue) -> Option<String> {
        match self {
            ValueFormat::Fixed(decimals) => {
                let number = value.as_f64()?;
                Some(format!("{number:.prec$}", prec = *decimals as usize))
            }
            ValueFormat::Raw => {
                if value.is_missing() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
    }
}

/// Metadata for one table column: identity, declared type, display range,
/// palette and format. The first column registered on a table is the
/// row-name/identity column and is never scaled or formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Unique within a table; doubles as the header title text.
    pub name: String,
    pub data_type: ColumnType,
    /// Tooltip text for the header cell.
    pub description: String,
    /// Lower bound of the color-scale range. Unbounded by default.
    pub value_min: f64,
    /// Upper bound of the color-scale range. Unbounded by default.
    pub value_max: f64,
    /// Named palette identifier, opaque to the core.
    pub scale: String,
    pub format: ValueFormat,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: String::new(),
            value_min: f64::NEG_INFINITY,
            value_max: f64::INFINITY,
            scale: DEFAULT_SCALE.to_string(),
            format: ValueFormat::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.value_min = min;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.value_max = max;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = scale.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_one_decimal() {
        let column = ColumnSchema::new("score", ColumnType::Real);
        assert_eq!(column.value_min, f64::NEG_INFINITY);
        assert_eq!(column.value_max, f64::INFINITY);
        assert_eq!(column.scale, DEFAULT_SCALE);
        assert_eq!(column.format, ValueFormat::Fixed(1));
        assert!(column.description.is_empty());
    }

    #[test]
    fn builder_overrides_stick() {
        let column = ColumnSchema::new("score", ColumnType::Real)
            .with_description("Alignment score")
            .with_min(0.0)
            .with_max(10.0)
            .with_scale("RdYlGn")
            .with_format(ValueFormat::Fixed(2));
        assert_eq!(column.description, "Alignment score");
        assert_eq!(column.value_min, 0.0);
        assert_eq!(column.value_max, 10.0);
        assert_eq!(column.scale, "RdYlGn");
        assert_eq!(column.format, ValueFormat::Fixed(2));
    }

    #[test]
    fn fixed_format_applies_to_numbers() {
        let format = ValueFormat::Fixed(1);
        assert_eq!(format.apply(&CellValue::Number(7.0)).as_deref(), Some("7.0"));
        assert_eq!(
            format.apply(&CellValue::Text("3.14159".to_string())).as_deref(),
            Some("3.1")
        );
    }

    #[test]
    fn fixed_format_refuses_non_numeric() {
        let format = ValueFormat::Fixed(1);
        assert_eq!(format.apply(&CellValue::Text("ok".to_string())), None);
        assert_eq!(format.apply(&CellValue::Missing), None);
    }

    #[test]
    fn column_type_parses_loosely() {
        assert_eq!("numeric".parse::<ColumnType>(), Ok(ColumnType::Real));
        assert_eq!("TEXT".parse::<ColumnType>(), Ok(ColumnType::Text));
        assert_eq!("int".parse::<ColumnType>(), Ok(ColumnType::Integer));
        assert!("blob".parse::<ColumnType>().is_err());
    }
}
