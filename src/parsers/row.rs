use crate::errors::ConfigError;
use std::collections::BTreeSet;
use std::fmt;

use super::text::FIELD_DELIMITER;

/// Field counts a row may legally split into
pub const SUPPORTED_FIELD_COUNTS: [usize; 2] = [3, 4];

/// A parsed row, tagged by the shape it was read in
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    /// `name, link, extra` with no rating column
    ThreeField {
        name: String,
        link: String,
        extra: String,
    },
    /// `name, link, rating, extra`
    FourField {
        name: String,
        link: String,
        rating: Option<f64>,
        extra: String,
    },
}

impl RawRow {
    pub fn shape(&self) -> RowShape {
        match self {
            RawRow::ThreeField { .. } => RowShape::ThreeField,
            RawRow::FourField { .. } => RowShape::FourField,
        }
    }
}

/// Source shape of a row, decided by its field count
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RowShape {
    ThreeField,
    FourField,
}

impl RowShape {
    pub fn field_count(self) -> usize {
        match self {
            RowShape::ThreeField => 3,
            RowShape::FourField => 4,
        }
    }
}

impl fmt::Display for RowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-field", self.field_count())
    }
}

/// A normalized record split into a field count the parser does not accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub fields: usize,
    pub expected: BTreeSet<usize>,
}

/// Result of parsing one record: the row plus the raw rating if it failed to coerce
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub row: RawRow,
    pub uncoerced_rating: Option<String>,
}

/// Splits normalized records into typed rows
#[derive(Debug, Clone)]
pub struct RowParser {
    delimiter: char,
    expected: BTreeSet<usize>,
}

impl Default for RowParser {
    fn default() -> Self {
        Self {
            delimiter: FIELD_DELIMITER,
            expected: SUPPORTED_FIELD_COUNTS.into_iter().collect(),
        }
    }
}

impl RowParser {
    /// Creates a parser accepting only the given field counts (a subset of {3, 4})
    pub fn new(delimiter: char, expected: BTreeSet<usize>) -> Result<Self, ConfigError> {
        if expected.is_empty() {
            return Err(ConfigError::NoFieldCounts);
        }
        if let Some(&bad) = expected
            .iter()
            .find(|&&n| !SUPPORTED_FIELD_COUNTS.contains(&n))
        {
            return Err(ConfigError::FieldCount(bad));
        }
        Ok(Self {
            delimiter,
            expected,
        })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn expected(&self) -> &BTreeSet<usize> {
        &self.expected
    }

    /// Parses one normalized record
    ///
    /// A rating that is present but not numeric becomes `None`; the raw text is
    /// handed back in [`Parsed::uncoerced_rating`] so the caller can record it.
    pub fn parse(&self, normalized: &str) -> Result<Parsed, ParseError> {
        let fields: Vec<&str> = normalized.split(self.delimiter).map(str::trim).collect();

        if !self.expected.contains(&fields.len()) {
            return Err(ParseError {
                fields: fields.len(),
                expected: self.expected.clone(),
            });
        }

        match fields.as_slice() {
            [name, link, extra] => Ok(Parsed {
                row: RawRow::ThreeField {
                    name: name.to_string(),
                    link: link.to_string(),
                    extra: extra.to_string(),
                },
                uncoerced_rating: None,
            }),
            [name, link, rating, extra] => {
                let (rating, uncoerced_rating) = coerce_rating(rating);
                Ok(Parsed {
                    row: RawRow::FourField {
                        name: name.to_string(),
                        link: link.to_string(),
                        rating,
                        extra: extra.to_string(),
                    },
                    uncoerced_rating,
                })
            }
            _ => Err(ParseError {
                fields: fields.len(),
                expected: self.expected.clone(),
            }),
        }
    }
}

/// Parses with the default parser (`,` delimiter, 3 or 4 fields)
pub fn parse(normalized: &str) -> Result<Parsed, ParseError> {
    RowParser::default().parse(normalized)
}

/// Coerces the rating column; non-numeric text gives `None` plus the original value
fn coerce_rating(field: &str) -> (Option<f64>, Option<String>) {
    if field.is_empty() {
        return (None, None);
    }
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => (Some(value), None),
        _ => (None, Some(field.to_string())),
    }
}
