use crate::errors::ScrapeError;
use crate::parsers::row::{RawRow, RowShape};
use serde::{Deserialize, Serialize};

/// Default column labels, in row order
pub const DEFAULT_COLUMNS: [&str; 4] = ["ARTIST", "SONG", "RATING", "HITS"];

/// One row of the result table in the canonical four-column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// First column (artist, player name, ...)
    pub name: String,

    /// Second column (song, link, position, ...)
    pub link: String,

    /// Optional numeric column; `None` when absent or not numeric
    pub rating: Option<f64>,

    /// Last column (hits, or whatever trails the row)
    pub extra: String,
}

impl Row {
    pub fn new(name: String, link: String, rating: Option<f64>, extra: String) -> Self {
        Self {
            name,
            link,
            rating,
            extra,
        }
    }
}

impl From<RawRow> for Row {
    fn from(raw: RawRow) -> Self {
        match raw {
            RawRow::ThreeField { name, link, extra } => Row::new(name, link, None, extra),
            RawRow::FourField {
                name,
                link,
                rating,
                extra,
            } => Row::new(name, link, rating, extra),
        }
    }
}

/// Ordered rows sharing one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column labels for `name`, `link`, `rating`, `extra`
    pub columns: [String; 4],

    /// Shape of the first row that parsed; `None` for an empty table
    pub shape: Option<RowShape>,

    /// Rows in page reading order
    pub rows: Vec<Row>,
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::with_columns(DEFAULT_COLUMNS.map(String::from))
    }
}

impl ResultTable {
    pub fn with_columns(columns: [String; 4]) -> Self {
        Self {
            columns,
            shape: None,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds a [`ResultTable`] row by row, keeping failures alongside
#[derive(Debug, Default)]
pub struct TableAssembler {
    table: ResultTable,
    failures: Vec<ScrapeError>,
}

/// Output of [`TableAssembler::finish`] and [`assemble`]
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub table: ResultTable,
    pub failures: Vec<ScrapeError>,
}

impl TableAssembler {
    pub fn new(columns: [String; 4]) -> Self {
        Self {
            table: ResultTable::with_columns(columns),
            failures: Vec::new(),
        }
    }

    /// Appends one parse result
    ///
    /// The first row fixes the table shape; later rows of the other shape are
    /// still stored in the four-column layout with a null rating where missing.
    pub fn push(&mut self, parsed: Result<RawRow, ScrapeError>) {
        match parsed {
            Ok(raw) => {
                let shape = raw.shape();
                match self.table.shape {
                    None => {
                        ::log::debug!("Table shape fixed as {}", shape);
                        self.table.shape = Some(shape);
                    }
                    Some(fixed) if fixed != shape => {
                        ::log::debug!(
                            "Coercing {} row {} into {} table",
                            shape,
                            self.table.rows.len(),
                            fixed
                        );
                    }
                    Some(_) => {}
                }
                self.table.rows.push(Row::from(raw));
            }
            Err(e) => {
                ::log::warn!("Dropping row: {}", e);
                self.failures.push(e);
            }
        }
    }

    /// Records a failure that did not come from a single row (e.g. a whole page)
    pub fn record(&mut self, failure: ScrapeError) {
        self.failures.push(failure);
    }

    /// Number of rows accepted so far
    pub fn row_count(&self) -> usize {
        self.table.rows.len()
    }

    pub fn finish(self) -> Assembled {
        Assembled {
            table: self.table,
            failures: self.failures,
        }
    }
}

/// Assembles a whole sequence of parse results at once
pub fn assemble<I>(rows: I) -> Assembled
where
    I: IntoIterator<Item = Result<RawRow, ScrapeError>>,
{
    let mut assembler = TableAssembler::default();
    for row in rows {
        assembler.push(row);
    }
    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn four(name: &str, rating: Option<f64>) -> RawRow {
        RawRow::FourField {
            name: name.to_string(),
            link: "song".to_string(),
            rating,
            extra: "1".to_string(),
        }
    }

    fn three(name: &str) -> RawRow {
        RawRow::ThreeField {
            name: name.to_string(),
            link: "song".to_string(),
            extra: "1".to_string(),
        }
    }

    fn parse_failure(row: usize) -> ScrapeError {
        ScrapeError::Parse {
            url: "https://example.com".to_string(),
            row,
            fields: 5,
            expected: BTreeSet::from([3, 4]),
        }
    }

    #[test]
    fn test_empty_input() {
        let assembled = assemble(Vec::new());
        assert!(assembled.table.is_empty());
        assert_eq!(assembled.table.shape, None);
        assert!(assembled.failures.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let names = ["c", "a", "d", "b"];
        let assembled = assemble(names.iter().map(|n| Ok(four(n, Some(1.0)))));
        let got: Vec<&str> = assembled.table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(got, names);
    }

    #[test]
    fn test_mixed_successes_and_failures() {
        let input = vec![
            Ok(four("a", Some(1.0))),
            Err(parse_failure(1)),
            Ok(three("b")),
            Err(parse_failure(3)),
            Ok(four("c", None)),
        ];
        let assembled = assemble(input);
        assert_eq!(assembled.table.len(), 3);
        assert_eq!(assembled.failures.len(), 2);
        assert_eq!(assembled.failures[0], parse_failure(1));
    }

    #[test]
    fn test_first_row_fixes_shape() {
        let assembled = assemble(vec![Ok(three("a")), Ok(four("b", Some(2.0)))]);
        assert_eq!(assembled.table.shape, Some(RowShape::ThreeField));
        assert_eq!(assembled.table.rows[0].rating, None);
        assert_eq!(assembled.table.rows[1].rating, Some(2.0));
    }

    #[test]
    fn test_three_field_row_in_four_field_table() {
        let assembled = assemble(vec![Ok(four("a", Some(9.5))), Ok(three("b"))]);
        assert_eq!(assembled.table.shape, Some(RowShape::FourField));
        assert_eq!(
            assembled.table.rows[1],
            Row::new("b".to_string(), "song".to_string(), None, "1".to_string())
        );
    }

    #[test]
    fn test_columns_kept() {
        let columns = ["NAME", "LINK", "RATING", "EXTRA"].map(String::from);
        let mut assembler = TableAssembler::new(columns.clone());
        assembler.push(Ok(three("a")));
        let assembled = assembler.finish();
        assert_eq!(assembled.table.columns, columns);
    }
}
