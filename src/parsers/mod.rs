pub mod html;
pub mod row;
pub mod text;

#[cfg(test)]
mod tests;

use row::{ParseError, Parsed, RowParser};

/// A block of text captured from one page element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// URL of the page the block came from
    pub source: String,
    /// Inner text of the element
    pub text: String,
}

impl RawBlock {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Runs a raw block through normalization and row parsing
#[derive(Debug, Clone, Default)]
pub struct Parser {
    rows: RowParser,
}

impl Parser {
    pub fn new(rows: RowParser) -> Self {
        Self { rows }
    }

    pub fn row_parser(&self) -> &RowParser {
        &self.rows
    }

    /// Normalizes the block text with the parser's delimiter, then parses it
    pub fn parse_block(&self, block: &RawBlock) -> Result<Parsed, ParseError> {
        let normalized = text::normalize_with_delimiter(&block.text, self.rows.delimiter());
        ::log::trace!("Normalized block from {}: {:?}", block.source, normalized);
        self.rows.parse(&normalized)
    }
}
