use regex::Regex;
use std::sync::LazyLock;

/// Delimiter placed between fields when a multi-line block is flattened
pub const FIELD_DELIMITER: char = ',';

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").expect("case boundary regex is valid"));

/// Normalizes a raw block into a single delimited record using `,` as delimiter
///
/// The steps, in order:
/// - Remove stray commas (thousands separators, punctuation inside values)
/// - Turn every line of the block into one field, joined by the delimiter
/// - Split words glued together by text flattening (`fooBar` -> `foo Bar`)
///
/// A single-line input is taken to be an already flattened record, so only the
/// last step applies to it. This keeps `normalize` idempotent. It also means a
/// single-line raw block keeps its commas: `"Metallica One 9.5 120,000"` comes
/// back unchanged and parses by its commas, not its spaces.
pub fn normalize(raw: &str) -> String {
    normalize_with_delimiter(raw, FIELD_DELIMITER)
}

/// Same as [`normalize`] with a custom field delimiter
pub fn normalize_with_delimiter(raw: &str, delimiter: char) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let flattened = if is_multiline(trimmed) {
        flatten_lines(&strip_delimiters(trimmed, delimiter), delimiter)
    } else {
        trimmed.to_string()
    };

    split_case_boundaries(&flattened)
}

/// Returns true when the text still spans several lines
pub fn is_multiline(text: &str) -> bool {
    text.contains('\n')
}

/// Removes commas and the field delimiter from raw text
pub fn strip_delimiters(text: &str, delimiter: char) -> String {
    text.chars()
        .filter(|&c| c != ',' && c != delimiter)
        .collect()
}

/// Joins the lines of a block with the delimiter, one field per line
///
/// Each line has its whitespace collapsed; blank lines inside the block are
/// kept as empty fields.
pub fn flatten_lines(text: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&normalize_whitespace_in_segment(line));
    }
    out
}

/// Inserts a space at each lowercase -> uppercase transition, leaving acronyms alone
pub fn split_case_boundaries(text: &str) -> String {
    CASE_BOUNDARY.replace_all(text, "$1 $2").into_owned()
}

/// Splits a plain-text dump into raw blocks, one per blank-line separated paragraph
pub fn blocks_from_text(text: &str) -> Vec<String> {
    split_into_paragraphs(text)
        .into_iter()
        .map(|lines| lines.join("\n"))
        .collect()
}

/// Splits text into paragraphs based on empty lines
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current_paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Empty line marks a paragraph boundary
            if !current_paragraph.is_empty() {
                paragraphs.push(current_paragraph);
                current_paragraph = Vec::new();
            }
        } else {
            current_paragraph.push(trimmed);
        }
    }

    if !current_paragraph.is_empty() {
        paragraphs.push(current_paragraph);
    }

    paragraphs
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
