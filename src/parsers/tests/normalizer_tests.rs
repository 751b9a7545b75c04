use crate::parsers::text;

#[cfg(test)]
mod basic_tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(text::normalize(""), "");
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(text::normalize("   \n   \t   \r\n   "), "");
    }

    #[test]
    fn test_lines_become_fields() {
        let raw = "Metallica\nOne\n9.5\n120,000";
        assert_eq!(text::normalize(raw), "Metallica,One,9.5,120000");
    }

    #[test]
    fn test_commas_inside_values_removed() {
        let raw = "Smith, John\nQB\n1,234";
        assert_eq!(text::normalize(raw), "Smith John,QB,1234");
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = "Metallica\r\nOne\r\n120000\r\n";
        assert_eq!(text::normalize(raw), "Metallica,One,120000");
    }

    #[test]
    fn test_lines_are_trimmed_and_collapsed() {
        let raw = "  Iron   Maiden  \n  Fear of the Dark \n 4.8 \n 9000 ";
        assert_eq!(text::normalize(raw), "Iron Maiden,Fear of the Dark,4.8,9000");
    }

    #[test]
    fn test_blank_line_kept_as_empty_field() {
        assert_eq!(text::normalize("a\n\nb"), "a,,b");
    }

    #[test]
    fn test_case_boundaries_split() {
        assert_eq!(text::normalize("JoshAllen\nQB"), "Josh Allen,QB");
        assert_eq!(text::split_case_boundaries("aBcD"), "a Bc D");
    }

    #[test]
    fn test_acronyms_untouched() {
        assert_eq!(text::split_case_boundaries("NFL"), "NFL");
        assert_eq!(text::split_case_boundaries("AC/DC"), "AC/DC");
        assert_eq!(text::split_case_boundaries("theNFLDraft"), "the NFLDraft");
    }

    #[test]
    fn test_single_line_is_already_flattened() {
        assert_eq!(
            text::normalize("Metallica,One,9.5,120000"),
            "Metallica,One,9.5,120000"
        );
    }

    #[test]
    fn test_single_line_keeps_commas() {
        assert_eq!(
            text::normalize("Metallica One 9.5 120,000"),
            "Metallica One 9.5 120,000"
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let raw = "1234\nUniversity of Notre Dame";
        assert_eq!(
            text::normalize_with_delimiter(raw, ':'),
            "1234:University of Notre Dame"
        );
    }
}

#[cfg(test)]
mod idempotence_tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "Metallica\nOne\n9.5\n120,000",
            "Metallica,One,9.5,120000",
            "JoshAllen\nQB\n\n17",
            "  leading\ntrailing  \n",
            "Smith, John\r\nQB\r\n1,234",
            "camelCaseWordsHere",
            "ÉlodieÉcole\nçaVa",
        ];

        for input in inputs {
            let once = text::normalize(input);
            let twice = text::normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalized_output_has_no_newlines() {
        let once = text::normalize("a\nb\r\nc\n\nd");
        assert!(!once.contains('\n'));
        assert!(!once.contains('\r'));
    }
}

#[cfg(test)]
mod block_tests {
    use super::*;

    #[test]
    fn test_split_into_paragraphs() {
        let result = text::split_into_paragraphs("");
        assert_eq!(result.len(), 0);

        let result = text::split_into_paragraphs("Line 1a\nLine 1b\n\nLine 2a\nLine 2b");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], vec!["Line 1a", "Line 1b"]);
        assert_eq!(result[1], vec!["Line 2a", "Line 2b"]);

        let result = text::split_into_paragraphs("Paragraph 1.\n\n\n\nParagraph 2.");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_blocks_from_text() {
        let dump = "Metallica\nOne\n9.5\n120,000\n\n  \nTool\nSchism\n88,000\n";
        let blocks = text::blocks_from_text(dump);
        assert_eq!(
            blocks,
            vec![
                "Metallica\nOne\n9.5\n120,000".to_string(),
                "Tool\nSchism\n88,000".to_string(),
            ]
        );
    }

    #[test]
    fn test_normalize_whitespace_in_segment() {
        assert_eq!(
            text::normalize_whitespace_in_segment("  Trim  me  "),
            "Trim me"
        );
        assert_eq!(
            text::normalize_whitespace_in_segment("Tabs\tand\tspaces"),
            "Tabs and spaces"
        );
        assert_eq!(text::normalize_whitespace_in_segment("   "), "");
    }
}
