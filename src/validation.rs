//! IPv4 CIDR validation and extraction from raw list feeds.
//!
//! The feed is untrusted text with one entry per line. Extraction keeps every
//! line that matches the strict IPv4 CIDR grammar, verbatim and in order.
//! Blank lines and `#` comments are ignored. Anything else is reported as a
//! [`SkippedLine`] and never aborts the run.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Anchored IPv4 CIDR grammar: four octets in 0..=255 (leading zeros allowed)
/// and a prefix length in 0..=32.
static CIDR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}",
        r"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)",
        r"/(?:[0-9]|[12][0-9]|3[0-2])$",
    ))
    .expect("CIDR pattern is a valid regex")
});

/// A non-comment, non-blank line that failed the CIDR grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based position in the raw feed, blank and comment lines included
    pub line_number: usize,
    /// Trimmed line content
    pub content: String,
}

/// Result of scanning a raw feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Valid CIDRs in feed order
    pub cidrs: Vec<String>,
    /// Lines rejected by the grammar
    pub skipped: Vec<SkippedLine>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.cidrs.is_empty()
    }
}

/// Check a single string against the IPv4 CIDR grammar.
///
/// The string must match as a whole; no trimming is done here.
///
/// # Examples
/// ```
/// use ikuai_ipgroup::validation::is_valid_cidr;
/// assert!(is_valid_cidr("1.0.1.0/24"));
/// assert!(is_valid_cidr("010.0.0.0/8"));
/// assert!(!is_valid_cidr("256.0.0.0/8"));
/// assert!(!is_valid_cidr("10.0.0.0/33"));
/// assert!(!is_valid_cidr("10.0.0.0"));
/// ```
pub fn is_valid_cidr(candidate: &str) -> bool {
    CIDR_PATTERN.is_match(candidate)
}

/// Line boundaries: `\n`, `\r`, vertical tab, form feed, the ASCII file, group
/// and record separators, NEL, and the Unicode line and paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split raw text into lines on any [`is_line_break`] character, with `\r\n`
/// counted as a single break. A trailing break does not start a new line.
fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    let mut rest = raw;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let line = match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((index, c)) => {
                let mut next = index + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                let line = &rest[..index];
                rest = &rest[next..];
                line
            }
            None => std::mem::take(&mut rest),
        };
        Some(line)
    })
}

/// Extract every valid IPv4 CIDR from a raw feed.
///
/// Invalid lines are logged and collected in [`Extraction::skipped`].
///
/// # Examples
/// ```
/// use ikuai_ipgroup::validation::extract;
/// let feed = "# cn\n1.2.3.4/24\n999.1.1.1/24\n\n10.0.0.0/33\n";
/// let extraction = extract(feed);
/// assert_eq!(extraction.cidrs, vec!["1.2.3.4/24"]);
/// assert_eq!(extraction.skipped.len(), 2);
/// ```
pub fn extract(raw: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for (index, line) in split_lines(raw).enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if is_valid_cidr(line) {
            extraction.cidrs.push(line.to_string());
        } else {
            let line_number = index + 1;
            warn!("Skipping invalid line {}: {}", line_number, line);
            extraction.skipped.push(SkippedLine {
                line_number,
                content: line.to_string(),
            });
        }
    }

    debug!("{} lines rejected by CIDR grammar", extraction.skipped.len());
    info!("Extracted {} valid IPv4 CIDRs", extraction.cidrs.len());

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_mixed_feed() {
        let feed = "1.2.3.4/24\n999.1.1.1/24\n10.0.0.0/33\n# comment\n\n";
        let extraction = extract(feed);
        assert_eq!(extraction.cidrs, vec!["1.2.3.4/24".to_string()]);
        assert_eq!(
            extraction.skipped,
            vec![
                SkippedLine {
                    line_number: 2,
                    content: "999.1.1.1/24".to_string()
                },
                SkippedLine {
                    line_number: 3,
                    content: "10.0.0.0/33".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let feed = "10.0.0.0/8\n1.0.1.0/24\n10.0.0.0/8\n";
        let extraction = extract(feed);
        assert_eq!(
            extraction.cidrs,
            vec!["10.0.0.0/8", "1.0.1.0/24", "10.0.0.0/8"]
        );
    }

    #[test]
    fn test_extract_comments_and_blanks_not_reported() {
        let feed = "# header\n   \n\t\n  # indented comment\n";
        let extraction = extract(feed);
        assert!(extraction.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_extract_trims_whitespace() {
        let feed = "  1.0.1.0/24  \n\t1.0.2.0/23\t\n";
        let extraction = extract(feed);
        assert_eq!(extraction.cidrs, vec!["1.0.1.0/24", "1.0.2.0/23"]);
    }

    #[test]
    fn test_extract_unicode_and_control_line_breaks() {
        let feed = "1.0.1.0/24\u{2028}1.0.2.0/23\u{2029}bogus\x0b1.0.8.0/21\x0c\x1c1.0.32.0/19\u{85}";
        let extraction = extract(feed);
        assert_eq!(
            extraction.cidrs,
            vec!["1.0.1.0/24", "1.0.2.0/23", "1.0.8.0/21", "1.0.32.0/19"]
        );
        assert_eq!(
            extraction.skipped,
            vec![SkippedLine {
                line_number: 3,
                content: "bogus".to_string()
            }]
        );
    }

    #[test]
    fn test_split_lines_keeps_blank_lines_and_drops_trailing_break() {
        let lines: Vec<&str> = split_lines("a\r\n\nb\r\rc\n").collect();
        assert_eq!(lines, vec!["a", "", "b", "", "c"]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn test_extract_crlf_line_endings() {
        let feed = "1.0.1.0/24\r\n1.0.2.0/23\r\nbogus\r\n";
        let extraction = extract(feed);
        assert_eq!(extraction.cidrs, vec!["1.0.1.0/24", "1.0.2.0/23"]);
        assert_eq!(extraction.skipped[0].line_number, 3);
    }

    #[test]
    fn test_extract_bare_cr_line_endings() {
        let feed = "1.0.1.0/24\r1.0.2.0/23";
        let extraction = extract(feed);
        assert_eq!(extraction.cidrs, vec!["1.0.1.0/24", "1.0.2.0/23"]);
    }

    #[test]
    fn test_extract_line_numbers_count_comments_and_blanks() {
        let feed = "# a\n\n1.0.1.0/24\n# b\nnot-a-cidr\n";
        let extraction = extract(feed);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].line_number, 5);
        assert_eq!(extraction.skipped[0].content, "not-a-cidr");
    }

    #[test]
    fn test_extract_empty_input() {
        let extraction = extract("");
        assert!(extraction.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_extract_no_normalization() {
        // Host bits and leading zeros are kept as-is
        let feed = "1.2.3.4/8\n001.002.003.004/32\n";
        let extraction = extract(feed);
        assert_eq!(extraction.cidrs, vec!["1.2.3.4/8", "001.002.003.004/32"]);
    }

    #[test]
    fn test_is_valid_cidr_boundaries() {
        assert!(is_valid_cidr("0.0.0.0/0"));
        assert!(is_valid_cidr("255.255.255.255/32"));
        assert!(is_valid_cidr("249.250.199.100/9"));
        assert!(is_valid_cidr("1.2.3.4/19"));
        assert!(is_valid_cidr("1.2.3.4/30"));
    }

    #[test]
    fn test_is_valid_cidr_bad_octet() {
        assert!(!is_valid_cidr("256.0.0.0/8"));
        assert!(!is_valid_cidr("1.2.3.260/24"));
        assert!(!is_valid_cidr("1.2.3.1000/24"));
        assert!(!is_valid_cidr("1.2.3/24"));
        assert!(!is_valid_cidr("1.2.3.4.5/24"));
        assert!(!is_valid_cidr("-1.2.3.4/24"));
    }

    #[test]
    fn test_is_valid_cidr_bad_mask() {
        assert!(!is_valid_cidr("1.2.3.4/33"));
        assert!(!is_valid_cidr("1.2.3.4/40"));
        assert!(!is_valid_cidr("1.2.3.4/"));
        assert!(!is_valid_cidr("1.2.3.4/-1"));
        assert!(!is_valid_cidr("1.2.3.4/024"));
    }

    #[test]
    fn test_is_valid_cidr_missing_slash_or_extra_text() {
        assert!(!is_valid_cidr("1.2.3.4"));
        assert!(!is_valid_cidr("1.2.3.4/24 # cn"));
        assert!(!is_valid_cidr("ip 1.2.3.4/24"));
        assert!(!is_valid_cidr(" 1.2.3.4/24"));
        assert!(!is_valid_cidr("2001:db8::/32"));
        assert!(!is_valid_cidr(""));
    }
}
