//! Fragment parser: splits a document into typed fragments before node decoding.

use std::io::BufRead;

use crate::config::FormatConfig;
use crate::error::GraphError;

use super::fragment::{parse_fragment, FragmentParse, ParsedNodeFragment};

/// Lexical pass over a whole document.
pub trait FragmentParser: Send + Sync {
    /// Read every fragment in document order. Only read failures are errors;
    /// malformed fragments are skipped.
    fn parse(&self, reader: &mut dyn BufRead) -> Result<Vec<ParsedNodeFragment>, GraphError>;
}

/// Parser for documents framed by begin/separator/end marker lines.
///
/// The begin marker is optional (consumed only if it is the first non-blank
/// line); everything after the end marker is ignored.
#[derive(Debug, Clone)]
pub struct MarkerFragmentParser {
    format: FormatConfig,
}

impl MarkerFragmentParser {
    pub fn new(format: FormatConfig) -> Self {
        Self { format }
    }

    fn flush(&self, lines: &mut Vec<String>, index: &mut usize, out: &mut Vec<ParsedNodeFragment>) {
        match parse_fragment(lines) {
            FragmentParse::Blank => {}
            FragmentParse::Parsed(fragment) => out.push(fragment),
            FragmentParse::Malformed(reason) => {
                tracing::warn!(fragment_index = *index, "skipping malformed fragment: {}", reason);
            }
        }
        *index += 1;
        lines.clear();
    }
}

impl Default for MarkerFragmentParser {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl FragmentParser for MarkerFragmentParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<Vec<ParsedNodeFragment>, GraphError> {
        let begin = self.format.begin_marker.trim();
        let separator = self.format.separator.trim();
        let end = self.format.end_marker.trim();

        let mut fragments = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut index = 0usize;
        let mut seen_content = false;
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim_end_matches(['\n', '\r']);
            let trimmed = text.trim();

            if !seen_content {
                if trimmed.is_empty() {
                    continue;
                }
                seen_content = true;
                if trimmed == begin {
                    continue;
                }
            }

            if trimmed == end {
                break;
            }
            if trimmed == separator {
                self.flush(&mut current, &mut index, &mut fragments);
                continue;
            }
            current.push(text.to_string());
        }
        self.flush(&mut current, &mut index, &mut fragments);

        tracing::debug!(fragments = fragments.len(), "document parsed");
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn parse(text: &str) -> Vec<ParsedNodeFragment> {
        MarkerFragmentParser::default()
            .parse(&mut Cursor::new(text.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_parse_framed_document() {
        let fragments = parse(
            "=== graph ===\n@dialogue n1\nid = 1\n---\n@choice n2\n-|\nid = 2\n=== end ===\n",
        );
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].node_id, "n1");
        assert_eq!(fragments[0].text, "id = 1");
        assert_eq!(fragments[1].node_type, "choice");
        assert!(fragments[1].stop);
    }

    #[test]
    fn test_markers_are_optional() {
        let fragments = parse("@dialogue n1\n---\n@dialogue n2");
        let ids: Vec<_> = fragments.iter().map(|f| f.node_id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2"]);
    }

    #[test]
    fn test_text_after_end_marker_ignored() {
        let fragments = parse("=== graph ===\n@dialogue n1\n=== end ===\n@dialogue n2\n");
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_malformed_fragment_skipped() {
        let fragments = parse(
            "=== graph ===\n@dialogue n1\n---\nno header here\n---\n@choice\n---\n@choice n3\n=== end ===",
        );
        let ids: Vec<_> = fragments.iter().map(|f| f.node_id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n3"]);
    }

    #[test]
    fn test_empty_fragments_and_crlf() {
        let fragments = parse("=== graph ===\r\n---\r\n@dialogue n1\r\nid = 1\r\n---\r\n\r\n=== end ===\r\n");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "id = 1");
    }

    #[test]
    fn test_custom_markers() {
        let parser = MarkerFragmentParser::new(FormatConfig {
            begin_marker: "BEGIN".into(),
            separator: "%%".into(),
            end_marker: "END".into(),
        });
        let fragments = parser
            .parse(&mut Cursor::new("BEGIN\n@a x\n%%\n@b y\nEND".as_bytes()))
            .unwrap();
        assert_eq!(fragments.len(), 2);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
        }
    }

    #[test]
    fn test_read_failure_is_hard_error() {
        let mut reader = std::io::BufReader::new(FailingReader);
        let err = MarkerFragmentParser::default().parse(&mut reader).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
