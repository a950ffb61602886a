//! Fragment records and the header grammar shared by the default parser and
//! the ordering engine.
//!
//! ```text
//! @choice n2          header: type tag and node id
//! -|                  no fall-through to the next fragment
//! -> n5 1:0           explicit link, output port 1 to input port 0 of n5
//! id = 1              body, passed to the node serializer untouched
//! ```

use std::fmt::Write;

pub const HEADER_SIGIL: char = '@';
pub const LINK_DIRECTIVE: &str = "->";
pub const STOP_DIRECTIVE: &str = "-|";

/// An explicit connection carried by a fragment's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLink {
    pub target: String,
    pub output_port: u32,
    pub input_port: u32,
}

impl FragmentLink {
    pub fn new(target: impl Into<String>, output_port: u32, input_port: u32) -> Self {
        Self {
            target: target.into(),
            output_port,
            input_port,
        }
    }
}

/// One node's record as read from a document, before node-level decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNodeFragment {
    pub node_id: String,
    pub node_type: String,
    /// Opaque body, owned by the matching node serializer.
    pub text: String,
    pub links: Vec<FragmentLink>,
    /// Whether the fragment carried the no-fall-through directive.
    pub stop: bool,
}

impl ParsedNodeFragment {
    pub fn new(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            text: text.into(),
            links: Vec::new(),
            stop: false,
        }
    }
}

/// Header of a fragment about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentHeader {
    pub node_type: String,
    pub node_id: String,
    pub stop: bool,
    pub links: Vec<FragmentLink>,
}

impl FragmentHeader {
    pub fn new(node_type: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            node_id: node_id.into(),
            stop: false,
            links: Vec::new(),
        }
    }

    /// Header, directives and body as one fragment, without a trailing newline.
    pub fn render(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len() + 32);
        let _ = write!(out, "{}{} {}", HEADER_SIGIL, self.node_type, self.node_id);
        if self.stop {
            out.push('\n');
            out.push_str(STOP_DIRECTIVE);
        }
        for link in &self.links {
            out.push('\n');
            out.push_str(LINK_DIRECTIVE);
            out.push(' ');
            out.push_str(&link.target);
            if link.output_port != 0 || link.input_port != 0 {
                let _ = write!(out, " {}:{}", link.output_port, link.input_port);
            }
        }
        let body = body.trim_end_matches(['\n', '\r']);
        if !body.is_empty() {
            out.push('\n');
            out.push_str(body);
        }
        out
    }
}

/// Whether `token` can appear in a header (non-empty, no whitespace).
pub fn is_header_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

/// Outcome of reading one fragment's lines.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FragmentParse {
    Blank,
    Malformed(String),
    Parsed(ParsedNodeFragment),
}

pub(crate) fn parse_fragment(lines: &[String]) -> FragmentParse {
    let mut rest = lines.iter().skip_while(|l| l.trim().is_empty());
    let Some(header_line) = rest.next() else {
        return FragmentParse::Blank;
    };

    let (node_type, node_id) = match parse_header_line(header_line) {
        Ok(parts) => parts,
        Err(reason) => return FragmentParse::Malformed(reason),
    };

    let mut fragment = ParsedNodeFragment::new(node_id, node_type, String::new());
    let mut body: Vec<&str> = Vec::new();
    let mut in_directives = true;

    for line in rest {
        if in_directives {
            match parse_directive(line) {
                Some(Ok(Directive::Stop)) => {
                    fragment.stop = true;
                    continue;
                }
                Some(Ok(Directive::Link(link))) => {
                    fragment.links.push(link);
                    continue;
                }
                Some(Err(reason)) => {
                    tracing::warn!(node_id = %fragment.node_id, line = %line, "dropping directive: {}", reason);
                    continue;
                }
                None => in_directives = false,
            }
        }
        body.push(line.as_str());
    }

    while body.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
        body.pop();
    }
    fragment.text = body.join("\n");
    FragmentParse::Parsed(fragment)
}

fn parse_header_line(line: &str) -> Result<(String, String), String> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(HEADER_SIGIL) else {
        return Err(format!("expected '{}' header, found '{}'", HEADER_SIGIL, trimmed));
    };

    let mut tokens = rest.split_whitespace();
    let node_type = tokens.next().ok_or_else(|| "missing node type".to_string())?;
    let node_id = tokens.next().ok_or_else(|| "missing node id".to_string())?;
    if let Some(extra) = tokens.next() {
        tracing::trace!(node_id = %node_id, extra = %extra, "ignoring trailing header tokens");
    }
    Ok((node_type.to_string(), node_id.to_string()))
}

/// Whether the parser would read `line` as a directive when it follows a header.
pub(crate) fn is_directive_line(line: &str) -> bool {
    parse_directive(line).is_some()
}

enum Directive {
    Stop,
    Link(FragmentLink),
}

/// `None` when the line is not a directive at all.
fn parse_directive(line: &str) -> Option<Result<Directive, String>> {
    let trimmed = line.trim();
    if trimmed == STOP_DIRECTIVE {
        return Some(Ok(Directive::Stop));
    }
    let rest = trimmed.strip_prefix(LINK_DIRECTIVE)?;
    Some(parse_link(rest))
}

fn parse_link(rest: &str) -> Result<Directive, String> {
    let mut tokens = rest.split_whitespace();
    let target = tokens.next().ok_or_else(|| "link without target".to_string())?;
    let (output_port, input_port) = match tokens.next() {
        None => (0, 0),
        Some(ports) => {
            let (out, inp) = ports
                .split_once(':')
                .ok_or_else(|| format!("expected <out>:<in> ports, found '{}'", ports))?;
            let out = out
                .parse::<u32>()
                .map_err(|e| format!("bad output port '{}': {}", out, e))?;
            let inp = inp
                .parse::<u32>()
                .map_err(|e| format!("bad input port '{}': {}", inp, e))?;
            (out, inp)
        }
    };
    if tokens.next().is_some() {
        return Err("unexpected tokens after ports".to_string());
    }
    Ok(Directive::Link(FragmentLink::new(target, output_port, input_port)))
}
