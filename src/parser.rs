//! Pattern-based extraction of endpoints from a sector's router definition.
//!
//! The parser does not build a syntax tree. It relies on two configured regular expressions
//! and a small lexical scan that understands brackets, string literals and comments:
//!
//! 1. The *router body* pattern locates the router-construction call. The text between the
//!    call's opening bracket and its matching close becomes the body.
//! 2. The *endpoint* pattern is applied repeatedly to the body. Only matches that begin at the
//!    body's top nesting level (and outside strings and comments) are kept, so calls made
//!    inside procedure implementations are never mistaken for endpoints.

use crate::model::{EndpointInfo, OperationKind};
use log::debug;
use regex::Regex;

/// Extracts [`EndpointInfo`] values from router source text.
///
/// # Example
///
/// ```
/// use regex::Regex;
/// use sector_codegen::parser::RouterParser;
///
/// let parser = RouterParser::new(
///     Regex::new(r"router\s*\(").unwrap(),
///     Regex::new(r"(?P<name>\w+)\s*:\s*\w+(?:\.input\((?P<input>\w+)\))?\.(?P<kind>query|mutation)\(").unwrap(),
/// );
/// let endpoints = parser.parse("export const r = router({ ping: p.query(() => 'pong') });");
/// assert_eq!(endpoints[0].name, "ping");
/// ```
#[derive(Debug, Clone)]
pub struct RouterParser {
    body_pattern: Regex,
    endpoint_pattern: Regex,
}

impl RouterParser {
    pub fn new(body_pattern: Regex, endpoint_pattern: Regex) -> Self {
        Self {
            body_pattern,
            endpoint_pattern,
        }
    }

    /// Recovers endpoints in declaration order.
    ///
    /// Returns an empty list when the router body cannot be located; callers treat that as
    /// "this sector has no router".
    pub fn parse(&self, text: &str) -> Vec<EndpointInfo> {
        let Some(body) = self.isolate_body(text) else {
            debug!("Router body pattern did not match");
            return Vec::new();
        };

        let top_level = top_level_mask(body);
        let mut endpoints = Vec::new();

        for caps in self.endpoint_pattern.captures_iter(body) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            if !top_level[name.start()] {
                debug!("Skipping nested match '{}'", name.as_str());
                continue;
            }

            let kind_text = caps.name("kind").map(|m| m.as_str()).unwrap_or_default();
            let Some(kind) = OperationKind::from_method(kind_text) else {
                debug!(
                    "Skipping '{}' with unsupported operation kind '{}'",
                    name.as_str(),
                    kind_text
                );
                continue;
            };

            let mut endpoint = EndpointInfo::new(name.as_str(), kind);
            if let Some(input) = caps.name("input") {
                let symbol = input.as_str().rsplit('.').next().unwrap_or_default().trim();
                if !symbol.is_empty() {
                    endpoint = endpoint.with_input(symbol);
                }
            }
            endpoints.push(endpoint);
        }

        debug!("Extracted {} endpoints", endpoints.len());
        endpoints
    }

    /// Returns the text enclosed by the router-construction call.
    ///
    /// Only matches that start in code are considered, so a mention of the router call in a
    /// comment or string literal above the real one is passed over.
    fn isolate_body<'a>(&self, text: &'a str) -> Option<&'a str> {
        let code = code_mask(text);
        let caps = self
            .body_pattern
            .captures_iter(text)
            .find(|caps| caps.get(0).is_some_and(|m| code[m.start()]))?;
        if let Some(body) = caps.name("body") {
            return Some(body.as_str());
        }

        let whole = caps.get(0)?;
        let mut depth = net_open_brackets(whole.as_str());
        let mut start = whole.end();
        if depth == 0 {
            let offset = text[start..].find(|c: char| matches!(c, '(' | '{' | '['))?;
            start += offset + 1;
            depth = 1;
        }

        let end = find_closing(text, start, depth);
        Some(unwrap_object(&text[start..end]))
    }
}

/// Lexical state of the bracket scanner
#[derive(Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Str(u8),
    LineComment,
    BlockComment,
    /// Regular-expression literal; `true` while inside a `[...]` class
    Regex(bool),
}

/// Punctuators after which a `/` starts a regular-expression literal rather than a division
const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};";

/// Keywords after which a `/` starts a regular-expression literal
const REGEX_KEYWORDS: &[&[u8]] = &[b"return", b"typeof", b"case", b"throw"];

/// Whether a `/` following the code byte at `last` (if any) begins a regex literal.
fn regex_allowed(bytes: &[u8], last: Option<usize>) -> bool {
    let Some(last) = last else {
        return true;
    };
    let b = bytes[last];
    if REGEX_PRECEDERS.contains(&b) {
        return true;
    }
    // `=> /re/`
    if b == b'>' && last > 0 && bytes[last - 1] == b'=' {
        return true;
    }
    REGEX_KEYWORDS.iter().any(|kw| {
        let end = last + 1;
        end >= kw.len()
            && &bytes[end - kw.len()..end] == *kw
            && (end == kw.len() || !is_word_byte(bytes[end - kw.len() - 1]))
    })
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Walks `text` and reports, for each byte, its nesting depth and whether it is code.
fn scan<F: FnMut(usize, usize, bool)>(text: &str, initial_depth: usize, mut visit: F) {
    let bytes = text.as_bytes();
    let mut state = Lex::Code;
    let mut depth = initial_depth;
    // last non-whitespace code byte, or the closing delimiter of the last literal
    let mut last: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            Lex::Code => match b {
                b'\'' | b'"' | b'`' => {
                    visit(i, depth, false);
                    state = Lex::Str(b);
                }
                b'/' if next == Some(b'/') => {
                    visit(i, depth, false);
                    state = Lex::LineComment;
                }
                b'/' if next == Some(b'*') => {
                    visit(i, depth, false);
                    visit(i + 1, depth, false);
                    state = Lex::BlockComment;
                    i += 1;
                }
                b'/' if regex_allowed(bytes, last) => {
                    visit(i, depth, false);
                    state = Lex::Regex(false);
                }
                b'(' | b'{' | b'[' => {
                    visit(i, depth, true);
                    depth += 1;
                    last = Some(i);
                }
                b')' | b'}' | b']' => {
                    depth = depth.saturating_sub(1);
                    visit(i, depth, true);
                    last = Some(i);
                }
                _ => {
                    visit(i, depth, true);
                    if !b.is_ascii_whitespace() {
                        last = Some(i);
                    }
                }
            },
            Lex::Str(quote) => {
                visit(i, depth, false);
                if b == b'\\' {
                    if i + 1 < bytes.len() {
                        visit(i + 1, depth, false);
                    }
                    i += 1;
                } else if b == quote {
                    state = Lex::Code;
                    last = Some(i);
                }
            }
            Lex::LineComment => {
                visit(i, depth, false);
                if b == b'\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                visit(i, depth, false);
                if b == b'*' && next == Some(b'/') {
                    visit(i + 1, depth, false);
                    state = Lex::Code;
                    i += 1;
                }
            }
            Lex::Regex(in_class) => {
                visit(i, depth, false);
                match b {
                    b'\\' => {
                        if i + 1 < bytes.len() {
                            visit(i + 1, depth, false);
                        }
                        i += 1;
                    }
                    b'[' => state = Lex::Regex(true),
                    b']' if in_class => state = Lex::Regex(false),
                    b'/' if !in_class => {
                        state = Lex::Code;
                        last = Some(i);
                    }
                    // a regex literal cannot span lines; recover at the line end
                    b'\n' => state = Lex::Code,
                    _ => {}
                }
            }
        }
        i += 1;
    }
}

/// Marks the bytes of `text` that are code rather than comment or literal.
fn code_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len() + 1];
    scan(text, 0, |i, _, is_code| {
        mask[i] = is_code;
    });
    mask
}

/// Marks the bytes of `body` that are code at nesting depth zero.
fn top_level_mask(body: &str) -> Vec<bool> {
    let mut mask = vec![false; body.len() + 1];
    scan(body, 0, |i, depth, is_code| {
        mask[i] = is_code && depth == 0;
    });
    mask
}

fn net_open_brackets(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut net: isize = 0;
    scan(text, 0, |i, _, is_code| {
        if is_code {
            match bytes[i] {
                b'(' | b'{' | b'[' => net += 1,
                b')' | b'}' | b']' => net -= 1,
                _ => {}
            }
        }
    });
    net.max(0) as usize
}

/// Strips one object literal wrapping the whole call body, as in `router({ ... })`.
fn unwrap_object(body: &str) -> &str {
    let trimmed = body.trim_start();
    if !trimmed.starts_with('{') {
        return body;
    }
    let open = body.len() - trimmed.len();
    let close = find_closing(body, open + 1, 1);
    &body[open + 1..close]
}

/// Byte offset of the bracket closing a call whose body starts at `start`, or `text.len()`.
fn find_closing(text: &str, start: usize, depth: usize) -> usize {
    let tail = &text[start..];
    let bytes = tail.as_bytes();
    let mut end = None;
    scan(tail, depth, |i, d, is_code| {
        if end.is_none() && is_code && d + 1 == depth && matches!(bytes[i], b')' | b'}' | b']') {
            end = Some(i);
        }
    });
    start + end.unwrap_or(tail.len())
}
