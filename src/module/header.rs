//! Locating module headers inside arbitrary source text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
    static ref RE_LINE_COMMENT: Regex = Regex::new(r"//[^\n]*").unwrap();
    static ref RE_ENDMODULE: Regex = Regex::new(r"\bendmodule\b").unwrap();
    static ref RE_MODULE: Regex = Regex::new(r"\bmodule\s+(\w+)").unwrap();
}

/// A `module name #(...) (...)` header with balanced parentheses.
struct Candidate<'a> {
    name: &'a str,
    start: usize,
    port_section: &'a str,
    has_parameters: bool,
    /// The port list is followed by `;`.
    terminated: bool,
}

type HeaderShape = fn(&Candidate) -> bool;

/// Header shapes, most specific first.
const HEADER_SHAPES: [(&str, HeaderShape); 3] = [
    ("ansi", ansi_shape),
    ("parenthesized", parenthesized_shape),
    ("minimal", minimal_shape),
];

fn ansi_shape(c: &Candidate) -> bool {
    c.terminated && !c.port_section.contains(';')
}

fn parenthesized_shape(c: &Candidate) -> bool {
    !c.port_section.trim().is_empty()
}

fn minimal_shape(c: &Candidate) -> bool {
    !c.has_parameters
}

/// A module header found in the source together with the text it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleHeader<'a> {
    pub name: &'a str,
    /// Text between the header parentheses.
    pub port_section: &'a str,
    /// From the `module` keyword up to and including `endmodule`.
    pub body: &'a str,
}

/// Blank out comments. Newlines inside block comments are kept so
/// that line structure survives.
pub fn strip_comments(source: &str) -> String {
    let without_blocks = RE_BLOCK_COMMENT.replace_all(source, |caps: &regex::Captures| {
        caps[0].chars()
            .filter(|c| *c == '\n')
            .collect::<String>()
    });

    RE_LINE_COMMENT.replace_all(&without_blocks, "").into_owned()
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..].find(|c: char| !c.is_whitespace())
        .map_or(text.len(), |offset| pos + offset)
}

/// Position of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn candidate<'a>(source: &'a str, caps: &regex::Captures<'a>) -> Option<Candidate<'a>> {
    let whole = caps.get(0)?;
    let mut pos = skip_whitespace(source, whole.end());

    let has_parameters = source[pos..].starts_with('#');
    if has_parameters {
        pos = skip_whitespace(source, pos + 1);
        if !source[pos..].starts_with('(') {
            return None;
        }
        pos = skip_whitespace(source, matching_paren(source, pos)? + 1);
    }

    if !source[pos..].starts_with('(') {
        return None;
    }
    let close = matching_paren(source, pos)?;
    let after = skip_whitespace(source, close + 1);

    Some(Candidate {
        name: caps.get(1)?.as_str(),
        start: whole.start(),
        port_section: &source[pos + 1..close],
        has_parameters,
        terminated: source[after..].starts_with(';'),
    })
}

/// Find the last module header of the first shape that matches
/// anything at all.
pub fn find_module(source: &str) -> Option<ModuleHeader<'_>> {
    let candidates: Vec<_> = RE_MODULE.captures_iter(source)
        .filter_map(|caps| candidate(source, &caps))
        .collect();

    for (label, shape) in HEADER_SHAPES.iter() {
        if let Some(c) = candidates.iter().rev().find(|c| shape(c)) {
            let rest = &source[c.start..];
            let body = match RE_ENDMODULE.find(rest) {
                Some(end) => &rest[..end.end()],
                None => rest,
            };

            clilog::debug!(D_MOD_HEADER, "module '{}' matched by {} header", c.name, label);

            return Some(ModuleHeader { name: c.name, port_section: c.port_section, body });
        }
    }

    None
}
