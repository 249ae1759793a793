use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Rewrites free-form query text into the strict form the SPARQL engine accepts.
///
/// The rewrites run in a fixed order, each one assuming the previous ran:
/// `a` shorthand expansion, `PREFIX` line extraction, bare `http://` IRI
/// wrapping, optional prefixed-name bracketing, then re-assembly with the
/// session prefix map first and the extracted declarations after it.
pub struct QueryNormalizer {
    type_shorthand_regex: Regex,
    prefix_regex: Regex,
    bare_iri_regex: Regex,
    prefixed_name_regex: Regex,
    bracket_prefixed_names: bool,
}

impl QueryNormalizer {
    pub fn new(bracket_prefixed_names: bool) -> Result<Self, regex::Error> {
        Ok(QueryNormalizer {
            type_shorthand_regex: Regex::new(r"(^|[\s{;,(])a\s+(\w+:[\w-]+|<[^>\s]+>)")?,
            prefix_regex: Regex::new(r"(?m)^[ \t]*PREFIX\s+\w*:\s*<[^>]*>[ \t]*(?:\r?\n)?")?,
            bare_iri_regex: Regex::new(r#"http://[^\s<>"'{}]+"#)?,
            prefixed_name_regex: Regex::new(r"[A-Za-z0-9_-]+:[A-Za-z0-9_-]+")?,
            bracket_prefixed_names,
        })
    }

    pub fn normalize(&self, query: &str, prefixes: &BTreeMap<String, String>) -> String {
        let query = query.trim();

        let query = self.expand_type_shorthand(query);
        let (prefix_lines, body) = self.extract_prefixes(&query);
        let body = map_unbracketed(&body, |segment| self.wrap_bare_iris(segment));
        let body = if self.bracket_prefixed_names {
            map_unbracketed(&body, |segment| self.wrap_prefixed_names(segment))
        } else {
            body
        };

        let mut lines: Vec<String> = prefixes
            .iter()
            .map(|(prefix, namespace)| format!("PREFIX {}: <{}>", prefix, namespace))
            .collect();
        lines.extend(prefix_lines);
        lines.push(body.trim().to_string());
        lines.join("\n")
    }

    /// `?s a ex:Thing` becomes `?s rdf:type ex:Thing`.
    pub fn expand_type_shorthand(&self, query: &str) -> String {
        self.type_shorthand_regex.replace_all(query, "${1}rdf:type ${2}").into_owned()
    }

    /// Removes `PREFIX` declaration lines and returns them trimmed, in order.
    pub fn extract_prefixes(&self, query: &str) -> (Vec<String>, String) {
        let lines = self
            .prefix_regex
            .find_iter(query)
            .map(|m| m.as_str().trim().to_string())
            .collect();
        let body = self.prefix_regex.replace_all(query, "").into_owned();
        (lines, body)
    }

    fn wrap_bare_iris(&self, segment: &str) -> String {
        self.bare_iri_regex
            .replace_all(segment, |caps: &Captures| {
                let m = caps.get(0).map_or("", |m| m.as_str());
                let start = caps.get(0).map_or(0, |m| m.start());
                if preceded_by_word_char(segment, start) {
                    m.to_string()
                } else {
                    format!("<{}>", m)
                }
            })
            .into_owned()
    }

    fn wrap_prefixed_names(&self, segment: &str) -> String {
        self.prefixed_name_regex
            .replace_all(segment, |caps: &Captures| {
                let Some(m) = caps.get(0) else {
                    return String::new();
                };
                let before = segment[..m.start()].chars().next_back();
                let after = segment[m.end()..].chars().next();
                let glued_before = before.is_some_and(|c| {
                    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '/' | '#' | '.' | '?' | '$' | '@')
                });
                let glued_after = after.is_some_and(|c| matches!(c, ':' | '/'));
                let blank_node = m.as_str().starts_with("_:");
                if glued_before || glued_after || blank_node {
                    m.as_str().to_string()
                } else {
                    format!("<{}>", m.as_str())
                }
            })
            .into_owned()
    }
}

fn preceded_by_word_char(text: &str, index: usize) -> bool {
    text[..index].chars().next_back().is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Applies `rewrite` to every part of `text` outside IRI references
/// (`<...>` without whitespace) and string literals.
fn map_unbracketed(text: &str, rewrite: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut segment_start = 0;
    let mut i = 0;
    let bytes = text.as_bytes();

    while i < bytes.len() {
        let protected_end = match bytes[i] {
            b'<' => iri_reference_end(text, i),
            b'"' | b'\'' => Some(string_literal_end(text, i)),
            _ => None,
        };
        match protected_end {
            Some(end) => {
                out.push_str(&rewrite(&text[segment_start..i]));
                out.push_str(&text[i..end]);
                segment_start = end;
                i = end;
            }
            None => i += 1,
        }
    }
    out.push_str(&rewrite(&text[segment_start..]));
    out
}

/// End (exclusive) of an IRI reference starting at `start`, if it is one.
/// A lone `<` used as a comparison operator is not.
fn iri_reference_end(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start + 1..];
    let close = rest.find(|c: char| c == '>' || c == '<' || c.is_whitespace())?;
    (rest.as_bytes()[close] == b'>' && close > 0).then_some(start + 1 + close + 1)
}

fn string_literal_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
