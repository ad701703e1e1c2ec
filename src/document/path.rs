//! Path expressions addressing a key inside a document.
//!
//! Grammar, jq/yq style:
//!
//! ```text
//! metadata.version                               -> ["metadata", "version"]
//! .metadata.version                              -> ["metadata", "version"]
//! metadata.annotations["backstage.io/version"]   -> ["metadata", "annotations", "backstage.io/version"]
//! metadata['key.with.dots'].nested               -> ["metadata", "key.with.dots", "nested"]
//! ```
//!
//! Every segment is matched as an exact key. Keys containing `.` must be
//! bracket-quoted; there is no escaping inside the quotes.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::document::{Mapping, Node};
use crate::error::{MonobumpError, Result};

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    raw: String,
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parse a path expression into key segments
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(MonobumpError::malformed_path(path, "empty path"));
        }

        let mut chars = path.chars().peekable();
        let mut segments = Vec::new();
        let mut current = String::new();

        // Optional leading dot.
        if chars.peek() == Some(&'.') {
            chars.next();
        }

        while let Some(c) = chars.next() {
            match c {
                '.' => flush(&mut current, &mut segments),
                '[' => {
                    flush(&mut current, &mut segments);
                    segments.push(bracket_literal(path, &mut chars)?);
                    if chars.peek() == Some(&'.') {
                        chars.next();
                    }
                }
                other => current.push(other),
            }
        }
        flush(&mut current, &mut segments);

        if segments.is_empty() {
            return Err(MonobumpError::malformed_path(path, "path contains no segments"));
        }

        Ok(DocumentPath {
            raw: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The expression as written by the user
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Look up the node at this path
    pub fn get<'a>(&self, root: &'a Mapping) -> Result<&'a Node> {
        let (last, parents) = self.split();
        let mut map = root;
        for segment in parents {
            map = descend(map.get(segment), segment)?;
        }
        map.get(last).ok_or_else(|| key_not_found(last))
    }

    /// Look up a string leaf at this path
    pub fn get_str<'a>(&self, root: &'a Mapping) -> Result<&'a str> {
        self.get(root)?
            .as_str()
            .ok_or_else(|| MonobumpError::NotAString {
                path: self.raw.clone(),
            })
    }

    /// Replace the value at this path. The key must already exist.
    pub fn set(&self, root: &mut Mapping, value: Node) -> Result<()> {
        let (last, parents) = self.split();
        let mut map = root;
        for segment in parents {
            map = match map.get_mut(segment) {
                Some(Node::Mapping(nested)) => nested,
                Some(_) => return Err(not_a_map(segment)),
                None => return Err(key_not_found(segment)),
            };
        }

        let slot = map.get_mut(last).ok_or_else(|| key_not_found(last))?;
        *slot = value;
        Ok(())
    }

    fn split(&self) -> (&String, &[String]) {
        // parse() guarantees at least one segment
        match self.segments.split_last() {
            Some(parts) => parts,
            None => unreachable!("DocumentPath without segments"),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn flush(current: &mut String, segments: &mut Vec<String>) {
    if !current.is_empty() {
        segments.push(std::mem::take(current));
    }
}

/// Read `"literal"]` or `'literal']` following an opening bracket
fn bracket_literal(path: &str, chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let quote = match chars.next() {
        None => {
            return Err(MonobumpError::malformed_path(
                path,
                "unexpected end of path after '['",
            ))
        }
        Some(q @ ('"' | '\'')) => q,
        Some(other) => {
            return Err(MonobumpError::malformed_path(
                path,
                format!("expected quote character after '[', got '{}'", other),
            ))
        }
    };

    let mut literal = String::new();
    loop {
        match chars.next() {
            None => {
                return Err(MonobumpError::malformed_path(
                    path,
                    "unclosed string in bracket notation",
                ))
            }
            Some(c) if c == quote => break,
            Some(c) => literal.push(c),
        }
    }

    match chars.next() {
        Some(']') => Ok(literal),
        _ => Err(MonobumpError::malformed_path(
            path,
            "expected ']' to close bracket notation",
        )),
    }
}

fn descend<'a>(node: Option<&'a Node>, segment: &str) -> Result<&'a Mapping> {
    match node {
        Some(Node::Mapping(nested)) => Ok(nested),
        Some(_) => Err(not_a_map(segment)),
        None => Err(key_not_found(segment)),
    }
}

fn key_not_found(segment: &str) -> MonobumpError {
    MonobumpError::KeyNotFound {
        key: segment.to_string(),
    }
}

fn not_a_map(segment: &str) -> MonobumpError {
    MonobumpError::NotAMap {
        key: segment.to_string(),
    }
}
