//! Pattern tokens and their typed segments.
//!
//! # Syntax
//! ```text
//! literal          exact match
//! {name}           one path segment
//! {name:regex}     one path segment matching ^(?:regex)$
//! {name?}          optional flag recorded, matched like {name}
//! *                remainder of the path, bound to "wildcard"
//! user-{id}        mixed token compiled to one regex (first name only)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::routing::error::{RouteError, RouteResult};

/// Name under which a wildcard capture is bound.
pub const WILDCARD_PARAM: &str = "wildcard";

/// Pattern that matches any single segment inside a mixed token.
const ANY_SEGMENT: &str = "[^/]+";

/// An anchored regular expression restricting a parameter.
#[derive(Clone)]
pub struct Constraint {
    source: String,
    regex: Regex,
}

impl Constraint {
    /// Anchor `pattern` and compile it.
    fn anchored(param: &str, pattern: &str) -> RouteResult<Self> {
        Self::compile(param, pattern, format!("^(?:{pattern})$"))
    }

    fn compile(param: &str, source: &str, full: String) -> RouteResult<Self> {
        let regex = Regex::new(&full).map_err(|source_err| RouteError::InvalidConstraint {
            param: param.to_string(),
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written (or the generated expression for mixed tokens).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Constraint {}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint").field(&self.source).finish()
    }
}

/// A named parameter segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSegment {
    pub name: String,
    pub constraint: Option<Constraint>,
    pub optional: bool,
}

/// One compiled `/`-delimited token of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    Static(String),
    Parameter(ParamSegment),
    Wildcard,
}

impl RouteSegment {
    /// Parse one pattern token, applying any matching entry from `constraints`.
    pub fn parse(token: &str, constraints: &BTreeMap<String, String>) -> RouteResult<Self> {
        if token == "*" {
            return Ok(RouteSegment::Wildcard);
        }

        let pieces = split_groups(token);
        match pieces.as_slice() {
            [Piece::Group(inner)] => {
                let spec = GroupSpec::parse(inner);
                let pattern = constraints.get(spec.name).map(String::as_str).or(spec.pattern);
                let constraint = pattern
                    .map(|p| Constraint::anchored(spec.name, p))
                    .transpose()?;
                Ok(RouteSegment::Parameter(ParamSegment {
                    name: spec.name.to_string(),
                    constraint,
                    optional: spec.optional,
                }))
            }
            _ if pieces.iter().any(|p| matches!(p, Piece::Group(_))) => {
                parse_mixed(token, &pieces, constraints)
            }
            _ => Ok(RouteSegment::Static(token.to_string())),
        }
    }

    /// True for parameter segments carrying a regex.
    pub fn is_constrained(&self) -> bool {
        matches!(self, RouteSegment::Parameter(p) if p.constraint.is_some())
    }
}

/// Build the single regex for a token such as `user-{id}` or `{a}-{b:\d+}`.
///
/// Only the first group's name survives; the whole segment is bound to it.
fn parse_mixed(
    token: &str,
    pieces: &[Piece<'_>],
    constraints: &BTreeMap<String, String>,
) -> RouteResult<RouteSegment> {
    let mut full = String::from("^");
    let mut first: Option<GroupSpec<'_>> = None;

    for piece in pieces {
        match piece {
            Piece::Literal(text) => full.push_str(&regex::escape(text)),
            Piece::Group(inner) => {
                let spec = GroupSpec::parse(inner);
                let pattern = constraints
                    .get(spec.name)
                    .map(String::as_str)
                    .or(spec.pattern)
                    .unwrap_or(ANY_SEGMENT);
                full.push('(');
                full.push_str(pattern);
                full.push(')');
                if first.is_none() {
                    first = Some(spec);
                }
            }
        }
    }
    full.push('$');

    let Some(spec) = first else {
        return Ok(RouteSegment::Static(token.to_string()));
    };
    let constraint = Constraint::compile(spec.name, &full, full.clone())?;
    Ok(RouteSegment::Parameter(ParamSegment {
        name: spec.name.to_string(),
        constraint: Some(constraint),
        optional: spec.optional,
    }))
}

#[derive(Debug, PartialEq)]
enum Piece<'a> {
    Literal(&'a str),
    /// Text between a `{` and its balancing `}`.
    Group(&'a str),
}

/// Split a token into literal runs and brace groups, honoring nested braces
/// inside patterns such as `{code:\d{3}}`. An unbalanced `{` is literal.
fn split_groups(token: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let bytes = token.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let mut depth = 0usize;
        let mut close = None;
        for (j, &b) in bytes.iter().enumerate().skip(i) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(j);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else { break };

        if literal_start < i {
            pieces.push(Piece::Literal(&token[literal_start..i]));
        }
        pieces.push(Piece::Group(&token[i + 1..close]));
        i = close + 1;
        literal_start = i;
    }

    if literal_start < token.len() {
        pieces.push(Piece::Literal(&token[literal_start..]));
    }
    pieces
}

/// `name`, `name?`, `name:pattern` or `name?:pattern`.
struct GroupSpec<'a> {
    name: &'a str,
    pattern: Option<&'a str>,
    optional: bool,
}

impl<'a> GroupSpec<'a> {
    fn parse(inner: &'a str) -> Self {
        let (head, pattern) = match inner.split_once(':') {
            Some((head, pattern)) => (head, Some(pattern)),
            None => (inner, None),
        };
        let head = head.trim();
        let (name, optional) = match head.strip_suffix('?') {
            Some(name) => (name, true),
            None => (head, false),
        };
        Self {
            name,
            pattern,
            optional,
        }
    }
}
