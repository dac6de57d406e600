//! Tokenizer for revision expressions.
//!
//! Splits a spec into a Base (the leading name) and a sequence of suffix
//! operators. Brace bodies (`@{…}`, `^{…}`) are matched with nesting so
//! regex bodies pass through opaquely.

use rev_object::ObjectType;

use crate::ResolveError;

/// All-digit `@{…}` bodies at or above this value are timestamps, below it
/// reflog ordinals (mirrors the approxidate cutoff in C git's date parser).
const ORDINAL_CUTOFF: u64 = 100_000_000;

/// A suffix operator, applied left to right to the current object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `^` or `^n`: nth parent (`^0` peels to a commit in place).
    Parent(usize),
    /// `^{}`: unwrap tag chains.
    PeelUnwrap,
    /// `^{commit}`, `^{tree}`, `^{blob}`, `^{tag}`.
    PeelKind(ObjectType),
    /// `^{/pattern}`: history search from the current commit.
    MessageSearch(String),
    /// `~` or `~n`: nth first-parent ancestor.
    Ancestor(usize),
    /// `@{n}`: reflog entry by ordinal.
    ReflogOrdinal(usize),
    /// `@{<date>}`: reflog entry in effect at a point in time (raw body).
    ReflogDate(String),
    /// `@{-n}`: nth previously checked-out branch.
    PriorCheckout(usize),
    /// `@{u}` / `@{upstream}`.
    Upstream,
    /// `:path`: always the final operator, consumes the rest of the spec.
    Path(String),
}

/// A lexed revision expression.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed<'a> {
    /// `:/pattern`: the whole spec is a repository-wide message search.
    AllRefsSearch(&'a str),
    /// `Base Suffix*`.
    Spec { base: &'a str, tokens: Vec<Token> },
}

pub(crate) fn tokenize(spec: &str) -> Result<Parsed<'_>, ResolveError> {
    if spec.is_empty() {
        return Err(ResolveError::Invalid("empty expression".into()));
    }

    if let Some(pattern) = spec.strip_prefix(":/") {
        if pattern.is_empty() {
            return Err(ResolveError::Invalid(
                "':/' requires a search pattern".into(),
            ));
        }
        return Ok(Parsed::AllRefsSearch(pattern));
    }

    if spec == ":" {
        return Err(ResolveError::Invalid("':' names nothing".into()));
    }

    let bytes = spec.as_bytes();
    let base_end = scan_base(bytes);
    let base = &spec[..base_end];

    let mut tokens = Vec::new();
    let mut pos = base_end;

    while pos < bytes.len() {
        match bytes[pos] {
            b'^' => {
                pos += 1;
                if pos < bytes.len() && bytes[pos] == b'{' {
                    let (body, next) = braced_body(spec, pos)?;
                    tokens.push(caret_braced(body)?);
                    pos = next;
                } else {
                    let (n, next) = suffix_count(spec, pos, '^')?;
                    tokens.push(Token::Parent(n));
                    pos = next;
                }
            }
            b'~' => {
                pos += 1;
                let (n, next) = suffix_count(spec, pos, '~')?;
                tokens.push(Token::Ancestor(n));
                pos = next;
            }
            b'@' => {
                // In operator position '@' is always '@{…}': a bare '@'
                // would have been consumed by the base scan.
                if pos + 1 >= bytes.len() || bytes[pos + 1] != b'{' {
                    return Err(ResolveError::Invalid(format!(
                        "stray '@' at offset {} in '{}'",
                        pos, spec
                    )));
                }
                let (body, next) = braced_body(spec, pos + 1)?;
                tokens.push(at_braced(body)?);
                pos = next;
            }
            b':' => {
                // The rest of the spec is the path, verbatim.
                tokens.push(Token::Path(spec[pos + 1..].to_string()));
                pos = bytes.len();
            }
            other => {
                return Err(ResolveError::Invalid(format!(
                    "unexpected '{}' at offset {} in '{}'",
                    other as char, pos, spec
                )));
            }
        }
    }

    Ok(Parsed::Spec { base, tokens })
}

/// Length of the Base: everything up to the first operator introducer.
/// `@` only introduces an operator when followed by `{`.
fn scan_base(bytes: &[u8]) -> usize {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'^' | b'~' | b':' => break,
            b'@' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => break,
            _ => i += 1,
        }
    }
    i
}

/// Read a `{…}` body starting at the opening brace. Braces nest.
/// Returns the body and the position just past the closing brace.
fn braced_body(spec: &str, open: usize) -> Result<(&str, usize), ResolveError> {
    debug_assert_eq!(spec.as_bytes()[open], b'{');
    let bytes = spec.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&spec[open + 1..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(ResolveError::Invalid(format!(
        "unterminated brace in '{}'",
        spec
    )))
}

/// Parse the optional count after `^` or `~`. Defaults to 1.
/// The digits must be followed by another operator or the end of the spec.
fn suffix_count(spec: &str, pos: usize, op: char) -> Result<(usize, usize), ResolveError> {
    let bytes = spec.as_bytes();

    if pos < bytes.len() && bytes[pos] == b'-' {
        return Err(ResolveError::Invalid(format!(
            "'{}' does not take a negative count in '{}'",
            op, spec
        )));
    }

    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    let n = if end == pos {
        1
    } else {
        spec[pos..end]
            .parse()
            .map_err(|_| ResolveError::Invalid(format!("count out of range in '{}'", spec)))?
    };

    // Whatever follows must start another operator.
    if end < bytes.len() {
        let ok = match bytes[end] {
            b'^' | b'~' | b':' => true,
            b'@' => end + 1 < bytes.len() && bytes[end + 1] == b'{',
            _ => false,
        };
        if !ok {
            return Err(ResolveError::Invalid(format!(
                "trailing garbage after '{}' in '{}'",
                op, spec
            )));
        }
    }

    Ok((n, end))
}

/// Classify a `^{…}` body.
fn caret_braced(body: &str) -> Result<Token, ResolveError> {
    if body.is_empty() {
        return Ok(Token::PeelUnwrap);
    }
    if let Some(pattern) = body.strip_prefix('/') {
        return Ok(Token::MessageSearch(pattern.to_string()));
    }
    match body {
        "commit" => Ok(Token::PeelKind(ObjectType::Commit)),
        "tree" => Ok(Token::PeelKind(ObjectType::Tree)),
        "blob" => Ok(Token::PeelKind(ObjectType::Blob)),
        "tag" => Ok(Token::PeelKind(ObjectType::Tag)),
        other => Err(ResolveError::InvalidKindKeyword(other.to_string())),
    }
}

/// Classify an `@{…}` body.
fn at_braced(body: &str) -> Result<Token, ResolveError> {
    if body == "u" || body == "upstream" {
        return Ok(Token::Upstream);
    }

    if let Some(count) = body.strip_prefix('-') {
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResolveError::Invalid(format!(
                "'@{{-{}}}' is not a checkout ordinal",
                count
            )));
        }
        let n: usize = count
            .parse()
            .map_err(|_| ResolveError::Invalid(format!("'@{{-{}}}' is out of range", count)))?;
        if n == 0 {
            return Err(ResolveError::Invalid("'@{-0}' is not meaningful".into()));
        }
        return Ok(Token::PriorCheckout(n));
    }

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        // Small numbers are reflog ordinals; timestamp-sized ones are dates.
        if let Ok(n) = body.parse::<u64>() {
            if n < ORDINAL_CUTOFF {
                return Ok(Token::ReflogOrdinal(n as usize));
            }
        }
        return Ok(Token::ReflogDate(body.to_string()));
    }

    Ok(Token::ReflogDate(body.to_string()))
}
