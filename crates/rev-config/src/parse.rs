//! Line-oriented parser for the INI-style configuration format.

use bstr::{BString, ByteSlice};

use crate::{ConfigEntry, ConfigError, ConfigKey};

/// Parse configuration bytes into entries, in file order.
pub fn parse_config(data: &[u8]) -> Result<Vec<ConfigEntry>, ConfigError> {
    let mut entries = Vec::new();
    let mut section: Option<BString> = None;
    let mut subsection: Option<BString> = None;

    for (idx, raw_line) in data.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(b"[") {
            let (sec, sub) = parse_section_header(line, line_no)?;
            section = Some(sec);
            subsection = sub;
            continue;
        }

        let current_section = section.clone().ok_or(ConfigError::Parse {
            line: line_no,
            reason: "variable outside of a section".into(),
        })?;

        let (name, value) = parse_variable_line(line, line_no)?;

        entries.push(ConfigEntry {
            key: ConfigKey {
                section: lowercase(&current_section),
                subsection: subsection.clone(),
                name: lowercase(&name),
            },
            value,
        });
    }

    Ok(entries)
}

fn lowercase(s: &[u8]) -> BString {
    BString::from(s.to_ascii_lowercase())
}

/// Strip a trailing `#` or `;` comment, honoring double quotes.
fn strip_comment(line: &[u8]) -> &[u8] {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, &b) in line.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b'#' | b';' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse `[section]` or `[section "subsection"]`.
fn parse_section_header(
    line: &[u8],
    line_no: usize,
) -> Result<(BString, Option<BString>), ConfigError> {
    let close = line.rfind_byte(b']').ok_or(ConfigError::Parse {
        line: line_no,
        reason: "unterminated section header".into(),
    })?;
    let inner = line[1..close].trim();

    if let Some(quote) = inner.find_byte(b'"') {
        let section = inner[..quote].trim();
        let rest = &inner[quote + 1..];
        let end_quote = rest.rfind_byte(b'"').ok_or(ConfigError::Parse {
            line: line_no,
            reason: "unterminated subsection quote".into(),
        })?;
        let mut sub = Vec::new();
        let mut escaped = false;
        for &b in &rest[..end_quote] {
            if escaped {
                sub.push(b);
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else {
                sub.push(b);
            }
        }
        Ok((BString::from(section), Some(BString::from(sub))))
    } else {
        // Dotted form: [section.subsection]
        if let Some(dot) = inner.find_byte(b'.') {
            Ok((
                BString::from(&inner[..dot]),
                Some(BString::from(&inner[dot + 1..])),
            ))
        } else {
            Ok((BString::from(inner), None))
        }
    }
}

/// Parse `name = value` (or a bare `name`, which reads as "true").
fn parse_variable_line(
    line: &[u8],
    line_no: usize,
) -> Result<(BString, Option<BString>), ConfigError> {
    match line.find_byte(b'=') {
        None => {
            let name = line.trim();
            validate_variable_name(name, line_no)?;
            Ok((BString::from(name), None))
        }
        Some(eq) => {
            let name = line[..eq].trim();
            validate_variable_name(name, line_no)?;
            let value = unquote_value(line[eq + 1..].trim());
            Ok((BString::from(name), Some(value)))
        }
    }
}

fn validate_variable_name(name: &[u8], line_no: usize) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Parse {
            line: line_no,
            reason: "empty variable name".into(),
        });
    }
    if !name
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'-')
    {
        return Err(ConfigError::Parse {
            line: line_no,
            reason: format!(
                "invalid variable name: {}",
                String::from_utf8_lossy(name)
            ),
        });
    }
    Ok(())
}

/// Remove surrounding quotes and process backslash escapes.
fn unquote_value(value: &[u8]) -> BString {
    let mut out = Vec::with_capacity(value.len());
    let mut escaped = false;
    let mut in_quotes = false;

    for &b in value {
        if escaped {
            match b {
                b'n' => out.push(b'\n'),
                b't' => out.push(b'\t'),
                other => out.push(other),
            }
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => in_quotes = !in_quotes,
            _ => out.push(b),
        }
    }

    BString::from(out)
}
