/*
 * parameter.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mimestream, a streaming MIME parser.
 *
 * Mimestream is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mimestream is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mimestream.  If not, see <http://www.gnu.org/licenses/>.
 */

//! `name=value` parameters of structured MIME fields (RFC 2045 section 5.1).

use std::borrow::Cow;

use crate::util::is_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Removes parenthesised comments outside quoted strings. Comments nest.
pub fn strip_comments(value: &str) -> Cow<'_, str> {
    if !value.contains('(') {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len());
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            escaped = false;
            if depth == 0 {
                out.push(c);
            }
            continue;
        }
        match c {
            '\\' if quoted || depth > 0 => {
                escaped = true;
                if depth == 0 {
                    out.push(c);
                }
            }
            '"' if depth == 0 => {
                quoted = !quoted;
                out.push(c);
            }
            '(' if !quoted => depth += 1,
            ')' if !quoted && depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Parses `; name=value; name="quoted value"`. Parameters without a value or with a
/// non-token name are skipped. Unquoted values run to the next semicolon.
pub fn parse_parameter_list(params: &str) -> Vec<Parameter> {
    let bytes = params.as_bytes();
    let len = bytes.len();
    let mut parameters = Vec::new();
    let mut pos = 0;
    loop {
        while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
            pos += 1;
        }
        if pos >= len {
            break;
        }
        let name_start = pos;
        while pos < len && bytes[pos] != b'=' && bytes[pos] != b';' {
            pos += 1;
        }
        let name = params[name_start..pos].trim();
        if pos >= len || bytes[pos] == b';' {
            continue;
        }
        pos += 1;
        while pos < len && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
        let value = if pos < len && bytes[pos] == b'"' {
            pos += 1;
            let mut value = Vec::new();
            while pos < len {
                match bytes[pos] {
                    b'\\' if pos + 1 < len => {
                        value.push(bytes[pos + 1]);
                        pos += 2;
                    }
                    b'"' => {
                        pos += 1;
                        break;
                    }
                    b => {
                        value.push(b);
                        pos += 1;
                    }
                }
            }
            while pos < len && bytes[pos] != b';' {
                pos += 1;
            }
            String::from_utf8_lossy(&value).into_owned()
        } else {
            let start = pos;
            while pos < len && bytes[pos] != b';' {
                pos += 1;
            }
            params[start..pos].trim().to_owned()
        };
        if is_token(name) {
            parameters.push(Parameter::new(name, value));
        }
    }
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &str) -> Vec<(String, String)> {
        parse_parameter_list(params)
            .into_iter()
            .map(|p| (p.name().to_owned(), p.value().to_owned()))
            .collect()
    }

    #[test]
    fn quoted_and_unquoted() {
        assert_eq!(
            pairs(r#" charset=UTF-8; name="my \"file\"; v2.txt" ;format = flowed"#),
            vec![
                ("charset".into(), "UTF-8".into()),
                ("name".into(), r#"my "file"; v2.txt"#.into()),
                ("format".into(), "flowed".into()),
            ]
        );
    }

    #[test]
    fn unquoted_non_token_value() {
        assert_eq!(
            pairs("boundary=----=_Part_0_1.2"),
            vec![("boundary".into(), "----=_Part_0_1.2".into())]
        );
    }

    #[test]
    fn skips_broken_parameters() {
        assert_eq!(pairs("novalue; bad name=x; ok=1;"), vec![("ok".into(), "1".into())]);
        assert!(pairs("").is_empty());
    }

    #[test]
    fn comments() {
        assert_eq!(strip_comments("1.0 (produced by (nested) tool)"), "1.0 ");
        assert_eq!(strip_comments(r#""(kept)" x(y)"#), r#""(kept)" x"#);
        assert!(matches!(strip_comments("plain"), Cow::Borrowed(_)));
    }
}
