/*
 * mod.rs
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

//! Header fields: the raw name/body pair, the line accumulators that assemble it, and the
//! parsers for the `Content-*` fields that shape a body.

mod builder;
mod content_disposition;
mod content_id;
mod content_type;
mod mime_version;
mod parameter;
mod parsers;

use std::cell::OnceCell;
use std::fmt;

use bytes::Bytes;

pub use builder::{FieldBuilder, LenientFieldBuilder, StrictFieldBuilder};
pub use content_disposition::{parse_content_disposition, ContentDisposition};
pub use content_id::{parse_content_id, ContentId};
pub use content_type::{parse_content_type, ContentType};
pub use mime_version::MimeVersion;
pub use parameter::{parse_parameter_list, strip_comments, Parameter};
pub use parsers::{FieldParser, FieldParsers, ParsedField};

use crate::error::{MimeError, Result};
use crate::util::{content_len, decode_header_bytes, is_field_name_char, is_whitespace, unfold};

/// One logical header field.
///
/// Fields read from input keep their raw bytes (final line terminator excluded) and resolve
/// the body from them on first access. Synthetic fields carry the body directly.
#[derive(Clone)]
pub struct RawField {
    name: String,
    body: OnceCell<String>,
    raw: Option<Bytes>,
    delimiter_idx: usize,
    obsolete: bool,
}

impl RawField {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        let name = name.into();
        let delimiter_idx = name.len();
        Self {
            name,
            body: OnceCell::from(body.into()),
            raw: None,
            delimiter_idx,
            obsolete: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unfolded value: CR and LF removed, one space after the colon skipped.
    pub fn body(&self) -> &str {
        self.body.get_or_init(|| {
            let raw = self.raw.as_deref().unwrap_or_default();
            let mut off = self.delimiter_idx + 1;
            if raw.len() > off + 1 && is_whitespace(raw[off]) {
                off += 1;
            }
            let slice = raw.get(off..).unwrap_or_default();
            unfold(&decode_header_bytes(&slice[..content_len(slice)]))
        })
    }

    pub fn raw(&self) -> Option<&Bytes> {
        self.raw.as_ref()
    }

    /// Offset of the `:` within the raw bytes.
    pub fn delimiter_idx(&self) -> usize {
        self.delimiter_idx
    }

    /// Whitespace between the name and the colon.
    pub fn is_obsolete_syntax(&self) -> bool {
        self.obsolete
    }

    /// Resolves the body and drops the raw bytes.
    pub(crate) fn detach(self) -> Self {
        let body = self.body().to_owned();
        Self {
            body: OnceCell::from(body),
            raw: None,
            ..self
        }
    }
}

impl fmt::Debug for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawField")
            .field("name", &self.name)
            .field("body", &self.body())
            .field("obsolete", &self.obsolete)
            .finish()
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.body())
    }
}

/// Splits `raw` into name and body at the first colon.
/// Blanks between the name and the colon are accepted and flagged as obsolete syntax.
pub fn parse_raw_field(raw: Bytes) -> Result<RawField> {
    let name_end = raw.iter().position(|&b| !is_field_name_char(b)).unwrap_or(raw.len());
    let mut pos = name_end;
    while pos < raw.len() && matches!(raw[pos], b' ' | b'\t') {
        pos += 1;
    }
    if name_end == 0 || pos >= raw.len() || raw[pos] != b':' {
        let text = decode_header_bytes(&raw[..content_len(&raw)]);
        return Err(MimeError::InvalidField(format!(
            "no name/value separator found: {text}"
        )));
    }
    let name = String::from_utf8_lossy(&raw[..name_end]).into_owned();
    Ok(RawField {
        name,
        body: OnceCell::new(),
        raw: Some(raw),
        delimiter_idx: pos,
        obsolete: pos > name_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &'static [u8]) -> RawField {
        parse_raw_field(Bytes::from_static(raw)).unwrap()
    }

    #[test]
    fn name_and_body() {
        let field = split(b"Subject: hello world");
        assert_eq!(field.name(), "Subject");
        assert_eq!(field.body(), "hello world");
        assert_eq!(field.delimiter_idx(), 7);
        assert!(!field.is_obsolete_syntax());
    }

    #[test]
    fn folded_body() {
        let field = split(b"Subject: hello\r\n world\r\n");
        assert_eq!(field.body(), "hello world");
        assert_eq!(&field.raw().unwrap()[..], b"Subject: hello\r\n world\r\n");
    }

    #[test]
    fn only_one_space_skipped() {
        assert_eq!(split(b"X-Pad:   three").body(), "  three");
        assert_eq!(split(b"X-Tight:value").body(), "value");
        assert_eq!(split(b"X-Empty:").body(), "");
    }

    #[test]
    fn obsolete_syntax() {
        let field = split(b"Subject \t: old style");
        assert_eq!(field.name(), "Subject");
        assert!(field.is_obsolete_syntax());
        assert_eq!(field.delimiter_idx(), 9);
        assert_eq!(field.body(), "old style");
    }

    #[test]
    fn invalid_fields() {
        for raw in [&b"no colon here"[..], b": no name", b"Bad Name: value", b""] {
            let err = parse_raw_field(Bytes::copy_from_slice(raw)).unwrap_err();
            assert!(matches!(err, MimeError::InvalidField(_)), "{raw:?}");
        }
    }

    #[test]
    fn synthetic_field() {
        let field = RawField::new("Content-Type", "text/html");
        assert!(field.raw().is_none());
        assert_eq!(field.body(), "text/html");
        assert_eq!(field.to_string(), "Content-Type: text/html");
    }

    #[test]
    fn non_utf8_body() {
        assert_eq!(split(b"Subject: caf\xe9").body(), "caf\u{e9}");
    }
}
