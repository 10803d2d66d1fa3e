/*
 * util.rs
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

//! Character classes and small helpers shared by the field, descriptor and stream layers
//! (RFC 2045 token, RFC 2046 boundary, RFC 5322 field name).

/// Checks if a character is valid in an RFC 2045 token.
#[inline]
pub fn is_token_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

/// Checks if the string is a valid RFC 2045 token (1+ token chars).
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Checks if a character is valid in a MIME boundary (RFC 2046).
#[inline]
pub fn is_boundary_char(c: u8) -> bool {
    matches!(c,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' |
        b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' |
        b'/' | b':' | b'=' | b'?' | b' '
    )
}

/// Validates MIME boundary: 1-70 chars from boundary set, not ending in space (RFC 2046).
pub fn is_valid_boundary(boundary: &str) -> bool {
    let b = boundary.as_bytes();
    (1..=70).contains(&b.len())
        && b.iter().copied().all(is_boundary_char)
        && b.last() != Some(&b' ')
}

/// Printable US-ASCII except colon (RFC 5322 ftext).
#[inline]
pub fn is_field_name_char(c: u8) -> bool {
    matches!(c, 0x21..=0x39 | 0x3b..=0x7e)
}

/// SP, HT, CR or LF.
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

/// Length of `line` without its trailing LF or CRLF.
pub fn content_len(line: &[u8]) -> usize {
    let mut len = line.len();
    if len > 0 && line[len - 1] == b'\n' {
        len -= 1;
        if len > 0 && line[len - 1] == b'\r' {
            len -= 1;
        }
    }
    len
}

/// Header bytes to string: UTF-8 when valid, otherwise each byte as ISO-8859-1.
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Removes the CR and LF characters of folded header lines, keeping the fold whitespace.
pub fn unfold(s: &str) -> String {
    if !s.contains(['\r', '\n']) {
        return s.to_owned();
    }
    s.chars().filter(|&c| c != '\r' && c != '\n').collect()
}

pub fn is_same_mime_type(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.eq_ignore_ascii_case(b))
}

/// True for any `multipart/*` type.
pub fn is_multipart(mime_type: &str) -> bool {
    mime_type
        .get(..10)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart/"))
}

/// True for `message/*` types that encapsulate a complete message.
/// `message/partial` and `message/external-body` carry fragments or references instead.
pub fn is_message(mime_type: &str) -> bool {
    let Some((media, sub)) = mime_type.split_once('/') else {
        return false;
    };
    media.eq_ignore_ascii_case("message")
        && !sub.is_empty()
        && !sub.eq_ignore_ascii_case("partial")
        && !sub.eq_ignore_ascii_case("external-body")
}
