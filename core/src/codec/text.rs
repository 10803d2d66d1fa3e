/*
 * text.rs
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

use std::io::{self, Read};

use encoding_rs::{CoderResult, Decoder, Encoding};

use crate::error::{MimeError, Result};

const DEFAULT_CHARSET: &str = "us-ascii";
const CHUNK_SIZE: usize = 4096;

/// Character view of a byte stream: reads yield UTF-8 decoded from the declared charset.
pub struct TextReader<R> {
    inner: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    chunk: Box<[u8]>,
    decoded: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read> TextReader<R> {
    /// Fails with [`MimeError::UnsupportedCharset`] for labels the WHATWG registry does not know.
    /// `None` means `us-ascii`.
    pub fn new(inner: R, charset: Option<&str>) -> Result<Self> {
        let label = charset.map(str::trim).unwrap_or(DEFAULT_CHARSET);
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| MimeError::UnsupportedCharset(label.to_owned()))?;
        Ok(Self {
            inner,
            encoding,
            decoder: encoding.new_decoder_with_bom_removal(),
            chunk: vec![0; CHUNK_SIZE].into_boxed_slice(),
            decoded: Vec::new(),
            pos: 0,
            finished: false,
        })
    }

    /// Canonical name of the charset in use.
    pub fn charset(&self) -> &'static str {
        self.encoding.name()
    }

    fn decode_next(&mut self) -> io::Result<()> {
        let n = self.inner.read(&mut self.chunk)?;
        let last = n == 0;
        let capacity = self
            .decoder
            .max_utf8_buffer_length(n)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "decoded text too large"))?;
        self.decoded.clear();
        self.decoded.resize(capacity, 0);
        self.pos = 0;
        let (result, _read, written, _replaced) =
            self.decoder
                .decode_to_utf8(&self.chunk[..n], &mut self.decoded, last);
        debug_assert!(matches!(result, CoderResult::InputEmpty));
        self.decoded.truncate(written);
        self.finished = last;
        Ok(())
    }
}

impl<R: Read> Read for TextReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pos < self.decoded.len() {
                let n = out.len().min(self.decoded.len() - self.pos);
                out[..n].copy_from_slice(&self.decoded[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            self.decode_next()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(data: &[u8], charset: Option<&str>) -> String {
        let mut out = String::new();
        TextReader::new(data, charset)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn decodes_declared_charset() {
        assert_eq!(text(b"caf\xe9", Some("ISO-8859-1")), "caf\u{e9}");
        assert_eq!(text("\u{4f60}\u{597d}".as_bytes(), Some("utf-8")), "\u{4f60}\u{597d}");
        assert_eq!(text(b"\xcf\xf0\xe8", Some("windows-1251")), "\u{41f}\u{440}\u{438}");
    }

    #[test]
    fn defaults_to_ascii() {
        let reader = TextReader::new(&b"plain"[..], None).unwrap();
        assert_eq!(reader.charset(), "windows-1252");
        assert_eq!(text(b"plain", None), "plain");
    }

    #[test]
    fn unknown_charset() {
        match TextReader::new(&b""[..], Some("x-klingon")) {
            Err(MimeError::UnsupportedCharset(label)) => assert_eq!(label, "x-klingon"),
            _ => panic!("expected unsupported charset"),
        }
    }
}
