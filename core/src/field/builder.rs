/*
 * builder.rs
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

//! Accumulators folding physical header lines into one logical field.

use bytes::{Bytes, BytesMut};

use super::{parse_raw_field, RawField};
use crate::error::{MimeError, Result};
use crate::util::{content_len, is_whitespace};

pub trait FieldBuilder {
    fn reset(&mut self);

    /// Adds one physical line, terminator included.
    fn append(&mut self, line: &[u8]) -> Result<()>;

    /// `Ok(None)` when nothing was appended since the last reset.
    fn build(&mut self) -> Result<Option<RawField>>;

    /// Exact bytes appended since the last reset, if this builder keeps them.
    fn raw(&self) -> Option<&[u8]>;
}

/// Keeps the original bytes so the field can be reproduced exactly.
/// Fails with [`MimeError::MaxHeaderLength`] once a field outgrows the limit.
#[derive(Debug, Default)]
pub struct StrictFieldBuilder {
    buf: BytesMut,
    max_len: Option<usize>,
}

impl StrictFieldBuilder {
    pub fn new(max_len: Option<usize>) -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            max_len,
        }
    }
}

impl FieldBuilder for StrictFieldBuilder {
    fn reset(&mut self) {
        self.buf.clear();
    }

    fn append(&mut self, line: &[u8]) -> Result<()> {
        if self
            .max_len
            .is_some_and(|max| self.buf.len() + line.len() > max)
        {
            return Err(MimeError::MaxHeaderLength);
        }
        self.buf.extend_from_slice(line);
        Ok(())
    }

    fn build(&mut self) -> Result<Option<RawField>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let raw = Bytes::copy_from_slice(&self.buf[..content_len(&self.buf)]);
        parse_raw_field(raw).map(Some)
    }

    fn raw(&self) -> Option<&[u8]> {
        Some(&self.buf)
    }
}

/// Trims every line and joins continuations with a single space.
/// Bytes past the length limit are dropped; the original form is not kept.
#[derive(Debug, Default)]
pub struct LenientFieldBuilder {
    buf: BytesMut,
    max_len: Option<usize>,
}

impl LenientFieldBuilder {
    pub fn new(max_len: Option<usize>) -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            max_len,
        }
    }
}

fn trim(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|&b| !is_whitespace(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|&b| !is_whitespace(b)).map_or(start, |i| i + 1);
    &line[start..end]
}

impl FieldBuilder for LenientFieldBuilder {
    fn reset(&mut self) {
        self.buf.clear();
    }

    fn append(&mut self, line: &[u8]) -> Result<()> {
        let line = trim(line);
        if line.is_empty() {
            return Ok(());
        }
        let mut room = self
            .max_len
            .map_or(usize::MAX, |max| max.saturating_sub(self.buf.len()));
        if !self.buf.is_empty() && room > 0 {
            self.buf.extend_from_slice(b" ");
            room -= 1;
        }
        self.buf.extend_from_slice(&line[..line.len().min(room)]);
        Ok(())
    }

    fn build(&mut self) -> Result<Option<RawField>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let field = parse_raw_field(Bytes::copy_from_slice(&self.buf))?;
        Ok(Some(field.detach()))
    }

    fn raw(&self) -> Option<&[u8]> {
        None
    }
}
