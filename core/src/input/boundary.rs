/*
 * boundary.rs
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

//! Cursor over one part of a multipart body: ends at the next `--boundary` delimiter line.
//!
//! The reader holds only the scanning state. All bytes live in the owning entity's
//! [`BufferedLineReader`], which is passed to every call.

use std::io::{self, Read};

use bytes::BytesMut;

use super::buffer::{BufferedLineReader, DEFAULT_BUFFER_SIZE};
use crate::error::MimeError;

#[derive(Debug)]
pub struct BoundaryReader {
    /// `--` followed by the boundary parameter.
    delimiter: Vec<u8>,
    strict: bool,
    /// Underlying source exhausted.
    eof: bool,
    /// End (exclusive) of the bytes that belong to this part.
    limit: usize,
    at_boundary: bool,
    /// Delimiter length plus the line break preceding it.
    boundary_len: usize,
    last_part: bool,
    completed: bool,
    initial_length: Option<usize>,
    /// The last byte handed out ended a line.
    line_start: bool,
}

impl BoundaryReader {
    pub fn new<R: Read>(
        buffer: &mut BufferedLineReader<R>,
        boundary: &str,
        strict: bool,
    ) -> io::Result<Self> {
        buffer.ensure_capacity((2 * boundary.len()).max(DEFAULT_BUFFER_SIZE));
        let mut delimiter = Vec::with_capacity(boundary.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(boundary.as_bytes());
        let mut reader = Self {
            delimiter,
            strict,
            eof: false,
            limit: 0,
            at_boundary: false,
            boundary_len: 0,
            last_part: false,
            completed: false,
            initial_length: None,
            line_start: true,
        };
        // an empty part is only recognised once the delimiter and the byte after it are seen
        loop {
            reader.fill_buffer(buffer)?;
            if reader.eof || reader.at_boundary || buffer.length() > reader.delimiter.len() {
                break;
            }
        }
        Ok(reader)
    }

    /// No bytes left before the boundary and the source is exhausted.
    pub fn eof<R: Read>(&self, buffer: &BufferedLineReader<R>) -> bool {
        self.eof && !buffer.has_buffered_data()
    }

    /// The closing `--boundary--` delimiter was consumed.
    pub fn is_last_part(&self) -> bool {
        self.last_part
    }

    /// The delimiter came before any content.
    pub fn is_empty_stream(&self) -> bool {
        self.initial_length == Some(0)
    }

    /// The delimiter was consumed and nothing follows it.
    pub fn is_fully_consumed<R: Read>(
        &mut self,
        buffer: &mut BufferedLineReader<R>,
    ) -> io::Result<bool> {
        if !self.completed {
            return Ok(false);
        }
        if !buffer.has_buffered_data() && !self.eof && buffer.fill_buffer()?.is_none() {
            self.eof = true;
        }
        Ok(!buffer.has_buffered_data())
    }

    pub fn read<R: Read>(
        &mut self,
        buffer: &mut BufferedLineReader<R>,
        out: &mut [u8],
    ) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.read_allowed(buffer)? {
                return Ok(0);
            }
            self.fill_buffer(buffer)?;
            if self.has_data(buffer) {
                let chunk = out.len().min(self.limit - buffer.pos());
                let n = buffer.take_buffered(&mut out[..chunk]);
                if n > 0 {
                    self.line_start = out[n - 1] == b'\n';
                }
                return Ok(n);
            }
        }
    }

    pub fn read_line<R: Read>(
        &mut self,
        buffer: &mut BufferedLineReader<R>,
        dst: &mut BytesMut,
        max_line_len: Option<usize>,
    ) -> io::Result<usize> {
        if !self.read_allowed(buffer)? {
            return Ok(0);
        }
        let start = dst.len();
        loop {
            if !self.has_data(buffer) {
                self.fill_buffer(buffer)?;
                if self.end_of_stream() && !self.has_data(buffer) {
                    self.skip_boundary(buffer)?;
                    self.verify_end_of_stream(buffer)?;
                    break;
                }
                continue;
            }
            let avail = &buffer.buffered()[..self.limit - buffer.pos()];
            let (chunk, found) = match memchr::memchr(b'\n', avail) {
                Some(i) => (i + 1, true),
                None => (avail.len(), false),
            };
            dst.extend_from_slice(&avail[..chunk]);
            if chunk > 0 {
                self.line_start = avail[chunk - 1] == b'\n';
            }
            buffer.skip(chunk);
            if max_line_len.is_some_and(|max| dst.len() - start > max) {
                return Err(MimeError::MaxLineLength.into());
            }
            if found {
                break;
            }
        }
        Ok(dst.len() - start)
    }

    fn end_of_stream(&self) -> bool {
        self.eof || self.at_boundary
    }

    fn has_data<R: Read>(&self, buffer: &BufferedLineReader<R>) -> bool {
        self.limit > buffer.pos() && self.limit <= buffer.limit()
    }

    fn read_allowed<R: Read>(&mut self, buffer: &mut BufferedLineReader<R>) -> io::Result<bool> {
        if self.completed {
            return Ok(false);
        }
        if self.end_of_stream() && !self.has_data(buffer) {
            self.skip_boundary(buffer)?;
            self.verify_end_of_stream(buffer)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn verify_end_of_stream<R: Read>(&self, buffer: &BufferedLineReader<R>) -> io::Result<()> {
        if self.strict && self.eof && !self.at_boundary && !buffer.is_truncated() {
            return Err(MimeError::UnexpectedEndOfStream.into());
        }
        Ok(())
    }

    fn fill_buffer<R: Read>(&mut self, buffer: &mut BufferedLineReader<R>) -> io::Result<Option<usize>> {
        if self.eof {
            return Ok(None);
        }
        let read = if self.has_data(buffer) {
            Some(0)
        } else {
            buffer.fill_buffer()?
        };
        self.eof = read.is_none();
        match self.find_delimiter(buffer) {
            Some(index) => {
                self.limit = index;
                self.at_boundary = true;
                self.calculate_boundary_len(buffer);
            }
            None if self.eof => self.limit = buffer.limit(),
            // hold back enough bytes to complete a CRLF plus delimiter split across reads
            None => self.limit = buffer.limit().saturating_sub(self.delimiter.len() + 2),
        }
        Ok(read)
    }

    /// Finds a delimiter at the start of a line, followed by `--`, whitespace or a line break.
    fn find_delimiter<R: Read>(&self, buffer: &BufferedLineReader<R>) -> Option<usize> {
        let mut from = buffer.pos();
        while let Some(index) = buffer.index_of(&self.delimiter, from, buffer.limit()) {
            let line_start = if index > buffer.pos() {
                buffer.byte_at(index - 1) == b'\n'
            } else {
                self.line_start
            };
            if !line_start {
                from = index + 1;
                continue;
            }
            let end = index + self.delimiter.len();
            if end == buffer.limit() {
                return self.eof.then_some(index);
            }
            match buffer.byte_at(end) {
                b'-' | b'\r' | b'\n' | b' ' | b'\t' => return Some(index),
                _ => from = index + 1,
            }
        }
        None
    }

    fn calculate_boundary_len<R: Read>(&mut self, buffer: &BufferedLineReader<R>) {
        self.boundary_len = self.delimiter.len();
        let len = self.limit - buffer.pos();
        if self.initial_length.is_none() {
            self.initial_length = Some(len);
        }
        if len > 0 && buffer.byte_at(self.limit - 1) == b'\n' {
            self.boundary_len += 1;
            self.limit -= 1;
        }
        if len > 1 && buffer.byte_at(self.limit - 1) == b'\r' {
            self.boundary_len += 1;
            self.limit -= 1;
        }
    }

    /// Consumes the delimiter line, noting a closing `--` and dropping transport padding.
    fn skip_boundary<R: Read>(&mut self, buffer: &mut BufferedLineReader<R>) -> io::Result<()> {
        if self.completed {
            return Ok(());
        }
        self.completed = true;
        if !self.at_boundary {
            return Ok(());
        }
        buffer.skip(self.boundary_len);
        let mut check_last_part = true;
        loop {
            if buffer.length() > 1 {
                let pos = buffer.pos();
                let (ch1, ch2) = (buffer.byte_at(pos), buffer.byte_at(pos + 1));
                if check_last_part && ch1 == b'-' && ch2 == b'-' {
                    self.last_part = true;
                    buffer.skip(2);
                    check_last_part = false;
                    continue;
                }
                if ch1 == b'\r' && ch2 == b'\n' {
                    buffer.skip(2);
                    break;
                }
                buffer.skip(1);
                if ch1 == b'\n' {
                    break;
                }
            } else if self.eof {
                if buffer.length() == 1 && matches!(buffer.byte_at(buffer.pos()), b'\r' | b'\n') {
                    buffer.skip(1);
                }
                break;
            } else if buffer.fill_buffer()?.is_none() {
                self.eof = true;
            }
        }
        Ok(())
    }
}
