/*
 * buffer.rs
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

//! Buffered byte source with line reads, push-back and truncation.

use std::io::{self, Read};

use bytes::BytesMut;

use super::LineRead;
use crate::error::MimeError;

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Reads from `inner` through an internal buffer whose unread region is `buf[pos..limit]`.
/// The boundary reader inspects that region directly.
pub struct BufferedLineReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    limit: usize,
    max_line_len: Option<usize>,
    truncated: bool,
    count_lines: bool,
    lines: usize,
}

impl<R: Read> BufferedLineReader<R> {
    pub fn new(inner: R, capacity: usize, max_line_len: Option<usize>) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(1)],
            pos: 0,
            limit: 0,
            max_line_len,
            truncated: false,
            count_lines: false,
            lines: 0,
        }
    }

    /// Counts line feeds as they are consumed.
    pub fn with_line_counting(mut self, enabled: bool) -> Self {
        self.count_lines = enabled;
        self
    }

    pub fn lines_consumed(&self) -> usize {
        self.lines
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn ensure_capacity(&mut self, len: usize) {
        if len > self.buf.len() {
            self.buf.resize(len, 0);
        }
    }

    /// Compacts the buffer and reads once from the source.
    /// Returns `None` at end of stream, `Some(0)` when the buffer has no free space.
    pub fn fill_buffer(&mut self) -> io::Result<Option<usize>> {
        if self.truncated {
            return Ok(None);
        }
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.limit, 0);
            self.limit -= self.pos;
            self.pos = 0;
        }
        if self.limit == self.buf.len() {
            return Ok(Some(0));
        }
        loop {
            match self.inner.read(&mut self.buf[self.limit..]) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    self.limit += n;
                    return Ok(Some(n));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Stops delivering data: buffered bytes are dropped and the source is never read again.
    pub fn truncate(&mut self) {
        self.pos = 0;
        self.limit = 0;
        self.truncated = true;
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn has_buffered_data(&self) -> bool {
        self.limit > self.pos
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of buffered, unread bytes.
    pub fn length(&self) -> usize {
        self.limit - self.pos
    }

    pub fn byte_at(&self, index: usize) -> u8 {
        self.buf[index]
    }

    /// Buffered, unread bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.pos..self.limit]
    }

    /// Absolute index of `pattern` within `buf[from..to]`.
    pub fn index_of(&self, pattern: &[u8], from: usize, to: usize) -> Option<usize> {
        if from >= to {
            return None;
        }
        memchr::memmem::find(&self.buf[from..to], pattern).map(|i| from + i)
    }

    /// Consumes up to `n` buffered bytes.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.length());
        if self.count_lines {
            self.lines += memchr::memchr_iter(b'\n', &self.buf[self.pos..self.pos + n]).count();
        }
        self.pos += n;
        n
    }

    /// Copies buffered bytes into `out` without touching the source.
    pub fn take_buffered(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.length());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.skip(n)
    }
}

impl<R: Read> Read for BufferedLineReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.truncated || out.is_empty() {
            return Ok(0);
        }
        while !self.has_buffered_data() {
            if self.fill_buffer()?.is_none() {
                return Ok(0);
            }
        }
        Ok(self.take_buffered(out))
    }
}

impl<R: Read> LineRead for BufferedLineReader<R> {
    fn read_line(&mut self, dst: &mut BytesMut) -> io::Result<usize> {
        if self.truncated {
            return Ok(0);
        }
        let start = dst.len();
        let mut found = false;
        while !found {
            if !self.has_buffered_data() && self.fill_buffer()?.is_none() {
                break;
            }
            let chunk = match memchr::memchr(b'\n', self.buffered()) {
                Some(i) => {
                    found = true;
                    i + 1
                }
                None => self.length(),
            };
            dst.extend_from_slice(&self.buf[self.pos..self.pos + chunk]);
            self.skip(chunk);
            if self.max_line_len.is_some_and(|max| dst.len() - start > max) {
                return Err(MimeError::MaxLineLength.into());
            }
        }
        Ok(dst.len() - start)
    }

    fn unread(&mut self, data: &[u8]) -> bool {
        if self.truncated {
            return false;
        }
        if data.len() <= self.pos {
            let start = self.pos - data.len();
            self.buf[start..self.pos].copy_from_slice(data);
            self.pos = start;
        } else {
            let mut merged = Vec::with_capacity(data.len() + self.buf.len());
            merged.extend_from_slice(data);
            merged.extend_from_slice(&self.buf[self.pos..self.limit]);
            let limit = merged.len();
            merged.resize(limit + self.buf.len(), 0);
            self.buf = merged;
            self.pos = 0;
            self.limit = limit;
        }
        if self.count_lines {
            let pushed = memchr::memchr_iter(b'\n', data).count();
            self.lines = self.lines.saturating_sub(pushed);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out its data a few bytes at a time.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(out.len()).min(self.data.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn lines<R: Read>(reader: &mut BufferedLineReader<R>) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let mut line = BytesMut::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                return out;
            }
            out.push(line.to_vec());
        }
    }

    #[test]
    fn reads_lines_across_fills() {
        let source = Trickle {
            data: b"first\r\nsecond\nlast",
            step: 3,
        };
        let mut reader = BufferedLineReader::new(source, 8, None);
        assert_eq!(
            lines(&mut reader),
            vec![b"first\r\n".to_vec(), b"second\n".to_vec(), b"last".to_vec()]
        );
    }

    #[test]
    fn line_limit() {
        let mut reader = BufferedLineReader::new(&b"0123456789\r\n"[..], 64, Some(5));
        let mut line = BytesMut::new();
        let err = reader.read_line(&mut line).unwrap_err();
        assert!(matches!(MimeError::from(err), MimeError::MaxLineLength));

        let mut reader = BufferedLineReader::new(&b"abc\r\n"[..], 64, Some(5));
        assert_eq!(lines(&mut reader), vec![b"abc\r\n".to_vec()]);
    }

    #[test]
    fn unread_is_delivered_first() {
        let mut reader = BufferedLineReader::new(&b"one\ntwo\n"[..], 16, None);
        let mut line = BytesMut::new();
        reader.read_line(&mut line).unwrap();
        assert!(reader.unread(b"zero\none\n"));
        assert_eq!(
            lines(&mut reader),
            vec![b"zero\n".to_vec(), b"one\n".to_vec(), b"two\n".to_vec()]
        );
    }

    #[test]
    fn truncate_stops_reading() {
        let mut reader = BufferedLineReader::new(&b"one\ntwo\n"[..], 16, None);
        let mut line = BytesMut::new();
        reader.read_line(&mut line).unwrap();
        reader.truncate();
        let mut out = [0u8; 8];
        assert_eq!(reader.read(&mut out).unwrap(), 0);
        assert_eq!(reader.read_line(&mut line).unwrap(), 0);
        assert!(!reader.unread(b"x"));
    }

    #[test]
    fn counts_consumed_lines() {
        let mut reader = BufferedLineReader::new(&b"a\nb\nc\n"[..], 16, None).with_line_counting(true);
        let mut line = BytesMut::new();
        reader.read_line(&mut line).unwrap();
        reader.read_line(&mut line).unwrap();
        assert_eq!(reader.lines_consumed(), 2);
        reader.unread(b"b\n");
        assert_eq!(reader.lines_consumed(), 1);
    }

    #[test]
    fn ensure_capacity_grows() {
        let mut reader = BufferedLineReader::new(&b""[..], 16, None);
        reader.ensure_capacity(100);
        assert_eq!(reader.capacity(), 100);
        reader.ensure_capacity(10);
        assert_eq!(reader.capacity(), 100);
    }
}
