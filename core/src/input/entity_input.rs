/*
 * entity_input.rs
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

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use bytes::BytesMut;

use super::boundary::BoundaryReader;
use super::buffer::{BufferedLineReader, DEFAULT_BUFFER_SIZE};
use super::LineRead;

/// Input of one entity: its own buffer over whatever the parent handed down, plus the
/// part cursor while a multipart body is being walked.
pub(crate) struct EntityInput {
    buffer: BufferedLineReader<Box<dyn Read>>,
    part: Option<BoundaryReader>,
    max_line_len: Option<usize>,
    /// Content read through the data stream since it was last reset.
    used: bool,
    /// The data stream reported end of stream.
    eof: bool,
}

impl EntityInput {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match self.part.as_mut() {
            Some(part) => part.read(&mut self.buffer, out),
            None => self.buffer.read(out),
        }
    }

    fn read_line(&mut self, dst: &mut BytesMut) -> io::Result<usize> {
        match self.part.as_mut() {
            Some(part) => part.read_line(&mut self.buffer, dst, self.max_line_len),
            None => self.buffer.read_line(dst),
        }
    }

    fn reset_flags(&mut self) {
        self.used = false;
        self.eof = false;
    }
}

/// Handle shared between an entity and the readers of its children.
#[derive(Clone)]
pub(crate) struct SharedInput(Rc<RefCell<EntityInput>>);

impl SharedInput {
    pub fn new(source: Box<dyn Read>, max_line_len: Option<usize>, count_lines: bool) -> Self {
        let buffer = BufferedLineReader::new(source, DEFAULT_BUFFER_SIZE, max_line_len)
            .with_line_counting(count_lines);
        Self(Rc::new(RefCell::new(EntityInput {
            buffer,
            part: None,
            max_line_len,
            used: false,
            eof: false,
        })))
    }

    pub fn read_line(&self, dst: &mut BytesMut) -> io::Result<usize> {
        let mut input = self.0.borrow_mut();
        input.used = true;
        let n = input.read_line(dst)?;
        if n == 0 {
            input.eof = true;
        }
        Ok(n)
    }

    /// Only possible while no part cursor is open.
    pub fn unread(&self, data: &[u8]) -> bool {
        let mut input = self.0.borrow_mut();
        input.part.is_none() && input.buffer.unread(data)
    }

    pub fn is_used(&self) -> bool {
        self.0.borrow().used
    }

    pub fn data_eof(&self) -> bool {
        self.0.borrow().eof
    }

    pub fn open_part(&self, boundary: &str, strict: bool) -> io::Result<()> {
        let mut input = self.0.borrow_mut();
        let part = BoundaryReader::new(&mut input.buffer, boundary, strict)?;
        input.part = Some(part);
        input.reset_flags();
        Ok(())
    }

    pub fn close_part(&self) {
        let mut input = self.0.borrow_mut();
        input.part = None;
        input.reset_flags();
    }

    pub fn part_is_empty(&self) -> bool {
        self.0.borrow().part.as_ref().is_some_and(BoundaryReader::is_empty_stream)
    }

    pub fn part_is_last(&self) -> bool {
        self.0.borrow().part.as_ref().is_some_and(BoundaryReader::is_last_part)
    }

    pub fn part_eof(&self) -> bool {
        let input = self.0.borrow();
        input.part.as_ref().is_some_and(|part| part.eof(&input.buffer))
    }

    pub fn part_fully_consumed(&self) -> io::Result<bool> {
        let mut input = self.0.borrow_mut();
        let input = &mut *input;
        match input.part.as_mut() {
            Some(part) => part.is_fully_consumed(&mut input.buffer),
            None => Ok(false),
        }
    }

    pub fn lines_consumed(&self) -> usize {
        self.0.borrow().buffer.lines_consumed()
    }

    pub fn truncate(&self) {
        self.0.borrow_mut().buffer.truncate();
    }

    /// The entity's data stream: the open part, or the rest of the input.
    pub fn reader(&self) -> EntityReader {
        EntityReader {
            input: self.clone(),
            track: true,
        }
    }

    /// Same bytes as [`reader`](Self::reader) without marking the data stream used.
    /// Child entities read through this.
    pub fn lower_reader(&self) -> EntityReader {
        EntityReader {
            input: self.clone(),
            track: false,
        }
    }
}

pub(crate) struct EntityReader {
    input: SharedInput,
    track: bool,
}

impl Read for EntityReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut input = self.input.0.borrow_mut();
        let n = input.read(out)?;
        if self.track {
            input.used = true;
            if n == 0 && !out.is_empty() {
                input.eof = true;
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(data: &'static [u8]) -> SharedInput {
        SharedInput::new(Box::new(data), None, true)
    }

    #[test]
    fn data_stream_flags() {
        let input = shared(b"header\r\n\r\nbody");
        let mut line = BytesMut::new();
        input.read_line(&mut line).unwrap();
        assert!(input.is_used());
        input.close_part();
        assert!(!input.is_used());

        let mut lower = String::new();
        input.lower_reader().take(4).read_to_string(&mut lower).unwrap();
        assert_eq!(lower, "\r\nbo");
        assert!(!input.is_used());

        let mut rest = String::new();
        input.reader().read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "dy");
        assert!(input.is_used());
        assert!(input.data_eof());
    }

    #[test]
    fn parts_through_shared_input() {
        let input = shared(b"--b\r\none\r\n--b--\r\ntail");
        input.open_part("b", false).unwrap();
        assert!(input.part_is_empty());
        let mut preamble = Vec::new();
        input.reader().read_to_end(&mut preamble).unwrap();
        assert!(preamble.is_empty());
        assert!(!input.unread(b"x"));

        input.open_part("b", false).unwrap();
        let mut child = String::new();
        input.lower_reader().read_to_string(&mut child).unwrap();
        assert_eq!(child, "one");
        assert!(input.part_is_last());
        assert!(!input.part_eof());
        assert!(!input.part_fully_consumed().unwrap());
        assert_eq!(input.lines_consumed(), 3);

        input.close_part();
        let mut epilogue = String::new();
        input.reader().read_to_string(&mut epilogue).unwrap();
        assert_eq!(epilogue, "tail");
    }

    #[test]
    fn truncated_input_is_empty() {
        let input = shared(b"line\r\nmore");
        input.truncate();
        let mut line = BytesMut::new();
        assert_eq!(input.read_line(&mut line).unwrap(), 0);
        assert!(input.data_eof());
    }
}
