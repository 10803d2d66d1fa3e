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

//! Byte sources backing the entity state machines: a buffered line reader, the
//! boundary-delimited part cursor layered over it, and the content-length guard.

mod boundary;
mod buffer;
mod entity_input;
mod limited;

use std::io;

use bytes::BytesMut;

pub use boundary::BoundaryReader;
pub use buffer::{BufferedLineReader, DEFAULT_BUFFER_SIZE};
pub(crate) use entity_input::SharedInput;
pub use limited::LimitedReader;

/// Line-at-a-time reads with push-back.
pub trait LineRead {
    /// Appends one line, terminator included, to `dst`.
    /// Returns the number of bytes appended; 0 means end of stream.
    fn read_line(&mut self, dst: &mut BytesMut) -> io::Result<usize>;

    /// Pushes `data` back so it is delivered before anything else.
    /// Returns false when the source cannot take it back.
    fn unread(&mut self, data: &[u8]) -> bool;
}
