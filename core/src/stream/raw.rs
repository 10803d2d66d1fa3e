/*
 * raw.rs
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

use std::io::Read;

use super::context::ParseContext;
use super::entity::EntityStateMachine;
use super::state::{EntityState, RecursionMode};
use crate::descriptor::BodyDescriptor;
use crate::error::{MimeError, Result};
use crate::field::{ParsedField, RawField};
use crate::input::LimitedReader;

/// A body part or embedded message handed out as one unparsed stream.
pub(crate) struct RawEntity {
    state: EntityState,
    source: Box<dyn Read>,
    line: usize,
}

impl RawEntity {
    /// `max_content_len` bounds the whole raw stream, as for any other content.
    pub fn new(source: Box<dyn Read>, line: usize, max_content_len: Option<u64>) -> Self {
        let source: Box<dyn Read> = match max_content_len {
            Some(limit) => Box::new(LimitedReader::new(source, limit)),
            None => source,
        };
        Self {
            state: EntityState::RawEntity,
            source,
            line,
        }
    }
}

impl EntityStateMachine for RawEntity {
    fn state(&self) -> EntityState {
        self.state
    }

    fn set_recursion_mode(&mut self, _mode: RecursionMode) {}

    fn advance(&mut self, _ctx: &mut ParseContext) -> Result<Option<Box<dyn EntityStateMachine>>> {
        if self.state != EntityState::RawEntity {
            return Err(MimeError::IllegalState("entity already finished"));
        }
        self.state = EntityState::EndOfStream;
        Ok(None)
    }

    fn field(&self) -> Option<&RawField> {
        None
    }

    fn parsed_field(&self) -> Option<&ParsedField> {
        None
    }

    fn body_descriptor(&self) -> Option<&BodyDescriptor> {
        None
    }

    fn content_stream(&mut self, _ctx: &ParseContext) -> Result<Box<dyn Read + '_>> {
        if self.state != EntityState::RawEntity {
            return Err(MimeError::IllegalState("no content stream in this state"));
        }
        Ok(Box::new(&mut self.source))
    }

    fn decoded_content_stream(&mut self, _ctx: &ParseContext) -> Result<Box<dyn Read + '_>> {
        Err(MimeError::IllegalState("raw entities have no decoded content"))
    }

    fn line_number(&self) -> usize {
        self.line
    }

    // The parent's input is truncated instead.
    fn stop(&mut self) {}
}
